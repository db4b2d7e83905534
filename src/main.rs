use anyhow::{Context, Result};
use clap::Parser;
use photobooth::camera::CameraDevice;
use photobooth::error::EventBusError;
use photobooth::events::{EventBus, EventFilter, EventReceiver};
use photobooth::geofence::FixedLocation;
use photobooth::preview::ShareOutcome;
use photobooth::touch::TouchInput;
use photobooth::{FacingMode, PhotoBooth, PhotoboothConfig, ShutdownReason};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(about = "Camera photo booth with decorative frames and touch-driven stickers")]
#[command(version)]
#[command(long_about = "A photo booth that streams a camera, lets users place, move, scale, \
rotate and lock stickers over the live view, and exports the composed photo as a PNG. \
Optionally gated to a geographic area.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "photobooth.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Also write logs to daily files in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the booth")]
    validate_config: bool,

    /// Print the effective configuration and exit
    #[arg(long, help = "Print the effective configuration in TOML format and exit")]
    print_config: bool,

    /// Camera to open: environment or user
    #[arg(long, value_name = "FACING")]
    facing: Option<FacingMode>,

    /// Sticker images to place, in order
    #[arg(long = "sticker", value_name = "PATH")]
    stickers: Vec<String>,

    /// Drag the last sticker by "dx,dy" CSS pixels before capture
    #[arg(long, value_name = "DX,DY", value_parser = parse_pair)]
    drag: Option<(f64, f64)>,

    /// Directory for saved photos
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Share the photo instead of only saving it
    #[arg(long)]
    share: bool,

    /// Device position as "lat,lng" for the geofence check
    #[arg(long, value_name = "LAT,LNG", value_parser = parse_pair)]
    position: Option<(f64, f64)>,

    /// Drive stickers from the touchscreen until interrupted
    #[cfg(all(feature = "touchscreen", target_os = "linux"))]
    #[arg(long)]
    touch_session: bool,
}

fn parse_pair(value: &str) -> std::result::Result<(f64, f64), String> {
    let (a, b) = value
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated numbers, got '{}'", value))?;
    let a = a.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let b = b.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((a, b))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = PhotoboothConfig::load_from_file(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    if let Some(facing) = args.facing {
        config.camera.facing_mode = facing;
    }
    if let Some(output) = &args.output {
        config.export.output_dir = output.clone();
    }

    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let _log_guard = init_logging(&args)?;
    info!("Starting photobooth v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                info!("Configuration validation successful");
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    let event_bus = Arc::new(EventBus::new(128));
    let logger = spawn_event_logger(&event_bus);

    let mut builder = PhotoBooth::builder()
        .with_camera(create_camera(&config)?)
        .with_event_bus(Arc::clone(&event_bus));
    if let Some((latitude, longitude)) = args.position {
        builder = builder.with_location(Arc::new(FixedLocation::new(latitude, longitude)));
    }
    let mut booth = builder.with_config(config).build()?;

    if !booth.initialize().await {
        let message = booth
            .modal()
            .and_then(|modal| modal.text())
            .unwrap_or("The photo booth could not start")
            .to_string();
        error!("{}", message);
        eprintln!("✗ {}", message);
        booth.shutdown(ShutdownReason::Error(message));
        logger.abort();
        std::process::exit(1);
    }
    booth.dismiss_modal();

    #[cfg(all(feature = "touchscreen", target_os = "linux"))]
    if args.touch_session {
        let reason = run_touch_session(&mut booth).await?;
        info!("Touch session ended: {}", reason);
        logger.abort();
        return Ok(());
    }

    let mut last_sticker = None;
    for path in &args.stickers {
        last_sticker = Some(booth.add_sticker(path.as_str()).await?);
    }

    if let (Some(id), Some((dx, dy))) = (last_sticker, args.drag) {
        if let Some(center) = booth.scene().get(id).map(|sticker| sticker.center()) {
            booth.handle_touch(&TouchInput::start(center.x, center.y));
            booth.handle_touch(&TouchInput::moved(center.x + dx, center.y + dy));
            booth.handle_touch(&TouchInput::end(center.x + dx, center.y + dy));
        }
    }

    let session = booth.capture().await?;
    info!("Captured {}x{} photo", session.width, session.height);

    if args.share {
        match booth.share_photo().await? {
            ShareOutcome::Shared { file_name } => println!("✓ Shared {}", file_name),
            ShareOutcome::SavedInstead { path, notice } => {
                warn!("{}", notice);
                println!("✓ Saved {}", path.display());
            }
        }
    } else {
        let path = booth.save_photo().await?;
        println!("✓ Saved {}", path.display());
    }

    booth.shutdown(ShutdownReason::UserRequest);
    logger.abort();
    Ok(())
}

#[cfg(all(feature = "camera", target_os = "linux"))]
fn create_camera(config: &PhotoboothConfig) -> Result<Arc<dyn CameraDevice>> {
    let camera = photobooth::camera::GstCameraDevice::new(config.camera.clone())?;
    Ok(Arc::new(camera))
}

#[cfg(not(all(feature = "camera", target_os = "linux")))]
fn create_camera(config: &PhotoboothConfig) -> Result<Arc<dyn CameraDevice>> {
    warn!("Built without camera support, using the synthetic test pattern");
    let (width, height) = config.camera.ideal_resolution;
    Ok(Arc::new(photobooth::SyntheticCamera::new(
        width.min(1920),
        height.min(1080),
    )))
}

#[cfg(all(feature = "touchscreen", target_os = "linux"))]
async fn run_touch_session(booth: &mut PhotoBooth) -> Result<ShutdownReason> {
    use photobooth::touch::TouchInputHandler;
    use photobooth::PhotoboothEvent;
    use tokio_util::sync::CancellationToken;

    let cancel = CancellationToken::new();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let (width, height) = booth.config().display.resolution;
    let handler =
        TouchInputHandler::new(&booth.config().display).with_surface((width as f64, height as f64));
    let reader = handler.start(cancel.clone(), tx)?;

    let reason = booth.run(rx, cancel.clone()).await;
    cancel.cancel();
    if let Err(e) = reader.await? {
        warn!("Touch reader stopped with error: {}", e);
        booth.event_bus().publish(PhotoboothEvent::SystemError {
            component: "touch".to_string(),
            error: e.to_string(),
        });
    }
    Ok(reason)
}

/// Log every booth event until the bus closes
fn spawn_event_logger(event_bus: &EventBus) -> tokio::task::JoinHandle<()> {
    let mut receiver = EventReceiver::new(
        event_bus.subscribe(),
        EventFilter::All,
        "event-logger".to_string(),
    );
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => info!(event_type = event.event_type(), "{}", event.description()),
                Err(EventBusError::Lagged { .. }) => continue,
                Err(_) => break,
            }
        }
    })
}

fn init_logging(args: &Args) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("photobooth={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "photobooth.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(file_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}
