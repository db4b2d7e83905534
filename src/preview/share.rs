use crate::error::ShareError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};

/// File handed to a native share target
#[derive(Debug, Clone, PartialEq)]
pub struct ShareFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: std::sync::Arc<Vec<u8>>,
}

impl ShareFile {
    pub const PNG_NAME: &'static str = "photo.png";
    pub const PNG_MIME: &'static str = "image/png";

    pub fn png(bytes: std::sync::Arc<Vec<u8>>) -> Self {
        Self {
            name: Self::PNG_NAME.to_string(),
            mime_type: Self::PNG_MIME.to_string(),
            bytes,
        }
    }
}

/// Platform share facility
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Whether this target accepts `file` at all
    fn can_share(&self, file: &ShareFile) -> bool;

    async fn share(&self, file: &ShareFile) -> Result<(), ShareError>;
}

/// No share facility on this device
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedShare;

#[async_trait]
impl ShareTarget for UnsupportedShare {
    fn can_share(&self, _file: &ShareFile) -> bool {
        false
    }

    async fn share(&self, _file: &ShareFile) -> Result<(), ShareError> {
        Err(ShareError::Unsupported)
    }
}

/// Shares by writing the file to a staging directory and running an
/// external command with the file path appended to its arguments.
#[derive(Debug, Clone)]
pub struct CommandShare {
    command: String,
    args: Vec<String>,
    staging_dir: PathBuf,
}

impl CommandShare {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            staging_dir: std::env::temp_dir().join("photobooth-share"),
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }
}

#[async_trait]
impl ShareTarget for CommandShare {
    fn can_share(&self, file: &ShareFile) -> bool {
        !self.command.is_empty() && file.mime_type == ShareFile::PNG_MIME
    }

    async fn share(&self, file: &ShareFile) -> Result<(), ShareError> {
        let failed = |details: String| ShareError::Failed { details };

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|e| failed(format!("staging directory: {}", e)))?;
        let path = self.staging_dir.join(&file.name);
        tokio::fs::write(&path, file.bytes.as_slice())
            .await
            .map_err(|e| failed(format!("staging file: {}", e)))?;

        debug!("Running share command {} for {}", self.command, path.display());
        let status = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .arg(&path)
            .status()
            .await
            .map_err(|e| failed(format!("{}: {}", self.command, e)))?;

        if status.success() {
            info!("Shared {} via {}", file.name, self.command);
            Ok(())
        } else {
            Err(failed(format!("{} exited with {}", self.command, status)))
        }
    }
}
