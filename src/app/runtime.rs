use super::booth::PhotoBooth;
use super::types::ShutdownReason;
use crate::touch::TouchInput;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

impl PhotoBooth {
    /// Feed touch input to the overlay until a shutdown is requested
    pub async fn run(
        &mut self,
        mut touches: mpsc::UnboundedReceiver<TouchInput>,
        cancel: CancellationToken,
    ) -> ShutdownReason {
        info!("Photo booth is running");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let reason = loop {
            tokio::select! {
                _ = cancel.cancelled() => break ShutdownReason::UserRequest,
                _ = &mut ctrl_c => {
                    info!("Received SIGINT signal (Ctrl+C)");
                    break ShutdownReason::Signal("SIGINT".to_string());
                }
                input = touches.recv() => match input {
                    Some(input) => self.handle_touch(&input),
                    None => break ShutdownReason::Error("touch input closed".to_string()),
                },
                Some(timer) = self.gestures.next_timer() => {
                    let outcomes = self.gestures.handle_timer(&mut self.scene, timer);
                    self.publish_outcomes(outcomes);
                }
            }
        };

        self.shutdown(reason.clone());
        reason
    }
}
