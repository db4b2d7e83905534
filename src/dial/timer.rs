use super::machine::TimerId;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A pending long-press. Reports its id on `fired` unless cancelled first.
#[derive(Debug)]
pub struct LongPressTimer {
    id: TimerId,
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl LongPressTimer {
    pub fn spawn(id: TimerId, after: Duration, fired: mpsc::UnboundedSender<TimerId>) -> Self {
        let cancellation_token = CancellationToken::new();
        let token = cancellation_token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(after) => {
                    trace!("Long-press timer {:?} fired", id);
                    let _ = fired.send(id);
                }
                _ = token.cancelled() => {
                    trace!("Long-press timer {:?} cancelled", id);
                }
            }
        });

        Self {
            id,
            cancellation_token,
            handle,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for LongPressTimer {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
