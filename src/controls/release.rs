use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Ownership of the one scheduled actuator release.
///
/// Dropping or cancelling the handle guarantees the release will not touch
/// controller state: the task re-checks `token` under the controller lock
/// before doing anything.
#[derive(Debug)]
pub struct PendingRelease {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PendingRelease {
    pub fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { token, task }
    }

    /// Must be called with the controller lock held.
    pub fn cancel(self) {
        self.token.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_waiting_task() {
        let token = CancellationToken::new();
        let fired = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));

        let task_token = token.clone();
        let task_fired = fired.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = task_token.cancelled() => {},
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    task_fired.store(true, std::sync::atomic::Ordering::SeqCst);
                }
            }
        });

        let pending = PendingRelease::new(token.clone(), task);
        assert!(!token.is_cancelled());
        pending.cancel();
        assert!(token.is_cancelled());

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(!fired.load(std::sync::atomic::Ordering::SeqCst));
    }
}
