use tokio::sync::broadcast::{error::RecvError, Receiver};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::models::control_event::StateChangeEvent;

/// Task: Log every fan state change the controller reports.
/// Can be cancelled.
#[tracing::instrument(skip_all)]
pub async fn task_control_event_logging(
    token: CancellationToken,
    mut rx_state_changes: Receiver<StateChangeEvent>,
) {
    info!("Started.");
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                warn!("Cancelled.");
                break;
            },
            received = rx_state_changes.recv() => match received {
                Ok(event) => info!("Got control event: {}", event),
                Err(RecvError::Lagged(skipped)) => warn!("Missed {} control events.", skipped),
                Err(RecvError::Closed) => {
                    warn!("Control event channel closed.");
                    break;
                }
            }
        };
    }
}
