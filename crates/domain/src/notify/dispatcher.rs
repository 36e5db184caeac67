//! Fire-and-forget delivery of alert messages on a background task.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::{mpsc, oneshot};

use super::{AlertMessage, Notifier};

enum Job {
    Deliver(AlertMessage),
    Drain(oneshot::Sender<()>),
}

/// Fire-and-forget alert delivery.
///
/// Messages are handed to a background task in enqueue order. Delivery
/// failures are logged and counted, never reported to the enqueuer.
#[derive(Clone)]
pub struct AlertDispatcher {
    sender: mpsc::UnboundedSender<Job>,
}

impl AlertDispatcher {
    /// Spawns the delivery task on the current tokio runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                match job {
                    Job::Deliver(message) => {
                        if let Err(e) = notifier.send(&message).await {
                            counter!("notifier_failures_total").increment(1);
                            tracing::warn!(
                                to = %message.to,
                                subject = %message.subject,
                                error = %e,
                                "alert delivery failed"
                            );
                        }
                    }
                    Job::Drain(done) => {
                        let _ = done.send(());
                    }
                }
            }
            tracing::debug!("alert dispatcher stopped");
        });

        Self { sender }
    }

    /// Queues a message for delivery.
    pub fn enqueue(&self, message: AlertMessage) {
        if self.sender.send(Job::Deliver(message)).is_err() {
            counter!("notifier_failures_total").increment(1);
            tracing::warn!("alert dispatcher is not running; alert dropped");
        }
    }

    /// Waits until every message queued before this call was handed to the notifier.
    pub async fn drain(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.send(Job::Drain(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher").finish_non_exhaustive()
    }
}
