use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AlertMessage, Notifier, NotifyError};

/// In-memory notifier for testing.
///
/// Records every delivered message and can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    sent: Arc<RwLock<Vec<AlertMessage>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to reject every subsequent message.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Returns the messages delivered so far.
    pub async fn sent(&self) -> Vec<AlertMessage> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Delivery {
                to: message.to.clone(),
                reason: "transport unavailable".to_string(),
            });
        }

        self.sent.write().await.push(message.clone());
        Ok(())
    }
}
