use async_trait::async_trait;

use super::{AlertMessage, Notifier, NotifyError};

/// Notifier that writes alerts to the log instead of delivering them.
///
/// Used by the server when no outbound transport is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "alert dispatched"
        );
        Ok(())
    }
}
