//! Outbound alert delivery.
//!
//! The actual transport (email) is an external collaborator; the domain only
//! formats messages and hands them to a [`Notifier`] through the
//! fire-and-forget [`AlertDispatcher`].

mod dispatcher;
mod memory;
mod tracing_notifier;

pub use dispatcher::AlertDispatcher;
pub use memory::InMemoryNotifier;
pub use tracing_notifier::TracingNotifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A formatted alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl AlertMessage {
    /// Builds the low-stock alert sent to one recipient.
    pub fn low_stock(
        sender: &str,
        recipient: &str,
        ingredient_name: &str,
        stock: u32,
        threshold: u32,
    ) -> Self {
        let name = escape_html(ingredient_name);
        let html_body = format!(
            "<div style=\"font-family: sans-serif;\">\
             <h2>Low Stock Alert</h2>\
             <p><strong>{name}</strong> stock has fallen below threshold.</p>\
             <p><strong>New Stock:</strong> {stock}</p>\
             <p><strong>Threshold:</strong> {threshold}</p>\
             <p>Please restock as soon as possible.</p>\
             </div>"
        );

        Self {
            from: sender.to_string(),
            to: recipient.trim().to_string(),
            subject: format!("Low Stock Alert: {ingredient_name}"),
            html_body,
        }
    }
}

/// Escapes the characters that would otherwise be read as HTML markup.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Errors reported by a notifier transport.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery to {to} failed: {reason}")]
    Delivery { to: String, reason: String },
}

/// Transport that delivers alert messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one message.
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError>;
}
