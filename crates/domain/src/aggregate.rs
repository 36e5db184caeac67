//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use store::Version;
use uuid::Uuid;

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name, used in logs and metrics labels.
    fn event_type(&self) -> &'static str;
}

/// Trait for aggregates persisted as versioned documents.
///
/// Aggregates never mutate themselves from a command directly:
/// - command methods validate against the current state and return events
/// - `apply` folds an event into the state (pure, deterministic)
/// - the [`crate::CommandHandler`] persists the folded state with an
///   optimistic version check
pub trait Aggregate: Default + Serialize + DeserializeOwned + Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The type of errors this aggregate's commands can produce.
    type Error: std::error::Error + Send + Sync;

    /// Typed identifier of the aggregate.
    type Id: Copy + Into<Uuid> + From<Uuid> + std::fmt::Display + Send + Sync;

    /// Returns the aggregate type name.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identifier, or None for an uninitialized aggregate.
    fn id(&self) -> Option<Self::Id>;

    /// Returns the stored version (0 until first persisted).
    fn version(&self) -> Version;

    /// Sets the aggregate version. Called by the command handler.
    fn set_version(&mut self, version: Version);

    /// When the aggregate came into existence.
    fn created_at(&self) -> DateTime<Utc>;

    /// Owning principal, indexed by the store for owner-scoped queries.
    fn owner(&self) -> Option<Uuid> {
        None
    }

    /// Status tag, indexed by the store for status-scoped queries.
    fn status_tag(&self) -> Option<String> {
        None
    }

    /// Collection-wide unique key; the store rejects a second holder.
    fn unique_key(&self) -> Option<String> {
        None
    }

    /// Applies an event to the aggregate, updating its state.
    ///
    /// This method must be pure and deterministic and must not fail
    /// (events represent facts that have happened).
    fn apply(&mut self, event: Self::Event);

    /// Applies multiple events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}
