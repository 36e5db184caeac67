//! Command handling infrastructure.

use std::marker::PhantomData;

use store::{Document, DocumentQuery, DocumentStore, Version};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The events that were generated and applied.
    pub events: Vec<A::Event>,

    /// The new version of the aggregate after the command.
    pub new_version: Version,
}

/// Handler for executing commands against aggregates of one collection.
///
/// The handler is responsible for:
/// 1. Loading the aggregate document from the store
/// 2. Executing the command to produce events
/// 3. Folding the events into the aggregate
/// 4. Persisting the new state with an optimistic version check
pub struct CommandHandler<S, A>
where
    S: DocumentStore,
    A: Aggregate,
{
    store: S,
    collection: String,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: DocumentStore,
    A: Aggregate,
    DomainError: From<A::Error>,
{
    /// Creates a new command handler over `collection`.
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the collection this handler writes to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load(&self, id: A::Id) -> Result<Option<A>, DomainError> {
        match self.store.get(&self.collection, id.into()).await? {
            Some(document) => Ok(Some(Self::decode(document)?)),
            None => Ok(None),
        }
    }

    /// Loads an aggregate or fails with `NotFound`.
    pub async fn load_existing(&self, id: A::Id) -> Result<A, DomainError> {
        self.load(id).await?.ok_or_else(|| DomainError::NotFound {
            entity: A::aggregate_type(),
            id: id.to_string(),
        })
    }

    /// Loads the aggregate currently holding `key`.
    pub async fn load_by_unique_key(&self, key: &str) -> Result<Option<A>, DomainError> {
        match self.store.get_by_unique_key(&self.collection, key).await? {
            Some(document) => Ok(Some(Self::decode(document)?)),
            None => Ok(None),
        }
    }

    /// Loads all aggregates matching the query built by `refine`.
    pub async fn query(
        &self,
        refine: impl FnOnce(DocumentQuery) -> DocumentQuery,
    ) -> Result<Vec<A>, DomainError> {
        let query = refine(DocumentQuery::collection(self.collection.as_str()));
        self.store
            .query(query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    /// Executes a creation command against a fresh aggregate and inserts it.
    pub async fn create<F>(&self, command_fn: F) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
    {
        let mut aggregate = A::default();
        let events = command_fn(&aggregate)?;
        aggregate.apply_events(events.iter().cloned());

        let document = self.to_document(&aggregate)?;
        let stored = self.store.insert(document).await?;
        aggregate.set_version(stored.version);

        Self::record(&events);
        Ok(CommandResult {
            aggregate,
            events,
            new_version: stored.version,
        })
    }

    /// Executes a command against an existing aggregate and persists the result.
    ///
    /// The command function receives the current aggregate state and returns
    /// either a list of events to apply, or an error.
    pub async fn execute<F>(
        &self,
        id: A::Id,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
    {
        let aggregate = self.load_existing(id).await?;
        self.execute_on(aggregate, command_fn).await
    }

    /// Executes a command against an already loaded aggregate.
    ///
    /// The write fails with a concurrency conflict if the aggregate changed
    /// since it was loaded.
    pub async fn execute_on<F>(
        &self,
        mut aggregate: A,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Vec<A::Event>, A::Error>,
    {
        let current_version = aggregate.version();
        let events = command_fn(&aggregate)?;

        if events.is_empty() {
            return Ok(CommandResult {
                aggregate,
                events: vec![],
                new_version: current_version,
            });
        }

        aggregate.apply_events(events.iter().cloned());

        let document = self.to_document(&aggregate)?;
        let stored = self.store.update(document, current_version).await?;
        aggregate.set_version(stored.version);

        Self::record(&events);
        Ok(CommandResult {
            aggregate,
            events,
            new_version: stored.version,
        })
    }

    /// Removes an aggregate. Returns false if it did not exist.
    pub async fn delete(&self, id: A::Id) -> Result<bool, DomainError> {
        Ok(self.store.delete(&self.collection, id.into()).await?)
    }

    fn to_document(&self, aggregate: &A) -> Result<Document, DomainError> {
        let id = aggregate.id().ok_or_else(|| {
            DomainError::Validation(format!(
                "{} has no identity after its creation events",
                A::aggregate_type()
            ))
        })?;

        Ok(
            Document::new(self.collection.as_str(), id.into(), serde_json::to_value(aggregate)?)
                .with_owner(aggregate.owner())
                .with_status(aggregate.status_tag())
                .with_unique_key(aggregate.unique_key())
                .with_created_at(aggregate.created_at()),
        )
    }

    fn decode(document: Document) -> Result<A, DomainError> {
        let mut aggregate: A = serde_json::from_value(document.payload)?;
        aggregate.set_version(document.version);
        Ok(aggregate)
    }

    fn record(events: &[A::Event]) {
        for event in events {
            tracing::debug!(
                aggregate = A::aggregate_type(),
                event = event.event_type(),
                "event applied"
            );
        }
    }
}
