//! Display names of principals seen at the boundary.

use common::{Principal, PrincipalId, Role};
use serde::{Deserialize, Serialize};
use store::{Document, DocumentStore, StoreError};

use crate::error::DomainError;

const COLLECTION: &str = "principals";

/// Name shown for principals that never supplied one.
pub const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PrincipalRecord {
    id: PrincipalId,
    role: Role,
    name: String,
}

/// Records the names carried by principal claims so administrator listings
/// can show who placed an order.
pub struct PrincipalDirectory<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> PrincipalDirectory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stores or refreshes the principal's display name.
    ///
    /// Claims without a name are ignored. Losing a race against a concurrent
    /// request of the same principal is not an error.
    pub async fn record(&self, principal: &Principal) -> Result<(), DomainError> {
        let Some(name) = principal.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
        else {
            return Ok(());
        };

        let record = PrincipalRecord {
            id: principal.id,
            role: principal.role,
            name: name.to_string(),
        };

        let existing = self.store.get(COLLECTION, principal.id.as_uuid()).await?;
        let result = match existing {
            Some(document) => {
                let current: PrincipalRecord = document.decode()?;
                if current.name == record.name && current.role == record.role {
                    return Ok(());
                }
                let updated = Document {
                    payload: serde_json::to_value(&record)?,
                    ..document.clone()
                };
                self.store.update(updated, document.version).await
            }
            None => {
                let document = Document::new(
                    COLLECTION,
                    principal.id.as_uuid(),
                    serde_json::to_value(&record)?,
                );
                self.store.insert(document).await
            }
        };

        match result {
            Ok(_) => {
                tracing::debug!(principal = %principal.id, "principal name recorded");
                Ok(())
            }
            Err(StoreError::AlreadyExists { .. } | StoreError::ConcurrencyConflict { .. }) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The recorded name, or [`UNKNOWN_NAME`].
    pub async fn display_name(&self, id: PrincipalId) -> Result<String, DomainError> {
        match self.store.get(COLLECTION, id.as_uuid()).await? {
            Some(document) => Ok(document.decode::<PrincipalRecord>()?.name),
            None => Ok(UNKNOWN_NAME.to_string()),
        }
    }
}
