use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version number of a stored document, used for optimistic concurrency control.
///
/// A document is written at version 1 and every successful update bumps it by one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version (0) of a document that has never been written.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) a document has right after insertion.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A JSON document stored in a named collection.
///
/// Besides the payload, a document carries the few attributes the store can
/// filter and constrain on: the owning principal, a status tag and an optional
/// unique key. At most one document per collection may hold a given unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Collection name (e.g. `"orders"`, `"ingredients.base"`).
    pub collection: String,

    /// Document identifier, unique within its collection.
    pub id: Uuid,

    /// Current version.
    pub version: Version,

    /// Owning principal, if any.
    pub owner: Option<Uuid>,

    /// Status tag used for filtering.
    pub status: Option<String>,

    /// Collection-wide unique key.
    pub unique_key: Option<String>,

    /// The serialized entity.
    pub payload: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates an unversioned document ready for insertion.
    pub fn new(collection: impl Into<String>, id: Uuid, payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            collection: collection.into(),
            id,
            version: Version::initial(),
            owner: None,
            status: None,
            unique_key: None,
            payload,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_owner(mut self, owner: Option<Uuid>) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        self.status = status;
        self
    }

    pub fn with_unique_key(mut self, unique_key: Option<String>) -> Self {
        self.unique_key = unique_key;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Deserializes the payload into an entity.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
