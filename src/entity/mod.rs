//! Domain records shown by the dashboard's list pages.
//!
//! The list cache only needs [`Entity`], i.e. a way to pull the id out of a
//! record. Remote clients need the richer [`Resource`] contract: a stable
//! collection name, a create/update payload and a way to build records from
//! that payload.

mod macros;
mod records;

pub use records::*;

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

/// Anything with an opaque string identity.
pub trait Entity: Clone {
    /// Returns the record id. Two records are the same entity iff ids match.
    fn id(&self) -> &str;
}

/// A dashboard collection backed by the remote CRUD service.
pub trait Resource: Entity + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used as the REST path segment and in log fields.
    const KIND: &'static str;

    /// Body sent on create and update.
    type Draft: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Creation timestamp assigned by the backend.
    fn created_at(&self) -> DateTime<Utc>;

    /// Builds a freshly created record from its draft.
    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    /// Overwrites every editable field with the draft's values.
    fn apply_draft(&mut self, draft: Self::Draft);

    /// Field the backend keeps unique within the collection (usually a name).
    fn unique_key(&self) -> &str;

    /// Same as [`Resource::unique_key`], read from a draft.
    fn draft_unique_key(draft: &Self::Draft) -> &str;
}
