//! Page-scoped, id-keyed list cache with optimistic mutations.
//!
//! A [`ListCache`] mirrors one page of a server-paginated collection plus the
//! server-side total. Views call its mutators right after the matching remote
//! call succeeds so the visible list changes without a re-fetch.

mod list_cache;
mod policy;
mod snapshot;

pub use list_cache::ListCache;
pub use policy::{CachePolicy, CountPolicy, DuplicatePolicy};
pub use snapshot::ListSnapshot;
