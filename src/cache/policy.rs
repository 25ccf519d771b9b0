use serde::{Deserialize, Serialize};

/// How `remove` and `remove_many` adjust the total count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPolicy {
    /// Decrement by the number of ids requested, matched or not.
    ///
    /// Callers only remove after a confirmed remote delete, so the requested
    /// count is the amount the server total went down by. Repeated or
    /// out-of-order completions make the count drift.
    #[default]
    TrustCaller,
    /// Decrement by the number of cached items actually removed.
    ClampToMatches,
}

/// What `add` does when the id is already cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Prepend unconditionally. Two items share the id until the next
    /// `replace_all`.
    #[default]
    Allow,
    /// Drop the cached copy, prepend the new one and leave the count alone.
    ReplaceExisting,
}

/// Combined mutation policy of a [`ListCache`](super::ListCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CachePolicy {
    #[serde(default)]
    pub count: CountPolicy,
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
}

impl CachePolicy {
    /// Clamped counts and duplicate replacement.
    pub fn strict() -> Self {
        Self {
            count: CountPolicy::ClampToMatches,
            duplicates: DuplicatePolicy::ReplaceExisting,
        }
    }

    pub fn count(mut self, count: CountPolicy) -> Self {
        self.count = count;
        self
    }

    pub fn duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}
