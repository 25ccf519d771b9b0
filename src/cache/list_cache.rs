use super::policy::{CachePolicy, CountPolicy, DuplicatePolicy};
use super::snapshot::ListSnapshot;
use crate::entity::Entity;
use im::Vector;
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Client-held mirror of one page of an entity collection.
///
/// None of the mutators fail. Each one publishes a fresh [`ListSnapshot`]
/// to subscribers before it returns, and returns that snapshot.
///
/// The cache is owned by exactly one view and mutated through `&mut self`;
/// it is never shared between views.
pub struct ListCache<E: Entity> {
    name: String,
    policy: CachePolicy,
    state: ListSnapshot<E>,
    publisher: watch::Sender<ListSnapshot<E>>,
}

impl<E: Entity> ListCache<E> {
    /// Creates an empty cache (`items = []`, `total_count = 0`).
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, CachePolicy::default())
    }

    pub fn with_policy(name: impl Into<String>, policy: CachePolicy) -> Self {
        let state = ListSnapshot::default();
        let (publisher, _) = watch::channel(state.clone());
        Self {
            name: name.into(),
            policy,
            state,
            publisher,
        }
    }

    /// Returns the logical name used in log fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Returns the current snapshot. O(1).
    pub fn snapshot(&self) -> ListSnapshot<E> {
        self.state.clone()
    }

    pub fn items(&self) -> &Vector<E> {
        &self.state.items
    }

    pub fn total_count(&self) -> i64 {
        self.state.total_count
    }

    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.state.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.contains(id)
    }

    /// Subscribes to change notifications.
    ///
    /// The receiver always holds the latest snapshot; intermediate snapshots
    /// may be skipped by slow readers.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<E>> {
        self.publisher.subscribe()
    }

    /// Replaces the cached page wholesale. `total_count` is not touched.
    pub fn replace_all<I>(&mut self, entities: I) -> ListSnapshot<E>
    where
        I: IntoIterator<Item = E>,
    {
        let items: Vector<E> = entities.into_iter().collect();
        debug!(cache = %self.name, len = items.len(), "replace_all");
        self.commit(items, self.state.total_count)
    }

    /// Overwrites the total count without validation.
    pub fn set_total(&mut self, total: i64) -> ListSnapshot<E> {
        debug!(cache = %self.name, total, "set_total");
        self.commit(self.state.items.clone(), total)
    }

    /// Prepends a newly created entity and counts it.
    pub fn add(&mut self, entity: E) -> ListSnapshot<E> {
        let mut items = self.state.items.clone();
        let mut total = self.state.total_count;
        let already_cached = items.iter().any(|item| item.id() == entity.id());

        match (already_cached, self.policy.duplicates) {
            (true, DuplicatePolicy::ReplaceExisting) => {
                items.retain(|item| item.id() != entity.id());
            }
            (true, DuplicatePolicy::Allow) => {
                warn!(cache = %self.name, id = entity.id(), "add: id already cached, keeping both");
                total += 1;
            }
            (false, _) => total += 1,
        }

        debug!(cache = %self.name, id = entity.id(), total, "add");
        items.push_front(entity);
        self.commit(items, total)
    }

    /// Removes every item with `id` and decrements the total.
    pub fn remove(&mut self, id: &str) -> ListSnapshot<E> {
        let mut items = self.state.items.clone();
        let before = items.len();
        items.retain(|item| item.id() != id);
        let matched = before - items.len();

        let decrement = match self.policy.count {
            CountPolicy::TrustCaller => {
                if matched == 0 {
                    warn!(cache = %self.name, id, "remove: id not cached, total still decremented");
                }
                1
            }
            CountPolicy::ClampToMatches => matched as i64,
        };

        let total = self.state.total_count - decrement;
        debug!(cache = %self.name, id, matched, total, "remove");
        self.commit(items, total)
    }

    /// Removes every item whose id is listed and decrements the total.
    ///
    /// Under [`CountPolicy::TrustCaller`] the total drops by `ids.len()`,
    /// duplicates in `ids` included.
    pub fn remove_many<S>(&mut self, ids: &[S]) -> ListSnapshot<E>
    where
        S: AsRef<str>,
    {
        let targets: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        let mut items = self.state.items.clone();
        let before = items.len();
        items.retain(|item| !targets.contains(item.id()));
        let matched = before - items.len();

        let decrement = match self.policy.count {
            CountPolicy::TrustCaller => {
                if matched != ids.len() {
                    warn!(
                        cache = %self.name,
                        requested = ids.len(),
                        matched,
                        "remove_many: requested and matched counts differ"
                    );
                }
                ids.len() as i64
            }
            CountPolicy::ClampToMatches => matched as i64,
        };

        let total = self.state.total_count - decrement;
        debug!(cache = %self.name, requested = ids.len(), matched, total, "remove_many");
        self.commit(items, total)
    }

    /// Replaces the item with `id` in place. No-op on the items if absent.
    pub fn update(&mut self, id: &str, entity: E) -> ListSnapshot<E> {
        let mut items = self.state.items.clone();
        let mut matched = 0usize;
        for item in items.iter_mut() {
            if item.id() == id {
                *item = entity.clone();
                matched += 1;
            }
        }

        debug!(cache = %self.name, id, matched, "update");
        self.commit(items, self.state.total_count)
    }

    fn commit(&mut self, items: Vector<E>, total_count: i64) -> ListSnapshot<E> {
        self.state = ListSnapshot {
            items,
            total_count,
            revision: self.state.revision + 1,
        };
        self.publisher.send_replace(self.state.clone());
        self.state.clone()
    }
}

impl<E: Entity + std::fmt::Debug> std::fmt::Debug for ListCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCache")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("total_count", &self.state.total_count)
            .field("items", &self.state.items)
            .finish()
    }
}
