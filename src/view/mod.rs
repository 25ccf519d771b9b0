//! List-page controller.
//!
//! Runs the remote call first and applies the matching cache mutation only
//! after it succeeded. On failure the cache is left exactly as it was and
//! the error goes back to the caller, which decides whether to retry, show
//! it or drop it.

use crate::cache::{CachePolicy, ListCache, ListSnapshot};
use crate::config::DeskConfig;
use crate::core::Result;
use crate::entity::Resource;
use crate::remote::{ListQuery, RemoteCrud};
use tokio::sync::watch;
use tracing::{info, warn};

pub struct ListController<R: Resource, C: RemoteCrud<R>> {
    client: C,
    cache: ListCache<R>,
    query: ListQuery,
}

impl<R: Resource, C: RemoteCrud<R>> ListController<R, C> {
    pub fn new(client: C, query: ListQuery, policy: CachePolicy) -> Self {
        Self {
            client,
            cache: ListCache::with_policy(R::KIND, policy),
            query,
        }
    }

    /// Controller starting at page 1 with the configured page size and policy.
    pub fn from_config(client: C, config: &DeskConfig) -> Self {
        Self::new(
            client,
            ListQuery::first(config.page_size(None)),
            config.cache_policy,
        )
    }

    pub fn cache(&self) -> &ListCache<R> {
        &self.cache
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn snapshot(&self) -> ListSnapshot<R> {
        self.cache.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<R>> {
        self.cache.subscribe()
    }

    /// Last requested page.
    pub fn query(&self) -> ListQuery {
        self.query
    }

    /// Number of pages implied by the cached total; at least 1.
    pub fn page_count(&self) -> u32 {
        let total = self.cache.total_count().max(0) as u64;
        let size = u64::from(self.query.size.max(1));
        total.div_ceil(size).max(1).min(u64::from(u32::MAX)) as u32
    }

    /// Fetches `query` and replaces the cached page and total.
    pub async fn load(&mut self, query: ListQuery) -> Result<ListSnapshot<R>> {
        let page = self
            .client
            .list(query)
            .await
            .inspect_err(|err| Self::log_failure("list", err))?;

        self.query = query;
        self.cache.replace_all(page.items);
        let snapshot = self.cache.set_total(page.total);
        info!(
            kind = R::KIND,
            page = query.page,
            size = query.size,
            total = page.total,
            "page loaded"
        );
        Ok(snapshot)
    }

    /// Re-fetches the last requested page.
    pub async fn reload(&mut self) -> Result<ListSnapshot<R>> {
        self.load(self.query).await
    }

    pub async fn create(&mut self, draft: &R::Draft) -> Result<R> {
        let created = self
            .client
            .create(draft)
            .await
            .inspect_err(|err| Self::log_failure("create", err))?;

        self.cache.add(created.clone());
        info!(kind = R::KIND, id = created.id(), "created");
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, draft: &R::Draft) -> Result<R> {
        let updated = self
            .client
            .update(id, draft)
            .await
            .inspect_err(|err| Self::log_failure("update", err))?;

        self.cache.update(id, updated.clone());
        info!(kind = R::KIND, id, "updated");
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.client
            .delete(id)
            .await
            .inspect_err(|err| Self::log_failure("delete", err))?;

        self.cache.remove(id);
        info!(kind = R::KIND, id, "deleted");
        Ok(())
    }

    /// An empty `ids` slice is a no-op and issues no remote call.
    pub async fn delete_many(&mut self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        self.client
            .delete_many(ids)
            .await
            .inspect_err(|err| Self::log_failure("delete_many", err))?;

        self.cache.remove_many(ids);
        info!(kind = R::KIND, count = ids.len(), "bulk deleted");
        Ok(())
    }

    fn log_failure(operation: &str, err: &crate::DeskError) {
        warn!(
            kind = R::KIND,
            operation,
            conflict = err.is_conflict(),
            retryable = err.is_retryable(),
            error = %err,
            "remote call failed, cache untouched"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{RoomCategory, RoomCategoryDraft};
    use crate::remote::InMemoryCrud;

    fn draft(name: &str) -> RoomCategoryDraft {
        RoomCategoryDraft::new(name.to_string(), String::new())
    }

    #[tokio::test]
    async fn test_page_count() {
        let backend = InMemoryCrud::<RoomCategory>::new();
        for i in 0..7 {
            backend.create(&draft(&format!("C{i}"))).await.unwrap();
        }
        let mut controller: ListController<RoomCategory, _> =
            ListController::new(backend, ListQuery::first(3), CachePolicy::default());
        assert_eq!(controller.page_count(), 1);
        controller.reload().await.unwrap();
        assert_eq!(controller.page_count(), 3);
        assert_eq!(controller.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_from_config_uses_page_size_and_policy() {
        let config = DeskConfig::default()
            .default_page_size(5)
            .cache_policy(CachePolicy::strict());
        let controller: ListController<RoomCategory, _> =
            ListController::from_config(InMemoryCrud::<RoomCategory>::new(), &config);
        assert_eq!(controller.query(), ListQuery::first(5));
        assert_eq!(controller.cache().policy(), CachePolicy::strict());
        assert_eq!(controller.cache().name(), "room-categories");
    }

    #[tokio::test]
    async fn test_delete_many_empty_skips_remote() {
        let backend = InMemoryCrud::<RoomCategory>::new();
        backend
            .fail_next(crate::DeskError::Transport("down".into()))
            .unwrap();
        let mut controller: ListController<RoomCategory, _> =
            ListController::new(backend, ListQuery::first(10), CachePolicy::default());
        controller.delete_many(&[]).await.unwrap();
        assert_eq!(controller.snapshot().revision(), 0);
        // The injected failure is still pending because no call was made.
        assert!(controller.reload().await.is_err());
    }
}
