use super::{ListQuery, Page, RemoteCrud};
use crate::core::{DeskError, Result};
use crate::entity::Resource;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process stand-in for the backend service.
///
/// Keeps records newest first, assigns v4 uuids and rejects duplicate unique
/// keys with [`DeskError::Conflict`] the way the real service answers `409`.
pub struct InMemoryCrud<R: Resource> {
    records: RwLock<VecDeque<R>>,
    injected: Mutex<Option<DeskError>>,
}

impl<R: Resource> InMemoryCrud<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(VecDeque::new()),
            injected: Mutex::new(None),
        }
    }

    /// Creates a backend holding `records`, first element newest.
    pub fn with_records(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records.into()),
            injected: Mutex::new(None),
        }
    }

    /// Makes the next call fail with `err` without touching any record.
    pub fn fail_next(&self, err: DeskError) -> Result<()> {
        *self.injected.lock()? = Some(err);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<R> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    fn take_injected(&self) -> Result<()> {
        match self.injected.lock()?.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn conflict(key: &str) -> DeskError {
        DeskError::Conflict(format!("{} '{}' already exists", R::KIND, key))
    }

    fn not_found(id: &str) -> DeskError {
        DeskError::NotFound(format!("{} not found: {}", R::KIND, id))
    }
}

impl<R: Resource> Default for InMemoryCrud<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> RemoteCrud<R> for InMemoryCrud<R> {
    async fn list(&self, query: ListQuery) -> Result<Page<R>> {
        self.take_injected()?;
        query.validate()?;
        let records = self.records.read().await;
        let items = records
            .iter()
            .skip(query.offset())
            .take(query.size as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total: records.len() as i64,
        })
    }

    async fn create(&self, draft: &R::Draft) -> Result<R> {
        self.take_injected()?;
        let mut records = self.records.write().await;
        let key = R::draft_unique_key(draft);
        if records.iter().any(|record| record.unique_key() == key) {
            return Err(Self::conflict(key));
        }

        let record = R::from_draft(Uuid::new_v4().to_string(), Utc::now(), draft.clone());
        records.push_front(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R> {
        self.take_injected()?;
        let mut records = self.records.write().await;
        let key = R::draft_unique_key(draft);
        if records
            .iter()
            .any(|record| record.id() != id && record.unique_key() == key)
        {
            return Err(Self::conflict(key));
        }

        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        record.apply_draft(draft.clone());
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.take_injected()?;
        let mut records = self.records.write().await;
        let position = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| Self::not_found(id))?;
        records.remove(position);
        Ok(())
    }

    /// Ids that are not stored are ignored.
    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        self.take_injected()?;
        let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.records
            .write()
            .await
            .retain(|record| !targets.contains(record.id()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{BlogCategory, BlogCategoryDraft};

    fn draft(name: &str) -> BlogCategoryDraft {
        BlogCategoryDraft::new(name.to_string(), name.to_lowercase())
    }

    #[tokio::test]
    async fn test_create_is_newest_first() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        backend.create(&draft("News")).await.unwrap();
        backend.create(&draft("Events")).await.unwrap();

        let page = backend.list(ListQuery::first(10)).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Events", "News"]);
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        backend.create(&draft("News")).await.unwrap();
        let err = backend.create(&draft("News")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_keeps_own_name() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        let created = backend.create(&draft("News")).await.unwrap();
        let updated = backend
            .update(&created.id, &BlogCategoryDraft::new("News".into(), "latest".into()))
            .await
            .unwrap();
        assert_eq!(updated.slug, "latest");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_pagination() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        for i in 0..5 {
            backend.create(&draft(&format!("C{i}"))).await.unwrap();
        }
        let page = backend.list(ListQuery::new(2, 2)).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C2", "C1"]);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        let err = backend.delete("nope").await.unwrap_err();
        assert!(matches!(err, DeskError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let backend = InMemoryCrud::<BlogCategory>::new();
        backend
            .fail_next(DeskError::Transport("connection reset".into()))
            .unwrap();
        assert!(backend.create(&draft("News")).await.is_err());
        assert!(backend.is_empty().await);
        assert!(backend.create(&draft("News")).await.is_ok());
    }
}
