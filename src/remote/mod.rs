//! Remote CRUD collaborators.
//!
//! [`RemoteCrud`] is the boundary the list views talk to. Every call either
//! resolves with a value or fails with a [`DeskError`](crate::DeskError);
//! callers only touch their cache after a successful resolution.

mod http;
mod memory;

pub use http::HttpCrudClient;
pub use memory::InMemoryCrud;

use crate::core::{DeskError, Result};
use crate::entity::Resource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
}

impl ListQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub fn first(size: u32) -> Self {
        Self::new(1, size)
    }

    /// Number of items preceding this page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.size as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(DeskError::Validation("page must be >= 1".into()));
        }
        if self.size == 0 {
            return Err(DeskError::Validation("page size must be >= 1".into()));
        }
        Ok(())
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::first(20)
    }
}

/// Pagination envelope returned by `list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total: i64,
}

/// Body of a bulk delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDelete {
    pub ids: Vec<String>,
}

/// Create/read/update/delete calls for one resource type.
#[async_trait]
pub trait RemoteCrud<R: Resource>: Send + Sync {
    async fn list(&self, query: ListQuery) -> Result<Page<R>>;

    /// Fails with [`DeskError::Conflict`] when the unique key is taken.
    async fn create(&self, draft: &R::Draft) -> Result<R>;

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn delete_many(&self, ids: &[String]) -> Result<()>;
}

#[async_trait]
impl<R, C> RemoteCrud<R> for std::sync::Arc<C>
where
    R: Resource,
    C: RemoteCrud<R> + ?Sized,
{
    async fn list(&self, query: ListQuery) -> Result<Page<R>> {
        (**self).list(query).await
    }

    async fn create(&self, draft: &R::Draft) -> Result<R> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &str, draft: &R::Draft) -> Result<R> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id).await
    }

    async fn delete_many(&self, ids: &[String]) -> Result<()> {
        (**self).delete_many(ids).await
    }
}
