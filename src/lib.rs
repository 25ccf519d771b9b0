// ============================================================================
// propdesk Library
// ============================================================================

pub mod access;
pub mod cache;
pub mod config;
pub mod core;
pub mod entity;
pub mod remote;
pub mod view;

#[doc(hidden)]
pub use paste;

// Re-export main types for convenience
pub use crate::cache::{CachePolicy, CountPolicy, DuplicatePolicy, ListCache, ListSnapshot};
pub use crate::config::DeskConfig;
pub use crate::core::{DeskError, Result};
pub use crate::entity::{Entity, Resource};
pub use crate::remote::{HttpCrudClient, InMemoryCrud, ListQuery, Page, RemoteCrud};
pub use crate::view::ListController;

// Re-export access control API
pub use crate::access::{
    AccessGuard, Action, Authenticator, GuardDecision, PageCatalog, PageRoute, Permission,
    PermissionChecker, PermissionSet, Session, TokenAuthenticator, UserDirectory,
};
