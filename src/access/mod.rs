//! Page access control.
//!
//! Each dashboard page declares the permissions it needs ([`PageCatalog`]).
//! An [`AccessGuard`] resolves the visitor's [`Session`] through an injected
//! [`Authenticator`] and asks an injected [`PermissionChecker`] whether the
//! page may render; otherwise it answers with a redirect.

mod auth;
mod guard;
mod pages;
mod permission;

pub use auth::{Session, User, UserDirectory};
pub use guard::{
    AccessGuard, Authenticator, DenyReason, GuardDecision, PermissionChecker, SessionPermissions,
    StaticAuthenticator, TokenAuthenticator,
};
pub use pages::{PageCatalog, PageRoute};
pub use permission::{Action, Permission, PermissionSet};
