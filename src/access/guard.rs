use super::auth::{Session, UserDirectory};
use super::pages::PageRoute;
use super::permission::PermissionSet;
use crate::core::{DeskError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves the current visitor to a session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Option<Session>;
}

/// Decides whether a session satisfies a permission requirement.
pub trait PermissionChecker: Send + Sync {
    fn has_permissions(&self, session: &Session, required: &PermissionSet) -> bool;
}

/// Checks the permissions recorded on the session; `admin` implies all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPermissions;

impl PermissionChecker for SessionPermissions {
    fn has_permissions(&self, session: &Session, required: &PermissionSet) -> bool {
        session.permissions.grants_all(required)
    }
}

/// Resolves a bearer token through a [`UserDirectory`].
#[derive(Clone)]
pub struct TokenAuthenticator {
    directory: Arc<UserDirectory>,
    token: Option<String>,
}

impl TokenAuthenticator {
    pub fn new(directory: Arc<UserDirectory>, token: Option<String>) -> Self {
        Self { directory, token }
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self) -> Option<Session> {
        let token = self.token.as_deref()?;
        self.directory.session(token).await
    }
}

/// Always yields the same session (or none).
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator(pub Option<Session>);

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self) -> Option<Session> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    MissingPermissions,
}

/// Outcome of guarding a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow(Session),
    Redirect { target: String, reason: DenyReason },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow(_) => None,
            Self::Redirect { target, .. } => Some(target.as_str()),
        }
    }
}

/// Gate evaluated before a page is shown.
///
/// Visitors without a session go to `login_route`; sessions lacking the
/// page's permissions go to the page's own redirect target.
pub struct AccessGuard<A, P = SessionPermissions> {
    authenticator: A,
    checker: P,
    login_route: String,
}

impl<A: Authenticator> AccessGuard<A, SessionPermissions> {
    pub fn new(authenticator: A, login_route: impl Into<String>) -> Self {
        Self::with_checker(authenticator, SessionPermissions, login_route)
    }
}

impl<A: Authenticator, P: PermissionChecker> AccessGuard<A, P> {
    pub fn with_checker(authenticator: A, checker: P, login_route: impl Into<String>) -> Self {
        Self {
            authenticator,
            checker,
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub async fn check(&self, page: &PageRoute) -> GuardDecision {
        let Some(session) = self.authenticator.authenticate().await else {
            debug!(page = %page.path, "no session, redirecting to login");
            return GuardDecision::Redirect {
                target: self.login_route.clone(),
                reason: DenyReason::Unauthenticated,
            };
        };

        if !self.checker.has_permissions(&session, &page.required) {
            info!(
                page = %page.path,
                user = %session.username,
                redirect = %page.redirect,
                "missing permissions"
            );
            return GuardDecision::Redirect {
                target: page.redirect.clone(),
                reason: DenyReason::MissingPermissions,
            };
        }

        GuardDecision::Allow(session)
    }

    /// Same as [`AccessGuard::check`] for callers that want an error instead
    /// of a redirect (API handlers, the CLI).
    pub async fn require(&self, page: &PageRoute) -> Result<Session> {
        match self.check(page).await {
            GuardDecision::Allow(session) => Ok(session),
            GuardDecision::Redirect {
                reason: DenyReason::Unauthenticated,
                ..
            } => Err(DeskError::Unauthorized(format!(
                "login required for {}",
                page.path
            ))),
            GuardDecision::Redirect {
                reason: DenyReason::MissingPermissions,
                ..
            } => Err(DeskError::Forbidden(format!(
                "missing permissions for {}",
                page.path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::permission::{Action, Permission};

    fn page() -> PageRoute {
        PageRoute::new(
            "/rooms",
            "Rooms",
            [Permission::on("rooms", Action::Read)].into(),
            "/",
        )
    }

    #[tokio::test]
    async fn test_no_session_redirects_to_login() {
        let guard = AccessGuard::new(StaticAuthenticator(None), "/login");
        let decision = guard.check(&page()).await;
        assert_eq!(decision.redirect_target(), Some("/login"));
        assert!(matches!(
            guard.require(&page()).await,
            Err(DeskError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_permission_redirects_to_page_target() {
        let session = Session::new("guest", PermissionSet::new());
        let guard = AccessGuard::new(StaticAuthenticator(Some(session)), "/login");
        let decision = guard.check(&page()).await;
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                target: "/".into(),
                reason: DenyReason::MissingPermissions
            }
        );
        assert!(matches!(
            guard.require(&page()).await,
            Err(DeskError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_granted_session_is_allowed() {
        let session = Session::new("clerk", [Permission::on("rooms", Action::Read)].into());
        let guard = AccessGuard::new(StaticAuthenticator(Some(session.clone())), "/login");
        assert_eq!(guard.check(&page()).await, GuardDecision::Allow(session));
    }

    #[tokio::test]
    async fn test_custom_checker_is_used() {
        struct DenyAll;
        impl PermissionChecker for DenyAll {
            fn has_permissions(&self, _: &Session, _: &PermissionSet) -> bool {
                false
            }
        }

        let session = Session::new("root", PermissionSet::admin());
        let guard = AccessGuard::with_checker(StaticAuthenticator(Some(session)), DenyAll, "/login");
        assert!(!guard.check(&page()).await.is_allowed());
    }
}
