use super::permission::{Permission, PermissionSet};
use crate::core::{DeskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Dashboard operator account
#[derive(Debug, Clone)]
pub struct User {
    username: String,
    password_hash: String,
    permissions: PermissionSet,
}

impl User {
    /// Creates a new user
    pub fn new(username: String, password_hash: String, permissions: PermissionSet) -> Self {
        Self {
            username,
            password_hash,
            permissions,
        }
    }

    /// Returns the username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the user's permissions
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Checks if user has a specific permission
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.permissions.grants(permission)
    }

    /// Checks if user is an administrator
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.permissions.is_admin()
    }
}

/// Authenticated identity with the permissions it carried at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub permissions: PermissionSet,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: impl Into<String>, permissions: PermissionSet) -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            username: username.into(),
            permissions,
            issued_at: Utc::now(),
        }
    }
}

/// Account store and session issuer
///
/// Owned explicitly by the application and shared by `Arc`; there is no
/// process-wide instance.
pub struct UserDirectory {
    users: RwLock<HashMap<String, User>>,
    sessions: RwLock<HashMap<String, Session>>,
    cost: u32,
}

impl UserDirectory {
    /// Creates a directory holding one administrator account
    pub fn with_admin(username: &str, password: &str) -> Result<Self> {
        Self::with_admin_and_cost(username, password, bcrypt::DEFAULT_COST)
    }

    /// Same as [`UserDirectory::with_admin`] with an explicit bcrypt cost
    pub fn with_admin_and_cost(username: &str, password: &str, cost: u32) -> Result<Self> {
        let admin_user = User::new(
            username.to_string(),
            Self::hash_password(password, cost)?,
            PermissionSet::admin(),
        );

        let mut users = HashMap::new();
        users.insert(username.to_string(), admin_user);

        Ok(Self {
            users: RwLock::new(users),
            sessions: RwLock::new(HashMap::new()),
            cost,
        })
    }

    /// Hashes a password using bcrypt
    fn hash_password(password: &str, cost: u32) -> Result<String> {
        bcrypt::hash(password, cost).map_err(|err| DeskError::Auth(err.to_string()))
    }

    /// Verifies password against bcrypt hash
    fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Verifies credentials and issues a new session
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = {
            let users = self.users.read().await;
            users
                .get(username)
                .filter(|user| Self::verify_password(password, &user.password_hash))
                .cloned()
        };

        let Some(user) = user else {
            warn!(username, "login rejected");
            return Err(DeskError::Unauthorized("Invalid username or password".into()));
        };

        let session = Session::new(user.username, user.permissions);
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());
        info!(username, "session issued");
        Ok(session)
    }

    /// Drops a session; returns false if the token was unknown
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Looks up a live session by token
    pub async fn session(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Creates a new user
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        permissions: PermissionSet,
    ) -> Result<()> {
        Self::validate_username(username)?;
        Self::validate_password(password)?;

        let mut users = self.users.write().await;

        if users.contains_key(username) {
            return Err(DeskError::Conflict(format!("User '{}' already exists", username)));
        }

        let user = User::new(
            username.to_string(),
            Self::hash_password(password, self.cost)?,
            permissions,
        );
        users.insert(username.to_string(), user);

        Ok(())
    }

    /// Deletes a user and every session it holds
    pub async fn delete_user(&self, username: &str) -> Result<()> {
        let mut users = self.users.write().await;

        let user_to_delete = users
            .get(username)
            .ok_or_else(|| DeskError::NotFound(format!("User '{}' not found", username)))?;

        if user_to_delete.is_admin() {
            let admin_count = users.values().filter(|u| u.is_admin()).count();
            if admin_count <= 1 {
                return Err(DeskError::Validation("Cannot delete the last admin user".into()));
            }
        }

        users.remove(username);
        drop(users);

        self.sessions
            .write()
            .await
            .retain(|_, session| session.username != username);

        Ok(())
    }

    /// Updates a user's password
    pub async fn update_password(&self, username: &str, new_password: &str) -> Result<()> {
        Self::validate_password(new_password)?;
        let hash = Self::hash_password(new_password, self.cost)?;

        let mut users = self.users.write().await;
        let user = users
            .get_mut(username)
            .ok_or_else(|| DeskError::NotFound(format!("User '{}' not found", username)))?;
        user.password_hash = hash;

        Ok(())
    }

    /// Grants a permission to a user
    ///
    /// Sessions issued earlier keep the permissions they were issued with.
    pub async fn grant_permission(&self, username: &str, permission: Permission) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(username)
            .ok_or_else(|| DeskError::NotFound(format!("User '{}' not found", username)))?;
        user.permissions.insert(permission);
        Ok(())
    }

    /// Revokes a permission from a user
    pub async fn revoke_permission(&self, username: &str, permission: &Permission) -> Result<()> {
        let mut users = self.users.write().await;

        let is_admin = users
            .get(username)
            .map(User::is_admin)
            .ok_or_else(|| DeskError::NotFound(format!("User '{}' not found", username)))?;

        if permission.is_admin() && is_admin {
            let admin_count = users.values().filter(|u| u.is_admin()).count();
            if admin_count <= 1 {
                return Err(DeskError::Validation(
                    "Cannot revoke admin permission from the last admin user".into(),
                ));
            }
        }

        if let Some(user) = users.get_mut(username) {
            user.permissions.remove(permission);
        }

        Ok(())
    }

    /// Returns a sorted list of all usernames
    pub async fn list_users(&self) -> Vec<String> {
        let users = self.users.read().await;
        let mut usernames: Vec<String> = users.keys().cloned().collect();
        usernames.sort();
        usernames
    }

    /// Gets user information
    pub async fn get_user(&self, username: &str) -> Result<User> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("User '{}' not found", username)))
    }

    fn validate_username(username: &str) -> Result<()> {
        if username.is_empty() {
            return Err(DeskError::Validation("Username cannot be empty".into()));
        }

        if username.len() > 50 {
            return Err(DeskError::Validation(
                "Username too long (max 50 characters)".into(),
            ));
        }

        Ok(())
    }

    /// Minimum 8 characters
    fn validate_password(password: &str) -> Result<()> {
        if password.is_empty() {
            return Err(DeskError::Validation("Password cannot be empty".into()));
        }

        if password.len() < 8 {
            return Err(DeskError::Validation(
                "Password must be at least 8 characters long".into(),
            ));
        }

        Ok(())
    }
}
