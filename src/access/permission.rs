use crate::entity::Resource;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// CRUD verb a permission grants on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// Permission string of the form `<collection>:<action>`, or `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Implies every other permission.
    pub const ADMIN: Permission = Permission::from_static("admin");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Permission for `action` on the collection `kind`, e.g. `rooms:read`.
    pub fn on(kind: &str, action: Action) -> Self {
        Self::new(format!("{}:{}", kind, action.as_str()))
    }

    /// Permission for `action` on resource `R`.
    pub fn of<R: Resource>(action: Action) -> Self {
        Self::on(R::KIND, action)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        self == &Self::ADMIN
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Set of granted or required permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read/create/update/delete on collection `kind`.
    pub fn crud(kind: &str) -> Self {
        Action::ALL.iter().map(|action| Permission::on(kind, *action)).collect()
    }

    pub fn admin() -> Self {
        std::iter::once(Permission::ADMIN).collect()
    }

    /// Adds a permission; returns false if it was already present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Removes a permission; returns false if it was absent.
    pub fn remove(&mut self, permission: &Permission) -> bool {
        self.0.remove(permission)
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    pub fn is_admin(&self) -> bool {
        self.0.contains(&Permission::ADMIN)
    }

    /// True when `self` grants `permission`, directly or through `admin`.
    pub fn grants(&self, permission: &Permission) -> bool {
        self.is_admin() || self.contains(permission)
    }

    /// True when every permission in `required` is granted. An empty
    /// requirement is always satisfied.
    pub fn grants_all(&self, required: &PermissionSet) -> bool {
        self.is_admin() || required.0.is_subset(&self.0)
    }

    /// Required permissions not granted by `self`.
    pub fn missing(&self, required: &PermissionSet) -> Vec<Permission> {
        if self.is_admin() {
            return Vec::new();
        }
        required.0.difference(&self.0).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<I: IntoIterator<Item = Permission>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<const N: usize> From<[Permission; N]> for PermissionSet {
    fn from(permissions: [Permission; N]) -> Self {
        permissions.into_iter().collect()
    }
}
