//! Identity store: the user/role manager the admin screens delegate to.
//!
//! Handlers only ever talk to [`IdentityStore`]. Name uniqueness, password
//! hashing, membership bookkeeping and referential integrity are the store's
//! business; the handlers look at the returned [`IdentityResult`] and pick a
//! view.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod password;
pub mod postgres;

pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// Role granted to the seeded account and required by the admin screens.
pub const ADMIN_ROLE: &str = "Admin";

/// A stored user account, including its password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Data for a user that does not exist yet. `password` is plain text; the
/// store hashes it.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// One reason a store operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    fn new(code: &str, description: String) -> Self {
        Self { code: code.to_string(), description }
    }

    pub fn invalid_user_name(name: &str) -> Self {
        Self::new("InvalidUserName", format!("Username '{name}' is invalid."))
    }

    pub fn duplicate_user_name(name: &str) -> Self {
        Self::new("DuplicateUserName", format!("Username '{name}' is already taken."))
    }

    pub fn invalid_role_name(name: &str) -> Self {
        Self::new("InvalidRoleName", format!("Role name '{name}' is invalid."))
    }

    pub fn duplicate_role_name(name: &str) -> Self {
        Self::new("DuplicateRoleName", format!("Role name '{name}' is already taken."))
    }

    pub fn role_not_found(name: &str) -> Self {
        Self::new("RoleNotFound", format!("Role '{name}' does not exist."))
    }

    pub fn user_already_in_role(role: &str) -> Self {
        Self::new("UserAlreadyInRole", format!("User already in role '{role}'."))
    }

    pub fn user_not_in_role(role: &str) -> Self {
        Self::new("UserNotInRole", format!("User is not in role '{role}'."))
    }

    pub fn concurrency_failure() -> Self {
        Self::new(
            "ConcurrencyFailure",
            "Optimistic concurrency failure, object has been modified.".to_string(),
        )
    }
}

/// Outcome of a store mutation that the store was able to evaluate.
///
/// Infrastructure problems are reported separately as [`StoreError`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityResult {
    errors: Vec<IdentityError>,
}

impl IdentityResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failed(error: IdentityError) -> Self {
        Self { errors: vec![error] }
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[IdentityError] {
        &self.errors
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.description.clone()).collect()
    }
}

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Hash(String),
    /// The record is still referenced elsewhere and cannot be removed.
    InUse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {e}"),
            StoreError::Hash(e) => write!(f, "Hash error: {e}"),
            StoreError::InUse(e) => write!(f, "Record in use: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key used for case-insensitive name comparisons.
pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn users(&self) -> StoreResult<Vec<User>>;

    async fn find_user_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_user_by_name(&self, user_name: &str) -> StoreResult<Option<User>>;

    async fn create_user(&self, user: NewUser) -> StoreResult<IdentityResult>;

    /// Persist name, full name and email of an existing user.
    async fn update_user(&self, user: &User) -> StoreResult<IdentityResult>;

    /// Remove a user together with its role memberships.
    async fn delete_user(&self, user: &User) -> StoreResult<IdentityResult>;

    /// Names of the roles the user belongs to, sorted.
    async fn roles_of(&self, user: &User) -> StoreResult<Vec<String>>;

    async fn is_in_role(&self, user: &User, role_name: &str) -> StoreResult<bool>;

    async fn add_to_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult>;

    async fn remove_from_role(&self, user: &User, role_name: &str) -> StoreResult<IdentityResult>;

    async fn roles(&self) -> StoreResult<Vec<Role>>;

    async fn find_role_by_id(&self, id: &str) -> StoreResult<Option<Role>>;

    /// Case-insensitive lookup.
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    async fn create_role(&self, name: &str) -> StoreResult<IdentityResult>;

    async fn update_role(&self, role: &Role) -> StoreResult<IdentityResult>;

    /// Fails with [`StoreError::InUse`] while the role still has members.
    async fn delete_role(&self, role: &Role) -> StoreResult<IdentityResult>;

    async fn check_password(&self, user: &User, password: &str) -> StoreResult<bool> {
        password::verify_password(password, &user.password_hash)
    }
}

/// A user name is acceptable to the store when it is not blank.
pub(crate) fn check_user_name(name: &str) -> Option<IdentityError> {
    if name.trim().is_empty() {
        Some(IdentityError::invalid_user_name(name))
    } else {
        None
    }
}

pub(crate) fn check_role_name(name: &str) -> Option<IdentityError> {
    if name.trim().is_empty() {
        Some(IdentityError::invalid_role_name(name))
    } else {
        None
    }
}
