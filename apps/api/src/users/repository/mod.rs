//! User data access — one trait, two interchangeable backends.
//!
//! `OrmUserRepository` builds its statements at runtime from method calls.
//! `MapperUserRepository` runs hand-written statements kept under `sql/users/`.
//!
//! `UserService` holds an `Arc<dyn UserRepository>`, chosen at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserInput};
use crate::users::query::{SortField, UserSearch};

pub mod mapper;
#[cfg(test)]
pub mod memory;
pub mod orm;
#[cfg(test)]
mod store_tests;

pub use mapper::MapperUserRepository;
pub use orm::OrmUserRepository;

/// Columns selected for every `User` row, in `FromRow` order.
pub(crate) const USER_COLUMNS: &str =
    "id, username, email, full_name, is_active, created_at, updated_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    /// Rows sorted descending by `sort`, skipping `offset` and returning at most `limit`.
    async fn find_page(
        &self,
        offset: i64,
        limit: i64,
        sort: SortField,
    ) -> Result<Vec<User>, AppError>;

    async fn count_all(&self) -> Result<i64, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_active(&self) -> Result<Vec<User>, AppError>;

    async fn count_active(&self) -> Result<i64, AppError>;

    /// Case-insensitive substring match on `username`.
    async fn search_by_username(&self, fragment: &str) -> Result<Vec<User>, AppError>;

    /// Users whose email contains `domain` anywhere, not only as a suffix.
    async fn find_by_email_domain(&self, domain: &str) -> Result<Vec<User>, AppError>;

    /// Newest first. `None` returns every row.
    async fn find_recent(&self, limit: Option<i64>) -> Result<Vec<User>, AppError>;

    async fn search(&self, filters: &UserSearch) -> Result<Vec<User>, AppError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;

    /// Returns `None` when the statement inserted nothing.
    async fn insert(&self, user: &NewUser) -> Result<Option<User>, AppError>;

    /// Replaces the caller-supplied fields and re-stamps `updated_at`.
    /// Returns `None` when no row has this id.
    async fn update(
        &self,
        id: i64,
        input: &UserInput,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError>;

    /// Clears `is_active`. Returns `false` when no row has this id.
    async fn deactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, AppError>;

    /// Hard delete. Returns `false` when no row has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
