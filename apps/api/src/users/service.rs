//! Business rules shared by both data sources: duplicate checks before
//! insert, timestamp stamping, and pagination math.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserInput};
use crate::users::pagination::{Page, PageRequest};
use crate::users::query::UserSearch;
use crate::users::repository::UserRepository;

/// Which repository backend a service talks to. Reported as `dataSource`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Orm,
    Mapper,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Orm => "ORM",
            DataSource::Mapper => "Mapper",
        }
    }

    /// Where this source's routes are mounted.
    pub fn base_path(self) -> &'static str {
        match self {
            DataSource::Orm => "/api/users",
            DataSource::Mapper => "/api/mapper/users",
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    source: DataSource,
    recent_limit: Option<i64>,
    max_page_size: u32,
}

/// Current time at the store's microsecond precision, so a created row
/// reads back exactly as it was returned.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        source: DataSource,
        recent_limit: Option<i64>,
        max_page_size: u32,
    ) -> Self {
        Self {
            repo,
            source,
            recent_limit,
            max_page_size,
        }
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn max_page_size(&self) -> u32 {
        self.max_page_size
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        self.repo.find_all().await
    }

    /// Fetches the window at `page * size` and the total row count.
    pub async fn page(&self, request: PageRequest) -> Result<Page<User>, AppError> {
        let offset = request.offset()?;
        debug!(
            "{}: page {} size {} offset {offset}",
            self.source.label(),
            request.page,
            request.size
        );
        let content = self
            .repo
            .find_page(offset, request.limit(), request.sort)
            .await?;
        let total = self.repo.count_all().await?;
        Ok(Page::new(content, &request, total))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.repo.find_by_id(id).await
    }

    pub async fn get_active(&self) -> Result<Vec<User>, AppError> {
        self.repo.find_active().await
    }

    pub async fn search_by_username(&self, fragment: &str) -> Result<Vec<User>, AppError> {
        self.repo.search_by_username(fragment).await
    }

    /// Substring match on the whole address: `gmail.com` also matches `notgmail.com`.
    pub async fn get_by_email_domain(&self, domain: &str) -> Result<Vec<User>, AppError> {
        self.repo.find_by_email_domain(domain).await
    }

    pub async fn count_active(&self) -> Result<i64, AppError> {
        self.repo.count_active().await
    }

    pub async fn get_recent(&self) -> Result<Vec<User>, AppError> {
        self.repo.find_recent(self.recent_limit).await
    }

    pub async fn advanced_search(&self, filters: UserSearch) -> Result<Vec<User>, AppError> {
        self.repo.search(&filters.normalized()).await
    }

    pub async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        self.repo.exists_by_username(username).await
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        self.repo.exists_by_email(email).await
    }

    /// Rejects duplicates before touching the table, then inserts with both
    /// timestamps set to the same instant. The table's unique constraints
    /// still catch a duplicate that slips in between check and insert.
    pub async fn create(&self, input: UserInput) -> Result<User, AppError> {
        let input = input.normalized()?;

        if self.exists_by_username(&input.username).await? {
            return Err(AppError::Conflict(format!(
                "Username already exists: {}",
                input.username
            )));
        }
        if self.exists_by_email(&input.email).await? {
            return Err(AppError::Conflict(format!(
                "Email already exists: {}",
                input.email
            )));
        }

        let stamp = now();
        let new_user = NewUser {
            username: input.username,
            email: input.email,
            full_name: input.full_name,
            is_active: input.is_active.unwrap_or(true),
            created_at: stamp,
            updated_at: stamp,
        };

        let user = self
            .repo
            .insert(&new_user)
            .await?
            .ok_or_else(|| AppError::OperationFailed("Failed to create user".to_string()))?;

        info!(
            "{}: created user {} ({})",
            self.source.label(),
            user.id,
            user.username
        );
        Ok(user)
    }

    /// Replaces the caller-supplied fields of user `id` and re-stamps `updatedAt`.
    pub async fn update(&self, id: i64, input: UserInput) -> Result<User, AppError> {
        let input = input.normalized()?;
        let user = self
            .repo
            .update(id, &input, now())
            .await?
            .ok_or_else(|| {
                AppError::OperationFailed(format!("Failed to update user {id}"))
            })?;

        info!("{}: updated user {id}", self.source.label());
        Ok(user)
    }

    /// Soft delete. Returns `false` if there was no such user.
    pub async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let found = self.repo.deactivate(id, now()).await?;
        if found {
            info!("{}: deactivated user {id}", self.source.label());
        }
        Ok(found)
    }

    /// Hard delete. Returns `false` if there was no such user.
    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            info!("{}: deleted user {id}", self.source.label());
        }
        Ok(deleted)
    }
}
