use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserInput};
use crate::users::query::{contains_pattern, SortField, UserSearch};
use crate::users::repository::UserRepository;

/// Hand-written statements, one file per operation.
mod statements {
    pub const FIND_ALL: &str = include_str!("../../../sql/users/find_all.sql");
    pub const FIND_BY_ID: &str = include_str!("../../../sql/users/find_by_id.sql");
    pub const FIND_PAGE: &str = include_str!("../../../sql/users/find_page.sql");
    pub const COUNT_ALL: &str = include_str!("../../../sql/users/count_all.sql");
    pub const FIND_ACTIVE: &str = include_str!("../../../sql/users/find_active.sql");
    pub const COUNT_ACTIVE: &str = include_str!("../../../sql/users/count_active.sql");
    pub const SEARCH_BY_USERNAME: &str = include_str!("../../../sql/users/search_by_username.sql");
    pub const FIND_BY_EMAIL_DOMAIN: &str =
        include_str!("../../../sql/users/find_by_email_domain.sql");
    pub const FIND_RECENT: &str = include_str!("../../../sql/users/find_recent.sql");
    pub const SEARCH: &str = include_str!("../../../sql/users/search.sql");
    pub const EXISTS_BY_USERNAME: &str = include_str!("../../../sql/users/exists_by_username.sql");
    pub const EXISTS_BY_EMAIL: &str = include_str!("../../../sql/users/exists_by_email.sql");
    pub const INSERT: &str = include_str!("../../../sql/users/insert.sql");
    pub const UPDATE: &str = include_str!("../../../sql/users/update.sql");
    pub const DEACTIVATE: &str = include_str!("../../../sql/users/deactivate.sql");
    pub const DELETE_BY_ID: &str = include_str!("../../../sql/users/delete_by_id.sql");
}

/// Placeholder in `find_page.sql` replaced by the sort column.
const SORT_COLUMN_SLOT: &str = "{sort_column}";

/// Explicit-SQL backend. Row mapping is done by `FromRow`; aggregates come
/// back as scalars.
#[derive(Clone)]
pub struct MapperUserRepository {
    pool: PgPool,
}

impl MapperUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ORDER BY` cannot take a bind parameter, so the whitelisted column is spliced in.
fn page_statement(sort: SortField) -> String {
    statements::FIND_PAGE.replace(SORT_COLUMN_SLOT, sort.column())
}

#[async_trait]
impl UserRepository for MapperUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::FIND_ALL)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_page(
        &self,
        offset: i64,
        limit: i64,
        sort: SortField,
    ) -> Result<Vec<User>, AppError> {
        debug!("Mapper: page offset={offset} limit={limit} sort={}", sort.column());
        let sql = page_statement(sort);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>(statements::COUNT_ALL)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_active(&self) -> Result<Vec<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::FIND_ACTIVE)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar::<_, i64>(statements::COUNT_ACTIVE)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn search_by_username(&self, fragment: &str) -> Result<Vec<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::SEARCH_BY_USERNAME)
            .bind(contains_pattern(fragment))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Vec<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::FIND_BY_EMAIL_DOMAIN)
            .bind(contains_pattern(domain))
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_recent(&self, limit: Option<i64>) -> Result<Vec<User>, AppError> {
        // LIMIT NULL means no limit in PostgreSQL
        Ok(sqlx::query_as::<_, User>(statements::FIND_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search(&self, filters: &UserSearch) -> Result<Vec<User>, AppError> {
        debug!("Mapper: search {filters:?}");
        Ok(sqlx::query_as::<_, User>(statements::SEARCH)
            .bind(filters.username.as_deref().map(contains_pattern))
            .bind(filters.email.as_deref().map(contains_pattern))
            .bind(filters.full_name.as_deref().map(contains_pattern))
            .bind(filters.is_active)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(statements::EXISTS_BY_USERNAME)
            .bind(username)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(sqlx::query_scalar::<_, bool>(statements::EXISTS_BY_EMAIL)
            .bind(email)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn insert(&self, user: &NewUser) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::INSERT)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.full_name)
            .bind(user.is_active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(
        &self,
        id: i64,
        input: &UserInput,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(statements::UPDATE)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(input.is_active)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn deactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(statements::DEACTIVATE)
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(statements::DELETE_BY_ID)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
