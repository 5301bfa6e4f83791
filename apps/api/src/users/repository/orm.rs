use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserInput};
use crate::users::query::{contains_pattern, SortField, UserSearch};
use crate::users::repository::{UserRepository, USER_COLUMNS};

/// Query-builder backend: every statement is assembled from the method
/// that was called rather than read from a file.
#[derive(Clone)]
pub struct OrmUserRepository {
    pool: PgPool,
}

impl OrmUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn select_users() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"))
}

fn count_users() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new("SELECT COUNT(*) FROM users")
}

fn page_query(offset: i64, limit: i64, sort: SortField) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_users();
    qb.push(" ORDER BY ")
        .push(sort.column())
        .push(" DESC, id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb
}

fn recent_query(limit: Option<i64>) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_users();
    qb.push(" ORDER BY created_at DESC, id DESC");
    if let Some(limit) = limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    qb
}

/// Appends one `AND`-joined predicate per present filter.
fn search_query(filters: &UserSearch) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_users();
    let mut first = true;
    let mut next_clause = |qb: &mut QueryBuilder<'static, Postgres>| {
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(username) = &filters.username {
        next_clause(&mut qb);
        qb.push("username ILIKE ").push_bind(contains_pattern(username));
    }
    if let Some(email) = &filters.email {
        next_clause(&mut qb);
        qb.push("email ILIKE ").push_bind(contains_pattern(email));
    }
    if let Some(full_name) = &filters.full_name {
        next_clause(&mut qb);
        qb.push("full_name ILIKE ").push_bind(contains_pattern(full_name));
    }
    if let Some(is_active) = filters.is_active {
        next_clause(&mut qb);
        qb.push("is_active = ").push_bind(is_active);
    }
    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl UserRepository for OrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(select_users()
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_page(
        &self,
        offset: i64,
        limit: i64,
        sort: SortField,
    ) -> Result<Vec<User>, AppError> {
        debug!("ORM: page offset={offset} limit={limit} sort={}", sort.column());
        Ok(page_query(offset, limit, sort)
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(count_users()
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let mut qb = select_users();
        qb.push(" WHERE id = ").push_bind(id);
        Ok(qb
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_active(&self) -> Result<Vec<User>, AppError> {
        let mut qb = select_users();
        qb.push(" WHERE is_active = TRUE");
        Ok(qb.build_query_as::<User>().fetch_all(&self.pool).await?)
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        let mut qb = count_users();
        qb.push(" WHERE is_active = TRUE");
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn search_by_username(&self, fragment: &str) -> Result<Vec<User>, AppError> {
        let mut qb = select_users();
        qb.push(" WHERE username ILIKE ")
            .push_bind(contains_pattern(fragment));
        Ok(qb.build_query_as::<User>().fetch_all(&self.pool).await?)
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Vec<User>, AppError> {
        let mut qb = select_users();
        qb.push(" WHERE email LIKE ").push_bind(contains_pattern(domain));
        Ok(qb.build_query_as::<User>().fetch_all(&self.pool).await?)
    }

    async fn find_recent(&self, limit: Option<i64>) -> Result<Vec<User>, AppError> {
        Ok(recent_query(limit)
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn search(&self, filters: &UserSearch) -> Result<Vec<User>, AppError> {
        debug!("ORM: search {filters:?}");
        Ok(search_query(filters)
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = ",
        );
        qb.push_bind(username.to_string()).push(")");
        Ok(qb.build_query_scalar::<bool>().fetch_one(&self.pool).await?)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT EXISTS (SELECT 1 FROM users WHERE email = ");
        qb.push_bind(email.to_string()).push(")");
        Ok(qb.build_query_scalar::<bool>().fetch_one(&self.pool).await?)
    }

    async fn insert(&self, user: &NewUser) -> Result<Option<User>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO users (username, email, full_name, is_active, created_at, updated_at) ",
        );
        qb.push_values(std::iter::once(user), |mut row, u| {
            row.push_bind(u.username.clone())
                .push_bind(u.email.clone())
                .push_bind(u.full_name.clone())
                .push_bind(u.is_active)
                .push_bind(u.created_at)
                .push_bind(u.updated_at);
        });
        qb.push(" RETURNING ").push(USER_COLUMNS);
        Ok(qb
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update(
        &self,
        id: i64,
        input: &UserInput,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE users SET username = ");
        qb.push_bind(input.username.clone())
            .push(", email = ")
            .push_bind(input.email.clone())
            .push(", full_name = ")
            .push_bind(input.full_name.clone());
        if let Some(is_active) = input.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        qb.push(", updated_at = GREATEST(")
            .push_bind(now)
            .push(", updated_at + INTERVAL '1 microsecond') WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(USER_COLUMNS);
        Ok(qb
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn deactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE users SET is_active = FALSE, updated_at = GREATEST(",
        );
        qb.push_bind(now)
            .push(", updated_at + INTERVAL '1 microsecond') WHERE id = ")
            .push_bind(id);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM users WHERE id = ");
        qb.push_bind(id);
        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
