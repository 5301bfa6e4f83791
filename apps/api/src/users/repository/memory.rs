//! In-process `UserRepository` used by the service and router tests.
//!
//! Mirrors the PostgreSQL behaviour the SQL backends rely on: unique
//! `username`/`email`, monotonic `updated_at`, substring matching.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::AppError;
use crate::models::user::{NewUser, User, UserInput};
use crate::users::query::{SortField, UserSearch};
use crate::users::repository::UserRepository;

#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
    next_id: Mutex<i64>,
    insert_attempts: AtomicUsize,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `insert` reached the store.
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }

    fn filtered(&self, keep: impl Fn(&User) -> bool) -> Vec<User> {
        self.snapshot().into_iter().filter(keep).collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn bump(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous + Duration::microseconds(1))
}

/// PostgreSQL orders NULL above every value, so a descending sort lists it first.
fn nulls_high(a: &Option<String>, b: &Option<String>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
    }
}

fn compare(a: &User, b: &User, sort: SortField) -> std::cmp::Ordering {
    match sort {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Username => a.username.cmp(&b.username),
        SortField::Email => a.email.cmp(&b.email),
        SortField::FullName => nulls_high(&a.full_name, &b.full_name),
        SortField::IsActive => a.is_active.cmp(&b.is_active),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        Ok(self.snapshot())
    }

    async fn find_page(
        &self,
        offset: i64,
        limit: i64,
        sort: SortField,
    ) -> Result<Vec<User>, AppError> {
        let mut rows = self.snapshot();
        rows.sort_by(|a, b| compare(b, a, sort).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.snapshot().into_iter().find(|u| u.id == id))
    }

    async fn find_active(&self) -> Result<Vec<User>, AppError> {
        Ok(self.filtered(|u| u.is_active))
    }

    async fn count_active(&self) -> Result<i64, AppError> {
        Ok(self.filtered(|u| u.is_active).len() as i64)
    }

    async fn search_by_username(&self, fragment: &str) -> Result<Vec<User>, AppError> {
        Ok(self.filtered(|u| contains_ignore_case(&u.username, fragment)))
    }

    async fn find_by_email_domain(&self, domain: &str) -> Result<Vec<User>, AppError> {
        Ok(self.filtered(|u| u.email.contains(domain)))
    }

    async fn find_recent(&self, limit: Option<i64>) -> Result<Vec<User>, AppError> {
        let mut rows = self.snapshot();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    async fn search(&self, filters: &UserSearch) -> Result<Vec<User>, AppError> {
        Ok(self.filtered(|u| {
            filters
                .username
                .as_deref()
                .map_or(true, |f| contains_ignore_case(&u.username, f))
                && filters
                    .email
                    .as_deref()
                    .map_or(true, |f| contains_ignore_case(&u.email, f))
                && filters.full_name.as_deref().map_or(true, |f| {
                    u.full_name
                        .as_deref()
                        .is_some_and(|n| contains_ignore_case(n, f))
                })
                && filters.is_active.map_or(true, |a| u.is_active == a)
        }))
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.snapshot().iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.snapshot().iter().any(|u| u.email == email))
    }

    async fn insert(&self, user: &NewUser) -> Result<Option<User>, AppError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "A user with this username or email already exists".to_string(),
            ));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let row = User {
            id: *next_id,
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        rows.push(row.clone());
        Ok(Some(row))
    }

    async fn update(
        &self,
        id: i64,
        input: &UserInput,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        row.username = input.username.clone();
        row.email = input.email.clone();
        row.full_name = input.full_name.clone();
        if let Some(is_active) = input.is_active {
            row.is_active = is_active;
        }
        row.updated_at = bump(row.updated_at, now);
        Ok(Some(row.clone()))
    }

    async fn deactivate(&self, id: i64, now: DateTime<Utc>) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == id) {
            Some(row) => {
                row.is_active = false;
                row.updated_at = bump(row.updated_at, now);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(username: &str, full_name: Option<&str>) -> NewUser {
        let now = Utc::now();
        NewUser {
            username: username.to_string(),
            email: format!("{username}@x.io"),
            full_name: full_name.map(str::to_string),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_full_name_page_lists_missing_names_first() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&row("alice", Some("Alice Kim"))).await.unwrap();
        repo.insert(&row("bob", None)).await.unwrap();
        repo.insert(&row("carol", Some("Carol Diaz"))).await.unwrap();

        let page = repo.find_page(0, 3, SortField::FullName).await.unwrap();
        let names: Vec<&str> = page.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["bob", "carol", "alice"]);
    }
}
