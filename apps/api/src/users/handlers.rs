//! Axum route handlers for the user API.
//!
//! One handler set serves both data sources; the router mounts it once per
//! `UserService`.

use axum::extract::State;
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppError;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::models::user::{User, UserInput};
use crate::users::envelope::{listing, Envelope};
use crate::users::pagination::{Page, PageRequest};
use crate::users::query::{SortField, UserSearch};
use crate::users::service::UserService;

// ────────────────────────────────────────────────────────────────────────────
// Query parameters
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

fn default_page_size() -> u32 {
    10
}

fn default_sort_by() -> String {
    "createdAt".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct DomainQuery {
    pub domain: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

impl From<AdvancedSearchParams> for UserSearch {
    fn from(p: AdvancedSearchParams) -> Self {
        UserSearch {
            username: p.username,
            email: p.email,
            full_name: p.full_name,
            is_active: p.is_active,
        }
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("User not found. ID: {id}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Reads
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_list_users(
    State(service): State<UserService>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let users = service.list_all().await?;
    Ok(listing(service.source(), "Users retrieved", users))
}

/// GET /paged?page=0&size=10&sortBy=createdAt
pub async fn handle_list_users_paged(
    State(service): State<UserService>,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let sort: SortField = params.sort_by.parse()?;
    let request = PageRequest::new(params.page, params.size, sort, service.max_page_size())?;
    let Page {
        content,
        current_page,
        size,
        total_elements,
        total_pages,
        has_next,
        has_previous,
    } = service.page(request).await?;

    Ok(Envelope::ok(service.source(), "Paged users retrieved", content)
        .with("currentPage", current_page)
        .with("totalPages", total_pages)
        .with("totalElements", total_elements)
        .with("size", size)
        .with("hasNext", has_next)
        .with("hasPrevious", has_previous))
}

/// GET /:id
pub async fn handle_get_user(
    State(service): State<UserService>,
    AppPath(id): AppPath<i64>,
) -> Result<Envelope<User>, AppError> {
    let user = service.get_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Envelope::ok(service.source(), "User retrieved", user))
}

/// GET /active
pub async fn handle_active_users(
    State(service): State<UserService>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let users = service.get_active().await?;
    Ok(listing(service.source(), "Active users retrieved", users))
}

/// GET /search?username=
pub async fn handle_search_users(
    State(service): State<UserService>,
    AppQuery(params): AppQuery<UsernameQuery>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let users = service.search_by_username(&params.username).await?;
    Ok(listing(service.source(), "User search completed", users)
        .with("searchTerm", params.username))
}

/// GET /domain?domain=
pub async fn handle_users_by_domain(
    State(service): State<UserService>,
    AppQuery(params): AppQuery<DomainQuery>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let users = service.get_by_email_domain(&params.domain).await?;
    Ok(listing(service.source(), "Users by email domain retrieved", users)
        .with("domain", params.domain))
}

/// GET /recent
pub async fn handle_recent_users(
    State(service): State<UserService>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let users = service.get_recent().await?;
    Ok(listing(service.source(), "Recent users retrieved", users))
}

/// GET /count/active
pub async fn handle_count_active(
    State(service): State<UserService>,
) -> Result<Envelope<()>, AppError> {
    let count = service.count_active().await?;
    Ok(Envelope::message(service.source(), "Active user count retrieved")
        .with("activeUserCount", count))
}

/// GET /advanced-search?username=&email=&fullName=&isActive=
pub async fn handle_advanced_search(
    State(service): State<UserService>,
    AppQuery(params): AppQuery<AdvancedSearchParams>,
) -> Result<Envelope<Vec<User>>, AppError> {
    let criteria = json!({
        "username": params.username.as_deref().unwrap_or(""),
        "email": params.email.as_deref().unwrap_or(""),
        "fullName": params.full_name.as_deref().unwrap_or(""),
        "isActive": params.is_active,
    });
    let users = service.advanced_search(params.into()).await?;
    Ok(listing(service.source(), "Advanced search completed", users)
        .with("searchCriteria", criteria))
}

// ────────────────────────────────────────────────────────────────────────────
// Writes
// ────────────────────────────────────────────────────────────────────────────

/// POST /
pub async fn handle_create_user(
    State(service): State<UserService>,
    AppJson(input): AppJson<UserInput>,
) -> Result<Envelope<User>, AppError> {
    let user = service.create(input).await?;
    Ok(Envelope::created(service.source(), "User created", user))
}

/// PUT /:id
pub async fn handle_update_user(
    State(service): State<UserService>,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UserInput>,
) -> Result<Envelope<User>, AppError> {
    let user = service.update(id, input).await?;
    Ok(Envelope::ok(service.source(), "User updated", user))
}

/// PATCH /:id/deactivate
pub async fn handle_deactivate_user(
    State(service): State<UserService>,
    AppPath(id): AppPath<i64>,
) -> Result<Envelope<()>, AppError> {
    if !service.deactivate(id).await? {
        return Err(not_found(id));
    }
    Ok(Envelope::message(service.source(), "User deactivated").with("deactivatedId", id))
}

/// DELETE /:id
pub async fn handle_delete_user(
    State(service): State<UserService>,
    AppPath(id): AppPath<i64>,
) -> Result<Envelope<()>, AppError> {
    if !service.delete(id).await? {
        return Err(not_found(id));
    }
    Ok(Envelope::message(service.source(), "User deleted").with("deletedId", id))
}
