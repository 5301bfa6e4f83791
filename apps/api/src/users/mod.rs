// User directory: one handler set over `UserService`, mounted once per data source.
// ORM-style and mapper-style repositories implement the same `UserRepository` trait.

pub mod envelope;
pub mod handlers;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod service;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::users::service::UserService;

/// Routes for a single data source, relative to its base path.
pub fn routes() -> Router<UserService> {
    Router::new()
        .route(
            "/",
            get(handlers::handle_list_users).post(handlers::handle_create_user),
        )
        .route("/paged", get(handlers::handle_list_users_paged))
        .route("/active", get(handlers::handle_active_users))
        .route("/search", get(handlers::handle_search_users))
        .route("/domain", get(handlers::handle_users_by_domain))
        .route("/recent", get(handlers::handle_recent_users))
        .route("/count/active", get(handlers::handle_count_active))
        .route("/advanced-search", get(handlers::handle_advanced_search))
        .route(
            "/:id",
            get(handlers::handle_get_user)
                .put(handlers::handle_update_user)
                .delete(handlers::handle_delete_user),
        )
        .route("/:id/deactivate", patch(handlers::handle_deactivate_user))
}
