use crate::config::Config;
use crate::users::service::UserService;

/// Shared application state injected into route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Query-builder backed service, mounted at `/api/users`.
    pub orm: UserService,
    /// Explicit-SQL backed service, mounted at `/api/mapper/users`.
    pub mapper: UserService,
}
