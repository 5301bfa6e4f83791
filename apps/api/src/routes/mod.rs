pub mod health;

use axum::{routing::get, Router};

use crate::state::AppState;
use crate::users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/info", get(health::info_handler))
        .nest(
            state.orm.source().base_path(),
            users::routes().with_state(state.orm.clone()),
        )
        .nest(
            state.mapper.source().base_path(),
            users::routes().with_state(state.mapper.clone()),
        )
        .with_state(state)
}
