use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Plain-text liveness line pointing at the API.
pub async fn root_handler() -> &'static str {
    "User API is running! Try /api/users or /api/mapper/users"
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME")
    }))
}

/// GET /info
/// Describes the application and where each data source is mounted.
pub async fn info_handler(State(state): State<AppState>) -> Json<Value> {
    let sources: Vec<Value> = [&state.orm, &state.mapper]
        .iter()
        .map(|s| {
            json!({
                "dataSource": s.source().label(),
                "basePath": s.source().base_path()
            })
        })
        .collect();

    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "User directory REST API with ORM-style and mapper-style data access",
        "endpoints": sources,
        "maxPageSize": state.config.max_page_size
    }))
}
