//! HTTP API

pub mod menu;
pub mod sessions;
pub mod voice;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(menu::router())
        .merge(voice::router())
        .merge(sessions::router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}


#[cfg(test)]
mod tests {
    use super::create_router;
    use super::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;
    use voxpos_menu::Catalog;

    #[tokio::test]
    async fn test_health() {
        let app = create_router(AppState::new(Catalog::seeded(), None));
        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }
}
