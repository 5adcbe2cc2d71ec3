//! Session cart endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::info;
use voxpos_cart::{Cart, CartSnapshot};
use voxpos_driver::{run_turn, TurnOutcome};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}/intent", post(apply_intent))
        .route("/sessions/{id}/cart", get(show_cart).delete(clear_cart))
}

/// Apply an intent payload directly, skipping the voice collaborators.
async fn apply_intent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let Json(payload) = payload?;

    let session = state.session(&id).await;
    let mut cart = session.lock().await;
    let catalog = state.catalog.read().await;

    // The caller wrote this payload, so a malformed one is their error.
    let outcome = run_turn(&payload, &catalog, &mut cart, state.turn_config)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    Ok(Json(outcome))
}

async fn show_cart(State(state): State<AppState>, Path(id): Path<String>) -> Json<CartSnapshot> {
    let snapshot = match state.existing_session(&id).await {
        Some(session) => session.lock().await.snapshot(),
        None => Cart::new().snapshot(),
    };
    Json(snapshot)
}

/// End a session: its cart is emptied and the session leaves the registry.
async fn clear_cart(State(state): State<AppState>, Path(id): Path<String>) -> Json<CartSnapshot> {
    let snapshot = match state.end_session(&id).await {
        Some(session) => {
            // Waits for an in-flight turn on this session to finish.
            let mut cart = session.lock().await;
            cart.clear();
            info!("Session '{}' ended", id);
            cart.snapshot()
        }
        None => Cart::new().snapshot(),
    };
    Json(snapshot)
}

#[cfg(test)]
mod tests {
    use crate::api::create_router;
    use crate::api::test_support::*;
    use crate::state::AppState;
    use axum::http::StatusCode;
    use serde_json::json;
    use voxpos_driver::TurnConfig;
    use voxpos_menu::Catalog;
    use voxpos_resolver::UnknownActionPolicy;

    fn app() -> axum::Router {
        create_router(AppState::new(Catalog::seeded(), None))
    }

    fn add_one(item: &str) -> serde_json::Value {
        json!({"intent": "TRANSACTION", "results": [{"action": "add", "item": item, "quantity": 1}]})
    }

    #[tokio::test]
    async fn test_clearing_ends_the_session() {
        let state = AppState::new(Catalog::seeded(), None);
        let app = create_router(state.clone());

        send(&app, post_json("/sessions/s1/intent", add_one("Coke"))).await;
        assert!(state.existing_session("s1").await.is_some());

        let (status, cleared) = send(&app, delete("/sessions/s1/cart")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["lines"], json!([]));
        assert!(state.existing_session("s1").await.is_none());
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_on_one_session() {
        const TURNS: usize = 32;
        let state = AppState::new(Catalog::seeded(), None);
        let app = create_router(state.clone());

        let mut handles = Vec::new();
        for i in 0..TURNS {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                send(&app, post_json("/sessions/s1/intent", add_one("Coke"))).await;
                if i % 2 == 0 {
                    send(&app, post_json("/sessions/s2/intent", add_one("Sprite"))).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let s1 = state.existing_session("s1").await.unwrap();
        let s1 = s1.lock().await;
        assert_eq!(s1.quantity_of("Coke"), TURNS as u32);
        assert_eq!(s1.quantity_of("Sprite"), 0);

        let s2 = state.existing_session("s2").await.unwrap();
        let s2 = s2.lock().await;
        assert_eq!(s2.quantity_of("Sprite"), (TURNS / 2) as u32);
        assert_eq!(s2.quantity_of("Coke"), 0);
    }

    #[tokio::test]
    async fn test_reject_policy_skips_unknown_verbs() {
        let state = AppState::new(Catalog::seeded(), None).with_turn_config(TurnConfig {
            unknown_action: UnknownActionPolicy::Reject,
        });
        let app = create_router(state);

        let (status, body) = send(
            &app,
            post_json(
                "/sessions/s1/intent",
                json!({"intent": "TRANSACTION", "results": [
                    {"action": "swap", "item": "Coke"},
                    {"action": "add", "item": "Sprite"}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 1);
        assert_eq!(body["results"][0]["item"], "Sprite");
        assert_eq!(body["notes"][0]["kind"], "skipped_entry");
    }

    #[tokio::test]
    async fn test_intent_then_show_and_clear() {
        let app = app();

        let (status, body) = send(
            &app,
            post_json(
                "/sessions/s1/intent",
                json!({"intent": "TRANSACTION", "results": [
                    {"action": "add", "item": "coke", "quantity": 2},
                    {"action": "ADD", "item": "French Fries"}
                ]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["item"], "Coke");
        assert_eq!(body["batch"]["applied"], 2);

        let (_, cart) = send(&app, get("/sessions/s1/cart")).await;
        assert_eq!(cart["lines"].as_array().unwrap().len(), 2);
        assert_eq!(cart["status"], "active");

        // Other sessions are independent
        let (_, other) = send(&app, get("/sessions/s2/cart")).await;
        assert_eq!(other["lines"], json!([]));
        assert_eq!(other["total"], 0);

        let (status, cleared) = send(&app, delete("/sessions/s1/cart")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cleared["lines"], json!([]));

        let (_, cart) = send(&app, get("/sessions/s1/cart")).await;
        assert_eq!(cart["total"], 0);
    }

    #[tokio::test]
    async fn test_checkout_returns_receipt() {
        let app = app();
        send(
            &app,
            post_json(
                "/sessions/s1/intent",
                json!({"intent": "TRANSACTION", "results": [{"item": "Onion Rings", "quantity": 2}]}),
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            post_json(
                "/sessions/s1/intent",
                json!({"intent": "SYSTEM", "global_command": "CHECKOUT", "results": []}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["receipt"]["total"], 60000);
        assert_eq!(body["cart"]["status"], "checked_out");
    }

    #[tokio::test]
    async fn test_malformed_intent_is_rejected() {
        let app = app();
        let (status, _) = send(
            &app,
            post_json("/sessions/s1/intent", json!(["not", "an", "object"])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, cart) = send(&app, get("/sessions/s1/cart")).await;
        assert_eq!(cart["lines"], json!([]));
    }
}
