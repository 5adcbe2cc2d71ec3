//! Menu management endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use smol_str::SmolStr;
use tracing::info;
use voxpos_menu::{MenuItem, NewMenuItem};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(add_menu_item))
        .route("/menu/{id}", delete(delete_menu_item))
}

async fn list_menu(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.catalog.read().await;
    Json(json!({ "items": catalog.items() }))
}

async fn add_menu_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MenuItem>, ApiError> {
    let Json(payload) = payload?;
    let new_item = parse_new_item(&payload)?;

    let item = state.catalog.write().await.insert(new_item)?;
    info!("Menu item added: {} @ {}", item.name, item.price);
    Ok(Json(item))
}

async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Value> {
    if let Some(removed) = state.catalog.write().await.delete(&id) {
        info!("Menu item deleted: {}", removed.name);
    }
    Json(json!({ "success": true }))
}

/// Both `name` and `price` are required. Price may be a number or a numeric
/// string; fractional prices are truncated.
fn parse_new_item(payload: &Value) -> Result<NewMenuItem, ApiError> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid data: `name` is required"))?;

    let price = match payload.get("price") {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(whole_price)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().and_then(whole_price)),
        _ => None,
    }
    .ok_or_else(|| ApiError::bad_request("Invalid data: `price` must be a non-negative number"))?;

    Ok(NewMenuItem {
        id: None,
        name: SmolStr::new(name),
        price,
    })
}

fn whole_price(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0 && value <= u64::MAX as f64).then(|| value.trunc() as u64)
}
