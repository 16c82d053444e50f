use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::assignment::{OrderRequest, PlacedOrder, place_order};
use crate::engine::delivery::{CheckOutcome, check_order};
use crate::error::AppError;
use crate::geo::{RawCoordinate, parse_point};
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/assigned", get(list_assigned_orders))
        .route("/orders/delivered", get(list_delivered_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/check", put(run_delivery_check))
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub user_id: String,
    pub source_lat: RawCoordinate,
    pub source_lng: RawCoordinate,
    pub dest_lat: RawCoordinate,
    pub dest_lng: RawCoordinate,
    pub food_name: String,
}

#[derive(Deserialize)]
pub struct CheckOrderRequest {
    pub current_time: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CheckOrderResponse {
    pub order: Order,
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacedOrder>), AppError> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("user_id cannot be empty".to_string()));
    }
    if payload.food_name.trim().is_empty() {
        return Err(AppError::BadRequest("food_name cannot be empty".to_string()));
    }

    let source = parse_point(&payload.source_lat, &payload.source_lng)?;
    let dest = parse_point(&payload.dest_lat, &payload.dest_lng)?;

    let placed = place_order(
        &state,
        OrderRequest {
            user_id: payload.user_id,
            source,
            dest,
            food_name: payload.food_name,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .find_order_by_id(id)
        .await
        .ok_or(AppError::OrderNotFound(id))?;

    Ok(Json(order))
}

async fn run_delivery_check(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckOrderRequest>,
) -> Result<Json<CheckOrderResponse>, AppError> {
    let outcome = check_order(&state, id, payload.current_time).await?;

    let (order, message) = match outcome {
        CheckOutcome::AlreadyDelivered(order) => (order, "Order already delivered"),
        CheckOutcome::Delivered(order) => (order, "Order delivered"),
        CheckOutcome::NotYetDelivered(order) => (order, "Order not yet delivered"),
    };

    Ok(Json(CheckOrderResponse { order, message }))
}

async fn list_assigned_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<Order>> {
    Json(
        state
            .store
            .orders_for_user(&query.user_id, OrderStatus::Assigned)
            .await,
    )
}

async fn list_delivered_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Json<Vec<Order>> {
    Json(
        state
            .store
            .orders_for_user(&query.user_id, OrderStatus::Delivered)
            .await,
    )
}
