use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{RawCoordinate, parse_point};
use crate::models::partner::DeliveryPartner;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/partners", post(register_partner).get(list_partners))
}

#[derive(Deserialize)]
pub struct RegisterPartnerRequest {
    pub full_name: String,
    pub current_lat: RawCoordinate,
    pub current_lng: RawCoordinate,
}

async fn register_partner(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPartnerRequest>,
) -> Result<Json<DeliveryPartner>, AppError> {
    if payload.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("full_name cannot be empty".to_string()));
    }

    let location = parse_point(&payload.current_lat, &payload.current_lng)?;

    let partner = state
        .store
        .with_transaction(move |tx| {
            Ok(tx.create_partner(DeliveryPartner {
                id: Uuid::new_v4(),
                full_name: payload.full_name,
                location,
                is_occupied: false,
            }))
        })
        .await?;

    Ok(Json(partner))
}

async fn list_partners(State(state): State<Arc<AppState>>) -> Json<Vec<DeliveryPartner>> {
    Json(state.store.list_partners().await)
}
