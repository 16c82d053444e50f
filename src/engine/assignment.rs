use std::time::Instant;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::engine::selector::{eta_minutes, nearest_partner};
use crate::error::AppError;
use crate::models::event::{OrderEvent, OrderEventKind};
use crate::models::order::{Order, OrderStatus};
use crate::models::partner::GeoPoint;
use crate::state::AppState;
use crate::store::PartnerUpdate;

pub struct OrderRequest {
    pub user_id: String,
    pub source: GeoPoint,
    pub dest: GeoPoint,
    pub food_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    pub distance_km: f64,
}

/// Assigns the nearest unoccupied partner to a new order. Reading the
/// unoccupied set, creating the order, and claiming the partner all
/// happen in one transaction, so two concurrent placements can never
/// claim the same partner and a failure leaves nothing behind.
pub async fn place_order(state: &AppState, request: OrderRequest) -> Result<PlacedOrder, AppError> {
    let start = Instant::now();
    let result = assign(state, request).await;

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .assignment_latency_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .assignments_total
        .with_label_values(&[outcome])
        .inc();

    if let Ok(placed) = &result {
        state.metrics.partners_occupied.inc();
        state.publish_event(OrderEvent {
            kind: OrderEventKind::Assigned,
            order: placed.order.clone(),
        });

        info!(
            order_id = %placed.order.id,
            partner_id = ?placed.order.delivery_partner_id,
            distance_km = placed.distance_km,
            "order assigned"
        );
    }

    result
}

async fn assign(state: &AppState, request: OrderRequest) -> Result<PlacedOrder, AppError> {
    let minutes_per_km = state.eta_minutes_per_km;

    state
        .store
        .with_transaction(move |tx| {
            let candidates = tx.find_unoccupied_partners();
            if candidates.is_empty() {
                return Err(AppError::NoPartnersAvailable);
            }

            let selection = nearest_partner(&candidates, &request.source)?;
            let eta = eta_minutes(selection.distance_km, minutes_per_km);
            let created_at = Utc::now();
            let expected_delivery_time = created_at + Duration::minutes(eta);

            let order = tx.create_order(Order {
                id: Uuid::new_v4(),
                source: request.source,
                dest: request.dest,
                food_name: request.food_name,
                user_id: request.user_id,
                status: OrderStatus::Assigned,
                delivery_partner_id: Some(selection.partner.id),
                expected_delivery_time: Some(expected_delivery_time),
                partner_name: Some(selection.partner.full_name.clone()),
                created_at,
            });

            tx.update_partner(
                selection.partner.id,
                PartnerUpdate {
                    is_occupied: Some(true),
                },
            )?;

            Ok(PlacedOrder {
                order,
                distance_km: selection.distance_km,
            })
        })
        .await
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{OrderRequest, place_order};
    use crate::error::AppError;
    use crate::models::order::OrderStatus;
    use crate::models::partner::{DeliveryPartner, GeoPoint};
    use crate::state::AppState;

    fn request(user: &str) -> OrderRequest {
        OrderRequest {
            user_id: user.to_string(),
            source: GeoPoint { lat: 0.0, lng: 0.0 },
            dest: GeoPoint { lat: 0.5, lng: 0.5 },
            food_name: "pad thai".to_string(),
        }
    }

    async fn seed_partner(state: &AppState, id_seed: u128, lat: f64, lng: f64) {
        state
            .store
            .with_transaction(|tx| {
                tx.create_partner(DeliveryPartner {
                    id: Uuid::from_u128(id_seed),
                    full_name: format!("partner-{id_seed}"),
                    location: GeoPoint { lat, lng },
                    is_occupied: false,
                });
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn assigns_nearest_partner_and_marks_it_occupied() {
        let state = AppState::new(16, 2.0);
        seed_partner(&state, 1, 0.0, 0.0).await;
        seed_partner(&state, 2, 1.0, 1.0).await;

        let placed = place_order(&state, request("user-1")).await.unwrap();

        assert_eq!(placed.order.status, OrderStatus::Assigned);
        assert_eq!(placed.order.delivery_partner_id, Some(Uuid::from_u128(1)));
        assert_eq!(placed.order.partner_name.as_deref(), Some("partner-1"));
        assert!(placed.distance_km < 1e-9);
        assert!(placed.order.expected_delivery_time.is_some());
        assert_eq!(state.store.occupied_partner_count().await, 1);
    }

    #[tokio::test]
    async fn fails_without_partners_and_creates_nothing() {
        let state = AppState::new(16, 2.0);

        let result = place_order(&state, request("user-1")).await;

        assert!(matches!(result, Err(AppError::NoPartnersAvailable)));
        let (_, orders) = state.store.counts().await;
        assert_eq!(orders, 0);
    }

    #[tokio::test]
    async fn occupied_partner_cannot_be_selected_again() {
        let state = AppState::new(16, 2.0);
        seed_partner(&state, 1, 0.0, 0.0).await;

        place_order(&state, request("user-1")).await.unwrap();
        let second = place_order(&state, request("user-2")).await;

        assert!(matches!(second, Err(AppError::NoPartnersAvailable)));
    }
}
