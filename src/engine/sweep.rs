use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::engine::delivery::complete_delivery;
use crate::models::event::{OrderEvent, OrderEventKind};
use crate::models::order::OrderStatus;
use crate::state::AppState;

pub async fn run_reconciliation_sweep(state: Arc<AppState>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "reconciliation sweep started");

    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        sweep_once(&state, Utc::now()).await;
    }
}

/// One sweep pass: force-completes every assigned order whose expected
/// delivery time has passed. Each order gets its own transaction, so one
/// order's failure is logged and the rest still go through, and a crash
/// mid-sweep leaves already-processed orders fully committed. Returns
/// the number of orders delivered.
pub async fn sweep_once(state: &AppState, now: DateTime<Utc>) -> usize {
    let due = match state
        .store
        .with_transaction(|tx| Ok(tx.find_orders_due_for_delivery(now)))
        .await
    {
        Ok(due) => due,
        Err(err) => {
            error!(error = %err, "failed to read due orders");
            return 0;
        }
    };

    let mut updated = 0usize;
    for order in due {
        let order_id = order.id;
        let result = state
            .store
            .with_transaction(|tx| {
                // Re-read inside the transaction; a concurrent manual
                // check may have completed the order since the snapshot.
                match tx.find_order_by_id(order_id) {
                    Some(current) if current.status == OrderStatus::Assigned => {
                        complete_delivery(tx, &current).map(Some)
                    }
                    _ => Ok(None),
                }
            })
            .await;

        match result {
            Ok(Some(delivered)) => {
                updated += 1;
                state
                    .metrics
                    .deliveries_total
                    .with_label_values(&["sweep"])
                    .inc();
                if delivered.delivery_partner_id.is_some() {
                    state.metrics.partners_occupied.dec();
                }
                state.publish_event(OrderEvent {
                    kind: OrderEventKind::Delivered,
                    order: delivered,
                });
            }
            Ok(None) => {}
            Err(err) => {
                error!(order_id = %order_id, error = %err, "failed to reconcile order");
            }
        }
    }

    info!(updated, "reconciliation sweep finished");
    updated
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::sweep_once;
    use crate::models::order::{Order, OrderStatus};
    use crate::models::partner::{DeliveryPartner, GeoPoint};
    use crate::state::AppState;

    async fn seed_order(
        state: &AppState,
        order_seed: u128,
        partner_seed: u128,
        status: OrderStatus,
        expected_offset_minutes: i64,
    ) {
        let now = Utc::now();
        state
            .store
            .with_transaction(|tx| {
                tx.create_partner(DeliveryPartner {
                    id: Uuid::from_u128(partner_seed),
                    full_name: format!("partner-{partner_seed}"),
                    location: GeoPoint { lat: 0.0, lng: 0.0 },
                    is_occupied: status == OrderStatus::Assigned,
                });
                tx.create_order(Order {
                    id: Uuid::from_u128(order_seed),
                    source: GeoPoint { lat: 0.0, lng: 0.0 },
                    dest: GeoPoint { lat: 1.0, lng: 1.0 },
                    food_name: "dumplings".to_string(),
                    user_id: "user-1".to_string(),
                    status,
                    delivery_partner_id: Some(Uuid::from_u128(partner_seed)),
                    expected_delivery_time: Some(now + Duration::minutes(expected_offset_minutes)),
                    partner_name: Some(format!("partner-{partner_seed}")),
                    created_at: now,
                });
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delivers_only_overdue_assigned_orders() {
        let state = AppState::new(16, 2.0);
        seed_order(&state, 1, 11, OrderStatus::Assigned, -5).await;
        seed_order(&state, 2, 12, OrderStatus::Assigned, -1).await;
        seed_order(&state, 3, 13, OrderStatus::Assigned, 30).await;
        seed_order(&state, 4, 14, OrderStatus::Delivered, -60).await;

        let updated = sweep_once(&state, Utc::now()).await;

        assert_eq!(updated, 2);
        // Partner 13 still carries its active order.
        assert_eq!(state.store.occupied_partner_count().await, 1);

        let delivered = state
            .store
            .find_order_by_id(Uuid::from_u128(1))
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
    }

    #[tokio::test]
    async fn second_sweep_with_no_new_due_orders_updates_nothing() {
        let state = AppState::new(16, 2.0);
        seed_order(&state, 1, 11, OrderStatus::Assigned, -5).await;

        let first = sweep_once(&state, Utc::now()).await;
        let second = sweep_once(&state, Utc::now()).await;

        assert_eq!(first, 1);
        assert_eq!(second, 0);
    }

    #[tokio::test]
    async fn sweep_on_empty_store_is_a_noop() {
        let state = AppState::new(16, 2.0);
        assert_eq!(sweep_once(&state, Utc::now()).await, 0);
    }
}
