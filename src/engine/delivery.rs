use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{OrderEvent, OrderEventKind};
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;
use crate::store::{OrderUpdate, PartnerUpdate, StoreTx};

#[derive(Debug, Clone)]
pub enum CheckOutcome {
    AlreadyDelivered(Order),
    Delivered(Order),
    NotYetDelivered(Order),
}

/// The one place an order moves to `Delivered`: flips the status and
/// frees the linked partner in the same transaction. Shared by the
/// reconciliation sweep and the manual check.
pub fn complete_delivery(tx: &mut StoreTx<'_>, order: &Order) -> Result<Order, AppError> {
    let updated = tx.update_order(
        order.id,
        OrderUpdate {
            status: Some(OrderStatus::Delivered),
        },
    )?;

    if let Some(partner_id) = order.delivery_partner_id {
        tx.update_partner(
            partner_id,
            PartnerUpdate {
                is_occupied: Some(false),
            },
        )?;
    }

    Ok(updated)
}

/// On-demand delivery check for a single order against a caller-supplied
/// clock. Idempotent once the order is delivered.
pub async fn check_order(
    state: &AppState,
    order_id: Uuid,
    current_time: DateTime<Utc>,
) -> Result<CheckOutcome, AppError> {
    let outcome = state
        .store
        .with_transaction(|tx| {
            let order = tx
                .find_order_by_id(order_id)
                .ok_or(AppError::OrderNotFound(order_id))?;

            if order.status == OrderStatus::Delivered {
                return Ok(CheckOutcome::AlreadyDelivered(order));
            }

            let due = order.delivery_partner_id.is_some()
                && order
                    .expected_delivery_time
                    .is_some_and(|expected| current_time >= expected);

            if due {
                let updated = complete_delivery(tx, &order)?;
                Ok(CheckOutcome::Delivered(updated))
            } else {
                Ok(CheckOutcome::NotYetDelivered(order))
            }
        })
        .await?;

    if let CheckOutcome::Delivered(order) = &outcome {
        state
            .metrics
            .deliveries_total
            .with_label_values(&["check"])
            .inc();
        state.metrics.partners_occupied.dec();
        state.publish_event(OrderEvent {
            kind: OrderEventKind::Delivered,
            order: order.clone(),
        });

        info!(order_id = %order.id, "order delivered via manual check");
    }

    Ok(outcome)
}
