use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus};
use crate::models::partner::DeliveryPartner;

#[derive(Debug, Default, Clone)]
struct StoreData {
    partners: BTreeMap<Uuid, DeliveryPartner>,
    orders: BTreeMap<Uuid, Order>,
}

/// Shared handle to the order/partner repository. Cloning is cheap; all
/// clones see the same data. Mutations go through [`Store::with_transaction`].
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<StoreData>>,
}

/// One atomic unit of work against the store.
pub struct StoreTx<'a> {
    data: &'a mut StoreData,
}

#[derive(Debug, Default, Clone)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Default, Clone)]
pub struct PartnerUpdate {
    pub is_occupied: Option<bool>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` as a single serializable transaction. The data lock is
    /// held across the whole closure, so a read-then-write sequence like
    /// "find unoccupied partners, claim one" can never interleave with a
    /// concurrent claim of the same partner. If `f` returns an error,
    /// every staged mutation is rolled back.
    pub async fn with_transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreTx<'_>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut guard = self.inner.lock().await;
        let snapshot = guard.clone();
        let mut tx = StoreTx { data: &mut *guard };

        match f(&mut tx) {
            Ok(value) => Ok(value),
            Err(err) => {
                *guard = snapshot;
                Err(err)
            }
        }
    }

    pub async fn find_order_by_id(&self, id: Uuid) -> Option<Order> {
        self.inner.lock().await.orders.get(&id).cloned()
    }

    pub async fn orders_for_user(&self, user_id: &str, status: OrderStatus) -> Vec<Order> {
        self.inner
            .lock()
            .await
            .orders
            .values()
            .filter(|order| order.user_id == user_id && order.status == status)
            .cloned()
            .collect()
    }

    pub async fn list_partners(&self) -> Vec<DeliveryPartner> {
        self.inner.lock().await.partners.values().cloned().collect()
    }

    pub async fn occupied_partner_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .partners
            .values()
            .filter(|partner| partner.is_occupied)
            .count()
    }

    pub async fn counts(&self) -> (usize, usize) {
        let data = self.inner.lock().await;
        (data.partners.len(), data.orders.len())
    }
}

impl StoreTx<'_> {
    pub fn find_unoccupied_partners(&self) -> Vec<DeliveryPartner> {
        self.data
            .partners
            .values()
            .filter(|partner| !partner.is_occupied)
            .cloned()
            .collect()
    }

    pub fn find_order_by_id(&self, id: Uuid) -> Option<Order> {
        self.data.orders.get(&id).cloned()
    }

    pub fn find_orders_due_for_delivery(&self, now: DateTime<Utc>) -> Vec<Order> {
        self.data
            .orders
            .values()
            .filter(|order| {
                order.status == OrderStatus::Assigned
                    && order.expected_delivery_time.is_some_and(|t| t <= now)
            })
            .cloned()
            .collect()
    }

    pub fn create_partner(&mut self, partner: DeliveryPartner) -> DeliveryPartner {
        self.data.partners.insert(partner.id, partner.clone());
        partner
    }

    pub fn create_order(&mut self, order: Order) -> Order {
        self.data.orders.insert(order.id, order.clone());
        order
    }

    pub fn update_order(&mut self, id: Uuid, update: OrderUpdate) -> Result<Order, AppError> {
        let order = self
            .data
            .orders
            .get_mut(&id)
            .ok_or_else(|| AppError::Transaction(format!("order {id} missing from store")))?;

        if let Some(status) = update.status {
            order.status = status;
        }

        Ok(order.clone())
    }

    pub fn update_partner(
        &mut self,
        id: Uuid,
        update: PartnerUpdate,
    ) -> Result<DeliveryPartner, AppError> {
        let partner = self
            .data
            .partners
            .get_mut(&id)
            .ok_or_else(|| AppError::Transaction(format!("partner {id} missing from store")))?;

        if let Some(is_occupied) = update.is_occupied {
            partner.is_occupied = is_occupied;
        }

        Ok(partner.clone())
    }
}
