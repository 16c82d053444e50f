use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::partner::GeoPoint;

/// Orders are born `Assigned` (a partner is picked at placement time)
/// and only ever move to `Delivered`, never back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Assigned,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub source: GeoPoint,
    pub dest: GeoPoint,
    pub food_name: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub delivery_partner_id: Option<Uuid>,
    pub expected_delivery_time: Option<DateTime<Utc>>,
    /// Snapshot of the partner's name at assignment time.
    pub partner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
