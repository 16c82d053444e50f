use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPartner {
    pub id: Uuid,
    pub full_name: String,
    pub location: GeoPoint,
    /// True iff the partner is bound to exactly one undelivered order.
    /// Flipped to true only by order assignment and back to false only
    /// by the delivery-completion rule.
    pub is_occupied: bool,
}
