use serde::{Deserialize, Serialize};

use crate::models::order::Order;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderEventKind {
    Assigned,
    Delivered,
}

/// Lifecycle event broadcast to websocket subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order: Order,
}
