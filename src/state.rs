use tokio::sync::broadcast;

use crate::models::event::OrderEvent;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Store,
    pub events_tx: broadcast::Sender<OrderEvent>,
    pub metrics: Metrics,
    pub eta_minutes_per_km: f64,
}

impl AppState {
    pub fn new(event_buffer_size: usize, eta_minutes_per_km: f64) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            store: Store::new(),
            events_tx,
            metrics: Metrics::new(),
            eta_minutes_per_km,
        }
    }

    pub fn publish_event(&self, event: OrderEvent) {
        // Nobody listening is fine; the send result only signals that.
        let _ = self.events_tx.send(event);
    }
}
