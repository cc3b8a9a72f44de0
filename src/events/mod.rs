use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Events emitted by the core services. Consumed in-process by a logging
/// processor; callers refresh their own read-side queries, no push mechanism
/// is exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    DonationCreated(Uuid),
    DonationStatusChanged {
        donation_id: Uuid,
        old_status: String,
        new_status: String,
    },
    DonationDelivered {
        donation_id: Uuid,
        product_id: Uuid,
        deposit_id: Uuid,
        quantity: Decimal,
    },
    InventoryAdjusted {
        deposit_id: Uuid,
        product_id: Uuid,
        previous_quantity: Decimal,
        new_quantity: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and logs each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::DonationCreated(id) => info!(donation_id = %id, "donation registered"),
            Event::DonationStatusChanged {
                donation_id,
                old_status,
                new_status,
            } => info!(
                donation_id = %donation_id,
                from = %old_status,
                to = %new_status,
                "donation status changed"
            ),
            Event::DonationDelivered {
                donation_id,
                product_id,
                deposit_id,
                quantity,
            } => info!(
                donation_id = %donation_id,
                product_id = %product_id,
                deposit_id = %deposit_id,
                quantity = %quantity,
                "donation delivered into inventory"
            ),
            Event::InventoryAdjusted {
                deposit_id,
                product_id,
                previous_quantity,
                new_quantity,
            } => info!(
                deposit_id = %deposit_id,
                product_id = %product_id,
                previous = %previous_quantity,
                new = %new_quantity,
                "inventory manually adjusted"
            ),
        }
    }
}
