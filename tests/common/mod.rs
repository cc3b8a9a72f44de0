// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use foodbank_api::{
    db::{establish_connection, run_migrations},
    entities::{
        catalog_product,
        deposit,
        donation::{self, DonationStatus},
        inventory_level,
        movement_header::{self, Entity as MovementHeader},
        movement_line::{self, Entity as MovementLine},
    },
    events::{Event, EventSender},
    services::{
        donation_lifecycle::DonationLifecycleService,
        inventory_adjustment::InventoryAdjustmentService, inventory_sync::InventorySyncService,
        movement_ledger::MovementLedgerService,
    },
};

pub const DEFAULT_DEPOSIT: &str = "Main Deposit";

pub struct TestApp {
    pub db: Arc<DatabaseConnection>,
    pub ledger: MovementLedgerService,
    pub sync: InventorySyncService,
    pub lifecycle: DonationLifecycleService,
    pub adjustment: InventoryAdjustmentService,
    // Keeps the event channel open so service sends do not fail.
    _event_rx: mpsc::Receiver<Event>,
}

/// Boots the service graph against a fresh in-memory SQLite database. Each
/// call gets its own named shared-cache database so parallel tests never
/// collide.
pub async fn setup() -> TestApp {
    setup_with_default_deposit(DEFAULT_DEPOSIT).await
}

pub async fn setup_with_default_deposit(default_deposit_name: &str) -> TestApp {
    let url = format!(
        "sqlite:file:test_{}?mode=memory&cache=shared",
        Uuid::new_v4().simple()
    );
    let db = Arc::new(
        establish_connection(&url)
            .await
            .expect("Failed to create DB pool"),
    );
    run_migrations(db.as_ref())
        .await
        .expect("Failed to run migrations");

    let (tx, rx) = mpsc::channel(256);
    let event_sender = EventSender::new(tx);

    let ledger = MovementLedgerService::new(db.clone());
    let sync = InventorySyncService::new(
        db.clone(),
        ledger.clone(),
        event_sender.clone(),
        default_deposit_name,
    );
    let lifecycle = DonationLifecycleService::new(db.clone(), sync.clone(), event_sender.clone());
    let adjustment = InventoryAdjustmentService::new(db.clone(), ledger.clone(), event_sender);

    TestApp {
        db,
        ledger,
        sync,
        lifecycle,
        adjustment,
        _event_rx: rx,
    }
}

// Seed helpers

pub async fn seed_deposit(db: &DatabaseConnection, name: &str) -> deposit::Model {
    deposit::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed deposit")
}

pub async fn seed_product(
    db: &DatabaseConnection,
    name: &str,
    category: Option<&str>,
) -> catalog_product::Model {
    catalog_product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(category.map(|c| c.to_string())),
        unit_label: Set("kg".to_string()),
        expiry_date: Set(None),
        donated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed catalog product")
}

pub async fn seed_inventory(
    db: &DatabaseConnection,
    deposit_id: Uuid,
    product_id: Uuid,
    quantity: Decimal,
) -> inventory_level::Model {
    inventory_level::ActiveModel {
        deposit_id: Set(deposit_id),
        product_id: Set(product_id),
        quantity_available: Set(quantity),
        version: Set(1),
        last_updated: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to seed inventory")
}

pub async fn seed_donation(
    db: &DatabaseConnection,
    status: DonationStatus,
    product_name: &str,
    product_category: Option<&str>,
    quantity: Decimal,
) -> donation::Model {
    donation::ActiveModel {
        id: Set(Uuid::new_v4()),
        donor_id: Set(Uuid::new_v4()),
        catalog_item_id: Set(None),
        product_name: Set(product_name.to_string()),
        product_category: Set(product_category.map(|c| c.to_string())),
        quantity: Set(quantity),
        unit_label: Set("kg".to_string()),
        expiry_date: Set(None),
        status: Set(status.to_string()),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .expect("Failed to seed donation")
}

// Query helpers

pub async fn inventory_for(
    db: &DatabaseConnection,
    deposit_id: Uuid,
    product_id: Uuid,
) -> Option<inventory_level::Model> {
    inventory_level::Entity::find_by_id((deposit_id, product_id))
        .one(db)
        .await
        .expect("Failed to query inventory")
}

pub async fn movement_headers(db: &DatabaseConnection) -> Vec<movement_header::Model> {
    MovementHeader::find()
        .all(db)
        .await
        .expect("Failed to query movement headers")
}

pub async fn movement_lines(db: &DatabaseConnection) -> Vec<movement_line::Model> {
    MovementLine::find()
        .all(db)
        .await
        .expect("Failed to query movement lines")
}

pub async fn catalog_products(db: &DatabaseConnection) -> Vec<catalog_product::Model> {
    catalog_product::Entity::find()
        .all(db)
        .await
        .expect("Failed to query catalog products")
}

pub async fn deposits(db: &DatabaseConnection) -> Vec<deposit::Model> {
    deposit::Entity::find()
        .all(db)
        .await
        .expect("Failed to query deposits")
}
