//! foodbank-api
//!
//! Donation-management backend. The core is donation-to-inventory
//! synchronization: a donation reaching its terminal Delivered state is
//! applied to warehouse stock, every inventory-affecting event lands in an
//! append-only movement ledger (header + lines), and manual stock corrections
//! use compensating-transaction logic to keep inventory and ledger in
//! agreement.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use services::{
    donation_lifecycle::DonationLifecycleService, inventory_adjustment::InventoryAdjustmentService,
    inventory_sync::InventorySyncService, movement_ledger::MovementLedgerService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub movement_ledger: MovementLedgerService,
    pub inventory_sync: InventorySyncService,
    pub donation_lifecycle: DonationLifecycleService,
    pub inventory_adjustment: InventoryAdjustmentService,
}

impl AppState {
    /// Wires the service graph: the ledger is the leaf, the synchronizer
    /// writes through it, the lifecycle controller invokes the synchronizer
    /// on delivery.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let movement_ledger = MovementLedgerService::new(db.clone());
        let inventory_sync = InventorySyncService::new(
            db.clone(),
            movement_ledger.clone(),
            event_sender.clone(),
            config.default_deposit_name.clone(),
        );
        let donation_lifecycle =
            DonationLifecycleService::new(db.clone(), inventory_sync.clone(), event_sender.clone());
        let inventory_adjustment = InventoryAdjustmentService::new(
            db.clone(),
            movement_ledger.clone(),
            event_sender.clone(),
        );

        Self {
            db,
            config,
            event_sender,
            movement_ledger,
            inventory_sync,
            donation_lifecycle,
            inventory_adjustment,
        }
    }
}

/// Common response wrapper for the HTTP surface.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }
}
