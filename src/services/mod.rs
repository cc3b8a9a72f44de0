pub mod donation_lifecycle;
pub mod inventory_adjustment;
pub mod inventory_sync;
pub mod movement_ledger;
