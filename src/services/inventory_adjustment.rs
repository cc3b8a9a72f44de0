use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::inventory_level::{self, Entity as InventoryLevel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::movement_ledger::MovementLedgerService,
};

#[derive(Debug, Clone, serde::Serialize)]
pub struct AdjustmentOutcome {
    /// Human-readable summary ("+N units" / "-N units").
    pub message: String,
    pub previous_quantity: Decimal,
    pub new_quantity: Decimal,
    pub delta: Decimal,
}

/// Direct operator correction of a stock quantity. The inventory write and
/// the ledger write are two separate operations; a failed ledger write is
/// compensated by restoring the pre-adjustment quantity, and a failed
/// compensation surfaces as `ReconciliationError` so the caller knows manual
/// review is required.
#[derive(Clone)]
pub struct InventoryAdjustmentService {
    db: Arc<DatabaseConnection>,
    ledger: MovementLedgerService,
    event_sender: EventSender,
}

impl InventoryAdjustmentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ledger: MovementLedgerService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            ledger,
            event_sender,
        }
    }

    /// Fetches the current level for one (deposit, product) pair.
    pub async fn get_level(
        &self,
        deposit_id: Uuid,
        product_id: Uuid,
    ) -> Result<inventory_level::Model, ServiceError> {
        let db = &*self.db;

        InventoryLevel::find_by_id((deposit_id, product_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No inventory for product {} at deposit {}",
                    product_id, deposit_id
                ))
            })
    }

    /// Sets the stock quantity for one (deposit, product) pair and records
    /// the signed delta in the movement ledger.
    #[instrument(skip(self), fields(deposit_id = %deposit_id, product_id = %product_id, new_quantity = %new_quantity))]
    pub async fn update_quantity(
        &self,
        deposit_id: Uuid,
        product_id: Uuid,
        new_quantity: Decimal,
        operator_actor_id: Option<Uuid>,
    ) -> Result<AdjustmentOutcome, ServiceError> {
        if new_quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "stock quantity cannot be negative, got {}",
                new_quantity
            )));
        }

        let level = self.get_level(deposit_id, product_id).await?;
        let previous_quantity = level.quantity_available;
        let delta = new_quantity - previous_quantity;

        if delta.is_zero() {
            return Ok(AdjustmentOutcome {
                message: "no change".to_string(),
                previous_quantity,
                new_quantity,
                delta,
            });
        }

        self.write_quantity(deposit_id, product_id, new_quantity, level.version)
            .await?;

        if let Err(ledger_err) = self
            .ledger
            .record_manual_adjustment(product_id, delta, operator_actor_id)
            .await
        {
            warn!(
                deposit_id = %deposit_id,
                product_id = %product_id,
                "ledger write failed, compensating inventory: {}",
                ledger_err
            );

            // The inventory write bumped the version; the compensating write
            // targets that bumped row.
            match self
                .write_quantity(deposit_id, product_id, previous_quantity, level.version + 1)
                .await
            {
                Ok(()) => return Err(ledger_err),
                Err(rollback_err) => {
                    error!(
                        deposit_id = %deposit_id,
                        product_id = %product_id,
                        "compensating write failed, inventory and ledger may disagree: {}",
                        rollback_err
                    );
                    return Err(ServiceError::ReconciliationError(format!(
                        "ledger write failed ({}) and the compensating inventory write also \
                         failed ({}); stock for product {} at deposit {} requires manual review",
                        ledger_err, rollback_err, product_id, deposit_id
                    )));
                }
            }
        }

        self.event_sender
            .send(Event::InventoryAdjusted {
                deposit_id,
                product_id,
                previous_quantity,
                new_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        let message = if delta > Decimal::ZERO {
            format!("+{} units", delta.normalize())
        } else {
            format!("-{} units", delta.abs().normalize())
        };

        info!(
            deposit_id = %deposit_id,
            product_id = %product_id,
            previous = %previous_quantity,
            new = %new_quantity,
            "inventory adjusted ({})",
            message
        );

        Ok(AdjustmentOutcome {
            message,
            previous_quantity,
            new_quantity,
            delta,
        })
    }

    /// Version-guarded write of an absolute quantity. Zero rows affected
    /// means another writer got there first.
    async fn write_quantity(
        &self,
        deposit_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
        expected_version: i32,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;

        let result = InventoryLevel::update_many()
            .col_expr(inventory_level::Column::QuantityAvailable, Expr::value(quantity))
            .col_expr(
                inventory_level::Column::Version,
                Expr::value(expected_version + 1),
            )
            .col_expr(inventory_level::Column::LastUpdated, Expr::value(Utc::now()))
            .filter(inventory_level::Column::DepositId.eq(deposit_id))
            .filter(inventory_level::Column::ProductId.eq(product_id))
            .filter(inventory_level::Column::Version.eq(expected_version))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(format!(
                "inventory for product {} at deposit {} changed underneath this update",
                product_id, deposit_id
            )));
        }

        Ok(())
    }
}
