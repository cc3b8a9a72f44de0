use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        catalog_product::{self, Entity as CatalogProduct},
        deposit::{self, Entity as Deposit},
        donation,
        inventory_level::{self, Entity as InventoryLevel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::movement_ledger::MovementLedgerService,
};

#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncOutcome {
    pub product_id: Uuid,
    pub deposit_id: Uuid,
    pub new_quantity: Decimal,
}

/// Applies a delivered donation to warehouse stock: resolves (or lazily
/// creates) the ledger-domain product and the target deposit, adds the
/// donation quantity to the matching inventory row, and records the event in
/// the movement ledger.
#[derive(Clone)]
pub struct InventorySyncService {
    db: Arc<DatabaseConnection>,
    ledger: MovementLedgerService,
    event_sender: EventSender,
    default_deposit_name: String,
}

impl InventorySyncService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        ledger: MovementLedgerService,
        event_sender: EventSender,
        default_deposit_name: impl Into<String>,
    ) -> Self {
        Self {
            db,
            ledger,
            event_sender,
            default_deposit_name: default_deposit_name.into(),
        }
    }

    /// Steps run strictly in order: resolve product, resolve deposit, add the
    /// quantity, write the ledger. Failure at any step surfaces as a
    /// `ServiceError`; no partial retry is attempted.
    #[instrument(skip(self, donation), fields(donation_id = %donation.id))]
    pub async fn apply(
        &self,
        donation: &donation::Model,
        deposit_id: Option<Uuid>,
    ) -> Result<SyncOutcome, ServiceError> {
        if donation.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "donation quantity must be positive, got {}",
                donation.quantity
            )));
        }

        let product = self.resolve_product(donation).await?;
        let deposit = self.resolve_deposit(deposit_id).await?;
        let new_quantity = self
            .add_to_inventory(deposit.id, product.id, donation.quantity)
            .await?;

        self.ledger
            .record_donation_delivery(donation, product.id)
            .await?;

        self.event_sender
            .send(Event::DonationDelivered {
                donation_id: donation.id,
                product_id: product.id,
                deposit_id: deposit.id,
                quantity: donation.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            product_id = %product.id,
            deposit_id = %deposit.id,
            new_quantity = %new_quantity,
            "donation synchronized into inventory"
        );

        Ok(SyncOutcome {
            product_id: product.id,
            deposit_id: deposit.id,
            new_quantity,
        })
    }

    /// Exact-string (name, description) lookup, case-sensitive. A missing
    /// product is created from the donation's descriptor with the current
    /// time as donation date.
    async fn resolve_product(
        &self,
        donation: &donation::Model,
    ) -> Result<catalog_product::Model, ServiceError> {
        let db = &*self.db;

        let mut query =
            CatalogProduct::find().filter(catalog_product::Column::Name.eq(&donation.product_name));
        query = match &donation.product_category {
            Some(category) => query.filter(catalog_product::Column::Description.eq(category)),
            None => query.filter(catalog_product::Column::Description.is_null()),
        };

        if let Some(existing) = query.one(db).await.map_err(ServiceError::db_error)? {
            return Ok(existing);
        }

        let created = catalog_product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(donation.product_name.clone()),
            description: Set(donation.product_category.clone()),
            unit_label: Set(donation.unit_label.clone()),
            expiry_date: Set(donation.expiry_date),
            donated_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(product_id = %created.id, name = %created.name, "catalog product created");

        Ok(created)
    }

    /// Deterministic deposit selection: the explicit id when given, otherwise
    /// the deposit carrying the configured default name, otherwise the
    /// lexicographically-first deposit by name, otherwise a freshly created
    /// default deposit.
    async fn resolve_deposit(&self, explicit: Option<Uuid>) -> Result<deposit::Model, ServiceError> {
        let db = &*self.db;

        if let Some(id) = explicit {
            return Deposit::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::db_error)?
                .ok_or_else(|| ServiceError::NotFound(format!("Deposit {} not found", id)));
        }

        if let Some(default) = Deposit::find()
            .filter(deposit::Column::Name.eq(&self.default_deposit_name))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
        {
            return Ok(default);
        }

        if let Some(first) = Deposit::find()
            .order_by_asc(deposit::Column::Name)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
        {
            return Ok(first);
        }

        let created = deposit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(self.default_deposit_name.clone()),
            description: Set(Some("Created automatically on first delivery".to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(deposit_id = %created.id, name = %created.name, "default deposit created");

        Ok(created)
    }

    /// Adds `quantity` to the (deposit, product) row. Existing rows are
    /// updated with a version guard so a concurrent writer surfaces as
    /// `ConcurrentModification` instead of a lost update; a missing row is
    /// inserted with the donation quantity.
    async fn add_to_inventory(
        &self,
        deposit_id: Uuid,
        product_id: Uuid,
        quantity: Decimal,
    ) -> Result<Decimal, ServiceError> {
        let db = &*self.db;

        let existing = InventoryLevel::find_by_id((deposit_id, product_id))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        match existing {
            Some(level) => {
                let new_quantity = level.quantity_available + quantity;
                let result = InventoryLevel::update_many()
                    .col_expr(
                        inventory_level::Column::QuantityAvailable,
                        Expr::value(new_quantity),
                    )
                    .col_expr(inventory_level::Column::Version, Expr::value(level.version + 1))
                    .col_expr(inventory_level::Column::LastUpdated, Expr::value(Utc::now()))
                    .filter(inventory_level::Column::DepositId.eq(deposit_id))
                    .filter(inventory_level::Column::ProductId.eq(product_id))
                    .filter(inventory_level::Column::Version.eq(level.version))
                    .exec(db)
                    .await
                    .map_err(ServiceError::db_error)?;

                if result.rows_affected == 0 {
                    return Err(ServiceError::ConcurrentModification(format!(
                        "inventory for product {} at deposit {} changed underneath this update",
                        product_id, deposit_id
                    )));
                }

                Ok(new_quantity)
            }
            None => {
                inventory_level::ActiveModel {
                    deposit_id: Set(deposit_id),
                    product_id: Set(product_id),
                    quantity_available: Set(quantity),
                    version: Set(1),
                    last_updated: Set(Utc::now()),
                }
                .insert(db)
                .await
                .map_err(ServiceError::db_error)?;

                Ok(quantity)
            }
        }
    }
}
