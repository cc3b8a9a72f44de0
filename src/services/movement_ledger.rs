use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionError, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        donation,
        movement_header,
        movement_line::{self, TransactionType},
    },
    errors::ServiceError,
};

/// Actor role recorded on donation-delivery lines.
pub const ROLE_DONOR: &str = "donor";
/// Actor role recorded on manual-adjustment lines.
pub const ROLE_DISTRIBUTOR: &str = "distributor";

const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone)]
pub struct NewMovement {
    pub donor_actor_id: Option<Uuid>,
    pub operator_actor_id: Option<Uuid>,
    pub status: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMovementLine {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub transaction_type: TransactionType,
    pub actor_role: String,
    pub note: Option<String>,
}

/// Append-only audit trail of inventory-affecting events, written as one
/// header plus one-or-more lines.
#[derive(Clone)]
pub struct MovementLedgerService {
    db: Arc<DatabaseConnection>,
}

impl MovementLedgerService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Inserts the header and every line in a single database transaction:
    /// either the whole movement lands in the ledger or none of it does, so a
    /// header can never be left without lines.
    #[instrument(skip(self, header, lines), fields(line_count = lines.len()))]
    pub async fn record_movement(
        &self,
        header: NewMovement,
        lines: Vec<NewMovementLine>,
    ) -> Result<Uuid, ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "a movement requires at least one line".to_string(),
            ));
        }
        if let Some(line) = lines.iter().find(|l| l.quantity <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(format!(
                "movement line quantity must be positive, got {}",
                line.quantity
            )));
        }

        let header_id = Uuid::new_v4();
        let db = &*self.db;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                movement_header::ActiveModel {
                    id: Set(header_id),
                    occurred_at: Set(Utc::now()),
                    donor_actor_id: Set(header.donor_actor_id),
                    operator_actor_id: Set(header.operator_actor_id),
                    status: Set(header.status),
                    note: Set(header.note),
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)?;

                for line in lines {
                    movement_line::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        header_id: Set(header_id),
                        product_id: Set(line.product_id),
                        quantity: Set(line.quantity),
                        transaction_type: Set(line.transaction_type.as_str().to_string()),
                        actor_role: Set(line.actor_role),
                        note: Set(line.note),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::db_error)?;
                }

                Ok(())
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })?;

        info!(header_id = %header_id, "movement recorded");

        Ok(header_id)
    }

    /// Records the ingress produced by a delivered donation: one line, full
    /// donation quantity, role "donor".
    pub async fn record_donation_delivery(
        &self,
        donation: &donation::Model,
        product_id: Uuid,
    ) -> Result<Uuid, ServiceError> {
        let header = NewMovement {
            donor_actor_id: Some(donation.donor_id),
            operator_actor_id: None,
            status: STATUS_COMPLETED.to_string(),
            note: Some(format!("Donation {} delivered", donation.id)),
        };
        let line = NewMovementLine {
            product_id,
            quantity: donation.quantity,
            transaction_type: TransactionType::Ingress,
            actor_role: ROLE_DONOR.to_string(),
            note: None,
        };

        self.record_movement(header, vec![line]).await
    }

    /// Records a manual stock correction: ingress for a positive delta,
    /// egress for a negative one, quantity |delta|, role "distributor".
    pub async fn record_manual_adjustment(
        &self,
        product_id: Uuid,
        delta: Decimal,
        operator_actor_id: Option<Uuid>,
    ) -> Result<Uuid, ServiceError> {
        if delta.is_zero() {
            return Err(ServiceError::ValidationError(
                "adjustment delta must be non-zero".to_string(),
            ));
        }

        let transaction_type = if delta > Decimal::ZERO {
            TransactionType::Ingress
        } else {
            TransactionType::Egress
        };

        let header = NewMovement {
            donor_actor_id: None,
            operator_actor_id,
            status: STATUS_COMPLETED.to_string(),
            note: Some("Manual stock adjustment".to_string()),
        };
        let line = NewMovementLine {
            product_id,
            quantity: delta.abs(),
            transaction_type,
            actor_role: ROLE_DISTRIBUTOR.to_string(),
            note: None,
        };

        self.record_movement(header, vec![line]).await
    }
}
