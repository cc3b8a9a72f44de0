use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::donation::{self, DonationStatus, Entity as DonationEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory_sync::InventorySyncService,
};

#[derive(Debug, Clone)]
pub struct NewDonation {
    pub donor_id: Uuid,
    /// Donor-catalog reference; `None` registers a free-text ("custom") item.
    pub catalog_item_id: Option<Uuid>,
    pub product_name: String,
    pub product_category: Option<String>,
    pub quantity: Decimal,
    pub unit_label: String,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub donation: donation::Model,
    /// Set when the donation was marked delivered but inventory
    /// synchronization failed afterwards. The status change is not reverted;
    /// the caller must surface this and retry synchronization explicitly.
    pub sync_warning: Option<String>,
}

/// Advances donations through their status state machine and triggers
/// inventory synchronization on delivery.
#[derive(Clone)]
pub struct DonationLifecycleService {
    db: Arc<DatabaseConnection>,
    sync: InventorySyncService,
    event_sender: EventSender,
}

impl DonationLifecycleService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        sync: InventorySyncService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            sync,
            event_sender,
        }
    }

    /// The only legal edges. Delivered and Cancelled are terminal; everything
    /// else (including same-status requests) is rejected.
    fn is_valid_transition(from: DonationStatus, to: DonationStatus) -> bool {
        matches!(
            (from, to),
            (DonationStatus::Pending, DonationStatus::PickedUp)
                | (DonationStatus::Pending, DonationStatus::Cancelled)
                | (DonationStatus::PickedUp, DonationStatus::Delivered)
        )
    }

    /// Registers a donation in Pending state.
    #[instrument(skip(self, new_donation), fields(donor_id = %new_donation.donor_id))]
    pub async fn create(&self, new_donation: NewDonation) -> Result<donation::Model, ServiceError> {
        if new_donation.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "donation quantity must be positive, got {}",
                new_donation.quantity
            )));
        }
        if new_donation.product_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "product name must not be empty".to_string(),
            ));
        }

        let db = &*self.db;
        let created = donation::ActiveModel {
            id: Set(Uuid::new_v4()),
            donor_id: Set(new_donation.donor_id),
            catalog_item_id: Set(new_donation.catalog_item_id),
            product_name: Set(new_donation.product_name),
            product_category: Set(new_donation.product_category),
            quantity: Set(new_donation.quantity),
            unit_label: Set(new_donation.unit_label),
            expiry_date: Set(new_donation.expiry_date),
            status: Set(DonationStatus::Pending.to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::DonationCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(donation_id = %created.id, "donation registered");

        Ok(created)
    }

    /// Fetches one donation.
    pub async fn get(&self, donation_id: Uuid) -> Result<donation::Model, ServiceError> {
        let db = &*self.db;

        DonationEntity::find_by_id(donation_id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Donation {} not found", donation_id)))
    }

    /// Moves a donation along one edge of the state machine. Invalid edges
    /// are rejected before any write. On Delivered, the status write and the
    /// inventory synchronization are two separate operations: a sync failure
    /// is logged, reported in `sync_warning`, and does not revert the status.
    #[instrument(skip(self), fields(donation_id = %donation_id, new_status = %new_status))]
    pub async fn transition(
        &self,
        donation_id: Uuid,
        new_status: DonationStatus,
    ) -> Result<TransitionOutcome, ServiceError> {
        let donation = self.get(donation_id).await?;

        let old_status = donation.status().map_err(|e| {
            error!(donation_id = %donation_id, "corrupt status column: {}", e);
            ServiceError::InternalError(e)
        })?;

        if !Self::is_valid_transition(old_status, new_status) {
            return Err(ServiceError::ValidationError(format!(
                "cannot transition donation from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let mut active: donation::ActiveModel = donation.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db).await.map_err(|e| {
            error!(donation_id = %donation_id, "failed to persist status: {}", e);
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .send(Event::DonationStatusChanged {
                donation_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            donation_id = %donation_id,
            from = %old_status,
            to = %new_status,
            "donation status updated"
        );

        let mut sync_warning = None;
        if new_status == DonationStatus::Delivered {
            if let Err(sync_err) = self.sync.apply(&updated, None).await {
                warn!(
                    donation_id = %donation_id,
                    "donation marked delivered but inventory synchronization failed: {}",
                    sync_err
                );
                sync_warning = Some(format!(
                    "donation marked delivered but inventory synchronization failed: {}",
                    sync_err
                ));
            }
        }

        Ok(TransitionOutcome {
            donation: updated,
            sync_warning,
        })
    }
}
