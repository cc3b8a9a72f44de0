use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::donation::{self, DonationStatus},
    errors::ServiceError,
    services::donation_lifecycle::NewDonation,
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDonationRequest {
    pub donor_id: Uuid,
    pub catalog_item_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub product_name: String,
    pub product_category: Option<String>,
    pub quantity: Decimal,
    #[validate(length(min = 1))]
    pub unit_label: String,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: DonationStatus,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub donation: donation::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_warning: Option<String>,
}

pub async fn create_donation(
    State(state): State<AppState>,
    Json(payload): Json<CreateDonationRequest>,
) -> Result<Json<ApiResponse<donation::Model>>, ServiceError> {
    payload.validate()?;

    let created = state
        .donation_lifecycle
        .create(NewDonation {
            donor_id: payload.donor_id,
            catalog_item_id: payload.catalog_item_id,
            product_name: payload.product_name,
            product_category: payload.product_category,
            quantity: payload.quantity,
            unit_label: payload.unit_label,
            expiry_date: payload.expiry_date,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

pub async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<donation::Model>>, ServiceError> {
    let donation = state.donation_lifecycle.get(id).await?;
    Ok(Json(ApiResponse::success(donation)))
}

pub async fn transition_donation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<TransitionResponse>>, ServiceError> {
    let outcome = state.donation_lifecycle.transition(id, payload.status).await?;

    Ok(Json(ApiResponse::success(TransitionResponse {
        donation: outcome.donation,
        sync_warning: outcome.sync_warning,
    })))
}
