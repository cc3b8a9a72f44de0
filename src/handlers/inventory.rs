use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    entities::inventory_level,
    errors::ServiceError,
    services::inventory_adjustment::AdjustmentOutcome,
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Decimal,
    pub operator_actor_id: Option<Uuid>,
}

pub async fn get_level(
    State(state): State<AppState>,
    Path((deposit_id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<inventory_level::Model>>, ServiceError> {
    let level = state
        .inventory_adjustment
        .get_level(deposit_id, product_id)
        .await?;

    Ok(Json(ApiResponse::success(level)))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    Path((deposit_id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<Json<ApiResponse<AdjustmentOutcome>>, ServiceError> {
    let outcome = state
        .inventory_adjustment
        .update_quantity(
            deposit_id,
            product_id,
            payload.quantity,
            payload.operator_actor_id,
        )
        .await?;

    let mut response = ApiResponse::success(outcome);
    if let Some(data) = &response.data {
        response.message = Some(data.message.clone());
    }

    Ok(Json(response))
}
