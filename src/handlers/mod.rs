pub mod donations;
pub mod inventory;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::{db, errors::ServiceError, ApiResponse, AppState};

/// Routes for the collaborator interface consumed by the (excluded) UI layer.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/donations", post(donations::create_donation))
        .route("/donations/:id", get(donations::get_donation))
        .route("/donations/:id/status", post(donations::transition_donation))
        .route(
            "/inventory/:deposit_id/:product_id",
            get(inventory::get_level).put(inventory::update_quantity),
        )
}

/// Liveness check backed by a database ping.
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ServiceError> {
    db::check_connection(&state.db).await?;
    Ok(Json(ApiResponse::success("ok".to_string())))
}
