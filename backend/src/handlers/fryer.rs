//! HTTP handlers for fryers, oil batches and oil usage

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use shared::alerts::OilAlert;
use shared::models::{
    capability, BatchDetail, BatchStatus, CloseBatchInput, CreateFryerInput, Fryer,
    FryerDashboardEntry, OilUsageEntry, RecordUsageInput, StartBatchInput, UpdateFryerInput,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::nonce::action;
use crate::services::{FryerService, NonceService};
use crate::AppState;

#[derive(Deserialize)]
pub struct BatchListQuery {
    pub status: Option<BatchStatus>,
}

fn fryer_service(state: &AppState) -> FryerService {
    FryerService::new(state.db.clone(), state.config.fryer.thresholds())
}

fn require_manage(state: &AppState, user: &AuthUser, headers: &HeaderMap) -> AppResult<()> {
    user.require(capability::FRYERS_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(headers, action::FRYER, user.user_id)
}

/// List fryers
pub async fn list_fryers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Fryer>>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).list_fryers().await?))
}

/// Get a fryer
pub async fn get_fryer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(fryer_id): Path<Uuid>,
) -> AppResult<Json<Fryer>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).get_fryer(fryer_id).await?))
}

/// Create a fryer
pub async fn create_fryer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Json(input): Json<CreateFryerInput>,
) -> AppResult<(StatusCode, Json<Fryer>)> {
    require_manage(&state, &current_user.0, &headers)?;
    let fryer = fryer_service(&state).create_fryer(input).await?;
    Ok((StatusCode::CREATED, Json(fryer)))
}

/// Update a fryer
pub async fn update_fryer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(fryer_id): Path<Uuid>,
    Json(input): Json<UpdateFryerInput>,
) -> AppResult<Json<Fryer>> {
    require_manage(&state, &current_user.0, &headers)?;
    Ok(Json(fryer_service(&state).update_fryer(fryer_id, input).await?))
}

/// Delete a fryer without batch history
pub async fn delete_fryer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(fryer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_manage(&state, &current_user.0, &headers)?;
    fryer_service(&state).delete_fryer(fryer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Active fryers with their current batch, usage and alert
pub async fn get_fryer_dashboard(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<FryerDashboardEntry>>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).dashboard().await?))
}

/// Alerts over active batches, most severe first
pub async fn list_oil_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<OilAlert>>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).alerts().await?))
}

/// List batches for a fryer
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(fryer_id): Path<Uuid>,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<Vec<BatchDetail>>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    let batches = fryer_service(&state)
        .list_batches(fryer_id, query.status)
        .await?;
    Ok(Json(batches))
}

/// Start a new oil batch
pub async fn start_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(fryer_id): Path<Uuid>,
    Json(input): Json<StartBatchInput>,
) -> AppResult<(StatusCode, Json<BatchDetail>)> {
    require_manage(&state, &current_user.0, &headers)?;
    let batch = fryer_service(&state).start_batch(fryer_id, input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Get a batch with its usage stat and alert
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchDetail>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).get_batch_detail(batch_id).await?))
}

/// Close a batch when its oil is changed
pub async fn close_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<CloseBatchInput>,
) -> AppResult<Json<BatchDetail>> {
    require_manage(&state, &current_user.0, &headers)?;
    Ok(Json(fryer_service(&state).close_batch(batch_id, input).await?))
}

/// List usage entries for a batch
pub async fn list_usage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Vec<OilUsageEntry>>> {
    current_user.0.require(capability::FRYERS_VIEW)?;
    Ok(Json(fryer_service(&state).list_usage(batch_id).await?))
}

/// Record oil usage against an active batch
pub async fn record_usage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<RecordUsageInput>,
) -> AppResult<(StatusCode, Json<OilUsageEntry>)> {
    require_manage(&state, &current_user.0, &headers)?;
    let entry = fryer_service(&state)
        .record_usage(batch_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
