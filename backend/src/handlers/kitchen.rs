//! HTTP handlers for the kitchen display

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use shared::models::{capability, CreateOrderInput, KitchenOrder, OrderStatus, UpdateOrderStatusInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::nonce::action;
use crate::services::{KitchenService, NonceService};
use crate::AppState;

#[derive(Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

fn kitchen_service(state: &AppState) -> KitchenService {
    KitchenService::new(state.db.clone(), state.config.dashboard.late_order_minutes)
}

/// Open orders for the kitchen display
pub async fn list_kitchen_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<KitchenOrder>>> {
    current_user.0.require(capability::KITCHEN_VIEW)?;
    Ok(Json(kitchen_service(&state).list_open_orders(query.status).await?))
}

/// Get a kitchen order
pub async fn get_kitchen_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<KitchenOrder>> {
    current_user.0.require(capability::KITCHEN_VIEW)?;
    Ok(Json(kitchen_service(&state).get_order(order_id).await?))
}

/// Push an order to the kitchen
pub async fn create_kitchen_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<KitchenOrder>)> {
    current_user.0.require(capability::KITCHEN_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(&headers, action::KITCHEN, current_user.0.user_id)?;

    let order = kitchen_service(&state).create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Move an order to its next status
pub async fn update_kitchen_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderStatusInput>,
) -> AppResult<Json<KitchenOrder>> {
    current_user.0.require(capability::KITCHEN_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(&headers, action::KITCHEN, current_user.0.user_id)?;

    let order = kitchen_service(&state)
        .update_status(order_id, input.status)
        .await?;
    Ok(Json(order))
}
