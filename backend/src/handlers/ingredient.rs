//! HTTP handlers for ingredient stock endpoints

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use shared::models::{
    capability, CreateIngredientInput, Ingredient, IngredientMovement, MovementResult,
    RecordMovementInput, UpdateIngredientInput,
};
use shared::types::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{AuthUser, CurrentUser};
use crate::services::nonce::action;
use crate::services::{IngredientService, NonceService};
use crate::AppState;

#[derive(Deserialize)]
pub struct IngredientListQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct MovementListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

fn require_manage(state: &AppState, user: &AuthUser, headers: &HeaderMap) -> AppResult<()> {
    user.require(capability::INGREDIENTS_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(headers, action::INGREDIENT, user.user_id)
}

/// List ingredients
pub async fn list_ingredients(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<IngredientListQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    current_user.0.require(capability::INGREDIENTS_VIEW)?;
    let service = IngredientService::new(state.db);
    Ok(Json(service.list_ingredients(query.search.as_deref()).await?))
}

/// Get an ingredient
pub async fn get_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<Json<Ingredient>> {
    current_user.0.require(capability::INGREDIENTS_VIEW)?;
    let service = IngredientService::new(state.db);
    Ok(Json(service.get_ingredient(ingredient_id).await?))
}

/// Create an ingredient
pub async fn create_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Json(input): Json<CreateIngredientInput>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    require_manage(&state, &current_user.0, &headers)?;
    let service = IngredientService::new(state.db);
    let ingredient = service.create_ingredient(input).await?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

/// Update an ingredient
pub async fn update_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<UpdateIngredientInput>,
) -> AppResult<Json<Ingredient>> {
    require_manage(&state, &current_user.0, &headers)?;
    let service = IngredientService::new(state.db);
    Ok(Json(service.update_ingredient(ingredient_id, input).await?))
}

/// Delete an ingredient
pub async fn delete_ingredient(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(ingredient_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_manage(&state, &current_user.0, &headers)?;
    let service = IngredientService::new(state.db);
    service.delete_ingredient(ingredient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List stock movements for an ingredient
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ingredient_id): Path<Uuid>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<PaginatedResponse<IngredientMovement>>> {
    current_user.0.require(capability::INGREDIENTS_VIEW)?;
    let pagination = Pagination::clamped(query.page, query.per_page);
    let service = IngredientService::new(state.db);
    Ok(Json(service.list_movements(ingredient_id, &pagination).await?))
}

/// Record a stock movement
pub async fn record_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(ingredient_id): Path<Uuid>,
    Json(input): Json<RecordMovementInput>,
) -> AppResult<(StatusCode, Json<MovementResult>)> {
    require_manage(&state, &current_user.0, &headers)?;
    let service = IngredientService::new(state.db);
    let result = service
        .record_movement(ingredient_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}
