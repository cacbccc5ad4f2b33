//! HTTP handlers for menu category endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use shared::models::{capability, Category, CreateCategoryInput, DeleteCategoryResult, UpdateCategoryInput};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::nonce::action;
use crate::services::{CategoryService, NonceService};
use crate::AppState;

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    current_user.0.require(capability::CATEGORIES_VIEW)?;
    let service = CategoryService::new(state.db);
    Ok(Json(service.list_categories().await?))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    current_user.0.require(capability::CATEGORIES_VIEW)?;
    let service = CategoryService::new(state.db);
    Ok(Json(service.get_category(category_id).await?))
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    current_user.0.require(capability::CATEGORIES_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(&headers, action::CATEGORY, current_user.0.user_id)?;

    let service = CategoryService::new(state.db);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    current_user.0.require(capability::CATEGORIES_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(&headers, action::CATEGORY, current_user.0.user_id)?;

    let service = CategoryService::new(state.db);
    Ok(Json(service.update_category(category_id, input).await?))
}

/// Delete a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<DeleteCategoryResult>> {
    current_user.0.require(capability::CATEGORIES_MANAGE)?;
    NonceService::new(&state.config.nonce).check_headers(&headers, action::CATEGORY, current_user.0.user_id)?;

    let service = CategoryService::new(state.db);
    Ok(Json(service.delete_category(category_id).await?))
}
