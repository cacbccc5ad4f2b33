//! Authentication handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthTokens, LoginResult};
use crate::services::nonce::{is_known_action, IssuedNonce};
use crate::services::{AuthService, NonceService};
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct NonceQuery {
    pub action: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResult>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.login(&body.email, &body.password).await?;
    Ok(Json(result))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Issue a nonce for one of the admin actions
pub async fn issue_nonce(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<NonceQuery>,
) -> Result<Json<IssuedNonce>, AppError> {
    if !is_known_action(&query.action) {
        return Err(AppError::validation(
            "action",
            format!("Unknown nonce action '{}'", query.action),
        ));
    }

    let nonce = NonceService::new(&state.config.nonce).create(
        &query.action,
        current_user.0.user_id,
        chrono::Utc::now().timestamp(),
    );
    Ok(Json(nonce))
}
