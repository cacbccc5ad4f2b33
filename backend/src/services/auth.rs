//! Authentication service for staff login and token management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{AdminConfig, Config};
use crate::error::{AppError, AppResult};
use shared::models::{capability, StaffUser};

/// Drops a user's refresh tokens that can no longer be redeemed
const PRUNE_REFRESH_TOKENS: &str = r#"
    DELETE FROM refresh_tokens
    WHERE user_id = $1
      AND (revoked_at IS NOT NULL OR expires_at <= NOW())
"#;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub capabilities: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Result of a successful login
#[derive(Debug, Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: StaffUser,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    display_name: String,
    capabilities: Vec<String>,
    is_active: bool,
}

impl From<UserRow> for StaffUser {
    fn from(row: UserRow) -> Self {
        StaffUser {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            capabilities: row.capabilities,
        }
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, display_name, capabilities, is_active
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is disabled".to_string()));
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::warn!(user_id = %user.id, "Failed login attempt");
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ));
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user.id, &user.capabilities)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            tokens,
            user: user.into(),
        })
    }

    /// Rotate a refresh token into a fresh token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = Self::hash_token(refresh_token);

        let mut tx = self.db.begin().await?;

        let (user_id, capabilities) = sqlx::query_as::<_, (Uuid, Vec<String>)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            RETURNING u.id, u.capabilities
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let tokens = self.generate_tokens(user_id, &capabilities)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(Self::hash_token(&tokens.refresh_token))
        .bind(Utc::now() + Duration::seconds(self.refresh_token_expiry))
        .execute(&mut *tx)
        .await?;

        let pruned = sqlx::query(PRUNE_REFRESH_TOKENS)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(%user_id, pruned, "Refresh token rotated");
        Ok(tokens)
    }

    /// Create the configured administrator if the users table is empty
    pub async fn ensure_bootstrap_admin(&self, admin: &AdminConfig) -> AppResult<bool> {
        let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        if user_count > 0 {
            return Ok(false);
        }

        if admin.password.len() < 8 {
            return Err(AppError::validation(
                "admin.password",
                "Bootstrap password must be at least 8 characters",
            ));
        }

        let password_hash = hash(&admin.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
        let capabilities: Vec<String> = capability::ALL.iter().map(|c| c.to_string()).collect();

        sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, display_name, capabilities)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(admin.email.trim())
        .bind(&password_hash)
        .bind(admin.display_name.as_deref().unwrap_or("Administrator"))
        .bind(&capabilities)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "email"))?;

        tracing::info!(email = %admin.email, "Created bootstrap administrator");
        Ok(true)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, capabilities: &[String]) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            capabilities: capabilities.to_vec(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token; only its hash is stored
        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(Self::hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        sqlx::query(PRUNE_REFRESH_TOKENS)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Hash a token for storage
    fn hash_token(token: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
    }
}
