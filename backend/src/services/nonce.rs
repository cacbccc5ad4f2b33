//! Action nonces for state-changing requests
//!
//! A nonce binds a user to an action for a time window. Time is split into
//! ticks of half the configured lifespan; a nonce from the current or the
//! previous tick verifies, so a freshly issued one lasts between half and
//! the full lifespan.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::config::NonceConfig;
use crate::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the nonce on mutating requests
pub const NONCE_HEADER: &str = "x-rpos-nonce";

/// Bytes of the HMAC tag kept in a nonce
const NONCE_BYTES: usize = 12;

/// Nonce actions guarding each admin surface
pub mod action {
    pub const CATEGORY: &str = "category";
    pub const FRYER: &str = "fryer";
    pub const INGREDIENT: &str = "ingredient";
    pub const KITCHEN: &str = "kitchen";

    pub const ALL: [&str; 4] = [CATEGORY, FRYER, INGREDIENT, KITCHEN];
}

/// Issued nonce
#[derive(Debug, Serialize)]
pub struct IssuedNonce {
    pub action: String,
    pub nonce: String,
    /// Guaranteed validity in seconds
    pub expires_in: i64,
}

/// Creates and verifies action nonces
#[derive(Clone)]
pub struct NonceService {
    secret: Vec<u8>,
    lifespan_seconds: i64,
}

impl NonceService {
    pub fn new(config: &NonceConfig) -> Self {
        Self {
            secret: config.secret.as_bytes().to_vec(),
            lifespan_seconds: config.lifespan_seconds.max(2),
        }
    }

    /// Current tick for a unix timestamp
    fn tick(&self, now: i64) -> i64 {
        let half = self.lifespan_seconds / 2;
        (now + half - 1).div_euclid(half)
    }

    fn mac(&self, tick: i64, action: &str, user_id: Uuid) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{}|{}|{}", tick, action, user_id).as_bytes());
        mac
    }

    /// Issue a nonce for `action` at unix time `now`
    pub fn create(&self, action: &str, user_id: Uuid, now: i64) -> IssuedNonce {
        let tag = self.mac(self.tick(now), action, user_id).finalize().into_bytes();
        IssuedNonce {
            action: action.to_string(),
            nonce: URL_SAFE_NO_PAD.encode(&tag[..NONCE_BYTES]),
            expires_in: self.lifespan_seconds / 2,
        }
    }

    /// Verify a nonce for `action` at unix time `now`
    pub fn verify(&self, nonce: &str, action: &str, user_id: Uuid, now: i64) -> bool {
        let bytes = match URL_SAFE_NO_PAD.decode(nonce.trim()) {
            Ok(bytes) if bytes.len() == NONCE_BYTES => bytes,
            _ => return false,
        };

        let tick = self.tick(now);
        [tick, tick - 1].into_iter().any(|t| {
            self.mac(t, action, user_id)
                .verify_truncated_left(&bytes)
                .is_ok()
        })
    }

    /// Check the nonce header of a mutating request
    pub fn check_headers(&self, headers: &HeaderMap, action: &str, user_id: Uuid) -> AppResult<()> {
        let nonce = headers
            .get(NONCE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if self.verify(nonce, action, user_id, chrono::Utc::now().timestamp()) {
            Ok(())
        } else {
            tracing::warn!(%user_id, action, "Rejected request with missing or stale nonce");
            Err(AppError::InvalidNonce(action.to_string()))
        }
    }
}

pub fn is_known_action(name: &str) -> bool {
    action::ALL.contains(&name)
}
