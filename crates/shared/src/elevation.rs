//! Elevated-credential token verification and context signing.
//!
//! Forced period closures require an elevated token issued to the acting
//! user. This module verifies those tokens and signs the authorization
//! context that gets embedded into the audit trail.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ElevationConfig;

/// Scope claim required on every elevation token.
pub const ELEVATION_SCOPE: &str = "period-close";

/// Claims carried by an elevation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevatedClaims {
    /// The actor the token was issued to.
    pub sub: String,
    /// Token scope; must equal [`ELEVATION_SCOPE`].
    pub scope: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Errors that can occur during elevation token operations.
#[derive(Debug, Error)]
pub enum ElevationError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token has expired.
    #[error("elevation token has expired")]
    Expired,

    /// Token is invalid.
    #[error("invalid elevation token")]
    Invalid,

    /// Token was issued to a different actor.
    #[error("elevation token was issued to a different actor")]
    WrongActor,

    /// Token carries the wrong scope.
    #[error("elevation token has the wrong scope")]
    WrongScope,
}

/// Service for elevation token operations.
#[derive(Clone)]
pub struct ElevationService {
    config: ElevationConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for ElevationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevationService")
            .field("token_expiry_secs", &self.config.token_expiry_secs)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl ElevationService {
    /// Creates a new elevation service with the given configuration.
    #[must_use]
    pub fn new(config: ElevationConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issues an elevation token for the given actor.
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn issue_token(&self, actor: &str) -> Result<String, ElevationError> {
        let now = Utc::now();
        let expiry = i64::try_from(self.config.token_expiry_secs).unwrap_or(i64::MAX);
        let claims = ElevatedClaims {
            sub: actor.to_string(),
            scope: ELEVATION_SCOPE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ElevationError::EncodingError(e.to_string()))
    }

    /// Verifies that `token` is a live elevation token issued to `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is expired, malformed, scoped wrong,
    /// or bound to a different actor.
    pub fn verify_elevated(&self, actor: &str, token: &str) -> Result<(), ElevationError> {
        let data = decode::<ElevatedClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ElevationError::Expired,
                _ => ElevationError::Invalid,
            })?;

        if data.claims.scope != ELEVATION_SCOPE {
            return Err(ElevationError::WrongScope);
        }
        if data.claims.sub != actor {
            return Err(ElevationError::WrongActor);
        }
        Ok(())
    }

    /// Signs an arbitrary payload, producing a compact token string.
    ///
    /// Used to seal the authorization context embedded in forced-closure
    /// audit records.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn sign_payload<T: Serialize>(&self, payload: &T) -> Result<String, ElevationError> {
        encode(&Header::default(), payload, &self.encoding_key)
            .map_err(|e| ElevationError::EncodingError(e.to_string()))
    }
}
