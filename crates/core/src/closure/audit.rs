//! Forced-closure authorization.
//!
//! A forced closure bypasses blocking rules, so the bypass itself must be
//! fully accountable: a non-empty justification, a live elevated token
//! bound to the acting user, and a signed authorization context sealed
//! into the audit record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use clausura_shared::elevation::ElevationService;

use crate::closure::error::ClosureError;
use crate::closure::types::AuthorizationContext;

/// Payload signed into the authorization context.
#[derive(Debug, Serialize)]
struct AuthorizationPayload<'a> {
    actor: &'a str,
    timestamp: DateTime<Utc>,
    blocking_reasons: &'a [String],
}

/// Verifies forced-closure credentials and produces the signed context.
#[derive(Debug, Clone)]
pub struct ForcedClosureAuditor {
    elevation: ElevationService,
}

impl ForcedClosureAuditor {
    /// Creates an auditor backed by the given elevation service.
    #[must_use]
    pub fn new(elevation: ElevationService) -> Self {
        Self { elevation }
    }

    /// Authorizes a forced closure before any state is mutated.
    ///
    /// Checks, in order: the justification must be non-empty after
    /// trimming, and `token` must be a live elevation token issued to
    /// `actor`. On success the blocking reasons being bypassed are sealed
    /// under a signature so the audit record cannot be quietly rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`ClosureError::AuthorizationError`] when any check fails.
    pub fn authorize(
        &self,
        actor: &str,
        justification: &str,
        token: &str,
        blocking_reasons: &[String],
        now: DateTime<Utc>,
    ) -> Result<AuthorizationContext, ClosureError> {
        if justification.trim().is_empty() {
            return Err(ClosureError::AuthorizationError(
                "a non-empty justification is required for a forced closure".to_string(),
            ));
        }

        self.elevation.verify_elevated(actor, token).map_err(|e| {
            warn!(actor, error = %e, "forced closure rejected");
            ClosureError::AuthorizationError(e.to_string())
        })?;

        let payload = AuthorizationPayload {
            actor,
            timestamp: now,
            blocking_reasons,
        };
        let signature = self
            .elevation
            .sign_payload(&payload)
            .map_err(|e| ClosureError::AuthorizationError(e.to_string()))?;

        Ok(AuthorizationContext {
            actor: actor.to_string(),
            timestamp: now,
            blocking_reasons: blocking_reasons.to_vec(),
            signature,
        })
    }
}
