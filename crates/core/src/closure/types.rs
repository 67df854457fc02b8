//! Closure domain types.
//!
//! This module defines the evaluation result consumed by callers and the
//! append-only audit record written for every state transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use clausura_shared::types::{ClosureActionId, FiscalPeriodId};

use crate::period::types::PeriodStatus;

/// Outcome of evaluating the closure rules against a period.
///
/// Not persisted; rebuilt on every evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureEvaluation {
    /// True when no blocking rule fired.
    pub can_close: bool,
    /// Findings from blocking rules, in rule-definition order.
    pub blocking_reasons: Vec<String>,
    /// Findings from warning rules; closure remains permitted.
    pub warnings: Vec<String>,
    /// Advisory findings from informational rules.
    pub informational: Vec<String>,
}

impl ClosureEvaluation {
    /// Returns an evaluation with no findings.
    #[must_use]
    pub fn clean() -> Self {
        Self {
            can_close: true,
            ..Self::default()
        }
    }
}

/// Kind of closure transition recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureActionType {
    /// Regular closure, all gates passed.
    Normal,
    /// Elevated override bypassing blocking rules.
    Forced,
    /// Conditional reversal of a closure.
    Reopen,
}

impl ClosureActionType {
    /// Returns the string representation of the action type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Forced => "forced",
            Self::Reopen => "reopen",
        }
    }

    /// Parses an action type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "forced" => Some(Self::Forced),
            "reopen" => Some(Self::Reopen),
            _ => None,
        }
    }
}

impl fmt::Display for ClosureActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only audit record for a closure transition attempt.
///
/// Normal closes and reopens record only committed transitions. Forced
/// closes record every attempt: a failed attempt has
/// `new_status == prior_status` and `failed_with` set to the error code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureAction {
    /// Unique identifier.
    pub id: ClosureActionId,
    /// Period the transition targeted.
    pub period_id: FiscalPeriodId,
    /// Identity of the acting user.
    pub actor: String,
    /// Kind of transition.
    pub action: ClosureActionType,
    /// When the attempt happened.
    pub timestamp: DateTime<Utc>,
    /// Override justification; required and non-empty for forced closes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    /// Resolved status before the transition.
    pub prior_status: PeriodStatus,
    /// Resolved status after the transition.
    pub new_status: PeriodStatus,
    /// Blocking reasons bypassed by a forced close, empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocking_reasons_at_override: Vec<String>,
    /// Signature sealing the authorization context of a forced close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_signature: Option<String>,
    /// Error code when the attempt did not commit, `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_with: Option<String>,
}

/// Signed authorization produced before a forced closure mutates state.
///
/// Embedded verbatim into the resulting [`ClosureAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizationContext {
    /// Actor the elevation was granted to.
    pub actor: String,
    /// When authorization was granted.
    pub timestamp: DateTime<Utc>,
    /// Blocking reasons in effect at authorization time.
    pub blocking_reasons: Vec<String>,
    /// Compact signature over the fields above.
    pub signature: String,
}
