//! Fiscal period domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use clausura_shared::types::FiscalPeriodId;

/// Derived lifecycle status of a fiscal period.
///
/// Statuses are computed from stored facts by
/// [`PeriodStateResolver`](crate::period::PeriodStateResolver), never
/// persisted. The reachable transitions are:
/// - Open → Closing (period end passes)
/// - Open/Closing → Closed (close or forced close)
/// - Closed → Locked (lock threshold elapses, automatic)
/// - Closed → Open (reopen)
/// - Archived is a terminal marker set by an external retention process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is in progress and accepts activity.
    Open,
    /// Period has ended but is not yet finalized.
    Closing,
    /// Period is closed; reopening is still possible.
    Closed,
    /// Period is permanently immutable (lock threshold elapsed).
    Locked,
    /// Period was retired by the retention process (terminal).
    Archived,
}

impl PeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Locked => "locked",
            Self::Archived => "archived",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" => Some(Self::Open),
            "closing" => Some(Self::Closing),
            "closed" => Some(Self::Closed),
            "locked" => Some(Self::Locked),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Returns true if no transition may ever leave this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Locked | Self::Archived)
    }

    /// Returns true if the period counts as settled for ordering checks.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Closed | Self::Locked)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single pre-closure checklist step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step is done.
    Complete,
    /// Step is being worked on.
    InProgress,
    /// Step has not started.
    Pending,
    /// Step cannot proceed until something else is resolved.
    Blocked,
}

impl StepStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::InProgress => "in_progress",
            Self::Pending => "pending",
            Self::Blocked => "blocked",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "complete" => Some(Self::Complete),
            "in_progress" => Some(Self::InProgress),
            "pending" => Some(Self::Pending),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A required checklist item tracked per period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryStep {
    /// Opaque identifier from the checklist tracker.
    pub id: String,
    /// Human-readable step name.
    pub name: String,
    /// Current completion status.
    pub status: StepStatus,
    /// Whether the step gates normal closure.
    pub obligatory: bool,
    /// When the step was completed, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MandatoryStep {
    /// Creates a pending step.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, obligatory: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: StepStatus::Pending,
            obligatory,
            completed_at: None,
        }
    }

    /// Marks the step complete at the given instant.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.status = StepStatus::Complete;
        self.completed_at = Some(at);
    }
}

/// The four independent sign-offs required before normal closure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationGates {
    /// Accounting sign-off.
    pub accounting: bool,
    /// Fiscal sign-off.
    pub fiscal: bool,
    /// Audit sign-off.
    pub audit: bool,
    /// Management sign-off.
    pub management: bool,
}

impl ValidationGates {
    /// Returns gates with every sign-off granted.
    #[must_use]
    pub fn all_granted() -> Self {
        Self {
            accounting: true,
            fiscal: true,
            audit: true,
            management: true,
        }
    }
}

/// Errors that can occur when constructing period facts.
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    /// Start date must not be after end date.
    #[error("Start date must not be after end date")]
    InvalidDateRange,
}

/// Raw stored facts for a fiscal period, plus the concurrency token.
///
/// `is_closed` and `is_active` are the only persisted lifecycle flags; the
/// five logical statuses are derived from them. `version` backs optimistic
/// concurrency: every committed mutation bumps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Human label, e.g. "2025-01".
    pub code: String,
    /// First day of the period (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Whether the period has been finalized.
    pub is_closed: bool,
    /// Whether the period still accepts activity.
    pub is_active: bool,
    /// When the period was closed, if it is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Terminal marker set by the external retention process.
    #[serde(default)]
    pub archived: bool,
    /// Identity of the accountable owner.
    pub responsible_party: String,
    /// Required sign-offs.
    #[serde(default)]
    pub validations: ValidationGates,
    /// Ordered pre-closure checklist.
    #[serde(default)]
    pub mandatory_steps: Vec<MandatoryStep>,
    /// Optimistic concurrency token, bumped on every committed mutation.
    #[serde(default)]
    pub version: u64,
}

impl FiscalPeriod {
    /// Creates an open period with the supplied calendar bounds.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodError::InvalidDateRange`] if `start_date > end_date`.
    /// Single-day periods are allowed (adjustment periods use them).
    pub fn new(
        code: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        responsible_party: impl Into<String>,
    ) -> Result<Self, PeriodError> {
        if start_date > end_date {
            return Err(PeriodError::InvalidDateRange);
        }
        Ok(Self {
            id: FiscalPeriodId::new(),
            code: code.into(),
            start_date,
            end_date,
            is_closed: false,
            is_active: true,
            closed_at: None,
            archived: false,
            responsible_party: responsible_party.into(),
            validations: ValidationGates::default(),
            mandatory_steps: Vec::new(),
            version: 0,
        })
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if this period ends strictly before `other`.
    #[must_use]
    pub fn ends_before(&self, other: &Self) -> bool {
        self.end_date < other.end_date
    }

    /// Records closure at the given instant.
    ///
    /// `closed_at` is never allowed to precede `end_date`: a forced closure
    /// of an in-progress period is pinned to the period's end instead.
    pub fn mark_closed(&mut self, now: DateTime<Utc>) {
        let floor = self
            .end_date
            .and_hms_opt(0, 0, 0)
            .expect("midnight is valid")
            .and_utc();
        self.is_closed = true;
        self.is_active = false;
        self.closed_at = Some(now.max(floor));
    }

    /// Reverts closure; the period becomes active again if it has not ended.
    pub fn mark_reopened(&mut self, today: NaiveDate) {
        self.is_closed = false;
        self.closed_at = None;
        self.is_active = today <= self.end_date;
    }
}
