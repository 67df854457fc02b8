//! Pre-closure checklist tracking.

use crate::period::types::{FiscalPeriod, MandatoryStep, StepStatus};

/// Checklist completion snapshot for a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepProgress {
    /// Share of obligatory steps complete, 0..=100.
    pub percent_complete: u8,
    /// Every non-complete step, obligatory or not, in checklist order.
    pub incomplete: Vec<MandatoryStep>,
}

/// Tracks completion of the ordered pre-closure checklist.
pub struct MandatoryStepTracker;

impl MandatoryStepTracker {
    /// Computes checklist progress for the period.
    ///
    /// Non-obligatory steps are excluded from the ratio but still reported
    /// among the incomplete steps.
    #[must_use]
    pub fn progress(period: &FiscalPeriod) -> StepProgress {
        let obligatory = period
            .mandatory_steps
            .iter()
            .filter(|s| s.obligatory)
            .count();
        let completed = period
            .mandatory_steps
            .iter()
            .filter(|s| s.obligatory && s.status == StepStatus::Complete)
            .count();

        let percent_complete = if obligatory == 0 {
            100
        } else {
            u8::try_from(completed * 100 / obligatory).unwrap_or(100)
        };

        let incomplete = period
            .mandatory_steps
            .iter()
            .filter(|s| s.status != StepStatus::Complete)
            .cloned()
            .collect();

        StepProgress {
            percent_complete,
            incomplete,
        }
    }

    /// Returns true if every obligatory step is complete.
    #[must_use]
    pub fn step_eligible(period: &FiscalPeriod) -> bool {
        period
            .mandatory_steps
            .iter()
            .filter(|s| s.obligatory)
            .all(|s| s.status == StepStatus::Complete)
    }
}
