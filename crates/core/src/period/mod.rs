//! Fiscal period domain model.
//!
//! A period's lifecycle status is never stored; it is derived from two
//! persisted flags plus the closure timestamp. This module holds the raw
//! facts, the state resolver, the mandatory-step tracker, and the
//! validation-gate aggregator.
//!
//! # Modules
//!
//! - `types` - Period facts, statuses, steps, validation gates
//! - `resolver` - Derives the lifecycle status from raw facts
//! - `steps` - Pre-closure checklist progress and eligibility
//! - `validation` - Required sign-off aggregation
//! - `calendar` - Helpers for building monthly period facts

pub mod calendar;
pub mod resolver;
pub mod steps;
pub mod types;
pub mod validation;

#[cfg(test)]
mod resolver_props;

pub use calendar::monthly_periods;
pub use resolver::PeriodStateResolver;
pub use steps::{MandatoryStepTracker, StepProgress};
pub use types::{
    FiscalPeriod, MandatoryStep, PeriodError, PeriodStatus, StepStatus, ValidationGates,
};
pub use validation::ValidationGateAggregator;
