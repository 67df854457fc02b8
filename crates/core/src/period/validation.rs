//! Required sign-off aggregation.

use crate::period::types::FiscalPeriod;

/// The gates, in the fixed order used for deterministic reporting.
const GATE_NAMES: [&str; 4] = ["accounting", "fiscal", "audit", "management"];

/// Aggregates the four independent sign-offs required before closure.
pub struct ValidationGateAggregator;

impl ValidationGateAggregator {
    /// Returns true when every sign-off has been granted.
    #[must_use]
    pub fn all_validated(period: &FiscalPeriod) -> bool {
        Self::missing(period).is_empty()
    }

    /// Names each gate that has not signed off, in fixed order.
    #[must_use]
    pub fn missing(period: &FiscalPeriod) -> Vec<&'static str> {
        let gates = period.validations;
        let granted = [gates.accounting, gates.fiscal, gates.audit, gates.management];
        GATE_NAMES
            .iter()
            .zip(granted)
            .filter(|(_, ok)| !ok)
            .map(|(name, _)| *name)
            .collect()
    }
}
