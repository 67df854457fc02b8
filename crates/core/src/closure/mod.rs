//! Fiscal period closure.
//!
//! Implements the closure rule engine, the state machine driving close,
//! forced close and reopen transitions, and the forced-closure auditing
//! that makes rule bypasses accountable.
//!
//! # Modules
//!
//! - `types` - Evaluation results and audit records
//! - `error` - Closure-specific error types
//! - `rules` - The rule engine and the standard rule set
//! - `machine` - The closure state machine
//! - `audit` - Forced-closure authorization

pub mod audit;
pub mod error;
pub mod machine;
pub mod rules;
pub mod types;

#[cfg(test)]
mod machine_props;
#[cfg(test)]
mod rules_props;

pub use audit::ForcedClosureAuditor;
pub use error::ClosureError;
pub use machine::ClosureStateMachine;
pub use rules::{ClosureRule, ClosureRuleEngine, RuleContext, RuleSeverity};
pub use types::{AuthorizationContext, ClosureAction, ClosureActionType, ClosureEvaluation};
