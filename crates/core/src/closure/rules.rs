//! Closure rules engine.
//!
//! Rules are data, not code paths: each rule carries a severity and a pure
//! check producing finding strings. Evaluation walks the rule set in
//! definition order and aggregates the findings into a
//! [`ClosureEvaluation`]. Evaluating has no side effects and can be
//! repeated freely.

use chrono::{Months, NaiveDate};
use tracing::debug;

use clausura_shared::config::CloseoutConfig;

use crate::closure::types::ClosureEvaluation;
use crate::period::resolver::PeriodStateResolver;
use crate::period::types::FiscalPeriod;
use crate::period::validation::ValidationGateAggregator;
use crate::store::LedgerChecks;

/// How a rule's findings affect closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSeverity {
    /// Findings prevent normal closure.
    Blocking,
    /// Findings are reported but closure proceeds.
    Warning,
    /// Findings are advisory only.
    Informational,
}

/// Everything a rule check may consult.
///
/// Checks never reach outside this context, which keeps evaluation
/// deterministic for a given snapshot and instant.
pub struct RuleContext<'a> {
    /// The period being evaluated.
    pub period: &'a FiscalPeriod,
    /// Snapshot of every known period, for cross-period rules.
    pub all_periods: &'a [FiscalPeriod],
    /// The evaluation instant.
    pub now: chrono::DateTime<chrono::Utc>,
    /// External ledger queries.
    pub checks: &'a dyn LedgerChecks,
    /// Closure tunables (lock threshold, filing deadline).
    pub config: &'a CloseoutConfig,
}

impl RuleContext<'_> {
    /// The evaluation instant as a calendar date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Pure predicate producing zero or more finding strings.
pub type RuleCheck = Box<dyn Fn(&RuleContext<'_>) -> Vec<String> + Send + Sync>;

/// A single closure rule.
pub struct ClosureRule {
    /// Stable slug, e.g. `"chronological-order"`.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// What the rule verifies.
    pub description: &'static str,
    /// How findings affect closure.
    pub severity: RuleSeverity,
    /// Inactive rules are skipped during evaluation.
    pub active: bool,
    /// The check itself.
    pub check: RuleCheck,
}

impl std::fmt::Debug for ClosureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureRule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Evaluates the closure rule set against a period snapshot.
#[derive(Debug)]
pub struct ClosureRuleEngine {
    rules: Vec<ClosureRule>,
}

impl ClosureRuleEngine {
    /// Builds an engine from an explicit rule set.
    #[must_use]
    pub fn new(rules: Vec<ClosureRule>) -> Self {
        Self { rules }
    }

    /// The standard rule set, in definition order.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            ClosureRule {
                id: "chronological-order",
                name: "Chronological order",
                description: "Every earlier period must be closed or locked first",
                severity: RuleSeverity::Blocking,
                active: true,
                check: Box::new(|ctx| {
                    ctx.all_periods
                        .iter()
                        .filter(|other| other.ends_before(ctx.period))
                        .filter(|other| {
                            !PeriodStateResolver::resolve(
                                other,
                                ctx.now,
                                ctx.config.lock_after_months,
                            )
                            .is_settled()
                        })
                        .map(|other| format!("earlier period {} is not closed", other.code))
                        .collect()
                }),
            },
            ClosureRule {
                id: "temporal-eligibility",
                name: "Temporal eligibility",
                description: "A period cannot close before its last day has passed",
                severity: RuleSeverity::Blocking,
                active: true,
                check: Box::new(|ctx| {
                    if ctx.today() < ctx.period.end_date {
                        vec![format!(
                            "period {} has not ended yet (ends {})",
                            ctx.period.code, ctx.period.end_date
                        )]
                    } else {
                        Vec::new()
                    }
                }),
            },
            ClosureRule {
                id: "legal-deadline",
                name: "Legal filing deadline",
                description: "Flags closure happening past the statutory filing window",
                severity: RuleSeverity::Warning,
                active: true,
                check: Box::new(|ctx| {
                    let elapsed = (ctx.today() - ctx.period.end_date).num_days();
                    let overdue = elapsed - ctx.config.legal_deadline_days;
                    if overdue > 0 {
                        vec![format!("closing {overdue} days past the filing deadline")]
                    } else {
                        Vec::new()
                    }
                }),
            },
            ClosureRule {
                id: "mandatory-documents",
                name: "Mandatory documents",
                description: "Every required document must be filed before closure",
                severity: RuleSeverity::Blocking,
                active: true,
                check: Box::new(|ctx| {
                    if ctx.checks.documents_complete(ctx.period.id) {
                        Vec::new()
                    } else {
                        vec!["mandatory documents are incomplete".to_string()]
                    }
                }),
            },
            ClosureRule {
                id: "hierarchical-validation",
                name: "Hierarchical validation",
                description: "All four sign-offs must be granted before closure",
                severity: RuleSeverity::Blocking,
                active: true,
                check: Box::new(|ctx| {
                    ValidationGateAggregator::missing(ctx.period)
                        .into_iter()
                        .map(|gate| format!("missing validation: {gate}"))
                        .collect()
                }),
            },
            ClosureRule {
                id: "unlettered-entries",
                name: "Unlettered entries",
                description: "Flags unreconciled ledger lines left in the period",
                severity: RuleSeverity::Warning,
                active: true,
                check: Box::new(|ctx| {
                    if ctx.checks.has_unlettered_entries(ctx.period.id) {
                        vec!["period has unlettered ledger entries".to_string()]
                    } else {
                        Vec::new()
                    }
                }),
            },
            ClosureRule {
                id: "definitive-lock-notice",
                name: "Definitive lock notice",
                description: "Advises that the lock threshold has elapsed",
                severity: RuleSeverity::Informational,
                active: true,
                check: Box::new(|ctx| {
                    let locks_at = ctx.period.closed_at.and_then(|closed_at| {
                        closed_at.checked_add_months(Months::new(ctx.config.lock_after_months))
                    });
                    if locks_at.is_some_and(|t| ctx.now >= t) {
                        vec![format!(
                            "period {} is past the lock threshold and permanently immutable",
                            ctx.period.code
                        )]
                    } else {
                        Vec::new()
                    }
                }),
            },
        ])
    }

    /// Read-only access to the configured rules.
    #[must_use]
    pub fn rules(&self) -> &[ClosureRule] {
        &self.rules
    }

    /// Activates or deactivates a rule by id.
    ///
    /// Returns false when no rule carries that id.
    pub fn set_active(&mut self, id: &str, active: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.active = active;
                true
            }
            None => false,
        }
    }

    /// Runs every active rule against the period and aggregates findings.
    ///
    /// `can_close` is false iff any blocking rule produced a finding.
    /// Findings keep rule-definition order within each severity bucket.
    #[must_use]
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> ClosureEvaluation {
        let mut evaluation = ClosureEvaluation::clean();

        for rule in self.rules.iter().filter(|r| r.active) {
            let findings = (rule.check)(ctx);
            if findings.is_empty() {
                continue;
            }
            debug!(
                rule = rule.id,
                period = %ctx.period.code,
                findings = findings.len(),
                "closure rule fired"
            );
            match rule.severity {
                RuleSeverity::Blocking => evaluation.blocking_reasons.extend(findings),
                RuleSeverity::Warning => evaluation.warnings.extend(findings),
                RuleSeverity::Informational => evaluation.informational.extend(findings),
            }
        }

        evaluation.can_close = evaluation.blocking_reasons.is_empty();
        evaluation
    }
}
