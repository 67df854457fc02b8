//! Fiscal period closure state machine.
//!
//! Orchestrates closure, forced closure and reopening over the storage
//! traits. Every committed transition appends an audit record; forced
//! closure attempts are recorded whether or not they commit. Mutations
//! use optimistic concurrency: the period's version read before computing
//! a transition must still be current at commit time.

use tracing::{info, warn};

use clausura_shared::config::CloseoutConfig;
use clausura_shared::types::{ClosureActionId, FiscalPeriodId};

use crate::clock::Clock;
use crate::closure::audit::ForcedClosureAuditor;
use crate::closure::error::ClosureError;
use crate::closure::rules::{ClosureRuleEngine, RuleContext};
use crate::closure::types::{ClosureAction, ClosureActionType, ClosureEvaluation};
use crate::period::resolver::PeriodStateResolver;
use crate::period::steps::MandatoryStepTracker;
use crate::period::types::{FiscalPeriod, PeriodStatus};
use crate::store::{AuditStore, LedgerChecks, PeriodStore};

/// Closure orchestrator over pluggable storage, ledger and clock backends.
pub struct ClosureStateMachine<S, A, L, C> {
    periods: S,
    audit: A,
    ledger: L,
    clock: C,
    engine: ClosureRuleEngine,
    auditor: ForcedClosureAuditor,
    config: CloseoutConfig,
}

impl<S, A, L, C> ClosureStateMachine<S, A, L, C>
where
    S: PeriodStore,
    A: AuditStore,
    L: LedgerChecks,
    C: Clock,
{
    /// Assembles a state machine from its collaborators.
    pub fn new(
        periods: S,
        audit: A,
        ledger: L,
        clock: C,
        engine: ClosureRuleEngine,
        auditor: ForcedClosureAuditor,
        config: CloseoutConfig,
    ) -> Self {
        Self {
            periods,
            audit,
            ledger,
            clock,
            engine,
            auditor,
            config,
        }
    }

    /// Read-only access to the period store.
    pub fn periods(&self) -> &S {
        &self.periods
    }

    /// Evaluates whether a period can close right now.
    ///
    /// Runs the full rule set and folds the mandatory-step gate into the
    /// blocking reasons, so the result is exactly what [`close`] would
    /// enforce. Read-only and freely repeatable.
    ///
    /// [`close`]: Self::close
    pub fn evaluate(&self, id: FiscalPeriodId) -> Result<ClosureEvaluation, ClosureError> {
        let period = self.periods.get(id)?;
        let all = self.periods.list()?;
        let now = self.clock.now();
        Ok(self.evaluate_snapshot(&period, &all, now))
    }

    /// Closes a period through the normal path.
    ///
    /// Requires the resolved status to be `Open` or `Closing`, every
    /// blocking rule to pass and every obligatory step to be complete.
    /// On success the committed period is returned and a `Normal` audit
    /// record appended.
    ///
    /// # Errors
    ///
    /// - [`ClosureError::TerminalStateViolation`] if the period is locked
    ///   or archived.
    /// - [`ClosureError::InvalidTransition`] if the period is already
    ///   closed.
    /// - [`ClosureError::CannotClose`] carrying every blocking reason.
    /// - [`ClosureError::ConcurrentModification`] if the period changed
    ///   between read and commit.
    pub fn close(
        &self,
        id: FiscalPeriodId,
        actor: &str,
    ) -> Result<FiscalPeriod, ClosureError> {
        let period = self.periods.get(id)?;
        let all = self.periods.list()?;
        let now = self.clock.now();
        let status = self.resolve(&period, now);

        if status.is_terminal() {
            return Err(ClosureError::TerminalStateViolation { status });
        }
        if !matches!(status, PeriodStatus::Open | PeriodStatus::Closing) {
            return Err(ClosureError::InvalidTransition {
                from: status,
                to: PeriodStatus::Closed,
            });
        }

        let evaluation = self.evaluate_snapshot(&period, &all, now);
        if !evaluation.can_close {
            return Err(ClosureError::CannotClose {
                reasons: evaluation.blocking_reasons,
            });
        }

        let expected_version = period.version;
        let mut mutated = period;
        mutated.mark_closed(now);
        let committed = self.periods.commit(mutated, expected_version)?;
        let new_status = self.resolve(&committed, now);

        self.audit.append(ClosureAction {
            id: ClosureActionId::new(),
            period_id: id,
            actor: actor.to_string(),
            action: ClosureActionType::Normal,
            timestamp: now,
            justification: None,
            prior_status: status,
            new_status,
            blocking_reasons_at_override: Vec::new(),
            authorization_signature: None,
            failed_with: None,
        })?;

        info!(period = %committed.code, actor, "period closed");
        Ok(committed)
    }

    /// Forcibly closes a period, bypassing blocking rules and the step
    /// gate.
    ///
    /// The terminal guard still applies: locked and archived periods
    /// cannot be forced. Authorization (justification plus elevated token)
    /// happens before any mutation. Every attempt that gets past the
    /// period lookup leaves exactly one `Forced` audit record; failed
    /// attempts carry the error code in `failed_with`.
    ///
    /// # Errors
    ///
    /// - [`ClosureError::TerminalStateViolation`] for locked/archived
    ///   periods.
    /// - [`ClosureError::InvalidTransition`] if already closed.
    /// - [`ClosureError::AuthorizationError`] if the justification is
    ///   blank or the token does not verify for `actor`.
    /// - [`ClosureError::ConcurrentModification`] on a stale commit.
    pub fn force_close(
        &self,
        id: FiscalPeriodId,
        actor: &str,
        justification: &str,
        elevated_token: &str,
    ) -> Result<FiscalPeriod, ClosureError> {
        let period = self.periods.get(id)?;
        let all = self.periods.list()?;
        let now = self.clock.now();
        let status = self.resolve(&period, now);
        let evaluation = self.evaluate_snapshot(&period, &all, now);

        let record = |new_status: PeriodStatus,
                      signature: Option<String>,
                      failed_with: Option<&'static str>| ClosureAction {
            id: ClosureActionId::new(),
            period_id: id,
            actor: actor.to_string(),
            action: ClosureActionType::Forced,
            timestamp: now,
            justification: Some(justification.to_string()),
            prior_status: status,
            new_status,
            blocking_reasons_at_override: evaluation.blocking_reasons.clone(),
            authorization_signature: signature,
            failed_with: failed_with.map(String::from),
        };

        if status.is_terminal() {
            let err = ClosureError::TerminalStateViolation { status };
            self.audit.append(record(status, None, Some(err.error_code())))?;
            return Err(err);
        }
        if !matches!(status, PeriodStatus::Open | PeriodStatus::Closing) {
            let err = ClosureError::InvalidTransition {
                from: status,
                to: PeriodStatus::Closed,
            };
            self.audit.append(record(status, None, Some(err.error_code())))?;
            return Err(err);
        }

        let context = match self.auditor.authorize(
            actor,
            justification,
            elevated_token,
            &evaluation.blocking_reasons,
            now,
        ) {
            Ok(context) => context,
            Err(err) => {
                self.audit.append(record(status, None, Some(err.error_code())))?;
                return Err(err);
            }
        };

        let expected_version = period.version;
        let mut mutated = period;
        mutated.mark_closed(now);
        let committed = match self.periods.commit(mutated, expected_version) {
            Ok(committed) => committed,
            Err(store_err) => {
                let err = ClosureError::from(store_err);
                self.audit
                    .append(record(status, Some(context.signature), Some(err.error_code())))?;
                return Err(err);
            }
        };

        let new_status = self.resolve(&committed, now);
        self.audit
            .append(record(new_status, Some(context.signature), None))?;

        warn!(
            period = %committed.code,
            actor,
            bypassed = evaluation.blocking_reasons.len(),
            "period force-closed"
        );
        Ok(committed)
    }

    /// Reopens a closed period.
    ///
    /// Only `Closed` periods can reopen; the lock threshold makes closure
    /// permanent. Reopening is also refused while any later-ending period
    /// is closed or locked, to preserve chronological order.
    ///
    /// # Errors
    ///
    /// - [`ClosureError::TerminalStateViolation`] for locked/archived
    ///   periods.
    /// - [`ClosureError::InvalidTransition`] if the period is not closed.
    /// - [`ClosureError::OrderViolation`] if a later period is settled.
    /// - [`ClosureError::ConcurrentModification`] on a stale commit.
    pub fn reopen(
        &self,
        id: FiscalPeriodId,
        actor: &str,
    ) -> Result<FiscalPeriod, ClosureError> {
        let period = self.periods.get(id)?;
        let all = self.periods.list()?;
        let now = self.clock.now();
        let status = self.resolve(&period, now);

        if status.is_terminal() {
            return Err(ClosureError::TerminalStateViolation { status });
        }
        if status != PeriodStatus::Closed {
            return Err(ClosureError::InvalidTransition {
                from: status,
                to: PeriodStatus::Open,
            });
        }

        if let Some(later) = all
            .iter()
            .filter(|other| period.ends_before(other))
            .find(|other| self.resolve(other, now).is_settled())
        {
            return Err(ClosureError::OrderViolation(format!(
                "later period {} is already closed",
                later.code
            )));
        }

        let expected_version = period.version;
        let mut mutated = period;
        mutated.mark_reopened(now.date_naive());
        let committed = self.periods.commit(mutated, expected_version)?;
        let new_status = self.resolve(&committed, now);

        self.audit.append(ClosureAction {
            id: ClosureActionId::new(),
            period_id: id,
            actor: actor.to_string(),
            action: ClosureActionType::Reopen,
            timestamp: now,
            justification: None,
            prior_status: status,
            new_status,
            blocking_reasons_at_override: Vec::new(),
            authorization_signature: None,
            failed_with: None,
        })?;

        info!(period = %committed.code, actor, "period reopened");
        Ok(committed)
    }

    /// Lists the audit trail for a period, newest first.
    pub fn list_audit_trail(
        &self,
        id: FiscalPeriodId,
    ) -> Result<Vec<ClosureAction>, ClosureError> {
        Ok(self.audit.list_for_period(id)?)
    }

    /// Resolves the lifecycle status of a period as of `now`.
    fn resolve(
        &self,
        period: &FiscalPeriod,
        now: chrono::DateTime<chrono::Utc>,
    ) -> PeriodStatus {
        PeriodStateResolver::resolve(period, now, self.config.lock_after_months)
    }

    /// Runs the rule set and folds the step gate into the blocking reasons.
    fn evaluate_snapshot(
        &self,
        period: &FiscalPeriod,
        all: &[FiscalPeriod],
        now: chrono::DateTime<chrono::Utc>,
    ) -> ClosureEvaluation {
        let mut evaluation = self.engine.evaluate(&RuleContext {
            period,
            all_periods: all,
            now,
            checks: &self.ledger,
            config: &self.config,
        });

        if !MandatoryStepTracker::step_eligible(period) {
            let progress = MandatoryStepTracker::progress(period);
            evaluation.blocking_reasons.extend(
                progress
                    .incomplete
                    .iter()
                    .filter(|step| step.obligatory)
                    .map(|step| format!("mandatory step not complete: {}", step.name)),
            );
            evaluation.can_close = false;
        }

        evaluation
    }
}
