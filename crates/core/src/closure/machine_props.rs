//! Property-based tests for the closure state machine.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;

use clausura_shared::config::{CloseoutConfig, ElevationConfig};
use clausura_shared::elevation::ElevationService;

use crate::clock::FixedClock;
use crate::closure::audit::ForcedClosureAuditor;
use crate::closure::error::ClosureError;
use crate::closure::machine::ClosureStateMachine;
use crate::closure::rules::ClosureRuleEngine;
use crate::closure::types::ClosureActionType;
use crate::period::resolver::PeriodStateResolver;
use crate::period::types::{FiscalPeriod, PeriodStatus, ValidationGates};
use crate::store::memory::{InMemoryAuditStore, InMemoryPeriodStore};
use crate::store::{PeriodStore, StaticLedgerChecks};

const ACTOR: &str = "controller@example.com";

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_gates() -> impl Strategy<Value = ValidationGates> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(accounting, fiscal, audit, management)| ValidationGates {
            accounting,
            fiscal,
            audit,
            management,
        },
    )
}

fn arb_checks() -> impl Strategy<Value = StaticLedgerChecks> {
    (any::<bool>(), any::<bool>()).prop_map(|(documents_complete, has_unlettered_entries)| {
        StaticLedgerChecks {
            documents_complete,
            has_unlettered_entries,
        }
    })
}

fn arb_period() -> impl Strategy<Value = FiscalPeriod> {
    (arb_date(), 1i64..90, arb_gates()).prop_map(|(start, span, gates)| {
        let end = start + Duration::days(span);
        let mut period = FiscalPeriod::new("prop", start, end, "cfo").unwrap();
        period.validations = gates;
        period
    })
}

fn elevation() -> ElevationService {
    ElevationService::new(ElevationConfig {
        secret: "test-secret".to_string(),
        token_expiry_secs: 900,
    })
}

fn machine_for(
    period: FiscalPeriod,
    now: DateTime<Utc>,
    checks: StaticLedgerChecks,
) -> ClosureStateMachine<InMemoryPeriodStore, InMemoryAuditStore, StaticLedgerChecks, FixedClock> {
    let store = InMemoryPeriodStore::new();
    store.seed([period]).unwrap();
    ClosureStateMachine::new(
        store,
        InMemoryAuditStore::new(),
        checks,
        FixedClock(now),
        ClosureRuleEngine::standard(),
        ForcedClosureAuditor::new(elevation()),
        CloseoutConfig::default(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// `close` succeeds exactly when the evaluation permits it, and a
    /// success commits the closure atomically with one audit record.
    #[test]
    fn prop_close_agrees_with_evaluation(
        period in arb_period(),
        days_after_end in -30i64..120,
        checks in arb_checks(),
    ) {
        let id = period.id;
        let now = (period.end_date + Duration::days(days_after_end))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let machine = machine_for(period, now, checks);

        let evaluation = machine.evaluate(id).unwrap();
        match machine.close(id, ACTOR) {
            Ok(committed) => {
                prop_assert!(evaluation.can_close);
                prop_assert!(committed.is_closed);
                prop_assert_eq!(committed.version, 1);
                let trail = machine.list_audit_trail(id).unwrap();
                prop_assert_eq!(trail.len(), 1);
                prop_assert_eq!(trail[0].action, ClosureActionType::Normal);
            }
            Err(ClosureError::CannotClose { reasons }) => {
                prop_assert!(!evaluation.can_close);
                prop_assert_eq!(reasons, evaluation.blocking_reasons);
                prop_assert_eq!(machine.periods().get(id).unwrap().version, 0);
                prop_assert!(machine.list_audit_trail(id).unwrap().is_empty());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// A forced close with a live token always commits when the period is
    /// open, regardless of rule findings, and records exactly one Forced
    /// audit entry carrying the bypassed reasons.
    #[test]
    fn prop_forced_close_always_audited(
        period in arb_period(),
        days_after_end in -30i64..60,
        checks in arb_checks(),
    ) {
        let id = period.id;
        let now = (period.end_date + Duration::days(days_after_end))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let machine = machine_for(period, now, checks);
        let token = elevation().issue_token(ACTOR).unwrap();

        let evaluation = machine.evaluate(id).unwrap();
        let committed = machine
            .force_close(id, ACTOR, "year-end deadline", &token)
            .unwrap();
        prop_assert!(committed.is_closed);

        let trail = machine.list_audit_trail(id).unwrap();
        prop_assert_eq!(trail.len(), 1);
        prop_assert_eq!(trail[0].action, ClosureActionType::Forced);
        prop_assert_eq!(&trail[0].blocking_reasons_at_override, &evaluation.blocking_reasons);
        prop_assert!(trail[0].authorization_signature.is_some());
        prop_assert!(trail[0].failed_with.is_none());
    }

    /// Close followed by reopen restores the open facts, and every
    /// transition bumps the version exactly once.
    #[test]
    fn prop_reopen_inverts_forced_close(period in arb_period()) {
        let id = period.id;
        let end_date = period.end_date;
        let now = (end_date + Duration::days(5))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let machine = machine_for(period, now, StaticLedgerChecks::default());
        let token = elevation().issue_token(ACTOR).unwrap();

        machine.force_close(id, ACTOR, "deadline", &token).unwrap();
        let reopened = machine.reopen(id, ACTOR).unwrap();

        prop_assert!(!reopened.is_closed);
        prop_assert!(reopened.closed_at.is_none());
        prop_assert_eq!(reopened.version, 2);

        let status = PeriodStateResolver::resolve(&reopened, now, 3);
        prop_assert!(matches!(status, PeriodStatus::Open | PeriodStatus::Closing));
    }

    /// Archived periods refuse every mutation, privileged or not.
    #[test]
    fn prop_archived_rejects_all_mutations(mut period in arb_period()) {
        period.archived = true;
        let id = period.id;
        let now = (period.end_date + Duration::days(5))
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc();
        let machine = machine_for(period, now, StaticLedgerChecks::default());
        let token = elevation().issue_token(ACTOR).unwrap();

        prop_assert!(
            matches!(
                machine.close(id, ACTOR),
                Err(ClosureError::TerminalStateViolation { status: PeriodStatus::Archived })
            ),
            "close on archived period must return TerminalStateViolation"
        );
        prop_assert!(
            matches!(
                machine.force_close(id, ACTOR, "deadline", &token),
                Err(ClosureError::TerminalStateViolation { status: PeriodStatus::Archived })
            ),
            "force_close on archived period must return TerminalStateViolation"
        );
        prop_assert!(
            matches!(
                machine.reopen(id, ACTOR),
                Err(ClosureError::TerminalStateViolation { status: PeriodStatus::Archived })
            ),
            "reopen on archived period must return TerminalStateViolation"
        );
        prop_assert!(!machine.periods().get(id).unwrap().is_closed);
    }
}
