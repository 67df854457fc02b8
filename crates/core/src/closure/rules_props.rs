//! Property-based tests for the closure rule engine.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;

use clausura_shared::config::CloseoutConfig;

use crate::closure::rules::{ClosureRuleEngine, RuleContext};
use crate::period::types::{FiscalPeriod, ValidationGates};
use crate::store::StaticLedgerChecks;

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2015i32..2035, 1u32..=12, 1u32..=28)
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
    (arb_date(), 1i64..90, arb_gates(), any::<bool>()).prop_map(
        |(start, span, gates, is_closed)| {
            let end = start + Duration::days(span);
            let mut period = FiscalPeriod::new("prop", start, end, "cfo").unwrap();
            period.validations = gates;
            if is_closed {
                period.mark_closed(end.and_hms_opt(0, 0, 0).unwrap().and_utc());
            }
            period
        },
    )
}

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    arb_date().prop_map(|date| date.and_hms_opt(12, 0, 0).unwrap().and_utc())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Evaluation is pure: repeating it never changes the outcome.
    #[test]
    fn prop_evaluation_is_idempotent(
        period in arb_period(),
        now in arb_instant(),
        checks in arb_checks(),
    ) {
        let config = CloseoutConfig::default();
        let all = vec![period.clone()];
        let engine = ClosureRuleEngine::standard();
        let ctx = RuleContext {
            period: &period,
            all_periods: &all,
            now,
            checks: &checks,
            config: &config,
        };
        let first = engine.evaluate(&ctx);
        let second = engine.evaluate(&ctx);
        prop_assert_eq!(first, second);
    }

    /// `can_close` is exactly the absence of blocking findings; warnings
    /// and advisories never flip it.
    #[test]
    fn prop_can_close_iff_no_blocking_findings(
        period in arb_period(),
        now in arb_instant(),
        checks in arb_checks(),
    ) {
        let config = CloseoutConfig::default();
        let all = vec![period.clone()];
        let evaluation = ClosureRuleEngine::standard().evaluate(&RuleContext {
            period: &period,
            all_periods: &all,
            now,
            checks: &checks,
            config: &config,
        });
        prop_assert_eq!(evaluation.can_close, evaluation.blocking_reasons.is_empty());
    }

    /// Every missing validation gate produces a finding naming the gate.
    #[test]
    fn prop_missing_gates_each_produce_a_finding(
        period in arb_period(),
        now in arb_instant(),
    ) {
        let config = CloseoutConfig::default();
        let all = vec![period.clone()];
        let evaluation = ClosureRuleEngine::standard().evaluate(&RuleContext {
            period: &period,
            all_periods: &all,
            now,
            checks: &StaticLedgerChecks::default(),
            config: &config,
        });

        let gates = period.validations;
        for (name, granted) in [
            ("accounting", gates.accounting),
            ("fiscal", gates.fiscal),
            ("audit", gates.audit),
            ("management", gates.management),
        ] {
            let finding = format!("missing validation: {name}");
            prop_assert_eq!(
                evaluation.blocking_reasons.contains(&finding),
                !granted
            );
        }
    }

    /// Deactivating every rule yields a clean evaluation regardless of
    /// the period's state.
    #[test]
    fn prop_inactive_rules_never_fire(
        period in arb_period(),
        now in arb_instant(),
        checks in arb_checks(),
    ) {
        let config = CloseoutConfig::default();
        let all = vec![period.clone()];
        let mut engine = ClosureRuleEngine::standard();
        let ids: Vec<&str> = engine.rules().iter().map(|r| r.id).collect();
        for id in ids {
            engine.set_active(id, false);
        }
        let evaluation = engine.evaluate(&RuleContext {
            period: &period,
            all_periods: &all,
            now,
            checks: &checks,
            config: &config,
        });
        prop_assert!(evaluation.can_close);
        prop_assert!(evaluation.blocking_reasons.is_empty());
        prop_assert!(evaluation.warnings.is_empty());
        prop_assert!(evaluation.informational.is_empty());
    }
}
