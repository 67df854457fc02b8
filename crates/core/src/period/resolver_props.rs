//! Property-based tests for the period state resolver.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use proptest::prelude::*;

use crate::period::resolver::PeriodStateResolver;
use crate::period::types::{FiscalPeriod, PeriodStatus};

/// Strategy for plausible calendar dates.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for instants on or after a period's end.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (arb_date(), 0u32..24, 0u32..60).prop_map(|(date, h, min)| {
        date.and_hms_opt(h, min, 0).unwrap().and_utc()
    })
}

/// Strategy for arbitrary period facts.
fn arb_period() -> impl Strategy<Value = FiscalPeriod> {
    (arb_date(), 0i64..400, any::<bool>(), any::<bool>(), any::<bool>(), arb_instant())
        .prop_map(|(start, span, is_closed, is_active, archived, closed_instant)| {
            let end = start + Duration::days(span);
            let mut period = FiscalPeriod::new("prop", start, end, "cfo").unwrap();
            period.is_closed = is_closed;
            period.is_active = is_active;
            period.archived = archived;
            period.closed_at = is_closed.then_some(closed_instant);
            period
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any combination of facts resolves to exactly one of the five
    /// statuses, and resolution is deterministic.
    #[test]
    fn prop_resolution_is_total_and_deterministic(
        period in arb_period(),
        now in arb_instant(),
        lock_months in 1u32..48,
    ) {
        let first = PeriodStateResolver::resolve(&period, now, lock_months);
        let second = PeriodStateResolver::resolve(&period, now, lock_months);
        prop_assert_eq!(first, second);
    }

    /// The archived marker overrides every other fact.
    #[test]
    fn prop_archived_always_wins(
        mut period in arb_period(),
        now in arb_instant(),
        lock_months in 1u32..48,
    ) {
        period.archived = true;
        let status = PeriodStateResolver::resolve(&period, now, lock_months);
        prop_assert_eq!(status, PeriodStatus::Archived);
    }

    /// A period that is not closed can only be Open or Closing.
    #[test]
    fn prop_unclosed_never_settled(
        mut period in arb_period(),
        now in arb_instant(),
        lock_months in 1u32..48,
    ) {
        period.is_closed = false;
        period.archived = false;
        let status = PeriodStateResolver::resolve(&period, now, lock_months);
        prop_assert!(matches!(status, PeriodStatus::Open | PeriodStatus::Closing));
    }

    /// A closed period resolves Closed or Locked, and once the lock
    /// threshold has passed it stays Locked at every later instant.
    #[test]
    fn prop_lock_is_monotonic(
        mut period in arb_period(),
        now in arb_instant(),
        elapsed_days in 0i64..2000,
        extra_days in 0i64..2000,
        lock_months in 1u32..48,
    ) {
        period.archived = false;
        period.mark_closed(now);

        let later = now + Duration::days(elapsed_days);
        let status = PeriodStateResolver::resolve(&period, later, lock_months);
        prop_assert!(matches!(status, PeriodStatus::Closed | PeriodStatus::Locked));

        if status == PeriodStatus::Locked {
            let even_later = later + Duration::days(extra_days);
            let later_status = PeriodStateResolver::resolve(&period, even_later, lock_months);
            prop_assert_eq!(later_status, PeriodStatus::Locked);
        }
    }
}
