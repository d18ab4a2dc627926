use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::time::Duration;

use translit_probe::adapters::simulated::transliterate;
use translit_probe::domain::errors::SurfaceResult;
use translit_probe::domain::models::{OracleKind, Script, TimingProfile};
use translit_probe::services::{AbortSignal, EventualStatePoller, PollError};

fn oracle_strategy() -> impl Strategy<Value = OracleKind> {
    prop_oneof![
        Just(OracleKind::tamil()),
        Just(OracleKind::NonCrash),
        Just(OracleKind::MonotonicGrowth),
        "[a-z0-9]{1,6}".prop_map(OracleKind::substring),
    ]
}

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    /// Property: oracles are pure functions of their arguments
    ///
    /// Evaluating the same oracle on the same observation any number of
    /// times yields the same answer.
    #[test]
    fn prop_oracle_evaluation_is_pure(
        oracle in oracle_strategy(),
        observed in "\\PC{0,40}",
        previous in proptest::option::of("\\PC{0,40}"),
    ) {
        let first = oracle.holds(&observed, previous.as_deref());
        for _ in 0..5 {
            prop_assert_eq!(oracle.holds(&observed, previous.as_deref()), first);
        }
    }

    /// Property: NonCrash accepts every observation, including the empty one
    #[test]
    fn prop_non_crash_always_holds(observed in "\\PC{0,40}") {
        prop_assert!(OracleKind::NonCrash.holds(&observed, None));
    }

    /// Property: MonotonicGrowth never holds without an earlier observation
    /// and never holds on an unchanged one
    #[test]
    fn prop_monotonic_growth_needs_change(observed in "\\PC{0,40}") {
        prop_assert!(!OracleKind::MonotonicGrowth.holds(&observed, None));
        prop_assert!(!OracleKind::MonotonicGrowth.holds(&observed, Some(&observed)));
    }

    /// Property: transliterating a Latin word yields Tamil text
    #[test]
    fn prop_transliterated_words_contain_tamil(word in "[aeiou]?[kgcjtdnpmyrlvsh][aeiou]{1,2}") {
        let output = transliterate(&word);
        prop_assert!(output.chars().any(|c| Script::Tamil.contains(c)), "{} -> {}", word, output);
        prop_assert!(OracleKind::tamil().holds(&output, None));
    }

    /// Property: a poll whose predicate never holds ends within
    /// `settle_timeout + poll_interval` and reports the last observation
    #[test]
    fn prop_poller_terminates_within_bound(
        settle_ms in 1u64..20_000,
        poll_ms in 1u64..2_000,
    ) {
        let timing = TimingProfile::new(settle_ms, poll_ms, 0).unwrap();
        let runtime = paused_runtime();

        let (elapsed, result) = runtime.block_on(async {
            let poller = EventualStatePoller::new(AbortSignal::never());
            let start = tokio::time::Instant::now();
            let mut samples = 0u32;
            let result = poller
                .await_state(
                    || {
                        samples += 1;
                        let value = samples;
                        async move { SurfaceResult::Ok(value) }
                    },
                    |_| false,
                    &timing,
                )
                .await;
            (start.elapsed(), result)
        });

        prop_assert!(elapsed >= Duration::from_millis(settle_ms));
        prop_assert!(elapsed <= Duration::from_millis(settle_ms + poll_ms));
        match result {
            Err(PollError::TimeoutExceeded { last_observed, samples, .. }) => {
                prop_assert_eq!(last_observed, samples);
            }
            other => prop_assert!(false, "expected timeout, got {:?}", other.map(|s| s.value)),
        }
    }

    /// Property: the poller returns on the first satisfying sample
    #[test]
    fn prop_poller_returns_first_satisfying_sample(
        target in 1u32..50,
        poll_ms in 1u64..500,
    ) {
        let timing = TimingProfile::new(poll_ms * 100, poll_ms, 0).unwrap();
        let runtime = paused_runtime();

        let result = runtime.block_on(async {
            let poller = EventualStatePoller::new(AbortSignal::never());
            let mut samples = 0u32;
            poller
                .await_state(
                    || {
                        samples += 1;
                        let value = samples;
                        async move { SurfaceResult::Ok(value) }
                    },
                    |v| *v >= target,
                    &timing,
                )
                .await
        });

        let settled = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(settled.value, target);
        prop_assert_eq!(settled.samples, target);
        prop_assert_eq!(settled.elapsed, Duration::from_millis(poll_ms * u64::from(target - 1)));
    }
}
