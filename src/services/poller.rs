//! Eventual-state poller.
//!
//! The single synchronization primitive of the harness: sample a value until
//! a predicate holds or the settle budget runs out, sleeping between samples
//! instead of busy-waiting. Returns on the first satisfying sample.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, instrument, trace};

use crate::domain::errors::{SurfaceError, SurfaceResult};
use crate::domain::models::TimingProfile;
use crate::services::abort::AbortSignal;

/// A value on which the predicate held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    pub value: T,
    pub elapsed: Duration,
    pub samples: u32,
}

/// Why a poll ended without the predicate holding.
#[derive(Debug, Error)]
pub enum PollError<T> {
    #[error("predicate did not hold within {elapsed:?} ({samples} samples)")]
    TimeoutExceeded {
        last_observed: T,
        elapsed: Duration,
        samples: u32,
    },

    #[error("poll cancelled after {elapsed:?}")]
    Cancelled {
        last_observed: Option<T>,
        elapsed: Duration,
    },

    #[error(transparent)]
    Surface(SurfaceError),
}

/// Predicate-driven waiter over an asynchronous accessor.
#[derive(Debug, Clone, Default)]
pub struct EventualStatePoller {
    abort: AbortSignal,
}

impl EventualStatePoller {
    pub const fn new(abort: AbortSignal) -> Self {
        Self { abort }
    }

    /// Sample `accessor` until `predicate` holds.
    ///
    /// Fails with [`PollError::TimeoutExceeded`] carrying the last sample
    /// once `settle_timeout` has elapsed, so the call always finishes within
    /// `settle_timeout + poll_interval` plus the duration of one accessor
    /// call. An accessor error ends the poll immediately.
    #[instrument(
        name = "poll",
        skip_all,
        fields(settle_ms = timing.settle_timeout_ms, poll_ms = timing.poll_interval_ms)
    )]
    pub async fn await_state<T, F, Fut, P>(
        &self,
        mut accessor: F,
        mut predicate: P,
        timing: &TimingProfile,
    ) -> Result<Settled<T>, PollError<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SurfaceResult<T>>,
        P: FnMut(&T) -> bool,
    {
        let start = Instant::now();
        let budget = timing.settle_timeout();
        let mut samples = 0u32;
        let mut last_observed: Option<T> = None;

        loop {
            if self.abort.is_aborted() {
                return Err(PollError::Cancelled {
                    last_observed,
                    elapsed: start.elapsed(),
                });
            }

            let value = tokio::select! {
                biased;
                () = self.abort.aborted() => {
                    return Err(PollError::Cancelled {
                        last_observed,
                        elapsed: start.elapsed(),
                    });
                }
                sample = accessor() => sample.map_err(PollError::Surface)?,
            };
            samples += 1;

            if predicate(&value) {
                let elapsed = start.elapsed();
                debug!(samples, elapsed_ms = elapsed.as_millis() as u64, "predicate held");
                return Ok(Settled {
                    value,
                    elapsed,
                    samples,
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= budget {
                debug!(samples, elapsed_ms = elapsed.as_millis() as u64, "settle budget exhausted");
                return Err(PollError::TimeoutExceeded {
                    last_observed: value,
                    elapsed,
                    samples,
                });
            }
            last_observed = Some(value);

            // Never sleep past the deadline: the final sample lands on it.
            let nap = timing.poll_interval().min(budget - elapsed);
            trace!(nap_ms = nap.as_millis() as u64, "predicate not yet satisfied");

            tokio::select! {
                biased;
                () = self.abort.aborted() => {
                    return Err(PollError::Cancelled {
                        last_observed,
                        elapsed: start.elapsed(),
                    });
                }
                () = tokio::time::sleep(nap) => {}
            }
        }
    }

    /// Sleep for `delay` unless the run is aborted first.
    ///
    /// Returns `false` when the abort signal fired.
    pub async fn settle_delay(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.abort.is_aborted();
        }
        tokio::select! {
            biased;
            () = self.abort.aborted() => false,
            () = tokio::time::sleep(delay) => true,
        }
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SurfaceRole;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn timing(settle_ms: u64, poll_ms: u64) -> TimingProfile {
        TimingProfile::new(settle_ms, poll_ms, 0).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_satisfying_sample_without_sleeping() {
        let poller = EventualStatePoller::default();
        let start = Instant::now();

        let settled = poller
            .await_state(|| async { Ok("ready".to_string()) }, |v| v == "ready", &timing(15_000, 250))
            .await
            .unwrap();

        assert_eq!(settled.value, "ready");
        assert_eq!(settled.samples, 1);
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_sampling_until_predicate_holds() {
        let poller = EventualStatePoller::default();
        let counter = Arc::new(AtomicU32::new(0));

        let settled = poller
            .await_state(
                || {
                    let counter = counter.clone();
                    async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
                },
                |n| *n >= 4,
                &timing(15_000, 250),
            )
            .await
            .unwrap();

        assert_eq!(settled.value, 4);
        assert_eq!(settled.samples, 4);
        assert!(settled.elapsed >= Duration::from_millis(750));
        assert!(settled.elapsed < Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_carries_last_observed_value() {
        let poller = EventualStatePoller::default();
        let start = Instant::now();

        let err = poller
            .await_state(|| async { Ok("latin".to_string()) }, |_| false, &timing(1_000, 300))
            .await
            .unwrap_err();

        match err {
            PollError::TimeoutExceeded {
                last_observed,
                elapsed,
                samples,
            } => {
                assert_eq!(last_observed, "latin");
                assert!(elapsed >= Duration::from_millis(1_000));
                // 0, 300, 600, 900, then the deadline sample at 1000
                assert_eq!(samples, 5);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(start.elapsed() <= Duration::from_millis(1_300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accessor_fault_ends_poll() {
        let poller = EventualStatePoller::default();
        let err = poller
            .await_state(
                || async { Err::<String, _>(SurfaceError::unavailable(SurfaceRole::Output, "detached")) },
                |_| true,
                &timing(15_000, 250),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::Surface(SurfaceError::Unavailable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_interrupts_sleep() {
        let (handle, signal) = AbortSignal::pair();
        let poller = EventualStatePoller::new(signal);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_100)).await;
            handle.abort();
        });

        let start = Instant::now();
        let err = poller
            .await_state(|| async { Ok(String::new()) }, |_| false, &timing(15_000, 500))
            .await
            .unwrap_err();

        match err {
            PollError::Cancelled { last_observed, .. } => assert_eq!(last_observed.as_deref(), Some("")),
            other => panic!("expected cancellation, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_aborted_never_samples() {
        let (handle, signal) = AbortSignal::pair();
        handle.abort();
        let poller = EventualStatePoller::new(signal);
        let counter = AtomicU32::new(0);

        let err = poller
            .await_state(
                || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(1) }
                },
                |_| true,
                &timing(15_000, 250),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { last_observed: None, .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_delay_respects_abort() {
        let poller = EventualStatePoller::default();
        assert!(poller.settle_delay(Duration::from_millis(1_000)).await);

        let (handle, signal) = AbortSignal::pair();
        handle.abort();
        let poller = EventualStatePoller::new(signal);
        assert!(!poller.settle_delay(Duration::from_millis(1_000)).await);
        assert!(!poller.settle_delay(Duration::ZERO).await);
    }
}
