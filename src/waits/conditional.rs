use crate::core::TimeoutConfig;
use crate::errors::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace, warn};

/// Lower bound applied to caller-supplied poll intervals so a wait always
/// sleeps between polls.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Deadline-bounded poller.
///
/// A wait started at `t0` with timeout `T` has the deadline `t0 + T`. Polls
/// may start at any instant up to and including the deadline, and a started
/// poll always runs to completion. After an unsatisfied poll the next one is
/// scheduled one poll interval later; when that instant lies past the
/// deadline the wait gives up right away instead of sleeping for nothing.
/// A zero timeout therefore means exactly one poll.
#[derive(Debug, Clone)]
pub struct ConditionalWait {
    timeouts: TimeoutConfig,
}

impl ConditionalWait {
    pub fn new(timeouts: TimeoutConfig) -> Self {
        Self { timeouts }
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    /// Poll `condition` at the configured interval until it returns `true`
    /// or `timeout` runs out. Running out is `Ok(false)`, not an error.
    pub async fn wait_for_true<F, Fut>(&self, condition: F, timeout: Duration) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.wait_for_true_with(condition, timeout, self.timeouts.polling_interval())
            .await
    }

    /// [`wait_for_true`](Self::wait_for_true) with the configured condition timeout.
    pub async fn wait_for_true_default<F, Fut>(&self, condition: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        self.wait_for_true(condition, self.timeouts.condition()).await
    }

    pub async fn wait_for_true_with<F, Fut>(
        &self,
        mut condition: F,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let satisfied = self
            .wait_for_value(
                move || {
                    let poll = condition();
                    async move { poll.await.map(|satisfied| satisfied.then_some(())) }
                },
                timeout,
                poll_interval,
            )
            .await?;
        Ok(satisfied.is_some())
    }

    /// Like [`wait_for_true`](Self::wait_for_true) but running out of time is
    /// reported as [`BrowserError::Timeout`] carrying `message`.
    pub async fn wait_for<F, Fut>(&self, condition: F, timeout: Duration, message: &str) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        if self.wait_for_true(condition, timeout).await? {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!(
                "{} (not satisfied within {} ms)",
                message,
                timeout.as_millis()
            )))
        }
    }

    /// General form of the poller: each poll either produces a value
    /// (`Some`), reports "not yet" (`None`), or fails.
    ///
    /// Recoverable failures count as "not yet". Any other failure ends the
    /// wait immediately and is returned unchanged.
    pub async fn wait_for_value<T, F, Fut>(
        &self,
        mut probe: F,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        // no representable deadline means the wait is unbounded
        let deadline = Instant::now().checked_add(timeout);
        let mut polls: u32 = 0;

        debug!(
            timeout_ms = timeout.as_millis() as u64,
            poll_interval_ms = poll_interval.as_millis() as u64,
            "Waiting for condition"
        );

        loop {
            polls += 1;
            match probe().await {
                Ok(Some(value)) => {
                    debug!(polls, "Condition satisfied");
                    return Ok(Some(value));
                }
                Ok(None) => trace!(polls, "Condition not satisfied yet"),
                Err(err) if err.is_recoverable() => {
                    trace!(polls, error = %err, "Recoverable failure, poll counts as unsatisfied")
                }
                Err(err) => {
                    warn!(polls, error = %err, "Fatal failure, aborting wait");
                    return Err(err);
                }
            }

            let next_poll = match (Instant::now().checked_add(poll_interval), deadline) {
                (Some(next_poll), Some(deadline)) if next_poll <= deadline => next_poll,
                (Some(next_poll), None) => next_poll,
                _ => {
                    debug!(polls, "Condition not satisfied before the deadline");
                    return Ok(None);
                }
            };
            sleep_until(next_poll).await;
        }
    }
}

impl Default for ConditionalWait {
    fn default() -> Self {
        Self::new(TimeoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn wait_with_interval(interval_ms: u64) -> ConditionalWait {
        ConditionalWait::new(TimeoutConfig {
            polling_interval_ms: interval_ms,
            ..Default::default()
        })
    }

    /// Predicate that is false for the first `k - 1` polls and true from the
    /// k-th one on.
    fn true_on_poll(k: usize, polls: Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<Result<bool>> {
        move || {
            let index = polls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(index + 1 >= k))
        }
    }

    #[test]
    fn test_zero_timeout_polls_exactly_once() {
        let wait = wait_with_interval(10_000);
        let polls = Arc::new(AtomicUsize::new(0));

        let result = tokio_test::block_on(wait.wait_for_true(true_on_poll(2, polls.clone()), ms(0)));

        assert!(!result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_returns_first_result_without_sleeping() {
        let wait = wait_with_interval(200);
        let polls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let result = wait.wait_for_true(true_on_poll(1, polls.clone()), ms(0)).await;

        assert!(result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundary_poll_at_deadline_still_runs() {
        // true on the 4th poll, which starts at 3 * 100ms
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let result = wait.wait_for_true(true_on_poll(4, polls.clone()), ms(300)).await;

        assert!(result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), ms(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_millisecond_short_of_boundary_fails() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let result = wait.wait_for_true(true_on_poll(4, polls.clone()), ms(299)).await;

        assert!(!result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        // no pointless sleep once the next poll could not start in time
        assert_eq!(start.elapsed(), ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_are_spaced_by_interval() {
        let wait = wait_with_interval(50);
        let start = Instant::now();
        let mut seen = Vec::new();

        let result = wait
            .wait_for_true(
                || {
                    seen.push(start.elapsed());
                    std::future::ready(Ok(false))
                },
                ms(120),
            )
            .await;

        assert!(!result.unwrap());
        assert_eq!(seen, vec![ms(0), ms(50), ms(100)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recoverable_errors_never_escape() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let result = wait
            .wait_for_true(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(Err(BrowserError::StaleElement("node 7".into())))
                },
                ms(1000),
            )
            .await;

        assert!(!result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recoverable_error_then_success() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let result = wait
            .wait_for_true(
                move || {
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(if index < 2 {
                        Err(BrowserError::NotRendered("#menu".into()))
                    } else {
                        Ok(true)
                    })
                },
                ms(1000),
            )
            .await;

        assert!(result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_aborts_after_that_poll() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let start = Instant::now();

        let result = wait
            .wait_for_true(
                move || {
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(if index == 2 {
                        Err(BrowserError::SessionClosed("chrome exited".into()))
                    } else {
                        Ok(false)
                    })
                },
                ms(10_000),
            )
            .await;

        assert!(matches!(result, Err(BrowserError::SessionClosed(_))));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_override_interval() {
        let wait = wait_with_interval(1000);
        let polls = Arc::new(AtomicUsize::new(0));

        let result = wait
            .wait_for_true_with(true_on_poll(5, polls.clone()), ms(100), ms(25))
            .await;

        assert!(result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_override_still_sleeps() {
        let wait = wait_with_interval(100);
        let start = Instant::now();
        let polls = Arc::new(AtomicUsize::new(0));

        let result = wait
            .wait_for_true_with(true_on_poll(4, polls.clone()), ms(10), Duration::ZERO)
            .await;

        assert!(result.unwrap());
        assert_eq!(start.elapsed(), ms(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_comes_from_config() {
        let wait = ConditionalWait::new(TimeoutConfig {
            condition_ms: 500,
            polling_interval_ms: 100,
            ..Default::default()
        });
        let start = Instant::now();

        let result = wait.wait_for_true_default(|| std::future::ready(Ok(false))).await;

        assert!(!result.unwrap());
        assert_eq!(start.elapsed(), ms(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_reports_timeout_as_error() {
        let wait = wait_with_interval(100);

        let err = wait
            .wait_for(|| std::future::ready(Ok(false)), ms(300), "page title to change")
            .await
            .unwrap_err();

        match err {
            BrowserError::Timeout(message) => {
                assert!(message.starts_with("page title to change"));
                assert!(message.contains("300 ms"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_does_not_overflow() {
        let wait = wait_with_interval(100);

        let result = wait
            .wait_for_true(|| std::future::ready(Ok(true)), Duration::MAX)
            .await;

        assert!(result.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_keeps_polling() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        let result = wait
            .wait_for_true(true_on_poll(6, polls.clone()), Duration::MAX)
            .await;

        assert!(result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 6);
        assert_eq!(start.elapsed(), ms(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_ends_after_first_poll() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));

        let result = wait
            .wait_for_true_with(true_on_poll(2, polls.clone()), Duration::ZERO, Duration::MAX)
            .await;

        assert!(!result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_interval_with_unbounded_timeout_stops() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));

        let result = wait
            .wait_for_true_with(true_on_poll(2, polls.clone()), Duration::MAX, Duration::MAX)
            .await;

        assert!(!result.unwrap());
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_value_returns_probe_value() {
        let wait = wait_with_interval(100);
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let value = wait
            .wait_for_value(
                move || {
                    let index = counter.fetch_add(1, Ordering::SeqCst);
                    std::future::ready(Ok((index == 3).then_some(index * 10)))
                },
                ms(1000),
                ms(100),
            )
            .await
            .unwrap();

        assert_eq!(value, Some(30));
    }
}
