use std::fmt;
use std::future::Future;
use std::time::Duration;
use tryhard::RetryPolicy;

/// How many times an operation is attempted and how long to wait in between.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after every retry.
    pub factor: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            factor: 1.0,
        }
    }
}

impl Backoff {
    /// Delay before the `retry`-th retry (1-based), saturating at `Duration::MAX`.
    pub fn delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Runs `operation` until it succeeds, returns an error `should_retry` rejects, or
/// `backoff.max_attempts` attempts have been made.
pub async fn retry<T, E, F, Fut, P>(backoff: &Backoff, should_retry: P, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display + 'static,
{
    let backoff = backoff.clone();
    let max_attempts = backoff.max_attempts.max(1);
    let mut failures = 0u32;

    tryhard::retry_fn(operation)
        .retries(max_attempts)
        .custom_backoff(move |_attempt, err: &E| {
            failures += 1;
            if !should_retry(err) {
                tracing::debug!("Not retrying: {}", err);
                return RetryPolicy::Break;
            }
            if failures >= max_attempts {
                tracing::debug!("Giving up after {} attempts: {}", failures, err);
                return RetryPolicy::Break;
            }
            let delay = backoff.delay(failures);
            tracing::debug!(attempt = failures, ?delay, "Retrying after: {}", err);
            RetryPolicy::Delay(delay)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Transient,
        Permanent,
    }

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    fn no_delay(max_attempts: u32) -> Backoff {
        Backoff {
            max_attempts,
            initial_delay: Duration::ZERO,
            factor: 1.0,
        }
    }

    fn transient(err: &FakeError) -> bool {
        *err == FakeError::Transient
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = retry(&no_delay(5), transient, move || async move {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(FakeError::Transient),
                n => Ok(n),
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_at_max_attempts() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = retry(&no_delay(4), transient, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Transient)
        })
        .await;

        assert_eq!(result, Err(FakeError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn single_attempt_budget() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = retry(&no_delay(1), transient, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Transient)
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = retry(&no_delay(5), transient, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError::Permanent)
        })
        .await;

        assert_eq!(result, Err(FakeError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fixed_delay() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_millis(10));
        assert_eq!(backoff.delay(4), Duration::from_millis(10));
    }

    #[test]
    fn growing_delay() {
        let backoff = Backoff {
            max_attempts: 5,
            initial_delay: Duration::from_millis(100),
            factor: 2.0,
        };
        assert_eq!(backoff.delay(1), Duration::from_millis(100));
        assert_eq!(backoff.delay(2), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(400));
    }

    #[test]
    fn huge_delay_saturates() {
        let backoff = Backoff {
            max_attempts: 5,
            initial_delay: "18446744073709551615s"
                .parse::<humantime::Duration>()
                .unwrap()
                .into(),
            factor: 1.0,
        };
        assert_eq!(backoff.delay(1), Duration::MAX);

        let backoff = Backoff {
            max_attempts: 100,
            initial_delay: Duration::from_secs(1),
            factor: 10.0,
        };
        assert_eq!(backoff.delay(60), Duration::MAX);
    }
}
