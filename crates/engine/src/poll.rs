//! The one piece of waiting logic in the engine.
//!
//! Everything that polls the upstream backend goes through [`poll_until`],
//! so the interval/deadline behavior can be tested in isolation under a
//! paused tokio clock.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use gl_domain::error::{Error, Result};

/// Repeatedly run `action` until `is_terminal` accepts its output or the
/// wall-clock `budget` is exhausted.
///
/// The first observation happens immediately; subsequent observations are
/// spaced `interval` apart. The budget is checked after each non-terminal
/// observation, so a caller sees at most `⌈budget/interval⌉ + 1` calls.
/// Action errors propagate immediately — there are no retries here.
///
/// Budget exhaustion yields [`Error::RunTimeout`]. It is enforced locally
/// only; whatever `action` was watching may keep running upstream.
pub async fn poll_until<T, F, Fut, P>(
    mut action: F,
    is_terminal: P,
    interval: Duration,
    budget: Duration,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let deadline = Instant::now() + budget;

    loop {
        let observed = action().await?;
        if is_terminal(&observed) {
            return Ok(observed);
        }
        if Instant::now() >= deadline {
            return Err(Error::RunTimeout);
        }
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn terminal_on_nth_observation_polls_n_plus_one_times() {
        let calls = AtomicU32::new(0);
        let result = poll_until(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(if n > 3 { "completed" } else { "in_progress" }) }
            },
            |s| *s == "completed",
            Duration::from_millis(800),
            Duration::from_millis(60_000),
        )
        .await
        .unwrap();

        assert_eq!(result, "completed");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_terminal_needs_one_call() {
        let calls = AtomicU32::new(0);
        poll_until(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(true) }
            },
            |done| *done,
            Duration::from_millis(800),
            Duration::from_millis(60_000),
        )
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn never_terminal_times_out_within_bound() {
        let calls = AtomicU32::new(0);
        let err = poll_until(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("in_progress") }
            },
            |s| *s == "completed",
            Duration::from_millis(800),
            Duration::from_millis(60_000),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::RunTimeout));
        // ⌈60000/800⌉ + 1 observations at most.
        assert!(calls.load(Ordering::SeqCst) <= 76);
        assert!(calls.load(Ordering::SeqCst) >= 75);
    }

    #[tokio::test(start_paused = true)]
    async fn action_error_propagates_without_retry() {
        let calls = AtomicU32::new(0);
        let err = poll_until(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(Error::Http("connection reset".into())) }
            },
            |_| true,
            Duration::from_millis(800),
            Duration::from_millis(60_000),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
