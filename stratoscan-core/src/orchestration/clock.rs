//! Monotonic clock seam.
//!
//! Every timeout and polling cadence in the engine routes through a
//! [`Clock`] so time-driven behaviour is deterministic under tokio's paused
//! test clock and swappable in custom harnesses.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::Instant;

use crate::error::{Result, ScanError};

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// The production clock: plain `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Drive `operation` to completion within `limit`, failing with
/// [`ScanError::Timeout`] otherwise. The in-flight operation is dropped on
/// timeout, which is the cooperative cancel.
pub async fn run_with_timeout<T, F>(
    clock: &dyn Clock,
    limit: Duration,
    what: &str,
    operation: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        result = operation => result,
        _ = clock.sleep(limit) => Err(ScanError::Timeout(what.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn completes_within_limit() {
        let clock = TokioClock;
        let result = run_with_timeout(&clock, Duration::from_secs(5), "noop", async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_and_names_the_step() {
        let clock = TokioClock;
        let result: Result<()> =
            run_with_timeout(&clock, Duration::from_secs(5), "snapshot creation", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;

        match result {
            Err(ScanError::Timeout(step)) => assert_eq!(step, "snapshot creation"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
