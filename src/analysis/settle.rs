//! Join-all-settled helpers.
//!
//! Every operation runs to completion; a failure is logged and replaced by
//! that operation's fallback value instead of aborting the others.

use futures::future::join_all;
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Outcome of one settled operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled<T> {
    pub value: T,
    pub succeeded: bool,
}

impl<T> Settled<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Await one fallible operation, degrading an error to `fallback`.
pub async fn settle<T, E, F>(label: impl Display, operation: F, fallback: T) -> Settled<T>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match operation.await {
        Ok(value) => Settled {
            value,
            succeeded: true,
        },
        Err(e) => {
            warn!("{} failed, using fallback: {}", label, e);
            Settled {
                value: fallback,
                succeeded: false,
            }
        }
    }
}

/// Run all operations concurrently and settle each one.
///
/// Results come back in input order.
pub async fn settle_all<T, E, F, L>(operations: Vec<(L, F, T)>) -> Vec<Settled<T>>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
    L: Display,
{
    join_all(
        operations
            .into_iter()
            .map(|(label, operation, fallback)| settle(label, operation, fallback)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_settle_success_and_failure() {
        let ok = settle("ok", async { Ok::<_, String>(5) }, 0).await;
        assert_eq!(ok, Settled { value: 5, succeeded: true });

        let failed = settle("failed", async { Err::<i32, _>("boom") }, -1).await;
        assert_eq!(failed, Settled { value: -1, succeeded: false });
    }

    #[tokio::test]
    async fn test_settle_all_preserves_order() {
        let operations: Vec<(&str, BoxFuture<'static, Result<&str, String>>, &str)> = vec![
            (
                "slow",
                async {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok("slow")
                }
                .boxed(),
                "-",
            ),
            ("broken", async { Err("nope".to_string()) }.boxed(), "fallback"),
            ("fast", async { Ok("fast") }.boxed(), "-"),
        ];

        let results = settle_all(operations).await;
        let values: Vec<_> = results.iter().map(|r| r.value).collect();
        let flags: Vec<_> = results.iter().map(|r| r.succeeded).collect();
        assert_eq!(values, vec!["slow", "fallback", "fast"]);
        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_others() {
        let finished = Arc::new(AtomicUsize::new(0));
        let operations: Vec<_> = (0..4)
            .map(|i| {
                let finished = finished.clone();
                let op = async move {
                    if i == 0 {
                        return Err(format!("op {i} failed"));
                    }
                    tokio::time::sleep(Duration::from_millis(10 * i as u64)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    Ok(i)
                };
                (format!("op {i}"), op, 99)
            })
            .collect();

        let results = settle_all(operations).await;
        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert_eq!(results[0].value, 99);
        assert!(results[1..].iter().all(|r| r.succeeded));
    }

    #[tokio::test]
    async fn test_operations_run_concurrently() {
        let operations: Vec<_> = (0..5)
            .map(|i| {
                let op = async move {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok::<_, String>(i)
                };
                ("sleep", op, 0)
            })
            .collect();

        let started = std::time::Instant::now();
        let results = settle_all(operations).await;
        assert_eq!(results.len(), 5);
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
