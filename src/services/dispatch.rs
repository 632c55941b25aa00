use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::AppConfig;
use crate::errors::InventoryError;

/// Result of one remote call, tagged with the segment it was made for.
#[derive(Debug)]
pub struct SegmentOutcome<T> {
    pub segment_id: String,
    pub result: Result<T, InventoryError>,
}

/// Bounded pool for remote inventory calls.
///
/// Every call runs on its own task, holds one permit while in flight and is
/// cut off after `timeout`. A timeout or a panicking task is reported as an
/// error for that segment only.
#[derive(Clone)]
pub struct RemoteCallPool {
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl RemoteCallPool {
    pub fn new(max_concurrency: usize, timeout: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.inventory_max_concurrency, config.inventory_timeout)
    }

    pub fn spawn<T, Fut>(&self, call: Fut) -> JoinHandle<Result<T, InventoryError>>
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, InventoryError>> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| InventoryError::Unavailable("remote call pool closed".to_string()))?;

            tokio::time::timeout(timeout, call)
                .await
                .unwrap_or(Err(InventoryError::Timeout(timeout)))
        })
    }

    /// Issues one call per segment and waits until every call has settled.
    /// Outcomes come back in the order of `segment_ids`.
    pub async fn join_all<T, F, Fut>(&self, segment_ids: &[String], call: F) -> Vec<SegmentOutcome<T>>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, InventoryError>> + Send + 'static,
    {
        let handles: Vec<_> = segment_ids
            .iter()
            .map(|id| self.spawn(call(id.clone())))
            .collect();

        let settled = futures::future::join_all(handles).await;

        segment_ids
            .iter()
            .cloned()
            .zip(settled)
            .map(|(segment_id, joined)| SegmentOutcome {
                segment_id,
                result: joined.unwrap_or_else(|e| Err(task_failure(e))),
            })
            .collect()
    }

    /// Like `join_all`, but the first failure to complete wins. Calls still in
    /// flight are detached, not cancelled, and their results are dropped.
    pub async fn try_join_all<T, F, Fut>(
        &self,
        segment_ids: &[String],
        call: F,
    ) -> Result<Vec<T>, (String, InventoryError)>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, InventoryError>> + Send + 'static,
    {
        let pending = segment_ids.iter().map(|id| {
            let segment_id = id.clone();
            let handle = self.spawn(call(id.clone()));
            async move {
                match handle.await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err((segment_id, err)),
                    Err(e) => Err((segment_id, task_failure(e))),
                }
            }
        });

        futures::future::try_join_all(pending).await
    }
}

fn task_failure(err: tokio::task::JoinError) -> InventoryError {
    InventoryError::Unavailable(format!("remote call task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_join_all_preserves_input_order() {
        let pool = RemoteCallPool::new(8, Duration::from_secs(5));
        let segment_ids = ids(&["slow", "fast", "medium"]);

        let outcomes = pool
            .join_all(&segment_ids, |id| async move {
                let delay = match id.as_str() {
                    "slow" => 60,
                    "medium" => 30,
                    _ => 0,
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                Ok(id.to_uppercase())
            })
            .await;

        let order: Vec<_> = outcomes.iter().map(|o| o.segment_id.as_str()).collect();
        assert_eq!(order, vec!["slow", "fast", "medium"]);
        assert_eq!(outcomes[0].result.as_deref(), Ok("SLOW"));
    }

    #[tokio::test]
    async fn test_join_all_waits_for_every_call() {
        let pool = RemoteCallPool::new(8, Duration::from_secs(5));
        let finished = Arc::new(AtomicUsize::new(0));
        let segment_ids = ids(&["a", "b", "c"]);

        let outcomes = pool
            .join_all(&segment_ids, |id| {
                let finished = Arc::clone(&finished);
                async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    if id == "a" {
                        Err(InventoryError::Unavailable("boom".to_string()))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
        assert!(outcomes[2].result.is_ok());
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let pool = RemoteCallPool::new(2, Duration::from_millis(50));
        let outcomes = pool
            .join_all(&ids(&["stuck"]), |_| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        assert_eq!(
            outcomes[0].result,
            Err(InventoryError::Timeout(Duration::from_millis(50)))
        );
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = RemoteCallPool::new(2, Duration::from_secs(5));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let segment_ids = ids(&["a", "b", "c", "d", "e", "f"]);

        pool.join_all(&segment_ids, |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_try_join_all_returns_first_failure_without_waiting() {
        let pool = RemoteCallPool::new(8, Duration::from_secs(5));
        let started = Instant::now();

        let result = pool
            .try_join_all(&ids(&["slow", "missing"]), |id| async move {
                if id == "missing" {
                    return Err(InventoryError::NotFound);
                }
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(id)
            })
            .await;

        assert_eq!(result, Err(("missing".to_string(), InventoryError::NotFound)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_try_join_all_success_keeps_order() {
        let pool = RemoteCallPool::new(8, Duration::from_secs(5));
        let result = pool
            .try_join_all(&ids(&["x", "y", "z"]), |id| async move {
                if id == "x" {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                }
                Ok(id)
            })
            .await;

        assert_eq!(result, Ok(ids(&["x", "y", "z"])));
    }
}
