use std::future::Future;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

/// Run `executor_fn` over every item with at most `max_concurrency` in flight.
///
/// Every item is attempted regardless of how its siblings fare. Results come
/// back in input order. With a concurrency of 1 items run strictly one after
/// another, in order.
pub async fn run_bounded<I, T, F, Fut>(
    items: Vec<I>,
    max_concurrency: usize,
    executor_fn: F,
) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    if max_concurrency <= 1 {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(executor_fn(item).await);
        }
        return results;
    }

    let sem = Arc::new(Semaphore::new(max_concurrency));
    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

    for (idx, item) in items.into_iter().enumerate() {
        let sem = sem.clone();
        let fut = executor_fn(item);

        futs.push(async move {
            // The semaphore is never closed, so a permit always arrives.
            let _permit = sem.acquire_owned().await.ok();
            (idx, fut.await)
        });
    }

    let mut results: Vec<(usize, T)> = Vec::new();
    while let Some(res) = futs.next().await {
        results.push(res);
    }

    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn sequential_mode_preserves_order() {
        let seen = std::sync::Mutex::new(Vec::new());
        let out = run_bounded(vec![3, 1, 2], 1, |n| {
            seen.lock().unwrap().push(n);
            async move { n * 10 }
        })
        .await;
        assert_eq!(out, vec![30, 10, 20]);
        assert_eq!(*seen.lock().unwrap(), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn parallel_mode_respects_the_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let out = run_bounded((0..8).collect(), 3, |n: u64| {
            let active = active.clone();
            let peak = peak.clone();
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5 * (8 - n))).await;
                active.fetch_sub(1, Ordering::SeqCst);
                n
            }
        })
        .await;

        assert_eq!(out, (0..8).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }
}
