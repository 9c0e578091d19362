//! Background content refresh.
//!
//! Network-backed providers never fetch on the tick thread. Each one owns a
//! [`ContentFeed`]: a background tokio task runs the provider's
//! [`ContentFetcher`] when asked and publishes results into a single-slot
//! [`ContentSlot`]. The tick thread only ever does a lock-free snapshot read.

use crate::errors::ProviderRefreshError;
use arc_swap::ArcSwapOption;
use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Produces fresh content for one provider. Implementations may do slow I/O.
pub trait ContentFetcher: Send + Sync + 'static {
    type Output: Send + Sync + 'static;

    fn fetch(&self) -> impl Future<Output = Result<Self::Output, ProviderRefreshError>> + Send;
}

/// One published value
#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: T,
    /// Strictly increasing per slot, starting at 1
    pub generation: u64,
    pub fetched_at: Instant,
}

struct SlotInner<T> {
    current: ArcSwapOption<Snapshot<T>>,
    generation: AtomicU64,
}

/// Single-slot cache holding the latest good content
pub struct ContentSlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T> Clone for ContentSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ContentSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ContentSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SlotInner {
                current: ArcSwapOption::empty(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the cached value
    pub fn publish(&self, value: T) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.current.store(Some(Arc::new(Snapshot {
            value,
            generation,
            fetched_at: Instant::now(),
        })));
        generation
    }

    /// Latest snapshot, never blocks
    pub fn load(&self) -> Option<Arc<Snapshot<T>>> {
        self.inner.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }
}

/// Provider-side handle on a content slot and the task that fills it
pub struct ContentFeed<T> {
    slot: ContentSlot<T>,
    notify: Arc<Notify>,
    seen: u64,
    task: Option<JoinHandle<()>>,
}

impl<T: Send + Sync + 'static> ContentFeed<T> {
    /// Start a background task that runs `fetcher` on every refresh request,
    /// bounded by `budget`
    pub fn spawn<F>(name: &str, fetcher: F, budget: Duration, runtime: &Handle) -> Self
    where
        F: ContentFetcher<Output = T>,
    {
        let slot = ContentSlot::new();
        let notify = Arc::new(Notify::new());
        let task = runtime.spawn(refresh_loop(
            name.to_string(),
            fetcher,
            budget,
            slot.clone(),
            Arc::clone(&notify),
        ));
        Self {
            slot,
            notify,
            seen: 0,
            task: Some(task),
        }
    }

    /// A feed over a slot some other component publishes into
    pub fn from_slot(slot: ContentSlot<T>) -> Self {
        Self {
            slot,
            notify: Arc::new(Notify::new()),
            seen: 0,
            task: None,
        }
    }

    /// A feed that already holds `value` and never refreshes
    pub fn preloaded(value: T) -> Self {
        let slot = ContentSlot::new();
        slot.publish(value);
        Self::from_slot(slot)
    }

    /// Ask the background task for fresh content. Returns immediately; a
    /// request made while a fetch is running is served right after it.
    pub fn request_refresh(&self) {
        self.notify.notify_one();
    }

    /// Snapshot published since the last call, if any
    pub fn take_new(&mut self) -> Option<Arc<Snapshot<T>>> {
        let snapshot = self.slot.load()?;
        if snapshot.generation > self.seen {
            self.seen = snapshot.generation;
            Some(snapshot)
        } else {
            None
        }
    }

    pub fn slot(&self) -> &ContentSlot<T> {
        &self.slot
    }
}

impl<T> Drop for ContentFeed<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn refresh_loop<F: ContentFetcher>(
    name: String,
    fetcher: F,
    budget: Duration,
    slot: ContentSlot<F::Output>,
    notify: Arc<Notify>,
) {
    loop {
        notify.notified().await;
        match tokio::time::timeout(budget, fetcher.fetch()).await {
            Ok(Ok(value)) => {
                let generation = slot.publish(value);
                debug!("{}: published content generation {}", name, generation);
            }
            Ok(Err(e)) => warn!("{}: refresh failed, keeping last content: {}", name, e),
            Err(_) => warn!(
                "{}: {}, keeping last content",
                name,
                ProviderRefreshError::Timeout(budget)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingFetcher {
        calls: Arc<AtomicUsize>,
        delay: Duration,
        fail_after: usize,
    }

    impl ContentFetcher for CountingFetcher {
        type Output = usize;

        async fn fetch(&self) -> Result<usize, ProviderRefreshError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if n > self.fail_after {
                return Err(ProviderRefreshError::Unavailable("offline".into()));
            }
            Ok(n)
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_slot_generations_increase() {
        let slot = ContentSlot::new();
        assert!(slot.load().is_none());
        assert_eq!(slot.publish("a"), 1);
        assert_eq!(slot.publish("b"), 2);
        let snapshot = slot.load().unwrap();
        assert_eq!(snapshot.value, "b");
        assert_eq!(snapshot.generation, 2);
    }

    #[test]
    fn test_take_new_only_once() {
        let mut feed = ContentFeed::preloaded(7u32);
        assert_eq!(feed.take_new().map(|s| s.value), Some(7));
        assert!(feed.take_new().is_none());
        feed.slot().publish(8);
        assert_eq!(feed.take_new().map(|s| s.value), Some(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_publishes_and_keeps_last_good() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: Arc::clone(&calls),
            delay: Duration::from_millis(10),
            fail_after: 1,
        };
        let mut feed =
            ContentFeed::spawn("counter", fetcher, Duration::from_secs(1), &Handle::current());
        assert!(feed.take_new().is_none());

        feed.request_refresh();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(feed.take_new().map(|s| s.value), Some(1));

        // Second fetch fails: slot untouched
        feed.request_refresh();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(feed.take_new().is_none());
        assert_eq!(feed.slot().load().map(|s| s.value), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_over_budget_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: Arc::clone(&calls),
            delay: Duration::from_secs(30),
            fail_after: usize::MAX,
        };
        let mut feed =
            ContentFeed::spawn("slow", fetcher, Duration::from_secs(1), &Handle::current());
        feed.request_refresh();
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(feed.take_new().is_none());
        assert_eq!(feed.slot().generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_feed_stops_task() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = CountingFetcher {
            calls: Arc::clone(&calls),
            delay: Duration::ZERO,
            fail_after: usize::MAX,
        };
        let feed =
            ContentFeed::spawn("dropped", fetcher, Duration::from_secs(1), &Handle::current());
        let notify = Arc::clone(&feed.notify);
        drop(feed);
        settle().await;
        notify.notify_one();
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
