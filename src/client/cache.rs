//! Request cache with in-flight deduplication.
//!
//! Keys are plain strings such as `metadata:iceberg:anon:s3://bucket/table/`.
//! A key is either ready (a value and when it was fetched) or in flight (a
//! shared future every caller for that key awaits). Failures are not kept.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use super::error::ClientResult;

type SharedFetch<V> = Shared<BoxFuture<'static, ClientResult<V>>>;

enum Slot<V> {
    Ready { value: V, fetched_at: Instant },
    InFlight { id: u64, fetch: SharedFetch<V> },
}

/// Keyed cache of successful responses.
pub struct QueryCache<V> {
    slots: Mutex<HashMap<String, Slot<V>>>,
    stale_time: Duration,
    next_id: AtomicU64,
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Values younger than `stale_time` are served without refetching.
    pub fn new(stale_time: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            stale_time,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Return the fresh cached value for `key`, join the in-flight request,
    /// or start `fetch`.
    ///
    /// Dropping the returned future does not cancel a request other callers
    /// are still waiting on.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> ClientResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<V>> + Send + 'static,
    {
        let (id, shared) = {
            let mut slots = self.slots.lock().await;
            let joined = match slots.get(key) {
                Some(Slot::Ready { value, fetched_at })
                    if fetched_at.elapsed() < self.stale_time =>
                {
                    return Ok(value.clone());
                }
                Some(Slot::InFlight { id, fetch }) => Some((*id, fetch.clone())),
                _ => None,
            };

            match joined {
                Some(in_flight) => in_flight,
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let shared = fetch().boxed().shared();
                    slots.insert(
                        key.to_string(),
                        Slot::InFlight {
                            id,
                            fetch: shared.clone(),
                        },
                    );
                    (id, shared)
                }
            }
        };

        let result = shared.await;

        // The first waiter to finish settles the slot, unless it was
        // invalidated or replaced meanwhile.
        let mut slots = self.slots.lock().await;
        if matches!(slots.get(key), Some(Slot::InFlight { id: current, .. }) if *current == id) {
            match &result {
                Ok(value) => {
                    slots.insert(
                        key.to_string(),
                        Slot::Ready {
                            value: value.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(_) => {
                    slots.remove(key);
                }
            }
        }

        result
    }

    /// Store a value as freshly fetched.
    pub async fn insert(&self, key: &str, value: V) {
        self.slots.lock().await.insert(
            key.to_string(),
            Slot::Ready {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// The cached value for `key`, fresh or stale.
    pub async fn peek(&self, key: &str) -> Option<V> {
        match self.slots.lock().await.get(key) {
            Some(Slot::Ready { value, .. }) => Some(value.clone()),
            _ => None,
        }
    }

    pub async fn invalidate(&self, key: &str) {
        self.slots.lock().await.remove(key);
    }

    /// Drop every key starting with `prefix`. Returns how many were dropped.
    pub async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|key, _| !key.starts_with(prefix));
        before - slots.len()
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
