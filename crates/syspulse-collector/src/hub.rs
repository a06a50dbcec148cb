//! Fan-out hub: broadcasts tick batches to speed-mismatched subscribers.
//!
//! Each subscription owns a bounded delivery queue so a slow or stalled
//! consumer can never delay the sampler or its siblings. Overflow policy is
//! drop-oldest: dashboards care about current state, not historical
//! completeness, so the newest batch always wins. Drops are counted per
//! subscription and exposed as a metric, never escalated to an error.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use syspulse_core::{MetricFilter, TickBatch};

use crate::config::HubSection;

/// State shared between the hub's publisher side and one receiver.
struct SubscriptionShared {
    filter: MetricFilter,
    queue: Mutex<VecDeque<TickBatch>>,
    notify: Notify,
    /// Receiver endpoint dropped; deliveries to it fail.
    receiver_gone: AtomicBool,
    /// Publisher side finished (unsubscribed or hub closed); recv drains then
    /// returns `None`.
    publisher_done: AtomicBool,
    dropped: AtomicU64,
    consecutive_failures: AtomicU32,
}

/// Opaque handle returned by [`Hub::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Consumer end of a subscription.
///
/// Dropping the receiver marks the endpoint closed; the hub tears the
/// subscription down after a few failed deliveries.
pub struct BatchReceiver {
    shared: Arc<SubscriptionShared>,
}

impl BatchReceiver {
    /// Await the next batch. Returns `None` once the subscription is torn
    /// down (unsubscribed or hub closed) and the queue is drained.
    pub async fn recv(&mut self) -> Option<TickBatch> {
        loop {
            let notified = self.shared.notify.notified();
            if let Some(batch) = self.shared.queue.lock().pop_front() {
                return Some(batch);
            }
            if self.shared.publisher_done.load(Ordering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    /// Non-blocking variant for polling consumers.
    pub fn try_recv(&mut self) -> Option<TickBatch> {
        self.shared.queue.lock().pop_front()
    }

    /// Batches dropped from this subscription's queue since subscribing.
    pub fn dropped_batches(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for BatchReceiver {
    fn drop(&mut self) {
        self.shared.receiver_gone.store(true, Ordering::Release);
    }
}

/// Delivers each tick batch to every current subscription.
pub struct Hub {
    subs: DashMap<u64, Arc<SubscriptionShared>>,
    next_id: AtomicU64,
    queue_depth: usize,
    max_delivery_failures: u32,
}

impl Hub {
    pub fn new(cfg: &HubSection) -> Self {
        Self {
            subs: DashMap::new(),
            next_id: AtomicU64::new(1),
            queue_depth: cfg.queue_depth,
            max_delivery_failures: cfg.max_delivery_failures,
        }
    }

    /// Register a consumer interested in the metrics matched by `filter`.
    pub fn subscribe(&self, filter: MetricFilter) -> (SubscriptionHandle, BatchReceiver) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(SubscriptionShared {
            filter,
            queue: Mutex::new(VecDeque::with_capacity(self.queue_depth)),
            notify: Notify::new(),
            receiver_gone: AtomicBool::new(false),
            publisher_done: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            consecutive_failures: AtomicU32::new(0),
        });
        self.subs.insert(id, Arc::clone(&shared));
        tracing::debug!(subscription = id, "subscriber registered");
        (SubscriptionHandle(id), BatchReceiver { shared })
    }

    /// Idempotent: a stale or already-removed handle is a no-op.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Some((id, shared)) = self.subs.remove(&handle.0) {
            finish(&shared);
            tracing::debug!(subscription = id, "subscriber removed");
        }
    }

    /// Broadcast one tick batch; called once per tick by the sampler loop.
    ///
    /// Delivery is non-blocking per subscription: a full queue drops its
    /// oldest batch in favour of the new one, and a subscription whose
    /// receiver is gone is torn down after `max_delivery_failures`
    /// consecutive misses.
    pub fn publish(&self, batch: &TickBatch) {
        let mut unreachable: Vec<u64> = Vec::new();

        for entry in self.subs.iter() {
            let sub = entry.value();

            if sub.receiver_gone.load(Ordering::Acquire) {
                let misses = sub.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if misses >= self.max_delivery_failures {
                    unreachable.push(*entry.key());
                }
                continue;
            }
            sub.consecutive_failures.store(0, Ordering::Relaxed);

            let delivery = batch.filtered(&sub.filter);
            {
                let mut queue = sub.queue.lock();
                if queue.len() == self.queue_depth {
                    queue.pop_front();
                    sub.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        subscription = *entry.key(),
                        seq = batch.seq,
                        "subscriber queue full, dropped oldest batch"
                    );
                }
                queue.push_back(delivery);
            }
            sub.notify.notify_one();
        }

        for id in unreachable {
            if let Some((_, shared)) = self.subs.remove(&id) {
                finish(&shared);
                tracing::warn!(subscription = id, "unreachable subscriber auto-unsubscribed");
            }
        }
    }

    /// Per-subscription drop counter, `None` for unknown handles.
    pub fn dropped_batches(&self, handle: SubscriptionHandle) -> Option<u64> {
        self.subs
            .get(&handle.0)
            .map(|s| s.dropped.load(Ordering::Relaxed))
    }

    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Tear down all subscriptions; receivers drain their queues and then
    /// observe end-of-stream.
    pub fn close(&self) {
        let ids: Vec<u64> = self.subs.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some((_, shared)) = self.subs.remove(&id) {
                finish(&shared);
            }
        }
    }
}

/// Mark a subscription finished and wake its receiver so `recv` can observe
/// end-of-stream. `notify_one` stores a permit, so a receiver that has not
/// parked yet still wakes.
fn finish(shared: &SubscriptionShared) {
    shared.publisher_done.store(true, Ordering::Release);
    shared.notify.notify_one();
}
