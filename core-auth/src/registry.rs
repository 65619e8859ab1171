//! # Callback Registry
//!
//! Thread-safe multimap from [`RequesterKey`] to the continuations that
//! requester is waiting on.
//!
//! ## Overview
//!
//! Each registration stores a success continuation, a failure continuation and
//! the [`CallbackQueue`] the requester wants to be resumed on. The registry never
//! invokes anything itself: draining hands the continuations back, paired with
//! their queues, and the caller dispatches them after the lock is released.
//!
//! Drained continuations come back in global registration order. Within one
//! key this is the order the requester registered in; across keys it is the
//! interleaving the registry observed, which callers should not rely on.
//!
//! ## Requester lifetime
//!
//! Keys are plain identifiers. A requester that goes away without its entries
//! being drained still gets them delivered; continuations that need to reach
//! back into their owner should hold a `Weak` handle and do nothing when it no
//! longer upgrades.

use crate::types::RequesterKey;
use bridge_traits::CallbackQueue;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A continuation paired with the queue it must run on.
pub type Scheduled<T> = (T, Arc<dyn CallbackQueue>);

struct Callback<S, F> {
    seq: u64,
    queue: Arc<dyn CallbackQueue>,
    success: S,
    failure: F,
}

struct Entries<S, F> {
    next_seq: u64,
    by_key: HashMap<RequesterKey, Vec<Callback<S, F>>>,
}

impl<S, F> Entries<S, F> {
    fn count(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }
}

/// Pending success/failure continuations keyed by requester.
///
/// `S` and `F` are the continuation types, typically boxed `FnOnce` closures.
pub struct CallbackRegistry<S, F> {
    entries: Mutex<Entries<S, F>>,
}

impl<S, F> CallbackRegistry<S, F> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Entries {
                next_seq: 0,
                by_key: HashMap::new(),
            }),
        }
    }

    /// Append a pending request under `key`.
    ///
    /// Returns the total number of pending requests across all keys after the
    /// insert; `1` means this registration is the first one since the last
    /// drain.
    pub fn register(
        &self,
        key: RequesterKey,
        queue: Arc<dyn CallbackQueue>,
        success: S,
        failure: F,
    ) -> usize {
        let mut entries = self.entries.lock();
        let seq = entries.next_seq;
        entries.next_seq += 1;
        entries.by_key.entry(key).or_default().push(Callback {
            seq,
            queue,
            success,
            failure,
        });
        entries.count()
    }

    /// Remove every pending request and return the success continuations.
    ///
    /// The matching failure continuations are dropped.
    pub fn drain_successes(&self) -> Vec<Scheduled<S>> {
        self.take_all()
            .into_iter()
            .map(|callback| (callback.success, callback.queue))
            .collect()
    }

    /// Remove every pending request and return the failure continuations.
    ///
    /// The matching success continuations are dropped.
    pub fn drain_failures(&self) -> Vec<Scheduled<F>> {
        self.take_all()
            .into_iter()
            .map(|callback| (callback.failure, callback.queue))
            .collect()
    }

    /// Total pending requests across all keys.
    pub fn count(&self) -> usize {
        self.entries.lock().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Pending requests registered under `key`.
    pub fn pending_for(&self, key: &RequesterKey) -> usize {
        self.entries.lock().by_key.get(key).map_or(0, Vec::len)
    }

    /// Number of distinct requesters with at least one pending request.
    pub fn requester_count(&self) -> usize {
        self.entries.lock().by_key.len()
    }

    fn take_all(&self) -> Vec<Callback<S, F>> {
        let by_key = std::mem::take(&mut self.entries.lock().by_key);
        let mut callbacks: Vec<_> = by_key.into_values().flatten().collect();
        callbacks.sort_by_key(|callback| callback.seq);
        callbacks
    }

    fn snapshot<T: Clone>(&self, pick: impl Fn(&Callback<S, F>) -> &T) -> Vec<Scheduled<T>> {
        let entries = self.entries.lock();
        let mut callbacks: Vec<_> = entries.by_key.values().flatten().collect();
        callbacks.sort_by_key(|callback| callback.seq);
        callbacks
            .into_iter()
            .map(|callback| (pick(callback).clone(), Arc::clone(&callback.queue)))
            .collect()
    }
}

impl<S: Clone, F> CallbackRegistry<S, F> {
    /// Copy out the success continuations without removing anything.
    pub fn peek_successes(&self) -> Vec<Scheduled<S>> {
        self.snapshot(|callback| &callback.success)
    }
}

impl<S, F: Clone> CallbackRegistry<S, F> {
    /// Copy out the failure continuations without removing anything.
    pub fn peek_failures(&self) -> Vec<Scheduled<F>> {
        self.snapshot(|callback| &callback.failure)
    }
}

impl<S, F> Default for CallbackRegistry<S, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, F> fmt::Debug for CallbackRegistry<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("CallbackRegistry")
            .field("requesters", &entries.by_key.len())
            .field("pending", &entries.count())
            .finish()
    }
}
