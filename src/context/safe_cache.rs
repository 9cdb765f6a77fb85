use crate::error::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::watch;

type Outcome<V> = Option<Result<V>>;

enum Slot<V> {
    Ready(V),
    /// A construction is running; its outcome is published here
    Pending(watch::Receiver<Outcome<V>>),
}

/// Keyed get-or-compute map with an exactly-once construction guarantee.
///
/// One construction runs per key at a time. Callers arriving while it runs
/// await it and receive its outcome, error included. A construction that
/// fails or is cancelled leaves the entry empty, so the next caller runs it
/// again. Shard locks are released before awaiting.
pub struct SafeCache<K, V> {
    entries: DashMap<K, Slot<V>>,
}

impl<K, V> SafeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let sender = loop {
            let receiver = match self.entries.entry(key.clone()) {
                Entry::Occupied(entry) => match entry.get() {
                    Slot::Ready(value) => return Ok(value.clone()),
                    Slot::Pending(receiver) => receiver.clone(),
                },
                Entry::Vacant(entry) => {
                    let (sender, receiver) = watch::channel(None);
                    entry.insert(Slot::Pending(receiver));
                    break sender;
                }
            };
            if let Some(outcome) = outcome_of(receiver).await {
                return outcome;
            }
            // The running construction was cancelled, take it over
        };

        let mut construction = Construction {
            cache: self,
            key,
            sender,
            finished: false,
        };
        let outcome = init().await;
        construction.finish(outcome.clone());
        outcome
    }

    /// Store a value without running a construction
    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, Slot::Ready(value));
    }

    /// Completed value for `key`, without waiting on or starting a construction
    pub fn get_if_present(&self, key: &K) -> Option<V> {
        match self.entries.get(key)?.value() {
            Slot::Ready(value) => Some(value.clone()),
            Slot::Pending(_) => None,
        }
    }

    /// Number of completed entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.value(), Slot::Ready(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for SafeCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the running construction. `None` when it was dropped before
/// publishing an outcome.
async fn outcome_of<V: Clone>(mut receiver: watch::Receiver<Outcome<V>>) -> Outcome<V> {
    loop {
        let current = receiver.borrow_and_update().clone();
        if current.is_some() {
            return current;
        }
        if receiver.changed().await.is_err() {
            return receiver.borrow().clone();
        }
    }
}

/// The caller running a construction. Dropping it unfinished clears the
/// pending entry before waiters are woken.
struct Construction<'a, K, V>
where
    K: Eq + Hash,
{
    cache: &'a SafeCache<K, V>,
    key: K,
    sender: watch::Sender<Outcome<V>>,
    finished: bool,
}

impl<K, V> Construction<'_, K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn finish(&mut self, outcome: Result<V>) {
        match &outcome {
            Ok(value) => {
                self.cache.entries.insert(self.key.clone(), Slot::Ready(value.clone()));
            }
            Err(_) => {
                self.cache.entries.remove(&self.key);
            }
        }
        self.finished = true;
        self.sender.send_replace(Some(outcome));
    }
}

impl<K, V> Drop for Construction<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        if !self.finished {
            self.cache
                .entries
                .remove_if(&self.key, |_, slot| matches!(slot, Slot::Pending(_)));
        }
    }
}
