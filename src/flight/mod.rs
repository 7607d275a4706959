//! Call Deduplication Module (single-flight)
//!
//! Collapses concurrent calls for the same key into one execution.
//!
//! ## Core Concepts
//! - **Leader**: The first caller for a key registers a call, spawns the work and waits for it.
//! - **Joiners**: Later callers for the same key wait on the leader's barrier and receive a clone
//!   of its result, success or failure alike.
//! - **Window**: The registration is dropped as soon as the work finishes, so a call that
//!   arrives afterwards runs the work again. Caching results is the store's job, not ours.
//!
//! The leader's work runs on its own tokio task, so it always runs to completion: dropping
//! the caller that started it (an aborted task, a handler whose client hung up) neither
//! cancels the load nor makes a joiner run it again. Only a panicking work future leaves
//! joiners without a result; they then race to become the next leader.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

type Calls<T> = DashMap<String, watch::Receiver<Option<T>>>;

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Joiner(watch::Receiver<Option<T>>),
}

/// Owns the leader's sender and its in-flight registration.
///
/// The registration is cleared before the result is published, so a woken joiner never
/// sees its own call still listed. A task that unwinds clears it on drop.
struct Registration<T> {
    calls: Arc<Calls<T>>,
    key: String,
    sender: watch::Sender<Option<T>>,
    published: bool,
}

impl<T> Registration<T> {
    fn publish(mut self, result: T) {
        self.calls.remove(&self.key);
        self.published = true;
        self.sender.send_replace(Some(result));
    }
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        if !self.published {
            self.calls.remove(&self.key);
        }
    }
}

pub struct FlightGroup<T> {
    calls: Arc<Calls<T>>,
}

impl<T> Default for FlightGroup<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(DashMap::new()),
        }
    }
}

impl<T> FlightGroup<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `work` unless a call for `key` is already in flight, in which case the shared
    /// result of that call is returned instead.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn call<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.call_shared(key, work).await.0
    }

    /// Like [`call`](Self::call), also reporting whether the result came from another caller.
    pub async fn call_shared<F, Fut>(&self, key: &str, work: F) -> (T, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (sender, receiver) = loop {
            match self.enter(key) {
                Role::Leader(sender) => {
                    let receiver = sender.subscribe();
                    break (sender, receiver);
                }
                Role::Joiner(receiver) => {
                    if let Some(result) = wait_for_leader(receiver).await {
                        return (result, true);
                    }
                    tracing::debug!("Leader for '{}' went away, retrying", key);
                }
            }
        };

        let registration = Registration {
            calls: self.calls.clone(),
            key: key.to_string(),
            sender,
            published: false,
        };
        let fut = work();
        tokio::spawn(async move {
            let result = fut.await;
            registration.publish(result);
        });

        match wait_for_leader(receiver).await {
            Some(result) => (result, false),
            None => std::panic::resume_unwind(Box::new(format!(
                "single-flight work for '{}' panicked",
                key
            ))),
        }
    }

    /// Number of keys with a call currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.len()
    }

    fn enter(&self, key: &str) -> Role<T> {
        match self.calls.entry(key.to_string()) {
            Entry::Occupied(entry) => Role::Joiner(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (sender, receiver) = watch::channel(None);
                entry.insert(receiver);
                Role::Leader(sender)
            }
        }
    }
}

/// Returns `None` if the work task ended without publishing a result.
async fn wait_for_leader<T: Clone>(mut receiver: watch::Receiver<Option<T>>) -> Option<T> {
    match receiver.wait_for(Option::is_some).await {
        Ok(published) => published.clone(),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests;
