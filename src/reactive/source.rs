//! Cold composable streams and their operators.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;
use tracing::debug;

use super::subject::Observer;
use super::{lock, Behavior, Scope, Shared, Subscription, Value};

type SubscribeFn<T> = dyn Fn(Observer<T>) -> Subscription + Send + Sync;

/// A description of a push stream.
///
/// A `Source` does nothing until subscribed, and every subscription runs the
/// whole upstream chain again. That matters for side-effecting operators
/// like [`Source::merge_map`]: two subscribers mean two remote calls per
/// value. Use [`Source::share`] to connect once and fan the results out.
pub struct Source<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T: Value> Source<T> {
    pub fn new(subscribe: impl Fn(Observer<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Self {
            subscribe_fn: Arc::new(subscribe),
        }
    }

    /// A source that never emits.
    pub fn empty() -> Self {
        Self::new(|_| Subscription::empty())
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        (self.subscribe_fn)(Arc::new(observer))
    }

    pub(crate) fn subscribe_shared(&self, observer: Observer<T>) -> Subscription {
        (self.subscribe_fn)(observer)
    }

    pub fn map<U: Value>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Source<U> {
        let upstream = self.clone();
        let f = Arc::new(f);
        Source::new(move |observer: Observer<U>| {
            let f = Arc::clone(&f);
            upstream.subscribe(move |value| observer(&f(value)))
        })
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Source<T> {
        let upstream = self.clone();
        let predicate = Arc::new(predicate);
        Source::new(move |observer: Observer<T>| {
            let predicate = Arc::clone(&predicate);
            upstream.subscribe(move |value| {
                if predicate(value) {
                    observer(value);
                }
            })
        })
    }

    pub fn filter_map<U: Value>(
        &self,
        f: impl Fn(&T) -> Option<U> + Send + Sync + 'static,
    ) -> Source<U> {
        let upstream = self.clone();
        let f = Arc::new(f);
        Source::new(move |observer: Observer<U>| {
            let f = Arc::clone(&f);
            upstream.subscribe(move |value| {
                if let Some(mapped) = f(value) {
                    observer(&mapped);
                }
            })
        })
    }

    /// Interleave two sources in emission order.
    pub fn merge(&self, other: &Source<T>) -> Source<T> {
        let left = self.clone();
        let right = other.clone();
        Source::new(move |observer: Observer<T>| {
            let mut subscription = left.subscribe_shared(Arc::clone(&observer));
            subscription.add(right.subscribe_shared(observer));
            subscription
        })
    }

    /// Emit `value` synchronously on subscription, then follow upstream.
    pub fn start_with(&self, value: T) -> Source<T> {
        let upstream = self.clone();
        Source::new(move |observer: Observer<T>| {
            observer(&value);
            upstream.subscribe_shared(observer)
        })
    }

    /// Stop emitting once `scope` is torn down.
    ///
    /// Teardown also releases the upstream subscription, so an operator
    /// chain guarded this way cannot be kept alive by a forgotten handle.
    pub fn take_until(&self, scope: &Scope) -> Source<T> {
        let upstream = self.clone();
        let scope = scope.clone();
        Source::new(move |observer: Observer<T>| {
            if scope.is_closed() {
                return Subscription::empty();
            }
            let guard = scope.clone();
            let inner = upstream.subscribe(move |value| {
                if !guard.is_closed() {
                    observer(value);
                }
            });
            let slot = Arc::new(Mutex::new(Some(inner)));
            let released = Arc::downgrade(&slot);
            let hook = scope.on_teardown(move || {
                if let Some(slot) = released.upgrade() {
                    let inner = lock(&slot).take();
                    drop(inner);
                }
            });
            let owner = scope.clone();
            Subscription::new(move || {
                owner.cancel_teardown(hook);
                let inner = lock(&slot).take();
                drop(inner);
            })
        })
    }

    /// Run `f` for every value and emit each result as it completes.
    ///
    /// Calls run concurrently; none is suppressed or coalesced. Results
    /// arrive in completion order, not request order.
    pub fn merge_map<U, F, Fut>(&self, scope: &Scope, f: F) -> Source<U>
    where
        U: Value,
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        let upstream = self.clone();
        let scope = scope.clone();
        let f = Arc::new(f);
        Source::new(move |observer: Observer<U>| {
            let active = Arc::new(AtomicBool::new(true));
            let f = Arc::clone(&f);
            let scope = scope.clone();
            let live = Arc::clone(&active);
            let mut subscription = upstream.subscribe(move |value| {
                let call = f(value);
                let observer = Arc::clone(&observer);
                let live = Arc::clone(&live);
                let guard = scope.clone();
                scope.spawn(async move {
                    let output = call.await;
                    if live.load(Ordering::SeqCst) && !guard.is_closed() {
                        observer(&output);
                    }
                });
            });
            subscription.add(Subscription::new(move || active.store(false, Ordering::SeqCst)));
            subscription
        })
    }

    /// Run `f` for every value, keeping only the most recent call.
    ///
    /// A new value aborts the call in flight. A completion that belongs to
    /// an older request is dropped even if it races the abort, so a slow
    /// early response can never overwrite a newer one.
    pub fn switch_map<U, F, Fut>(&self, scope: &Scope, f: F) -> Source<U>
    where
        U: Value,
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        let upstream = self.clone();
        let scope = scope.clone();
        let f = Arc::new(f);
        Source::new(move |observer: Observer<U>| {
            let generation = Arc::new(AtomicU64::new(0));
            let current: Arc<Mutex<Option<AbortHandle>>> = Arc::new(Mutex::new(None));
            let f = Arc::clone(&f);
            let scope = scope.clone();
            let latest = Arc::clone(&generation);
            let in_flight = Arc::clone(&current);
            let mut subscription = upstream.subscribe(move |value| {
                let issued = latest.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(previous) = lock(&in_flight).take() {
                    previous.abort();
                }
                let call = f(value);
                let observer = Arc::clone(&observer);
                let check = Arc::clone(&latest);
                let guard = scope.clone();
                let handle = scope.spawn(async move {
                    let output = call.await;
                    if guard.is_closed() {
                        return;
                    }
                    if check.load(Ordering::SeqCst) != issued {
                        debug!(scope = %guard.name(), issued, "stale response dropped");
                        return;
                    }
                    observer(&output);
                });
                *lock(&in_flight) = handle;
            });
            subscription.add(Subscription::new(move || {
                // u64::MAX never matches an issued generation
                generation.store(u64::MAX, Ordering::SeqCst);
                if let Some(previous) = lock(&current).take() {
                    previous.abort();
                }
            }));
            subscription
        })
    }

    /// Connect now and multicast to every observer of the result.
    pub fn share(&self) -> Shared<T> {
        Shared::connect(self)
    }

    /// Connect now and cache the latest value, starting from `initial`.
    pub fn hold(&self, initial: T) -> Behavior<T> {
        Behavior::connect(self, initial)
    }
}
