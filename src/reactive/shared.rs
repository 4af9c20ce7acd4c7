//! Hot multicast streams: connected once, observed by many.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::{lock, Source, Subject, Subscription, Value};

/// A source connected exactly once.
///
/// The upstream chain (and every remote call in it) runs a single time per
/// upstream value no matter how many observers are attached; each observer
/// gets every value emitted while it is subscribed. Values emitted while no
/// observer is attached are dropped.
pub struct Shared<T> {
    subject: Subject<T>,
    upstream: Arc<Mutex<Option<Subscription>>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            upstream: Arc::clone(&self.upstream),
        }
    }
}

impl<T: Value> Shared<T> {
    /// Subscribe to `source` now and multicast what it emits.
    pub fn connect(source: &Source<T>) -> Self {
        let subject = Subject::new();
        let sink = subject.clone();
        let upstream = source.subscribe(move |value| sink.emit(value.clone()));
        Self {
            subject,
            upstream: Arc::new(Mutex::new(Some(upstream))),
        }
    }

    /// Observe the shared values. Each subscription keeps the connection
    /// open, even after every `Shared` handle is dropped.
    pub fn source(&self) -> Source<T> {
        let shared = self.clone();
        Source::new(move |observer| shared.subscribe_shared(observer))
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.subscribe_shared(Arc::new(observer))
    }

    fn subscribe_shared(&self, observer: super::subject::Observer<T>) -> Subscription {
        let mut subscription = self.subject.subscribe_shared(observer);
        let connection = self.clone();
        subscription.add(Subscription::new(move || drop(connection)));
        subscription
    }

    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    /// Release the upstream subscription and complete every observer.
    pub fn disconnect(&self) {
        let upstream = lock(&self.upstream).take();
        drop(upstream);
        self.subject.complete();
    }
}

/// The latest value of a stream, cached.
///
/// `Behavior` is the state cell every screen exposes to its renderer. The
/// value lives in a [`watch`] channel, so it can be read synchronously with
/// [`Behavior::get`] or awaited with [`Behavior::watch`]; new subscribers to
/// [`Behavior::source`] first receive the current value, then every change.
pub struct Behavior<T> {
    value: Arc<watch::Sender<T>>,
    changes: Subject<T>,
    upstream: Arc<Mutex<Option<Subscription>>>,
}

impl<T> Clone for Behavior<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            changes: self.changes.clone(),
            upstream: Arc::clone(&self.upstream),
        }
    }
}

impl<T: Value> Behavior<T> {
    pub fn new(initial: T) -> Self {
        let (value, _) = watch::channel(initial);
        Self {
            value: Arc::new(value),
            changes: Subject::new(),
            upstream: Arc::new(Mutex::new(None)),
        }
    }

    /// Seed with `initial` and follow `source` from now on.
    pub fn connect(source: &Source<T>, initial: T) -> Self {
        let behavior = Self::new(initial);
        let cell = behavior.clone_cell();
        let upstream = source.subscribe(move |value| cell.set(value.clone()));
        *lock(&behavior.upstream) = Some(upstream);
        behavior
    }

    // A clone that does not share the upstream slot, so observers capturing
    // it do not keep their own subscription alive.
    fn clone_cell(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            changes: self.changes.clone(),
            upstream: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store `value` and notify every observer.
    pub fn set(&self, value: T) {
        self.value.send_replace(value.clone());
        self.changes.emit(value);
    }

    /// Modify the current value in place, then notify.
    ///
    /// `f` runs under the cell's write lock, so concurrent updates never
    /// overwrite each other. It must not read this behavior.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut updated = None;
        self.value.send_modify(|value| {
            f(value);
            updated = Some(value.clone());
        });
        if let Some(value) = updated {
            self.changes.emit(value);
        }
    }

    /// Current value followed by every change.
    pub fn source(&self) -> Source<T> {
        let behavior = self.clone_cell();
        Source::new(move |observer| {
            let current = behavior.get();
            let subscription = behavior.changes.subscribe_shared(Arc::clone(&observer));
            observer(&current);
            subscription
        })
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.source().subscribe(observer)
    }

    /// Async view of the value, for renderers and tests that need to wait.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    /// Stop following the upstream source, keeping the last value.
    pub fn disconnect(&self) {
        let upstream = lock(&self.upstream).take();
        drop(upstream);
    }
}

impl<T: Value + std::fmt::Debug> std::fmt::Debug for Behavior<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Behavior").field(&*self.value.borrow()).finish()
    }
}
