//! Synchronous multicast subject and RAII subscriptions.

use std::sync::{Arc, Mutex};

use super::{lock, Source, Value};

/// Observer callback shared between a subject and the operators built on it.
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
    completed: bool,
}

/// A hot, push-based stream.
///
/// [`Subject::emit`] delivers the value synchronously to every observer that
/// is registered at the time of the call, in registration order. A value
/// emitted while nobody is subscribed is lost.
///
/// The observer list is snapshotted before delivery, so observers are free to
/// emit, subscribe or unsubscribe from inside the callback.
pub struct Subject<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T: Value> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Value> Subject<T> {
    /// Create a subject with no observers.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                observers: Vec::new(),
                completed: false,
            })),
        }
    }

    /// Push a value to every current observer.
    pub fn emit(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let registry = lock(&self.registry);
            if registry.completed {
                return;
            }
            registry.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };
        for observer in observers {
            observer(&value);
        }
    }

    /// Register an observer. Dropping the returned [`Subscription`] removes it.
    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.subscribe_shared(Arc::new(observer))
    }

    pub(crate) fn subscribe_shared(&self, observer: Observer<T>) -> Subscription {
        let id = {
            let mut registry = lock(&self.registry);
            if registry.completed {
                return Subscription::empty();
            }
            let id = registry.next_id;
            registry.next_id += 1;
            registry.observers.push((id, observer));
            id
        };
        let registry = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).observers.retain(|(i, _)| *i != id);
            }
        })
    }

    /// Stop the subject: observers are released and later emissions are ignored.
    pub fn complete(&self) {
        let mut registry = lock(&self.registry);
        registry.completed = true;
        registry.observers.clear();
    }

    pub fn is_completed(&self) -> bool {
        lock(&self.registry).completed
    }

    /// Number of observers currently attached.
    pub fn observer_count(&self) -> usize {
        lock(&self.registry).observers.len()
    }

    /// View this subject as a composable [`Source`].
    pub fn source(&self) -> Source<T> {
        let subject = self.clone();
        Source::new(move |observer| subject.subscribe_shared(observer))
    }
}

/// Handle to an active subscription; unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Vec<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap an unsubscribe action.
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: vec![Box::new(unsubscribe)],
        }
    }

    /// A subscription that owns nothing.
    pub fn empty() -> Self {
        Self {
            teardown: Vec::new(),
        }
    }

    /// Tie another subscription's lifetime to this one.
    pub fn add(&mut self, other: Subscription) {
        self.teardown.extend(other.into_actions());
    }

    pub fn is_empty(&self) -> bool {
        self.teardown.is_empty()
    }

    /// Unsubscribe now. Equivalent to dropping.
    pub fn unsubscribe(self) {
        drop(self);
    }

    fn into_actions(mut self) -> Vec<Box<dyn FnOnce() + Send>> {
        std::mem::take(&mut self.teardown)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for action in self.teardown.drain(..) {
            action();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("actions", &self.teardown.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder<T: Value>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &T| sink.lock().unwrap().push(v.clone()))
    }

    #[test]
    fn test_emit_reaches_observers_in_order() {
        let subject = Subject::new();
        let (seen, observer) = recorder::<u32>();
        let _sub = subject.subscribe(observer);

        subject.emit(1);
        subject.emit(2);
        subject.emit(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_emit_without_observer_is_lost() {
        let subject = Subject::new();
        subject.emit("early".to_string());

        let (seen, observer) = recorder::<String>();
        let _sub = subject.subscribe(observer);
        subject.emit("late".to_string());

        assert_eq!(*seen.lock().unwrap(), vec!["late".to_string()]);
    }

    #[test]
    fn test_drop_subscription_unsubscribes() {
        let subject = Subject::new();
        let (seen, observer) = recorder::<u32>();
        let sub = subject.subscribe(observer);
        assert_eq!(subject.observer_count(), 1);

        subject.emit(1);
        drop(sub);
        subject.emit(2);

        assert_eq!(subject.observer_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_complete_ignores_later_emissions() {
        let subject = Subject::new();
        let (seen, observer) = recorder::<u32>();
        let _sub = subject.subscribe(observer);

        subject.complete();
        subject.emit(7);

        assert!(subject.is_completed());
        assert!(seen.lock().unwrap().is_empty());
        assert!(subject.subscribe(|_: &u32| {}).is_empty());
    }

    #[test]
    fn test_reentrant_emit_is_delivered() {
        let subject: Subject<u32> = Subject::new();
        let (seen, observer) = recorder::<u32>();
        let _record = subject.subscribe(observer);
        let echo = subject.clone();
        let _echo = subject.subscribe(move |v| {
            if *v < 3 {
                echo.emit(v + 1);
            }
        });

        subject.emit(1);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subscription_add_releases_both() {
        let a: Subject<u32> = Subject::new();
        let b: Subject<u32> = Subject::new();
        let mut sub = a.subscribe(|_| {});
        sub.add(b.subscribe(|_| {}));
        assert_eq!(a.observer_count() + b.observer_count(), 2);

        sub.unsubscribe();

        assert_eq!(a.observer_count() + b.observer_count(), 0);
    }
}
