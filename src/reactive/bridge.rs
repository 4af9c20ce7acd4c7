//! Event bridge: plain callbacks for the UI layer, streams for composition.

use super::{Source, Subject, Value};

/// Callback handed to a UI element.
///
/// Each call emits exactly one event, synchronously and in call order.
/// Clones share the same event stream.
pub struct Callback<T> {
    subject: Subject<T>,
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: Value> Callback<T> {
    pub fn call(&self, event: T) {
        self.subject.emit(event);
    }

    /// Turn the callback into a bare closure for frameworks that want one.
    pub fn into_fn(self) -> impl Fn(T) + Send + Sync + 'static {
        move |event| self.subject.emit(event)
    }
}

impl Callback<()> {
    /// Fire a payload-less notification.
    pub fn notify(&self) {
        self.subject.emit(());
    }
}

impl<A: Value, B: Value> Callback<(A, B)> {
    /// Two-argument form, e.g. `(event, selection)` handlers.
    pub fn call2(&self, a: A, b: B) {
        self.subject.emit((a, b));
    }
}

/// Create a callback and the stream of events it emits.
///
/// Events fired before anything subscribes to the stream are lost; screens
/// wire all subscriptions at mount, before the user can interact.
pub fn bridge<T: Value>() -> (Callback<T>, Source<T>) {
    let subject = Subject::new();
    let source = subject.source();
    (Callback { subject }, source)
}

/// [`bridge`] for button-style callbacks without a payload.
pub fn notifier() -> (Callback<()>, Source<()>) {
    bridge()
}
