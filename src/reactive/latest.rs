//! Form field values that follow input and snap back on reset.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use super::{lock, Behavior, Source, Subscription, Value};

/// Current value of one form field.
///
/// Holds the most recent input, or `default` if a reset happened after it.
/// The field is hot: it tracks its inputs from construction on, whether or
/// not anything observes it, so a snapshot taken at commit time always sees
/// the latest value, including a reset fired by the previous commit.
pub struct FieldState<T> {
    value: Behavior<T>,
    default: T,
    inputs: Arc<Mutex<Option<Subscription>>>,
}

impl<T: Value> Clone for FieldState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            default: self.default.clone(),
            inputs: Arc::clone(&self.inputs),
        }
    }
}

impl<T: Value> FieldState<T> {
    /// A field with no input wiring; update it with [`FieldState::set`].
    pub fn new(default: T) -> Self {
        Self {
            value: Behavior::new(default.clone()),
            default,
            inputs: Arc::new(Mutex::new(None)),
        }
    }

    pub fn get(&self) -> T {
        self.value.get()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn set(&self, value: T) {
        self.value.set(value);
    }

    /// Snap back to the default. Idempotent.
    pub fn reset(&self) {
        self.value.set(self.default.clone());
    }

    /// The value stream: current value on subscription, then every change.
    pub fn source(&self) -> Source<T> {
        self.value.source()
    }

    pub fn watch(&self) -> watch::Receiver<T> {
        self.value.watch()
    }

    pub fn behavior(&self) -> &Behavior<T> {
        &self.value
    }

    /// Stop following the inputs; the last value stays readable.
    pub fn disconnect(&self) {
        let inputs = lock(&self.inputs).take();
        drop(inputs);
    }
}

impl<T: Value + std::fmt::Debug> std::fmt::Debug for FieldState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldState")
            .field("value", &self.get())
            .field("default", &self.default)
            .finish()
    }
}

/// Latest input value, reset to `default` whenever `reset` emits.
///
/// The returned field starts at `default`. Each input and each reset is
/// applied synchronously, in the order the events occur; a reset with no
/// prior input just re-emits the default.
pub fn latest_with_reset<T, R>(input: &Source<T>, default: T, reset: &Source<R>) -> FieldState<T>
where
    T: Value,
    R: Value,
{
    let field = FieldState::new(default.clone());
    let value = field.value.clone();
    let on_reset = default;
    let events = input.merge(&reset.map(move |_| on_reset.clone()));
    let subscription = events.subscribe(move |v| value.set(v.clone()));
    *lock(&field.inputs) = Some(subscription);
    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Subject;

    #[derive(Debug, Clone, Copy)]
    enum Event {
        Input(&'static str),
        Reset,
    }

    fn expected_after(events: &[Event]) -> &'static str {
        events
            .iter()
            .rev()
            .map(|e| match e {
                Event::Input(v) => *v,
                Event::Reset => "",
            })
            .next()
            .unwrap_or("")
    }

    #[test]
    fn test_starts_at_default() {
        let input: Subject<String> = Subject::new();
        let reset: Subject<()> = Subject::new();
        let field = latest_with_reset(&input.source(), "0".to_string(), &reset.source());

        assert_eq!(field.get(), "0");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = field.source().subscribe(move |v| sink.lock().unwrap().push(v.clone()));
        assert_eq!(*seen.lock().unwrap(), vec!["0".to_string()]);
    }

    #[test]
    fn test_latest_value_matches_last_event_for_all_interleavings() {
        let scripts: Vec<Vec<Event>> = vec![
            vec![],
            vec![Event::Reset],
            vec![Event::Reset, Event::Reset],
            vec![Event::Input("a")],
            vec![Event::Input("a"), Event::Reset],
            vec![Event::Input("a"), Event::Reset, Event::Input("b")],
            vec![Event::Input("a"), Event::Input("b"), Event::Input("c")],
            vec![Event::Reset, Event::Input("x"), Event::Reset, Event::Reset],
            vec![Event::Input("a"), Event::Reset, Event::Input("b"), Event::Reset, Event::Input("c")],
        ];

        for script in scripts {
            let input: Subject<&'static str> = Subject::new();
            let reset: Subject<()> = Subject::new();
            let field = latest_with_reset(&input.source(), "", &reset.source());
            for event in &script {
                match event {
                    Event::Input(v) => input.emit(*v),
                    Event::Reset => reset.emit(()),
                }
            }
            assert_eq!(field.get(), expected_after(&script), "script {:?}", script);
        }
    }

    #[test]
    fn test_reset_is_visible_to_snapshot_in_same_emission() {
        // The commit result is the reset signal; an observer registered on the
        // same signal after the field must already see the default.
        let input: Subject<String> = Subject::new();
        let committed: Subject<()> = Subject::new();
        let field = latest_with_reset(&input.source(), String::new(), &committed.source());
        let snapshot = field.clone();
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        let _sub = committed.subscribe(move |_| *sink.lock().unwrap() = Some(snapshot.get()));

        input.emit("Coffee".to_string());
        committed.emit(());

        assert_eq!(*observed.lock().unwrap(), Some(String::new()));
    }

    #[test]
    fn test_disconnect_stops_following_inputs() {
        let input: Subject<u32> = Subject::new();
        let field = latest_with_reset(&input.source(), 0, &Source::<()>::empty());
        input.emit(3);
        field.disconnect();
        input.emit(4);

        assert_eq!(field.get(), 3);
        assert_eq!(input.observer_count(), 0);
    }

    #[test]
    fn test_manual_reset() {
        let field = FieldState::new("TWD".to_string());
        field.set("USD".to_string());
        field.reset();
        field.reset();
        assert_eq!(field.get(), "TWD");
        assert_eq!(field.default_value(), "TWD");
    }
}
