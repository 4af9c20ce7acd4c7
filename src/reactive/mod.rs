//! Reactive composition primitives for screen view state.
//!
//! Screens are assembled from a handful of building blocks:
//!
//! - [`Subject`] - synchronous multicast push stream (the thing callbacks emit into)
//! - [`Source`] - cold, composable stream description with `map`/`merge`/`switch_map`...
//! - [`Shared`] - a source connected exactly once and fanned out to every observer
//! - [`Behavior`] - cached latest value, replayed to new subscribers
//! - [`Scope`] - per-screen teardown signal and owner of in-flight remote calls
//!
//! On top of those sit the screen-level combinators:
//!
//! - [`bridge`] / [`notifier`] - UI callback to event stream
//! - [`latest_with_reset`] - form field value that snaps back after a reset signal
//! - [`on_commit`] - snapshot on trigger, one remote call per trigger
//! - [`suggestions`] - autocomplete options with an inline "create" entry
//!
//! All propagation between these pieces is synchronous; the only suspension
//! points are the remote calls spawned through a [`Scope`].

pub mod bridge;
pub mod commit;
pub mod latest;
pub mod scope;
pub mod shared;
pub mod source;
pub mod subject;
pub mod suggest;

pub use bridge::{bridge, notifier, Callback};
pub use commit::{on_commit, CommitOutcome};
pub use latest::{latest_with_reset, FieldState};
pub use scope::{HookId, Scope};
pub use shared::{Behavior, Shared};
pub use source::Source;
pub use subject::{Subject, Subscription};
pub use suggest::{build_options, suggestions};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Values that can travel through a stream.
pub trait Value: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Value for T {}

/// Lock a mutex, recovering the data if a panicking observer poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
