//! Per-screen lifetime: teardown signal plus ownership of in-flight work.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::{lock, Source, Subject, Subscription};

type Hook = Box<dyn FnOnce() + Send>;

/// Handle of a registered teardown hook, for [`Scope::cancel_teardown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookId(u64);

struct ScopeInner {
    name: String,
    closed: AtomicBool,
    signal: Subject<()>,
    tasks: Mutex<Vec<AbortHandle>>,
    next_hook: AtomicU64,
    hooks: Mutex<BTreeMap<u64, Hook>>,
    kept: Mutex<Vec<Subscription>>,
}

/// Lifetime of one mounted screen.
///
/// Every remote call a screen makes is spawned through its scope, and every
/// long-lived subscription is either kept by the scope or guarded with
/// [`Source::take_until`]. After [`Scope::teardown`] no pending response can
/// reach the screen's state.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                name: name.into(),
                closed: AtomicBool::new(false),
                signal: Subject::new(),
                tasks: Mutex::new(Vec::new()),
                next_hook: AtomicU64::new(0),
                hooks: Mutex::new(BTreeMap::new()),
                kept: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Emits once, when the scope is torn down.
    pub fn signal(&self) -> Source<()> {
        self.inner.signal.source()
    }

    /// Spawn a future on the ambient tokio runtime, owned by this scope.
    ///
    /// Returns `None` without running the future if the scope is already
    /// closed or no runtime is available.
    pub fn spawn<F>(&self, future: F) -> Option<AbortHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            debug!(scope = %self.inner.name, "spawn refused after teardown");
            return None;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(scope = %self.inner.name, "no tokio runtime; remote call dropped");
                return None;
            }
        };
        let abort = handle.spawn(future).abort_handle();
        let mut tasks = lock(&self.inner.tasks);
        tasks.retain(|t| !t.is_finished());
        tasks.push(abort.clone());
        Some(abort)
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn pending_tasks(&self) -> usize {
        lock(&self.inner.tasks)
            .iter()
            .filter(|t| !t.is_finished())
            .count()
    }

    /// Keep a subscription alive until teardown.
    pub fn keep(&self, subscription: Subscription) {
        if self.is_closed() {
            return;
        }
        lock(&self.inner.kept).push(subscription);
    }

    /// Run `hook` at teardown, or right away if the scope is already closed.
    ///
    /// Hooks run in registration order.
    pub fn on_teardown(&self, hook: impl FnOnce() + Send + 'static) -> HookId {
        let id = HookId(self.inner.next_hook.fetch_add(1, Ordering::SeqCst));
        if self.is_closed() {
            hook();
            return id;
        }
        lock(&self.inner.hooks).insert(id.0, Box::new(hook));
        id
    }

    /// Forget a hook that has not run yet.
    pub fn cancel_teardown(&self, id: HookId) {
        let hook = lock(&self.inner.hooks).remove(&id.0);
        drop(hook);
    }

    /// Number of hooks waiting for teardown.
    pub fn pending_hooks(&self) -> usize {
        lock(&self.inner.hooks).len()
    }

    /// Close the scope. Idempotent.
    pub fn teardown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let tasks: Vec<AbortHandle> = lock(&self.inner.tasks).drain(..).collect();
        let aborted = tasks.iter().filter(|t| !t.is_finished()).count();
        for task in &tasks {
            task.abort();
        }
        self.inner.signal.emit(());
        self.inner.signal.complete();
        let hooks = std::mem::take(&mut *lock(&self.inner.hooks));
        for hook in hooks.into_values() {
            hook();
        }
        let kept: Vec<Subscription> = lock(&self.inner.kept).drain(..).collect();
        drop(kept);
        debug!(scope = %self.inner.name, aborted, "scope torn down");
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.inner.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_spawn_runs_future() {
        let scope = Scope::new("test");
        let (tx, rx) = tokio::sync::oneshot::channel();
        scope.spawn(async move {
            let _ = tx.send(42);
        });
        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_teardown_aborts_pending_tasks() {
        let scope = Scope::new("test");
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        scope.spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(scope.pending_tasks(), 1);

        scope.teardown();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!finished.load(Ordering::SeqCst));
        assert_eq!(scope.pending_tasks(), 0);
    }

    #[tokio::test]
    async fn test_spawn_after_teardown_is_refused() {
        let scope = Scope::new("test");
        scope.teardown();
        assert!(scope.spawn(async {}).is_none());
    }

    #[test]
    fn test_spawn_without_runtime_returns_none() {
        let scope = Scope::new("test");
        assert!(scope.spawn(async {}).is_none());
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let scope = Scope::new("test");
        let signals = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&signals);
        let _sub = scope.signal().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let hooks = Arc::new(AtomicUsize::new(0));
        let hook_counter = Arc::clone(&hooks);
        scope.on_teardown(move || {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        });

        scope.teardown();
        scope.teardown();

        assert!(scope.is_closed());
        assert_eq!(signals.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_kept_subscriptions_released_on_teardown() {
        let scope = Scope::new("test");
        let subject: Subject<u32> = Subject::new();
        scope.keep(subject.subscribe(|_| {}));
        assert_eq!(subject.observer_count(), 1);

        scope.teardown();

        assert_eq!(subject.observer_count(), 0);
    }

    #[test]
    fn test_cancelled_hook_never_runs() {
        let scope = Scope::new("test");
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let id = scope.on_teardown(move || flag.store(true, Ordering::SeqCst));
        assert_eq!(scope.pending_hooks(), 1);

        scope.cancel_teardown(id);
        assert_eq!(scope.pending_hooks(), 0);
        scope.teardown();

        assert!(!ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_hook_after_teardown_runs_immediately() {
        let scope = Scope::new("test");
        scope.teardown();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        scope.on_teardown(move || flag.store(true, Ordering::SeqCst));
        assert!(ran.load(Ordering::SeqCst));
    }
}
