//! Commit trigger to remote call, with the outcome fanned out.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{Scope, Shared, Source, Value};
use crate::error::{ServiceError, ServiceResult};

/// Result of one commit, tagged so a failure travels as a value.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<R> {
    Succeeded(R),
    Failed(ServiceError),
}

impl<R> CommitOutcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, CommitOutcome::Succeeded(_))
    }

    pub fn succeeded(&self) -> Option<&R> {
        match self {
            CommitOutcome::Succeeded(value) => Some(value),
            CommitOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ServiceError> {
        match self {
            CommitOutcome::Succeeded(_) => None,
            CommitOutcome::Failed(err) => Some(err),
        }
    }
}

impl<R> From<ServiceResult<R>> for CommitOutcome<R> {
    fn from(result: ServiceResult<R>) -> Self {
        match result {
            Ok(value) => CommitOutcome::Succeeded(value),
            Err(err) => CommitOutcome::Failed(err),
        }
    }
}

/// Issue one remote call per trigger and share the outcomes.
///
/// `snapshot` runs synchronously inside the trigger emission and reads
/// whatever field state the call needs; returning `None` drops the commit
/// without a call. Concurrent commits are independent: nothing is debounced
/// or coalesced, and outcomes arrive in completion order. A failed call
/// becomes [`CommitOutcome::Failed`] and later commits keep working.
///
/// The result is connected once, so any number of observers (field resets,
/// list refreshes, banners) share the same single call per commit.
pub fn on_commit<Tr, S, R, Snap, Call, Fut>(
    trigger: &Source<Tr>,
    scope: &Scope,
    snapshot: Snap,
    call: Call,
) -> Shared<CommitOutcome<R>>
where
    Tr: Value,
    S: Value,
    R: Value,
    Snap: Fn(&Tr) -> Option<S> + Send + Sync + 'static,
    Call: Fn(S) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ServiceResult<R>> + Send + 'static,
{
    let call = Arc::new(call);
    let name = scope.name().to_string();
    let skipped = name.clone();
    trigger
        .take_until(scope)
        .filter_map(move |event| {
            let captured = snapshot(event);
            if captured.is_none() {
                debug!(scope = %skipped, "commit skipped: nothing to submit");
            }
            captured
        })
        .merge_map(scope, move |captured: &S| {
            debug!(scope = %name, "commit issued");
            let pending = call(captured.clone());
            let name = name.clone();
            async move {
                let result = pending.await;
                if let Err(err) = &result {
                    warn!(scope = %name, code = err.error_code(), error = %err, "commit failed");
                }
                CommitOutcome::from(result)
            }
        })
        .share()
}
