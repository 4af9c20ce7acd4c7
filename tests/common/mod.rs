//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! mod common;
//! use common::*;
//!
//! let backend = MockAccountingService::new().with_tags(&["food"]);
//! let screen = mount_accounting(&backend);
//! settle().await;
//! assert!(screen.items().get().is_some());
//! ```

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

use std::time::Duration;

use accountcat_view::reactive::Behavior;

/// Let every spawned task run until it blocks.
///
/// Screens chain several spawned calls (commit, then refresh), so one yield
/// is not enough. Does not advance a paused clock.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Wait until `behavior` satisfies `ready`, failing the test after a second.
#[allow(dead_code)]
pub async fn wait_for<T>(behavior: &Behavior<T>, ready: impl FnMut(&T) -> bool) -> T
where
    T: Clone + Send + Sync + 'static,
{
    let mut rx = behavior.watch();
    let value = tokio::time::timeout(Duration::from_secs(1), rx.wait_for(ready))
        .await
        .expect("timed out waiting for view state")
        .expect("view state dropped");
    value.clone()
}
