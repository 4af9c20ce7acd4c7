//! Announcement strip shown above the screens.

use std::sync::Arc;

use tracing::warn;

use crate::reactive::{Behavior, Scope, Source};
use crate::traits::UserService;

/// Current instance announcement.
///
/// Loads at mount and again whenever `reload` emits; only the most recent
/// load can change the content.
pub struct AnnouncementBanner {
    scope: Scope,
    content: Behavior<String>,
}

impl AnnouncementBanner {
    pub fn mount(service: Arc<dyn UserService>, reload: Option<Source<()>>) -> Self {
        let scope = Scope::new("announcement");
        let content = reload
            .unwrap_or_else(Source::empty)
            .start_with(())
            .take_until(&scope)
            .switch_map(&scope, move |_| {
                let service = Arc::clone(&service);
                async move { service.get_announcement().await }
            })
            .filter_map(|result| match result {
                Ok(announcement) => Some(announcement.content.clone()),
                Err(err) => {
                    warn!(error = %err, "failed to load announcement");
                    None
                }
            })
            .hold(String::new());
        Self { scope, content }
    }

    pub fn content(&self) -> &Behavior<String> {
        &self.content
    }

    /// Whether there is anything to show.
    pub fn is_visible(&self) -> bool {
        self.content.with(|c| !c.trim().is_empty())
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for AnnouncementBanner {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}
