//! Instance settings screen: edit or revoke the announcement.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ViewConfig;
use crate::reactive::{
    bridge, latest_with_reset, notifier, on_commit, Behavior, Callback, CommitOutcome, FieldState,
    Scope, Source, Subject,
};
use crate::traits::InstanceSettingService;

pub const SAVED: &str = "Announcement saved";
pub const SAVE_FAILED: &str = "Failed to save announcement";
pub const REVOKED: &str = "Announcement revoked";
pub const REVOKE_FAILED: &str = "Failed to revoke announcement";

/// Transient feedback shown after a save or revoke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub open: bool,
}

pub struct InstanceSettingScreen {
    scope: Scope,
    content_change: Callback<String>,
    save: Callback<()>,
    revoke: Callback<()>,
    content: FieldState<String>,
    banner: Behavior<Banner>,
    announcement_changed: Subject<()>,
}

impl InstanceSettingScreen {
    pub fn mount(service: Arc<dyn InstanceSettingService>, config: &ViewConfig) -> Self {
        let scope = Scope::new("instance_setting");
        let (content_change, content_changes) = bridge::<String>();
        let (save, saves) = notifier();
        let (revoke, revokes) = notifier();
        let announcement_changed = Subject::<()>::new();

        let content = latest_with_reset(
            &content_changes.take_until(&scope),
            String::new(),
            &Source::<()>::empty(),
        );

        let saved = {
            let content = content.clone();
            let service = Arc::clone(&service);
            on_commit(
                &saves,
                &scope,
                move |_| {
                    let content = content.get();
                    (!content.trim().is_empty()).then_some(content)
                },
                move |content: String| {
                    let service = Arc::clone(&service);
                    async move { service.set_announcement(&content).await }
                },
            )
        };
        let revoked = {
            let service = Arc::clone(&service);
            on_commit(
                &revokes,
                &scope,
                |_| Some(()),
                move |_| {
                    let service = Arc::clone(&service);
                    async move { service.revoke_announcement().await }
                },
            )
        };

        let messages = saved
            .source()
            .map(|outcome| banner_message(outcome, SAVED, SAVE_FAILED))
            .merge(&revoked.source().map(|outcome| banner_message(outcome, REVOKED, REVOKE_FAILED)))
            .take_until(&scope);

        let banner = Behavior::new(Banner::default());
        {
            let banner = banner.clone();
            scope.keep(messages.subscribe(move |message| {
                info!(%message, "announcement banner");
                banner.set(Banner {
                    message: message.clone(),
                    open: true,
                });
            }));
        }
        {
            let banner = banner.clone();
            let duration = config.banner_duration;
            scope.keep(
                messages
                    .switch_map(&scope, move |_| close_after(duration))
                    .subscribe(move |_| banner.update(|b| b.open = false)),
            );
        }
        {
            let changed = announcement_changed.clone();
            let notify = move |outcome: &CommitOutcome<()>| {
                if outcome.is_success() {
                    changed.emit(());
                }
            };
            scope.keep(saved.subscribe(notify.clone()));
            scope.keep(revoked.subscribe(notify));
        }

        Self {
            scope,
            content_change,
            save,
            revoke,
            content,
            banner,
            announcement_changed,
        }
    }

    pub fn on_content_change(&self, value: impl Into<String>) {
        self.content_change.call(value.into());
    }

    pub fn on_save(&self) {
        self.save.notify();
    }

    pub fn on_revoke(&self) {
        self.revoke.notify();
    }

    pub fn content(&self) -> &FieldState<String> {
        &self.content
    }

    pub fn banner(&self) -> &Behavior<Banner> {
        &self.banner
    }

    /// Emits after every successful save or revoke.
    pub fn announcement_changed(&self) -> Source<()> {
        self.announcement_changed.source()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn unmount(&self) {
        self.scope.teardown();
    }
}

impl Drop for InstanceSettingScreen {
    fn drop(&mut self) {
        self.scope.teardown();
    }
}

fn banner_message(outcome: &CommitOutcome<()>, success: &str, failure: &str) -> String {
    if outcome.is_success() {
        success.to_string()
    } else {
        failure.to_string()
    }
}

async fn close_after(duration: Duration) {
    tokio::time::sleep(duration).await;
}
