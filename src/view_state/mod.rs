//! Screen view models.
//!
//! Each screen is mounted with its remote service injected as an
//! `Arc<dyn Trait>`, owns a private [`Scope`](crate::reactive::Scope), and is
//! torn down by `unmount()` or by dropping it. A renderer feeds user input
//! through the `on_*` methods and reads (or watches) the exposed state cells.
//!
//! ## Components
//!
//! - [`AccountingScreen`]: item form, tag autocomplete with inline creation, item list
//! - [`TodoListScreen`]: task entry and completion toggles
//! - [`InstanceSettingScreen`]: announcement editing with a timed [`Banner`]
//! - [`AnnouncementBanner`]: the announcement itself
//! - [`WeeklyHistogram`] / [`YearlySummary`]: the insight charts

mod accounting;
mod announcement;
mod insight;
pub mod instance_setting;
mod todo_list;

pub use accounting::AccountingScreen;
pub use announcement::AnnouncementBanner;
pub use insight::{WeeklyHistogram, YearlySummary};
pub use instance_setting::{Banner, InstanceSettingScreen};
pub use todo_list::TodoListScreen;
