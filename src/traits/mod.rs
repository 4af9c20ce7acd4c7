//! Trait seams for dependency injection.
//!
//! Screens never talk to a concrete backend. They receive the remote
//! services as `Arc<dyn Trait>`, and the RPC implementation in turn receives
//! its transport as an [`HttpClient`], so each layer can be swapped for a
//! mock in tests.
//!
//! # Traits
//!
//! - [`HttpClient`] - JSON POST transport
//! - [`AccountingService`] - items, currencies and tags
//! - [`TodoListService`] - tasks
//! - [`InstanceSettingService`] - instance announcement administration
//! - [`UserService`] - per-user reads such as the current announcement

pub mod http;
pub mod services;

pub use http::{Headers, HttpClient, HttpError, Response};
pub use services::{AccountingService, InstanceSettingService, TodoListService, UserService};
