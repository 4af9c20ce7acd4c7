//! AccountCat view layer.
//!
//! Reactive view-state composition for the AccountCat finance and todo
//! front-end: UI callbacks and remote-service round trips are composed into
//! per-screen state cells that a renderer can read, watch and tear down.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod config;
pub mod error;
pub mod models;
pub mod reactive;
pub mod traits;
pub mod view_state;
