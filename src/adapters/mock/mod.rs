//! Mock implementations for testing.
//!
//! Everything here runs in memory, so screens and the RPC client can be
//! exercised without a network.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP transport with configurable responses
//! - [`MockAccountingService`] - items, currencies, tags and spending summaries
//! - [`MockTodoListService`] - tasks
//! - [`MockInstanceSettingService`] / [`MockUserService`] - the announcement,
//!   usually built over one [`AnnouncementStore`] so a save is visible to reads
//!
//! The service mocks share one control surface: every call is recorded by
//! method name, failures can be injected per method, and [`hold`] parks the
//! next call of a method until the returned gate is released, which lets
//! tests resolve concurrent calls in any order.
//!
//! [`hold`]: MockAccountingService::hold

pub mod http;
pub mod services;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use services::{
    AnnouncementStore, Gate, MockAccountingService, MockInstanceSettingService,
    MockTodoListService, MockUserService, RecordedCall,
};
