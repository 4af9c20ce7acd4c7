//! Concrete implementations of the trait seams in `crate::traits`.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP transport using reqwest
//! - [`RpcClient`] - JSON-over-HTTP implementation of every remote service
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - configurable HTTP responses
//! - [`mock::MockAccountingService`], [`mock::MockTodoListService`],
//!   [`mock::MockInstanceSettingService`], [`mock::MockUserService`] -
//!   in-memory backends with call recording, failure injection and gates

pub mod mock;
pub mod reqwest_http;
pub mod rpc;

pub use mock::{
    MockAccountingService, MockHttpClient, MockInstanceSettingService, MockTodoListService,
    MockUserService,
};
pub use reqwest_http::ReqwestHttpClient;
pub use rpc::RpcClient;
