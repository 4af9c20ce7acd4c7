//! Error handling for remote service calls.
//!
//! - **Error Categories**: High-level classification for user messaging
//! - **Service Errors**: The one error type every remote call returns
//! - **Result Type Alias**: `ServiceResult<T>` for service trait methods
//!
//! # Error Categories
//!
//! | Category | Description | Worth resubmitting |
//! |----------|-------------|--------------------|
//! | Network | Connection, DNS, timeout | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Client | Malformed request/response | No |
//! | User | Input rejected by the backend | No |

mod category;
mod result;
mod service;

pub use category::ErrorCategory;
pub use result::ServiceResult;
pub use service::ServiceError;
