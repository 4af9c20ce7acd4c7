//! Result alias for remote service calls.

use super::service::ServiceError;

/// Result of a remote service call.
pub type ServiceResult<T> = Result<T, ServiceError>;
