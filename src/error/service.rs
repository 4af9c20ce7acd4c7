//! Errors returned by remote service calls.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Failure of a single remote call.
///
/// Every service trait method returns this. The view layer never propagates
/// it through a stream: screens either tag it into a
/// [`CommitOutcome`](crate::reactive::CommitOutcome) or log it and keep the
/// user's input for a manual retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("{operation} timed out")]
    Timeout { operation: String },

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode response: {message}")]
    Decode { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("{what} not found")]
    NotFound { what: String },

    #[error("request cancelled")]
    Cancelled,
}

impl ServiceError {
    pub fn transport(message: impl Into<String>) -> Self {
        ServiceError::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound { what: what.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ServiceError::Transport { .. } | ServiceError::Timeout { .. } => ErrorCategory::Network,
            ServiceError::Status { status, .. } => match *status {
                400 | 404 | 409 | 422 => ErrorCategory::User,
                408 | 429 => ErrorCategory::Network,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            ServiceError::Decode { .. } | ServiceError::Cancelled => ErrorCategory::Client,
            ServiceError::InvalidArgument { .. } | ServiceError::NotFound { .. } => {
                ErrorCategory::User
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Short code for log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Transport { .. } => "E_SVC_TRANSPORT",
            ServiceError::Timeout { .. } => "E_SVC_TIMEOUT",
            ServiceError::Status { .. } => "E_SVC_STATUS",
            ServiceError::Decode { .. } => "E_SVC_DECODE",
            ServiceError::InvalidArgument { .. } => "E_SVC_ARGUMENT",
            ServiceError::NotFound { .. } => "E_SVC_NOT_FOUND",
            ServiceError::Cancelled => "E_SVC_CANCELLED",
        }
    }

    /// Message fit for a banner or an inline hint.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Transport { .. } => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            ServiceError::Timeout { operation } => {
                format!("The {} request timed out. Please try again.", operation)
            }
            ServiceError::Status { status, .. } => match *status {
                401 => "Please sign in again.".to_string(),
                403 => "You don't have permission for this action.".to_string(),
                500..=599 => "The server is experiencing issues. Please try again later.".to_string(),
                _ => format!("The server returned an error (HTTP {}).", status),
            },
            ServiceError::Decode { .. } => "Received an unexpected response from the server.".to_string(),
            ServiceError::InvalidArgument { message } => message.clone(),
            ServiceError::NotFound { what } => format!("{} no longer exists.", what),
            ServiceError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

impl From<HttpError> for ServiceError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout { url } => ServiceError::Timeout {
                operation: url.rsplit('/').next().unwrap_or_default().to_string(),
            },
            HttpError::Request { reason, .. } => ServiceError::InvalidArgument { message: reason },
            HttpError::Aborted => ServiceError::Cancelled,
            other @ (HttpError::Connect { .. } | HttpError::Body { .. }) => ServiceError::Transport {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Decode {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_categories() {
        let server = ServiceError::Status {
            status: 503,
            message: "unavailable".to_string(),
        };
        let user = ServiceError::Status {
            status: 400,
            message: "amount isn't numeric".to_string(),
        };
        assert_eq!(server.category(), ErrorCategory::Server);
        assert!(server.is_retryable());
        assert_eq!(user.category(), ErrorCategory::User);
        assert!(!user.is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ServiceError::transport("refused").to_string(),
            "transport error: refused"
        );
        assert_eq!(
            ServiceError::not_found("item").to_string(),
            "item not found"
        );
        assert_eq!(ServiceError::Cancelled.to_string(), "request cancelled");
    }

    #[test]
    fn test_from_http_error() {
        let err: ServiceError = HttpError::Timeout {
            url: "http://api/accountcat.accounting.Accounting/ListCurrency".to_string(),
        }
        .into();
        assert_eq!(
            err,
            ServiceError::Timeout {
                operation: "ListCurrency".to_string()
            }
        );
        assert_eq!(err.error_code(), "E_SVC_TIMEOUT");
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_connect_failure_is_transport() {
        let err: ServiceError = HttpError::Connect {
            url: "http://api/x".to_string(),
            reason: "refused".to_string(),
        }
        .into();
        assert_eq!(err, ServiceError::transport("cannot connect to http://api/x: refused"));
        assert!(err.is_retryable());
        let aborted: ServiceError = HttpError::Aborted.into();
        assert_eq!(aborted, ServiceError::Cancelled);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ServiceError = json_err.into();
        assert!(matches!(err, ServiceError::Decode { .. }));
        assert_eq!(err.category(), ErrorCategory::Client);
    }

    #[test]
    fn test_user_messages_not_empty() {
        let errors = vec![
            ServiceError::transport("x"),
            ServiceError::Timeout {
                operation: "addItem".to_string(),
            },
            ServiceError::Status {
                status: 401,
                message: String::new(),
            },
            ServiceError::invalid_argument("missing amount"),
            ServiceError::Cancelled,
        ];
        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }
}
