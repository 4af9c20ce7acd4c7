//! Coarse classification of failed calls.

use std::fmt;

/// Which side of a failed call is at fault.
///
/// Nothing in the view layer resubmits on its own; the category only decides
/// what the user is told and whether pressing the button again could help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The backend was never reached, or did not answer in time.
    Network,
    /// The backend answered with a 5xx.
    Server,
    /// Request or reply did not fit the protocol.
    Client,
    /// The backend turned the input down.
    User,
}

impl ErrorCategory {
    /// Whether sending the same input again may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
        }
    }

    /// What the user can do about it.
    pub fn hint(self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check the connection, then submit again",
            ErrorCategory::Server => "AccountCat is having trouble; try again in a moment",
            ErrorCategory::Client => "Reload the page; the app may be out of date",
            ErrorCategory::User => "Correct the highlighted input and submit again",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
