//! View-layer configuration.

use std::time::Duration;

/// Environment variable overriding [`ViewConfig::api_base_url`].
pub const API_URL_ENV: &str = "ACCOUNTCAT_API_URL";
/// Environment variable overriding [`ViewConfig::default_currency`].
pub const DEFAULT_CURRENCY_ENV: &str = "ACCOUNTCAT_DEFAULT_CURRENCY";

/// Settings shared by every screen.
///
/// Use the builder pattern to customize.
///
/// # Example
///
/// ```ignore
/// use accountcat_view::config::ViewConfig;
///
/// let config = ViewConfig::from_env()
///     .with_default_currency("USD")
///     .with_banner_duration(Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    /// Base URL of the RPC endpoints (default: http://localhost:8080/api)
    pub api_base_url: String,
    /// Currency preselected in the accounting form (default: TWD)
    pub default_currency: String,
    /// How long a save/revoke banner stays open (default: 5s)
    pub banner_duration: Duration,
    /// Transport timeout for each HTTP request (default: 30s)
    pub request_timeout: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            default_currency: "TWD".to_string(),
            banner_duration: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    pub fn with_banner_duration(mut self, duration: Duration) -> Self {
        self.banner_duration = duration;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Defaults overridden by `ACCOUNTCAT_API_URL` and
    /// `ACCOUNTCAT_DEFAULT_CURRENCY`. Blank values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = non_blank(API_URL_ENV) {
            config = config.with_api_base_url(url.trim());
        }
        if let Some(currency) = non_blank(DEFAULT_CURRENCY_ENV) {
            config = config.with_default_currency(currency.trim().to_uppercase());
        }
        config
    }
}
