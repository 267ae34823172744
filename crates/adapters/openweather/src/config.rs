//! OpenWeatherMap client configuration.

use std::fmt;
use std::time::Duration;

/// Public API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Connection settings for the One Call API.
#[derive(Clone)]
pub struct OpenWeatherConfig {
    /// Scheme and host, without the `/data/3.0/onecall` path.
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    /// Settings for the public API with a 10 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn onecall_url(&self) -> String {
        format!("{}/data/3.0/onecall", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenWeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}
