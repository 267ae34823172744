//! Shutter controller connection settings.

use std::fmt;
use std::time::Duration;

use shutterhub_domain::direction::Direction;

/// Where the controller lives and how to authenticate against it.
#[derive(Clone)]
pub struct ShutterHttpConfig {
    /// Host (`192.168.0.105`) or full base URL (`http://host:port`).
    pub address: String,
    pub login: String,
    pub password: String,
    /// Path that opens the shutters.
    pub open_path: String,
    /// Path that closes the shutters.
    pub close_path: String,
    pub timeout: Duration,
}

impl ShutterHttpConfig {
    /// Settings with the controller's stock paths (`right` opens, `left`
    /// closes) and a 10 second timeout.
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            login: login.into(),
            password: password.into(),
            open_path: "right".to_string(),
            close_path: "left".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_paths(mut self, open_path: impl Into<String>, close_path: impl Into<String>) -> Self {
        self.open_path = open_path.into();
        self.close_path = close_path.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for a move in `direction`. Bare hosts get `http://`.
    pub(crate) fn url_for(&self, direction: Direction) -> String {
        let base = self.address.trim_end_matches('/');
        let path = match direction {
            Direction::Open => &self.open_path,
            Direction::Close => &self.close_path,
        };
        let path = path.trim_start_matches('/');
        if base.contains("://") {
            format!("{base}/{path}")
        } else {
            format!("http://{base}/{path}")
        }
    }
}

impl fmt::Debug for ShutterHttpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutterHttpConfig")
            .field("address", &self.address)
            .field("login", &self.login)
            .field("password", &"***")
            .field("open_path", &self.open_path)
            .field("close_path", &self.close_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}
