//! Write endpoint configuration.
//!
//! A [`WriteConfig`] names the InfluxDB server and database, optional Basic
//! credentials, the request timeout and the default [`WriteMode`]. It can be
//! built in code or loaded from a JSON file.
//!
//! ```rust
//! use std::time::Duration;
//! use influxline::{WriteConfig, WriteMode};
//!
//! let config = WriteConfig::new("http://localhost:8086", "vsphere")
//!     .with_auth("writer", "s3cret")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_mode(WriteMode::PerPoint);
//!
//! assert_eq!(config.write_url(), "http://localhost:8086/write");
//! ```
//!
//! The JSON form:
//!
//! ```json
//! {
//!   "server": "http://localhost:8086",
//!   "database": "vsphere",
//!   "auth": { "username": "writer", "password": "s3cret" },
//!   "timeout": { "secs": 10, "nanos": 0 },
//!   "mode": "bulk"
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::writer::WriteMode;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Basic credentials, applied to every request of a write.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl BasicAuth {
    /// Creates credentials from a user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for an InfluxDB write endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteConfig {
    /// Server base URL (e.g., `http://localhost:8086`).
    pub server: String,
    /// Target database, sent as the `db` query parameter.
    pub database: String,
    /// Optional Basic credentials.
    #[serde(default)]
    pub auth: Option<BasicAuth>,
    /// HTTP timeout for each request.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,
    /// Delivery mode used when none is given explicitly.
    #[serde(default)]
    pub mode: WriteMode,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl WriteConfig {
    /// Creates a new config with sensible defaults.
    ///
    /// Defaults: no auth, 30s timeout, bulk mode.
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            mode: WriteMode::default(),
        }
    }

    /// Loads a config from a JSON file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the loaded config is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sets Basic credentials.
    #[must_use]
    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth::new(username, password));
        self
    }

    /// Sets the HTTP timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the default delivery mode.
    #[must_use]
    pub fn with_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServer`] unless the server is an
    /// `http://` or `https://` URL with a host, and
    /// [`ConfigError::EmptyDatabase`] if no database is named.
    pub fn validate(&self) -> Result<()> {
        let host = self
            .server
            .strip_prefix("http://")
            .or_else(|| self.server.strip_prefix("https://"));
        if host.is_none_or(|h| h.trim_matches('/').is_empty()) {
            return Err(ConfigError::InvalidServer {
                server: self.server.clone(),
            }
            .into());
        }

        if self.database.trim().is_empty() {
            return Err(ConfigError::EmptyDatabase.into());
        }

        Ok(())
    }

    /// The write endpoint URL, without the query string.
    pub fn write_url(&self) -> String {
        format!("{}/write", self.server.trim_end_matches('/'))
    }
}
