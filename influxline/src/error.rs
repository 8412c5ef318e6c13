//! Error types for line-protocol encoding and delivery.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for all influxline operations.
#[derive(Error, Debug)]
pub enum InfluxLineError {
    /// A point could not be encoded into a line.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// A write request failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Write configuration could not be loaded or is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that make a single point unwritable.
///
/// An encode error is fatal to that one point only. The point produces no
/// line; callers decide whether to count it as a dropped metric.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The measurement name is empty.
    #[error("measurement name is empty")]
    EmptyMeasurement,

    /// The measurement name contains `\n` or `\r`.
    #[error("measurement name {measurement:?} contains a line break")]
    LineBreakInMeasurement {
        /// The (unescaped) measurement name of the dropped point.
        measurement: String,
    },

    /// A field key contains `\n` or `\r`.
    #[error("field key {field:?} of point '{measurement}' contains a line break")]
    LineBreakInFieldKey {
        /// The (unescaped) measurement name of the dropped point.
        measurement: String,
        /// The offending field key.
        field: String,
    },

    /// Every field was null or empty, so there is nothing to write.
    #[error("point '{measurement}' has no writable fields")]
    NoFields {
        /// The (unescaped) measurement name of the dropped point.
        measurement: String,
    },

    /// The point timestamp cannot be expressed as epoch nanoseconds.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] TimestampError),
}

/// Errors converting an instant to Unix-epoch nanoseconds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    /// The instant lies before 1970-01-01T00:00:00Z.
    #[error("instant is before the Unix epoch")]
    BeforeEpoch,

    /// The instant does not fit in 64-bit nanoseconds.
    #[error("instant exceeds the representable nanosecond range")]
    Overflow,
}

/// Errors delivering a request body to the write endpoint.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to create HTTP client.
    #[cfg(feature = "http-write")]
    #[error("failed to create HTTP client: {source}")]
    ClientCreate {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint could not be reached or the request did not complete.
    #[cfg(feature = "http-write")]
    #[error("HTTP request failed: {source}")]
    Request {
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-2xx status.
    ///
    /// `body` is the response body exactly as the server sent it, so
    /// server-side rejection reasons (field type conflicts, parse errors)
    /// reach the operator unmodified.
    #[error("server returned status {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// The response body text.
        body: String,
    },

    /// The request never produced a status (non-HTTP sinks, closed channels).
    #[error("sink unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

impl TransportError {
    /// Returns the HTTP status code, if the endpoint produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors loading or validating a [`WriteConfig`](crate::config::WriteConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config from '{}': {source}", path.display())]
    Read {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a config file as JSON.
    #[error("failed to parse config from '{}': {source}", path.display())]
    Parse {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON parsing error.
        #[source]
        source: serde_json::Error,
    },

    /// The server URL is not an http(s) URL.
    #[error("invalid server URL '{server}': must start with http:// or https://")]
    InvalidServer {
        /// The rejected server URL.
        server: String,
    },

    /// No database name was given.
    #[error("database name is empty")]
    EmptyDatabase,
}

/// Type alias for `Result<T, InfluxLineError>`.
pub type Result<T> = std::result::Result<T, InfluxLineError>;
