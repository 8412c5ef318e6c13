//! HTTP delivery to an InfluxDB `/write` endpoint.
//!
//! Each body is POSTed to `{server}/write?db={database}` with Basic auth
//! when configured. A 2xx status is success; anything else is returned as
//! [`TransportError::HttpStatus`] carrying the server's response body
//! verbatim. There is no retry at this layer.
//!
//! This module is only available when the `http-write` feature is enabled.
//!
//! # Example
//!
//! ```rust,no_run
//! use influxline::{BatchWriter, EncodeOptions, HttpSink, Point, WriteConfig, WriteMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WriteConfig::new("http://localhost:8086", "vsphere").with_auth("writer", "s3cret");
//! let mut writer = BatchWriter::new(HttpSink::new(&config)?);
//!
//! let points = vec![Point::new("WebServer").with_tag("Server", "Host01").with_field("CPU", 100)];
//! let report = writer.encode_and_write(&points, &EncodeOptions::default(), WriteMode::Bulk);
//!
//! for failure in report.result.failures() {
//!     eprintln!("write failed: {:?}", failure.error);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::header::CONTENT_TYPE;

use crate::config::{BasicAuth, WriteConfig};
use crate::error::{Result, TransportError};
use crate::sink::{Delivered, Sink};
use crate::writer::BatchWriter;

/// A [`Sink`] that POSTs bodies to an InfluxDB write endpoint.
#[derive(Debug)]
pub struct HttpSink {
    client: reqwest::blocking::Client,
    url: String,
    database: String,
    auth: Option<BasicAuth>,
}

impl HttpSink {
    /// Builds an HTTP sink from `config`.
    ///
    /// # Errors
    ///
    /// Returns a config error if `config` does not validate, or
    /// [`TransportError::ClientCreate`] if the HTTP client cannot be built.
    pub fn new(config: &WriteConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::ClientCreate { source: e })?;

        Ok(Self {
            client,
            url: config.write_url(),
            database: config.database.clone(),
            auth: config.auth.clone(),
        })
    }

    /// The write URL, without the query string.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Sink for HttpSink {
    fn send(&mut self, body: &str, lines: usize) -> std::result::Result<Delivered, TransportError> {
        let mut request = self
            .client
            .post(&self.url)
            .query(&[("db", self.database.as_str())])
            .header(CONTENT_TYPE, "text/plain; charset=utf-8");

        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        tracing::debug!(url = %self.url, db = %self.database, lines, "POST write");

        let resp = request
            .body(body.to_string())
            .send()
            .map_err(|e| TransportError::Request { source: e })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(Delivered {
                status: Some(status.as_u16()),
            });
        }

        let body = resp.text().unwrap_or_default();
        Err(TransportError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

impl BatchWriter<HttpSink> {
    /// Creates a writer that delivers to the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// See [`HttpSink::new`].
    pub fn from_config(config: &WriteConfig) -> Result<Self> {
        Ok(Self::new(HttpSink::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, InfluxLineError};

    #[test]
    fn test_new_validates_config() {
        let err = HttpSink::new(&WriteConfig::new("localhost:8086", "db")).unwrap_err();
        assert!(matches!(
            err,
            InfluxLineError::Config(ConfigError::InvalidServer { .. })
        ));
    }

    #[test]
    fn test_url_is_built_from_server() {
        let sink = HttpSink::new(&WriteConfig::new("http://influx:8086/", "db")).unwrap();
        assert_eq!(sink.url(), "http://influx:8086/write");
    }

    #[test]
    fn test_unreachable_server_is_request_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let config = WriteConfig::new("http://127.0.0.1:9", "db")
            .with_timeout(std::time::Duration::from_secs(2));
        let mut sink = HttpSink::new(&config).unwrap();

        let err = sink.send("m v=1i", 1).unwrap_err();
        assert!(matches!(err, TransportError::Request { .. }));
        assert_eq!(err.status(), None);
    }
}
