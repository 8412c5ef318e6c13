//! Batch delivery.
//!
//! [`BatchWriter`] hands a [`Batch`] to a [`Sink`] in one of two modes:
//!
//! - [`WriteMode::PerPoint`] — one request per line, sequentially, in batch
//!   order. A failed request is reported and the next line is still sent.
//! - [`WriteMode::Bulk`] — all lines joined by `\n` into exactly one request.
//!   A failure fails the whole request. InfluxDB does not apply multi-line
//!   writes transactionally, so neither does this layer.
//!
//! Nothing is retried here; [`WriteResult`] reports every request outcome
//! and the caller decides what to do about failures.
//!
//! ```rust
//! use influxline::{BatchWriter, EncodeOptions, MemorySink, Point, WriteMode};
//!
//! let points = vec![
//!     Point::new("cpu").with_tag("host", "esx01").with_field("usage", 12.5),
//!     Point::new("cpu").with_tag("host", "esx02").with_field("usage", 80.0),
//! ];
//!
//! let mut writer = BatchWriter::new(MemorySink::new());
//! let report = writer.encode_and_write(&points, &EncodeOptions::default(), WriteMode::Bulk);
//!
//! assert!(report.result.is_success());
//! assert_eq!(
//!     writer.sink().bodies(),
//!     ["cpu,host=esx01 usage=12.5\ncpu,host=esx02 usage=80"]
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::batch::{Batch, DroppedPoint};
use crate::encoder::EncodeOptions;
use crate::error::TransportError;
use crate::point::Point;
use crate::sink::Sink;

/// How a batch is split into requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// One request per line.
    PerPoint,
    /// One request carrying every line.
    #[default]
    Bulk,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerPoint => f.write_str("per-point"),
            Self::Bulk => f.write_str("bulk"),
        }
    }
}

/// Coarse classification of a request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Accepted (2xx, or a non-HTTP sink that accepted the body).
    Success,
    /// The endpoint rejected the request (4xx), e.g. a field type conflict.
    ClientError,
    /// The endpoint failed (5xx).
    ServerError,
    /// No response: connection refused, timeout, sink I/O failure.
    Unreachable,
    /// Any other status.
    Other,
}

impl StatusCategory {
    /// Classifies an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }

    /// Classifies a transport failure.
    pub fn from_error(error: &TransportError) -> Self {
        match error.status() {
            Some(status) => Self::from_status(status),
            None => Self::Unreachable,
        }
    }
}

/// The outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    /// Number of lines carried by the request.
    pub lines: usize,
    /// Outcome class.
    pub category: StatusCategory,
    /// HTTP status, when one was received.
    pub status: Option<u16>,
    /// Error text; for HTTP failures this includes the endpoint's body verbatim.
    pub error: Option<String>,
}

impl RequestOutcome {
    /// Returns `true` if the request was accepted.
    pub fn is_success(&self) -> bool {
        self.category == StatusCategory::Success
    }
}

/// Per-request outcomes of one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    /// The mode the batch was written in.
    pub mode: WriteMode,
    /// One entry per request issued, in issue order.
    pub outcomes: Vec<RequestOutcome>,
}

impl WriteResult {
    /// Returns `true` if every request was accepted (vacuously for no requests).
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RequestOutcome::is_success)
    }

    /// Number of requests issued.
    pub fn requests(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of lines in accepted requests.
    pub fn lines_written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.lines)
            .sum()
    }

    /// Iterates over the failed requests.
    pub fn failures(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Result of [`BatchWriter::encode_and_write`].
#[derive(Debug)]
pub struct PointsReport {
    /// Points that produced no line and were never sent.
    pub dropped: Vec<DroppedPoint>,
    /// Total tags dropped for empty values.
    pub rejected_tags: usize,
    /// Total fields dropped for empty values.
    pub skipped_fields: usize,
    /// Delivery outcome of the encoded lines.
    pub result: WriteResult,
}

/// Delivers batches to a sink.
#[derive(Debug)]
pub struct BatchWriter<S> {
    sink: S,
}

impl<S: Sink> BatchWriter<S> {
    /// Creates a writer over `sink`.
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the writer, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Writes `batch` in `mode`.
    ///
    /// An empty batch issues no request.
    pub fn write(&mut self, batch: &Batch, mode: WriteMode) -> WriteResult {
        let outcomes = match mode {
            WriteMode::PerPoint => self.write_per_point(batch),
            WriteMode::Bulk => self.write_bulk(batch),
        };
        WriteResult { mode, outcomes }
    }

    /// Encodes `points` and writes the resulting batch in `mode`.
    ///
    /// Points that fail to encode are dropped before delivery.
    pub fn encode_and_write<'a, I>(
        &mut self,
        points: I,
        options: &EncodeOptions,
        mode: WriteMode,
    ) -> PointsReport
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let report = Batch::encode_points(points, options);
        let result = self.write(&report.batch, mode);
        PointsReport {
            dropped: report.dropped,
            rejected_tags: report.rejected_tags,
            skipped_fields: report.skipped_fields,
            result,
        }
    }

    fn write_per_point(&mut self, batch: &Batch) -> Vec<RequestOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for (index, line) in batch.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let outcome = self.send(line.as_str(), 1);
            if let Some(error) = &outcome.error {
                tracing::warn!(index, %error, "per-point write failed, continuing");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    fn write_bulk(&mut self, batch: &Batch) -> Vec<RequestOutcome> {
        if batch.is_empty() {
            tracing::debug!("empty batch, nothing to write");
            return Vec::new();
        }
        let outcome = self.send(&batch.to_body(), batch.len());
        if let Some(error) = &outcome.error {
            tracing::warn!(lines = batch.len(), %error, "bulk write failed");
        }
        vec![outcome]
    }

    fn send(&mut self, body: &str, lines: usize) -> RequestOutcome {
        tracing::trace!(lines, bytes = body.len(), "sending request");
        match self.sink.send(body, lines) {
            Ok(delivered) => RequestOutcome {
                lines,
                category: StatusCategory::Success,
                status: delivered.status,
                error: None,
            },
            Err(error) => RequestOutcome {
                lines,
                category: StatusCategory::from_error(&error),
                status: error.status(),
                error: Some(error.to_string()),
            },
        }
    }
}
