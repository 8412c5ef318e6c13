//! # influxline
//!
//! InfluxDB line-protocol encoder and batched HTTP writer.
//!
//! influxline turns tag/metric samples into InfluxDB line protocol and
//! delivers them to an InfluxDB `/write` endpoint, one point per request or
//! all points in a single request. Encoding is strict about the parts of the
//! format that silently corrupt data when wrong: escaping, numeric type
//! suffixes, timestamp precision and deterministic tag order.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Values carry their kind explicitly; a string that reads `"123"` stays a string
//! - Identical points always encode to identical lines (tags are sorted)
//! - Empty tags and fields are dropped with a signal, never written
//! - A point with no writable fields produces no line at all
//! - Synchronous, no background threads, no retries behind the caller's back
//!
//! ## Quick Start
//!
//! ```rust
//! use influxline::{Batch, BatchWriter, EncodeOptions, MemorySink, Point, WriteMode};
//!
//! let points = vec![
//!     Point::new("WebServer")
//!         .with_tag("Server", "Host01")
//!         .with_field("CPU", 100)
//!         .with_field("Memory", ""),
//!     Point::new("WebServer")
//!         .with_tag("Server", "Host02")
//!         .with_field("status", "ok")
//!         .with_timestamp_nanos(1_700_000_000_000_000_000),
//! ];
//!
//! // Encode only
//! let report = Batch::encode_points(&points, &EncodeOptions::exclude_empty_fields());
//! assert_eq!(
//!     report.batch.to_body(),
//!     "WebServer,Server=Host01 CPU=100i\n\
//!      WebServer,Server=Host02 status=\"ok\" 1700000000000000000"
//! );
//!
//! // Encode and deliver (swap MemorySink for HttpSink to POST to InfluxDB)
//! let mut writer = BatchWriter::new(MemorySink::new());
//! let result = writer.write(&report.batch, WriteMode::PerPoint);
//! assert_eq!(result.requests(), 2);
//! ```
//!
//! ## Architecture
//!
//! - [`Point`] — Measurement, tags, typed fields, optional timestamp
//! - [`Value`] — Tagged field value and its line-protocol literal
//! - [`encode`] — One point to one [`EncodedLine`]
//! - [`Batch`] — Ordered lines for one write call
//! - [`BatchWriter`] — Per-point or bulk delivery to a [`Sink`]
//! - [`HttpSink`] — Sink POSTing to `{server}/write?db={database}`
//!
//! ## Modules
//!
//! - [`escape`] — Escaping rules per line-protocol context
//! - [`value`] — Field values and formatting
//! - [`timestamp`] — Instant to epoch-nanosecond conversion
//! - [`point`] — The point data model
//! - [`encoder`] — Point encoding
//! - [`batch`] — Batches of encoded lines
//! - [`sink`] — The sink trait and in-process sinks
//! - [`writer`] — Batch delivery and per-request outcomes
//! - [`config`] — Endpoint configuration
//! - `http` — HTTP sink (feature `http-write`)
//! - [`error`] — Error types

pub mod batch;
pub mod config;
pub mod encoder;
pub mod error;
pub mod escape;
#[cfg(feature = "http-write")]
pub mod http;
pub mod point;
pub mod sink;
pub mod timestamp;
pub mod value;
pub mod writer;

// Re-export primary API types at crate root for convenience.
pub use batch::{Batch, DroppedPoint, EncodeReport};
pub use config::{BasicAuth, WriteConfig};
pub use encoder::{EncodeOptions, Encoded, EncodedLine, encode};
pub use error::{
    ConfigError, EncodeError, InfluxLineError, Result, TimestampError, TransportError,
};
#[cfg(feature = "http-write")]
pub use http::HttpSink;
pub use point::Point;
pub use sink::{Delivered, IoSink, MemorySink, Sink};
pub use value::Value;
pub use writer::{BatchWriter, PointsReport, RequestOutcome, StatusCategory, WriteMode, WriteResult};
