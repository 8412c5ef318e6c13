//! Point → line-protocol encoding.
//!
//! [`encode`] turns one [`Point`] into one [`EncodedLine`]:
//!
//! ```text
//! measurement[,tag1=v1,tag2=v2,...] field1=v1[,field2=v2,...][ timestampNanos]
//! ```
//!
//! - Tags with a null or empty value are dropped and reported at `warn`
//!   level; InfluxDB rejects empty tag values.
//! - Tag `key=value` pairs are sorted before joining, so the same point
//!   always serializes to the same line whatever the tag insertion order.
//! - Fields with a null or empty value are dropped and reported at `trace`
//!   (when [`EncodeOptions::exclude_empty_fields`] asked for it) or `debug`
//!   level. Field order follows insertion order.
//! - A point left with no fields produces no line at all.
//!
//! ```rust
//! use influxline::{EncodeOptions, Point, encode};
//!
//! let point = Point::new("WebServer")
//!     .with_tag("Server", "Host01")
//!     .with_field("CPU", 100)
//!     .with_field("Memory", 50);
//!
//! let encoded = encode(&point, &EncodeOptions::default()).unwrap();
//! assert_eq!(encoded.line.as_str(), "WebServer,Server=Host01 CPU=100i,Memory=50i");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;
use crate::escape::{self, COMMA_EQ_SPACE, push_escaped};
use crate::point::Point;
use crate::timestamp;

/// Options controlling how points are encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Caller explicitly asked for null/empty fields to be filtered out.
    ///
    /// Empty fields are dropped either way (line protocol cannot represent
    /// them); this flag only lowers the log level to `trace`, marking the
    /// drop as intentional.
    #[serde(default)]
    pub exclude_empty_fields: bool,
}

impl EncodeOptions {
    /// Options with `exclude_empty_fields` set.
    pub fn exclude_empty_fields() -> Self {
        Self {
            exclude_empty_fields: true,
        }
    }
}

/// A single encoded line of line protocol, without a trailing newline.
///
/// Produced once per point and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedLine(String);

impl EncodedLine {
    /// Returns the line as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the line as UTF-8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length of the line in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the line is empty, which [`encode`] never produces.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the line, returning the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncodedLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The result of encoding one point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The encoded line.
    pub line: EncodedLine,
    /// Tag keys dropped because the key or value was null, empty or held a
    /// line break, sorted.
    pub rejected_tags: Vec<String>,
    /// Field keys dropped because the value was null or empty or the key was
    /// empty, in field order.
    pub skipped_fields: Vec<String>,
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// Why a tag cannot be written, if it cannot.
fn tag_rejection(key: &str, value: Option<&str>) -> Option<&'static str> {
    match value {
        _ if key.is_empty() => Some("empty key"),
        None | Some("") => Some("empty value"),
        Some(value) if has_line_break(key) || has_line_break(value) => Some("line break"),
        Some(_) => None,
    }
}

/// Encodes one point as a line of line protocol.
///
/// # Errors
///
/// - [`EncodeError::EmptyMeasurement`] if the measurement name is empty.
/// - [`EncodeError::LineBreakInMeasurement`] or
///   [`EncodeError::LineBreakInFieldKey`] if the measurement or a field key
///   contains `\n` or `\r`; escaping cannot make those safe.
/// - [`EncodeError::NoFields`] if no field survives empty-value filtering.
/// - [`EncodeError::Timestamp`] if the timestamp is before the epoch or out
///   of range.
///
/// In every error case no line is produced. Tags with a line break are
/// dropped like tags with an empty value, so an encoded line never spans
/// more than one line of output.
pub fn encode(point: &Point, options: &EncodeOptions) -> Result<Encoded, EncodeError> {
    if point.measurement().is_empty() {
        return Err(EncodeError::EmptyMeasurement);
    }
    if has_line_break(point.measurement()) {
        return Err(EncodeError::LineBreakInMeasurement {
            measurement: point.measurement().to_string(),
        });
    }
    let measurement = escape::escape_measurement(point.measurement());

    let mut rejected = Vec::new();
    let mut tag_pairs = Vec::with_capacity(point.tags().len());
    for (key, value) in point.tags() {
        if let Some(reason) = tag_rejection(key, value.as_deref()) {
            rejected.push((key.clone(), reason));
            continue;
        }
        let value = value.as_deref().unwrap_or_default();
        let mut pair = String::with_capacity(key.len() + value.len() + 1);
        push_escaped(&mut pair, key, COMMA_EQ_SPACE);
        pair.push('=');
        push_escaped(&mut pair, value, COMMA_EQ_SPACE);
        tag_pairs.push(pair);
    }
    tag_pairs.sort_unstable();
    rejected.sort_unstable();

    for (key, reason) in &rejected {
        tracing::warn!(
            measurement = point.measurement(),
            tag = key.as_str(),
            reason,
            "dropping unwritable tag"
        );
    }
    let rejected_tags: Vec<String> = rejected.into_iter().map(|(key, _)| key).collect();

    if let Some((key, _)) = point.fields().iter().find(|(key, _)| has_line_break(key)) {
        return Err(EncodeError::LineBreakInFieldKey {
            measurement: point.measurement().to_string(),
            field: key.clone(),
        });
    }

    let mut field_set = String::new();
    let mut skipped_fields = Vec::new();
    for (key, value) in point.fields() {
        if key.is_empty() {
            tracing::debug!(
                measurement = point.measurement(),
                "skipping field with empty key"
            );
            skipped_fields.push(key.clone());
            continue;
        }
        if value.is_empty() {
            if options.exclude_empty_fields {
                tracing::trace!(
                    measurement = point.measurement(),
                    field = key.as_str(),
                    "excluding empty field"
                );
            } else {
                tracing::debug!(
                    measurement = point.measurement(),
                    field = key.as_str(),
                    "skipping empty field"
                );
            }
            skipped_fields.push(key.clone());
            continue;
        }

        if !field_set.is_empty() {
            field_set.push(',');
        }
        push_escaped(&mut field_set, key, COMMA_EQ_SPACE);
        field_set.push('=');
        value.write_literal(&mut field_set);
    }

    if field_set.is_empty() {
        return Err(EncodeError::NoFields {
            measurement: point.measurement().to_string(),
        });
    }

    let timestamp = timestamp::to_nanos(point.timestamp())?;

    let tags_len: usize = tag_pairs.iter().map(|p| p.len() + 1).sum();
    let mut line = String::with_capacity(measurement.len() + tags_len + field_set.len() + 21);
    line.push_str(&measurement);
    for pair in &tag_pairs {
        line.push(',');
        line.push_str(pair);
    }
    line.push(' ');
    line.push_str(&field_set);
    if let Some(nanos) = timestamp {
        line.push(' ');
        line.push_str(&nanos.to_string());
    }

    Ok(Encoded {
        line: EncodedLine(line),
        rejected_tags,
        skipped_fields,
    })
}
