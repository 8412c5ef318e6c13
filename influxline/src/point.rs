//! The point data model.
//!
//! A [`Point`] is one measurement observation: a measurement name, a set of
//! tags (indexed string metadata), an ordered set of typed fields, and an
//! optional timestamp.
//!
//! ```rust
//! use influxline::{Point, Value};
//!
//! let point = Point::new("WebServer")
//!     .with_tag("Server", "Host01")
//!     .with_field("CPU", 100)
//!     .with_field("Memory", 50);
//!
//! assert_eq!(point.fields().len(), 2);
//! assert_eq!(point.field("CPU"), Some(&Value::Integer(100)));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::timestamp;
use crate::value::Value;

/// One data point.
///
/// Tags have no order; they are sorted at encode time. Fields keep the
/// order in which they were first added. Setting an existing tag or field
/// key again replaces its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    measurement: String,

    #[serde(default)]
    tags: HashMap<String, Option<String>>,

    #[serde(
        serialize_with = "serialize_fields",
        deserialize_with = "deserialize_fields"
    )]
    fields: Vec<(String, Value)>,

    #[serde(default, with = "timestamp::epoch_nanos")]
    timestamp: Option<SystemTime>,
}

impl Point {
    /// Creates a point with no tags, no fields and no timestamp.
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: HashMap::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Sets a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), Some(value.into()));
        self
    }

    /// Sets a tag whose value may be missing.
    ///
    /// A `None` value is kept so the encoder can report the rejected tag.
    #[must_use]
    pub fn with_optional_tag<V: Into<String>>(
        mut self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        self.tags.insert(key.into(), value.map(Into::into));
        self
    }

    /// Sets a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(key, value);
        self
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Sets the timestamp from epoch nanoseconds.
    #[must_use]
    pub fn with_timestamp_nanos(self, nanos: u64) -> Self {
        self.with_timestamp(timestamp::from_nanos(nanos))
    }

    /// Sets a tag in place.
    pub fn set_tag(&mut self, key: impl Into<String>, value: Option<String>) {
        self.tags.insert(key.into(), value);
    }

    /// Sets a field in place, replacing any existing value for `key`.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Returns the measurement name.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Returns the tags.
    pub fn tags(&self) -> &HashMap<String, Option<String>> {
        &self.tags
    }

    /// Returns the fields in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Returns the value of a field, if set.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the timestamp, if set.
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }
}

fn serialize_fields<S: Serializer>(fields: &[(String, Value)], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(fields.iter().map(|(k, v)| (k, v)))
}

/// Reads a JSON object of fields in document order.
fn deserialize_fields<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, Value)>, D::Error> {
    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Vec<(String, Value)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field names to values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut fields: Vec<(String, Value)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, Value>()? {
                match fields.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => *existing = value,
                    None => fields.push((key, value)),
                }
            }
            Ok(fields)
        }
    }

    d.deserialize_map(FieldsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_everything() {
        let point = Point::new("cpu")
            .with_tag("host", "web1")
            .with_optional_tag("rack", None::<String>)
            .with_field("usage", 85.5)
            .with_timestamp_nanos(1_700_000_000_000_000_000);

        assert_eq!(point.measurement(), "cpu");
        assert_eq!(point.tags().get("host"), Some(&Some("web1".to_string())));
        assert_eq!(point.tags().get("rack"), Some(&None));
        assert_eq!(point.field("usage"), Some(&Value::Float(85.5)));
        assert_eq!(
            timestamp::to_nanos(point.timestamp()),
            Ok(Some(1_700_000_000_000_000_000))
        );
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let point = Point::new("m")
            .with_tag("host", "a")
            .with_tag("host", "b")
            .with_field("x", 1)
            .with_field("y", 2)
            .with_field("x", 3);

        assert_eq!(point.tags().len(), 1);
        assert_eq!(point.tags().get("host"), Some(&Some("b".to_string())));

        // "x" keeps its original position.
        let keys: Vec<_> = point.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(point.field("x"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_deserialize_keeps_field_order() {
        let json = r#"{
            "measurement": "WebServer",
            "tags": {"Server": "Host01", "Cluster": null},
            "fields": {"Memory": 50, "CPU": 100, "Status": "ok", "Ready": null},
            "timestamp": 1700000000000000000
        }"#;

        let point: Point = serde_json::from_str(json).unwrap();

        let keys: Vec<_> = point.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Memory", "CPU", "Status", "Ready"]);
        assert_eq!(point.field("Ready"), Some(&Value::Null));
        assert_eq!(point.tags().get("Cluster"), Some(&None));
        assert_eq!(
            timestamp::to_nanos(point.timestamp()),
            Ok(Some(1_700_000_000_000_000_000))
        );
    }

    #[test]
    fn test_deserialize_minimal_point() {
        let point: Point =
            serde_json::from_str(r#"{"measurement": "m", "fields": {"v": 1.5}}"#).unwrap();

        assert!(point.tags().is_empty());
        assert_eq!(point.timestamp(), None);
        assert_eq!(point.field("v"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_deserialize_rejects_string_timestamp() {
        let result: Result<Point, _> = serde_json::from_str(
            r#"{"measurement": "m", "fields": {"v": 1}, "timestamp": "yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_roundtrip_via_json() {
        let point = Point::new("m")
            .with_tag("a", "b")
            .with_field("z", 1)
            .with_field("a", "x")
            .with_timestamp_nanos(42);

        let json = serde_json::to_string(&point).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, point);
    }
}
