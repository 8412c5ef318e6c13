//! Typed field values and their line-protocol literals.
//!
//! The kind of a value is declared by the caller through the [`Value`]
//! variant. Formatting never looks at the contents of a string to decide
//! whether it "is a number": `Value::String("123")` stays a quoted string.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::escape::{QUOTE_BACKSLASH, push_escaped};

/// A field value.
///
/// `Null` is a first-class variant because collectors routinely report
/// metrics that have not been populated yet. An empty `String` is treated
/// the same way (see [`Value::is_empty`]).
///
/// From JSON, values deserialize by their JSON type: `null` is `Null`, an
/// integral number is `Integer` (or `UInteger` above `i64::MAX`), any other
/// number is `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Signed 64-bit integer, written with an `i` suffix.
    Integer(i64),
    /// Unsigned 64-bit integer, written with a `u` suffix.
    UInteger(u64),
    /// 64-bit float.
    Float(f64),
    /// Boolean, written as `true` / `false`.
    Boolean(bool),
    /// String, written escaped and double-quoted.
    String(String),
    /// No value.
    Null,
}

impl Value {
    /// Returns `true` if this value cannot be written as a field.
    ///
    /// That is `Null`, the empty string, and non-finite floats (line
    /// protocol has no literal for `NaN` or infinity).
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::Float(f) => !f.is_finite(),
            Self::Integer(_) | Self::UInteger(_) | Self::Boolean(_) => false,
        }
    }

    /// Renders the value as a line-protocol field literal.
    ///
    /// Returns `None` (skip) for empty values; the caller must then omit
    /// the field entirely.
    ///
    /// ```rust
    /// use influxline::Value;
    ///
    /// assert_eq!(Value::Integer(-42).format().as_deref(), Some("-42i"));
    /// assert_eq!(Value::Float(0.5).format().as_deref(), Some("0.5"));
    /// assert_eq!(Value::from("123").format().as_deref(), Some("\"123\""));
    /// assert_eq!(Value::Null.format(), None);
    /// ```
    pub fn format(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        self.write_literal(&mut out);
        Some(out)
    }

    /// Appends the literal for a non-empty value to `out`.
    pub(crate) fn write_literal(&self, out: &mut String) {
        // Writing to a String cannot fail.
        let _ = match self {
            Self::Integer(v) => write!(out, "{v}i"),
            Self::UInteger(v) => write!(out, "{v}u"),
            Self::Float(v) => write!(out, "{v}"),
            Self::Boolean(v) => write!(out, "{v}"),
            Self::String(s) => {
                out.push('"');
                push_escaped(out, s, QUOTE_BACKSLASH);
                out.push('"');
                Ok(())
            }
            Self::Null => Ok(()),
        };
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInteger(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
