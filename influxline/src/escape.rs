//! Line-protocol escaping rules.
//!
//! Each part of a line has its own set of special characters:
//!
//! | Context | Escaped characters |
//! |---|---|
//! | measurement | `,` and space |
//! | tag key, tag value, field key | `,`, `=` and space |
//! | string field value | `"` and `\` |
//!
//! Every special character gets a single preceding backslash and nothing
//! else changes. Escaping is **not** idempotent: escaping an already-escaped
//! string escapes it again. Raw input must be escaped exactly once.
//!
//! A backslash is only special inside string field values. A tag value or
//! measurement that ends in `\` is written as-is, and the following space or
//! comma then reads as escaped to most parsers (`path=C:\ v=1i`). Such
//! values do not round-trip; strip or replace the trailing backslash before
//! encoding if that matters.
//!
//! ```rust
//! use influxline::escape;
//!
//! assert_eq!(escape::escape_measurement("cpu load,total"), r"cpu\ load\,total");
//! assert_eq!(escape::escape_tag("a=b"), r"a\=b");
//! assert_eq!(escape::escape_string_field(r#"say "hi""#), r#"say \"hi\""#);
//! ```

const COMMA_SPACE: [char; 2] = [',', ' '];
pub(crate) const COMMA_EQ_SPACE: [char; 3] = [',', '=', ' '];
pub(crate) const QUOTE_BACKSLASH: [char; 2] = ['"', '\\'];

/// Escapes a measurement name.
pub fn escape_measurement(src: &str) -> String {
    escape(src, COMMA_SPACE)
}

/// Escapes a tag key or a tag value.
pub fn escape_tag(src: &str) -> String {
    escape(src, COMMA_EQ_SPACE)
}

/// Escapes a field key.
pub fn escape_field_key(src: &str) -> String {
    escape(src, COMMA_EQ_SPACE)
}

/// Escapes the contents of a string field value.
///
/// The result is not quoted; wrapping in double quotes is left to
/// [`Value::format`](crate::value::Value::format).
pub fn escape_string_field(src: &str) -> String {
    escape(src, QUOTE_BACKSLASH)
}

fn escape<const N: usize>(src: &str, special_characters: [char; N]) -> String {
    let mut out = String::with_capacity(src.len());
    push_escaped(&mut out, src, special_characters);
    out
}

/// Appends `src` to `out`, prefixing each special character with `\`.
pub(crate) fn push_escaped<const N: usize>(
    out: &mut String,
    src: &str,
    special_characters: [char; N],
) {
    for c in src.chars() {
        if special_characters.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
