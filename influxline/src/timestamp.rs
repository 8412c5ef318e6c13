//! Conversion of instants to Unix-epoch nanoseconds.
//!
//! Line protocol timestamps default to nanosecond precision. A point without
//! a timestamp is stamped by the server with its write-receipt time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::TimestampError;

/// Converts an optional instant to nanoseconds since the Unix epoch.
///
/// `None` stays `None`. The full sub-second precision of the instant is kept.
///
/// # Errors
///
/// Returns [`TimestampError::BeforeEpoch`] for instants before 1970 and
/// [`TimestampError::Overflow`] for instants past the `u64` nanosecond range
/// (year 2554).
pub fn to_nanos(t: Option<SystemTime>) -> Result<Option<u64>, TimestampError> {
    t.map(system_time_to_nanos).transpose()
}

/// Converts an instant to nanoseconds since the Unix epoch.
///
/// # Errors
///
/// See [`to_nanos`].
pub fn system_time_to_nanos(t: SystemTime) -> Result<u64, TimestampError> {
    let since_epoch = t
        .duration_since(UNIX_EPOCH)
        .map_err(|_| TimestampError::BeforeEpoch)?;
    u64::try_from(since_epoch.as_nanos()).map_err(|_| TimestampError::Overflow)
}

/// Scales a millisecond-resolution epoch timestamp up to nanoseconds.
///
/// # Errors
///
/// Returns [`TimestampError::Overflow`] if the result does not fit in `u64`.
pub fn millis_to_nanos(millis: u64) -> Result<u64, TimestampError> {
    millis
        .checked_mul(1_000_000)
        .ok_or(TimestampError::Overflow)
}

/// Scales a second-resolution epoch timestamp up to nanoseconds.
///
/// # Errors
///
/// Returns [`TimestampError::Overflow`] if the result does not fit in `u64`.
pub fn secs_to_nanos(secs: u64) -> Result<u64, TimestampError> {
    secs.checked_mul(1_000_000_000)
        .ok_or(TimestampError::Overflow)
}

/// Builds the instant `nanos` nanoseconds after the Unix epoch.
pub fn from_nanos(nanos: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_nanos(nanos)
}

/// Serde adapter for `Option<SystemTime>` as integer epoch nanoseconds.
///
/// Used with `#[serde(with = "crate::timestamp::epoch_nanos")]`.
pub mod epoch_nanos {
    use std::time::SystemTime;

    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    /// Serializes an optional instant as epoch nanoseconds (or `null`).
    ///
    /// # Errors
    ///
    /// Fails for instants before the epoch or past the `u64` range.
    pub fn serialize<S: Serializer>(t: &Option<SystemTime>, s: S) -> Result<S::Ok, S::Error> {
        match super::to_nanos(*t).map_err(ser::Error::custom)? {
            Some(nanos) => s.serialize_some(&nanos),
            None => s.serialize_none(),
        }
    }

    /// Deserializes epoch nanoseconds (or `null`) into an optional instant.
    ///
    /// # Errors
    ///
    /// Fails if the value is not an unsigned integer or `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SystemTime>, D::Error> {
        let nanos = Option::<u64>::deserialize(d).map_err(|e| {
            de::Error::custom(format!("timestamp must be integer epoch nanoseconds: {e}"))
        })?;
        Ok(nanos.map(super::from_nanos))
    }
}
