//! Scalar Converter: pure, total functions mapping `(raw bits, logical type,
//! scale)` to a native scalar value.
//!
//! Every function here is free of allocation-bearing mutable state; the only
//! allocations are the owned `String`/`Vec<u8>` the conversion itself
//! produces. Failures are returned, never panicked: an unsupported
//! `(logical, physical)` pair yields `UnsupportedType`, and a `scale=0 Fixed`
//! that doesn't fit the requested width yields `Overflow`.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{
    decimal::Decimal,
    error::{CellLocation, ConversionError},
};

/// The raw physical payload of a single non-null cell, already extracted
/// from its Arrow array or JSON token at the smallest bit-width that carries
/// it. The Scalar Converter never looks past this boundary into Arrow or
/// JSON internals.
#[derive(Debug, Clone, Copy)]
pub enum RawScalar<'a> {
    /// Any integer-valued cell up to 64 bits, already widened to `i64`.
    Int(i64),
    /// A 64-bit IEEE-754 float cell.
    Float(f64),
    /// A raw boolean byte; `true` iff the byte equals `1`.
    BoolByte(u8),
    /// Borrowed UTF-8 text.
    Text(&'a str),
    /// Borrowed binary payload.
    Binary(&'a [u8]),
    /// Day offset from 1970-01-01, for `Date`.
    DateDays(i32),
    /// Packed `epoch * 10^scale + fraction` single-integer temporal form.
    TimestampPacked(i64),
    /// Two already-split fields: `epoch_seconds`, `fraction_nanos`. Used for
    /// the `TimestampNtz`/`TimestampLtz` struct-column encoding.
    TimestampSplit {
        /// Whole seconds since the epoch.
        epoch_seconds: i64,
        /// Sub-second remainder, already in nanoseconds.
        fraction_nanos: i64,
    },
    /// Two-field `TimestampTz` struct: a packed single-integer instant plus a
    /// stored offset (`offset_minutes + 1440`).
    TimestampTzPacked {
        /// `epoch * 10^scale + fraction`, same packing as [`RawScalar::TimestampPacked`].
        packed: i64,
        /// `offset_minutes + 1440`, in `[0, 2880]`.
        stored_offset: i32,
    },
    /// Three-field `TimestampTz` struct: split epoch/fraction plus a stored offset.
    TimestampTzSplit {
        /// Whole seconds since the epoch.
        epoch_seconds: i64,
        /// Sub-second remainder, already in nanoseconds.
        fraction_nanos: i64,
        /// `offset_minutes + 1440`, in `[0, 2880]`.
        stored_offset: i32,
    },
}

impl RawScalar<'_> {
    fn hint(&self) -> &'static str {
        match self {
            RawScalar::Int(_) => "int",
            RawScalar::Float(_) => "float",
            RawScalar::BoolByte(_) => "bool-byte",
            RawScalar::Text(_) => "text",
            RawScalar::Binary(_) => "binary",
            RawScalar::DateDays(_) => "date-days",
            RawScalar::TimestampPacked(_) => "timestamp-packed",
            RawScalar::TimestampSplit { .. } => "timestamp-split",
            RawScalar::TimestampTzPacked { .. } => "timestamp-tz-packed",
            RawScalar::TimestampTzSplit { .. } => "timestamp-tz-split",
        }
    }
}

/// A materialized scalar value, one step removed from the caller's target
/// host type (the Structured Reader and Object Binder handle that last
/// step; the Scalar Converter only produces these canonical forms).
#[derive(Debug, Clone, PartialEq)]
pub enum NativeScalar {
    /// `Fixed { scale: 0 }`, narrowed to `i64`.
    Integer(i64),
    /// `Fixed { scale > 0 }`, exact.
    Decimal(Decimal),
    /// `Real`.
    Double(f64),
    /// `Boolean`.
    Bool(bool),
    /// `Text` / `Variant` / raw-JSON `Object`/`Array`.
    Text(String),
    /// `Binary`.
    Binary(Vec<u8>),
    /// `Date`.
    Date(NaiveDate),
    /// `Time`.
    Time(NaiveTime),
    /// `TimestampNtz`: naive wall-clock, no zone.
    TimestampNtz(NaiveDateTime),
    /// `TimestampLtz`: instant, rendered in the session zone.
    TimestampLtz(DateTime<FixedOffset>),
    /// `TimestampTz`: instant plus the originating offset.
    TimestampTz(DateTime<FixedOffset>),
}

/// Split a packed single-integer temporal value into `(epoch_seconds, fraction_nanos)`.
///
/// `epoch = raw / 10^scale`, `fraction_nanos = (raw mod 10^scale) * 10^(9-scale)`.
/// `scale` must be in `0..=9`.
#[must_use]
pub fn unpack_timestamp(raw: i64, scale: u8) -> (i64, i64) {
    debug_assert!(scale <= 9);
    let divisor = pow10_i64(scale);
    let epoch = raw.div_euclid(divisor);
    let remainder = raw.rem_euclid(divisor);
    let fraction_nanos = remainder * pow10_i64(9 - scale);
    (epoch, fraction_nanos)
}

/// Inverse of [`unpack_timestamp`]: `epoch * 10^scale + fraction / 10^(9-scale)`.
#[must_use]
pub fn pack_timestamp(epoch_seconds: i64, fraction_nanos: i64, scale: u8) -> i64 {
    debug_assert!(scale <= 9);
    epoch_seconds * pow10_i64(scale) + fraction_nanos / pow10_i64(9 - scale)
}

fn pow10_i64(exp: u8) -> i64 {
    10i64.pow(u32::from(exp))
}

fn pow10_i128(exp: u8) -> i128 {
    10i128.pow(u32::from(exp))
}

/// Convert `Fixed{scale=0}` raw bits to the narrowest integer, failing with
/// [`Overflow`](ConversionError::Overflow) if the caller-requested
/// `max_bits` (8/16/32/64) cannot hold it.
pub fn convert_integer(
    raw: i64,
    max_bits: u8,
    location: CellLocation,
) -> Result<i64, ConversionError> {
    let fits = match max_bits {
        8 => i64::from(i8::try_from(raw).is_ok()),
        16 => i64::from(i16::try_from(raw).is_ok()),
        32 => i64::from(i32::try_from(raw).is_ok()),
        64 => 1,
        _ => {
            return Err(ConversionError::UnsupportedType {
                location,
                logical_type: crate::catalog::LogicalType::integer(0),
                physical_hint: "unrecognized integer width request",
            })
        }
    };
    if fits == 1 {
        Ok(raw)
    } else {
        tracing::debug!(%location, raw, max_bits, "integer cell overflows requested width");
        Err(ConversionError::Overflow {
            location,
            logical_type: crate::catalog::LogicalType::integer(0),
        })
    }
}

/// Convert `Fixed{scale>0}` raw bits (an unscaled integer) to an exact
/// [`Decimal`]. This never fails: `i128` comfortably holds 38 significant
/// digits, the warehouse's maximum precision.
#[must_use]
pub fn convert_decimal(unscaled: i128, scale: u8) -> Decimal {
    Decimal::new(unscaled, scale)
}

/// Widen an integer-scale-0 value to a `Fixed{scale}` decimal, exact.
#[must_use]
pub fn widen_integer_to_decimal(raw: i64, scale: u8) -> Decimal {
    Decimal::new(i128::from(raw) * pow10_i128(scale), scale)
}

/// `Real` conversion: the server guarantees IEEE-754 bits, so this is the identity.
#[must_use]
pub fn convert_real(bits: f64) -> f64 {
    bits
}

/// `Boolean` conversion: the raw byte compared to `1`.
#[must_use]
pub fn convert_boolean(raw_byte: u8) -> bool {
    raw_byte == 1
}

/// `Date` conversion: `1970-01-01 + days`.
#[must_use]
pub fn convert_date(days: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date") + Duration::days(i64::from(days))
}

/// `Time{scale}` conversion, splitting the ticks unit three ways by scale:
/// milliseconds (`scale<=3`), 100ns ticks (`scale<=7`), then truncating
/// further sub-100ns precision for `scale` in `8..=9`.
///
/// That truncation is intentional and deliberately not reported as an error;
/// it discards precision no supported host representation can carry anyway.
pub fn convert_time(raw: i64, scale: u8, location: CellLocation) -> Result<NaiveTime, ConversionError> {
    let total_nanos: i64 = if scale <= 3 {
        let millis = raw * pow10_i64(3 - scale);
        millis * 1_000_000
    } else if scale <= 7 {
        let ticks = raw * pow10_i64(7 - scale);
        ticks * 100
    } else if scale <= 9 {
        let ticks = raw / pow10_i64(scale - 7);
        ticks * 100
    } else {
        tracing::debug!(%location, scale, "time scale out of [0,9]");
        return Err(ConversionError::UnsupportedType {
            location,
            logical_type: crate::catalog::LogicalType::Time { scale },
            physical_hint: "scale out of [0,9]",
        });
    };
    let secs = total_nanos.div_euclid(1_000_000_000);
    let nanos = total_nanos.rem_euclid(1_000_000_000);
    NaiveTime::from_num_seconds_from_midnight_opt(
        u32::try_from(secs).unwrap_or(0),
        u32::try_from(nanos).unwrap_or(0),
    )
    .ok_or_else(|| {
        tracing::debug!(%location, raw, scale, "time value overflows a wall-clock representation");
        ConversionError::Overflow {
            location,
            logical_type: crate::catalog::LogicalType::Time { scale },
        }
    })
}

/// Assemble a naive wall clock from a split epoch/fraction pair, failing
/// with `Overflow` rather than panicking when `epoch_seconds` falls outside
/// the range `chrono` can represent (e.g. a `scale=0` cell near `i64::MAX`).
fn assemble_naive(
    epoch_seconds: i64,
    fraction_nanos: i64,
    logical_type: crate::catalog::LogicalType,
    location: CellLocation,
) -> Result<NaiveDateTime, ConversionError> {
    DateTime::from_timestamp(epoch_seconds, u32::try_from(fraction_nanos).unwrap_or(0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| {
            tracing::debug!(%location, epoch_seconds, fraction_nanos, "epoch seconds out of representable range");
            ConversionError::Overflow { location, logical_type }
        })
}

/// `TimestampNtz` conversion from either the single-integer or the
/// pre-split struct encoding.
pub fn convert_timestamp_ntz(
    raw: RawScalar<'_>,
    scale: u8,
    location: CellLocation,
) -> Result<NaiveDateTime, ConversionError> {
    let logical_type = crate::catalog::LogicalType::TimestampNtz { scale };
    match raw {
        RawScalar::TimestampPacked(packed) => {
            let (epoch, frac) = unpack_timestamp(packed, scale);
            assemble_naive(epoch, frac, logical_type, location)
        }
        RawScalar::TimestampSplit {
            epoch_seconds,
            fraction_nanos,
        } => assemble_naive(epoch_seconds, fraction_nanos, logical_type, location),
        other => {
            tracing::debug!(%location, physical = other.hint(), "unsupported physical encoding for TimestampNtz");
            Err(ConversionError::UnsupportedType {
                location,
                logical_type,
                physical_hint: other.hint(),
            })
        }
    }
}

/// `TimestampLtz` conversion: same physical decoding as `TimestampNtz`, then
/// rendered in `session_offset_minutes` (the connection's session time
/// zone, expressed as a fixed UTC offset).
pub fn convert_timestamp_ltz(
    raw: RawScalar<'_>,
    scale: u8,
    session_offset_minutes: i32,
    location: CellLocation,
) -> Result<DateTime<FixedOffset>, ConversionError> {
    let logical_type = crate::catalog::LogicalType::TimestampLtz { scale };
    let naive = match raw {
        RawScalar::TimestampPacked(packed) => {
            let (epoch, frac) = unpack_timestamp(packed, scale);
            assemble_naive(epoch, frac, logical_type.clone(), location)?
        }
        RawScalar::TimestampSplit {
            epoch_seconds,
            fraction_nanos,
        } => assemble_naive(epoch_seconds, fraction_nanos, logical_type.clone(), location)?,
        other => {
            tracing::debug!(%location, physical = other.hint(), "unsupported physical encoding for TimestampLtz");
            return Err(ConversionError::UnsupportedType {
                location,
                logical_type,
                physical_hint: other.hint(),
            });
        }
    };
    let offset = FixedOffset::east_opt(session_offset_minutes * 60).ok_or(
        ConversionError::Overflow {
            location,
            logical_type,
        },
    )?;
    Ok(DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc).with_timezone(&offset))
}

/// `TimestampTz` conversion from any of the 2-field or 3-field struct
/// encodings, recovering `offset_minutes = stored - 1440`.
pub fn convert_timestamp_tz(
    raw: RawScalar<'_>,
    scale: u8,
    location: CellLocation,
) -> Result<DateTime<FixedOffset>, ConversionError> {
    let logical_type = crate::catalog::LogicalType::TimestampTz { scale };
    let (naive, stored_offset) = match raw {
        RawScalar::TimestampTzPacked { packed, stored_offset } => {
            let (epoch, frac) = unpack_timestamp(packed, scale);
            (assemble_naive(epoch, frac, logical_type.clone(), location)?, stored_offset)
        }
        RawScalar::TimestampTzSplit {
            epoch_seconds,
            fraction_nanos,
            stored_offset,
        } => (
            assemble_naive(epoch_seconds, fraction_nanos, logical_type.clone(), location)?,
            stored_offset,
        ),
        other => {
            tracing::debug!(%location, physical = other.hint(), "unsupported physical encoding for TimestampTz");
            return Err(ConversionError::UnsupportedType {
                location,
                logical_type,
                physical_hint: other.hint(),
            });
        }
    };
    let offset_minutes = stored_offset - 1440;
    if !(-1440..=1440).contains(&offset_minutes) {
        return Err(ConversionError::InvalidEncoding {
            location,
            message: format!("timestamp_tz offset_minutes {offset_minutes} out of [-1440, 1440]"),
        });
    }
    let offset = FixedOffset::east_opt(offset_minutes * 60).ok_or(ConversionError::Overflow {
        location,
        logical_type,
    })?;
    Ok(DateTime::<chrono::Utc>::from_naive_utc_and_offset(naive, chrono::Utc).with_timezone(&offset))
}

/// Decode a UTF-8 text cell from raw bytes, failing with `InvalidEncoding`
/// on malformed UTF-8 (rather than the lossy replacement a `String::from_utf8_lossy`
/// would silently perform).
pub fn convert_text(bytes: &[u8], location: CellLocation) -> Result<String, ConversionError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ConversionError::InvalidEncoding {
            location,
            message: format!("invalid UTF-8 at byte offset {}", e.valid_up_to()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> CellLocation {
        CellLocation::new(0, 0, 0)
    }

    #[test]
    fn fixed_point_with_scale() {
        // Arrow Int32 raw 12345, Fixed{scale=2} -> decimal 123.45
        let d = convert_decimal(12345, 2);
        assert_eq!(d.to_string(), "123.45");
    }

    #[test]
    fn timestamp_tz_two_field_struct() {
        let raw = RawScalar::TimestampTzPacked {
            packed: 1_720_705_205_000_000_000,
            stored_offset: 1740,
        };
        let dt = convert_timestamp_tz(raw, 9, loc()).unwrap();
        // packed unpacks to epoch_seconds=1_720_705_205 (2024-07-11 13:40:05 UTC);
        // rendered at the recovered +05:00 offset that's 18:40:05 local.
        assert_eq!(dt.naive_local().to_string(), "2024-07-11 18:40:05");
        assert_eq!(dt.offset().local_minus_utc(), 300 * 60);
    }

    #[test]
    fn time_scale_six() {
        let t = convert_time(51_605_000_000, 6, loc()).unwrap();
        assert_eq!(t.to_string(), "14:20:05");
        assert_eq!(t.nanosecond(), 0);
    }

    #[test]
    fn timestamp_single_int_round_trip() {
        for scale in 0u8..=9 {
            for raw in [0i64, 1, -1, 123_456_789, -987_654_321, i64::from(i32::MAX)] {
                let (epoch, frac) = unpack_timestamp(raw, scale);
                let packed = pack_timestamp(epoch, frac, scale);
                assert_eq!(packed, raw, "round-trip failed for scale={scale}, raw={raw}");
            }
        }
    }

    #[test]
    fn boolean_is_strict_equality_to_one() {
        assert!(convert_boolean(1));
        assert!(!convert_boolean(0));
        assert!(!convert_boolean(2));
    }

    #[test]
    fn invalid_utf8_is_reported_not_replaced() {
        let bytes = [0xff, 0xfe];
        let err = convert_text(&bytes, loc()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { .. }));
    }

    #[test]
    fn integer_overflow_is_detected() {
        let err = convert_integer(1_000_000, 8, loc()).unwrap_err();
        assert!(matches!(err, ConversionError::Overflow { .. }));
        assert_eq!(convert_integer(100, 8, loc()).unwrap(), 100);
    }
}
