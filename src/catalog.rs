//! Type Catalog: the closed enumeration of logical SQL types the warehouse
//! can return, plus the handful of pure helpers callers need to reason about
//! them.
//!
//! There is no runtime mutation here — a [`LogicalType`] tree is built once
//! from server-provided chunk-header metadata and then only ever read.

use crate::error::ConversionError;

/// A logical SQL type as reported by the warehouse's result-chunk schema.
///
/// `Fixed { scale: 0, .. }` is an integer; any other scale is an exact
/// decimal. `Text` also stands in for `Variant`/`Object`/`Array` payloads
/// when structured-type decoding is disabled (see `DecodeConfig`).
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalType {
    /// Arbitrary-precision fixed-point number. `scale` in `0..=38`, `precision` in `1..=38`.
    Fixed {
        /// Number of fractional digits. Zero means this is an integer.
        scale: u8,
        /// Total number of significant digits.
        precision: u8,
    },
    /// 64-bit IEEE-754 floating point.
    Real,
    /// Single-bit boolean.
    Boolean,
    /// UTF-8 text, including `VARIANT` and, when structured types are
    /// disabled, the raw-JSON rendering of `OBJECT`/`ARRAY`.
    Text,
    /// Arbitrary octet sequence.
    Binary,
    /// Day offset from 1970-01-01.
    Date,
    /// Time-of-day as an integer with `scale` fractional-second digits.
    Time {
        /// Number of fractional-second digits, in `0..=9`.
        scale: u8,
    },
    /// Naive local wall-clock timestamp (no zone).
    TimestampNtz {
        /// Number of fractional-second digits, in `0..=9`.
        scale: u8,
    },
    /// Instant to be rendered in the session time zone.
    TimestampLtz {
        /// Number of fractional-second digits, in `0..=9`.
        scale: u8,
    },
    /// Instant plus the originating UTC offset, in minutes.
    TimestampTz {
        /// Number of fractional-second digits, in `0..=9`.
        scale: u8,
    },
    /// `OBJECT(name: type, ...)` — an ordered, named field list.
    StructuredObject {
        /// Declared fields, in declaration order.
        fields: Vec<(String, LogicalType)>,
    },
    /// `ARRAY(T)` — a homogeneous ordered sequence.
    StructuredArray {
        /// Element logical type.
        element: Box<LogicalType>,
    },
    /// `MAP(K, V)` — a homogeneous keyed mapping.
    StructuredMap {
        /// Key logical type.
        key: Box<LogicalType>,
        /// Value logical type.
        value: Box<LogicalType>,
    },
}

impl LogicalType {
    /// Convenience constructor for an integer (`Fixed` with `scale = 0`).
    #[must_use]
    pub fn integer(precision: u8) -> Self {
        LogicalType::Fixed {
            scale: 0,
            precision,
        }
    }

    /// Convenience constructor for a decimal (`Fixed` with `scale > 0`).
    #[must_use]
    pub fn decimal(scale: u8, precision: u8) -> Self {
        LogicalType::Fixed { scale, precision }
    }

    /// `true` when this type is `Fixed { scale: 0, .. }`.
    #[must_use]
    pub fn is_fixed_integer(&self) -> bool {
        matches!(self, LogicalType::Fixed { scale: 0, .. })
    }

    /// `true` for any of the five temporal variants.
    #[must_use]
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date
                | LogicalType::Time { .. }
                | LogicalType::TimestampNtz { .. }
                | LogicalType::TimestampLtz { .. }
                | LogicalType::TimestampTz { .. }
        )
    }

    /// `true` for any of the three structured-type variants.
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            LogicalType::StructuredObject { .. }
                | LogicalType::StructuredArray { .. }
                | LogicalType::StructuredMap { .. }
        )
    }

    /// The fractional-second `scale` of a temporal type, if any.
    #[must_use]
    pub fn temporal_scale(&self) -> Option<u8> {
        match self {
            LogicalType::Time { scale }
            | LogicalType::TimestampNtz { scale }
            | LogicalType::TimestampLtz { scale }
            | LogicalType::TimestampTz { scale } => Some(*scale),
            _ => None,
        }
    }

    /// The element type of `StructuredArray`.
    ///
    /// # Errors
    /// Returns [`ConversionError::NotAContainer`] if `self` is not `StructuredArray`.
    pub fn element_of(&self) -> Result<&LogicalType, ConversionError> {
        match self {
            LogicalType::StructuredArray { element } => Ok(element),
            other => Err(ConversionError::NotAContainer(other.clone())),
        }
    }

    /// The `(key, value)` types of `StructuredMap`.
    ///
    /// # Errors
    /// Returns [`ConversionError::NotAContainer`] if `self` is not `StructuredMap`.
    pub fn map_key_value(&self) -> Result<(&LogicalType, &LogicalType), ConversionError> {
        match self {
            LogicalType::StructuredMap { key, value } => Ok((key, value)),
            other => Err(ConversionError::NotAContainer(other.clone())),
        }
    }

    /// The declared `(name, type)` field list of `StructuredObject`.
    ///
    /// # Errors
    /// Returns [`ConversionError::NotAContainer`] if `self` is not `StructuredObject`.
    pub fn object_fields(&self) -> Result<&[(String, LogicalType)], ConversionError> {
        match self {
            LogicalType::StructuredObject { fields } => Ok(fields),
            other => Err(ConversionError::NotAContainer(other.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_scale_zero_is_integer() {
        assert!(LogicalType::integer(18).is_fixed_integer());
        assert!(!LogicalType::decimal(2, 18).is_fixed_integer());
    }

    #[test]
    fn temporal_classification() {
        assert!(LogicalType::Date.is_temporal());
        assert!(LogicalType::TimestampTz { scale: 9 }.is_temporal());
        assert!(!LogicalType::Real.is_temporal());
    }

    #[test]
    fn element_of_fails_on_non_container() {
        let err = LogicalType::Real.element_of().unwrap_err();
        assert!(matches!(err, ConversionError::NotAContainer(LogicalType::Real)));
    }

    #[test]
    fn element_of_unwraps_array() {
        let arr = LogicalType::StructuredArray {
            element: Box::new(LogicalType::Text),
        };
        assert_eq!(arr.element_of().unwrap(), &LogicalType::Text);
    }
}
