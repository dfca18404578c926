//! Arrow-specific error helpers.
//!
//! `chunk-arrow` does not define its own error enum: every failure a caller
//! can observe is a [`chunk_core::error::ConversionError`], the same type
//! the JSON path raises. These helpers just build the right variant out of
//! Arrow-specific context (a `DataType` mismatch, a malformed struct arity)
//! that the core crate has no reason to know about.

use arrow_schema::DataType;
use chunk_core::{
    catalog::LogicalType,
    error::{CellLocation, ConversionError},
};

pub use chunk_core::error::ConversionError as ArrowDecodeError;

/// The Arrow column's physical `DataType` did not match what `logical_type` requires.
pub(crate) fn type_mismatch(
    location: CellLocation,
    logical_type: &LogicalType,
    actual: &DataType,
) -> ConversionError {
    ConversionError::InvalidEncoding {
        location,
        message: format!(
            "column declared {logical_type:?} but backing Arrow array has data type {actual:?}"
        ),
    }
}

/// A struct column backing a `TimestampTz`/`TimestampNtz`/`TimestampLtz` cell
/// had a field count that is neither the 2-field nor the (where applicable)
/// 3-field encoding.
pub(crate) fn bad_struct_arity(
    location: CellLocation,
    logical_type: &LogicalType,
    got: usize,
) -> ConversionError {
    ConversionError::InvalidEncoding {
        location,
        message: format!(
            "{logical_type:?} struct column has {got} sub-fields, expected 2 or 3"
        ),
    }
}

/// The chunk's declared schema width doesn't match a batch's actual column count.
pub(crate) fn schema_width_mismatch(expected: usize, got: usize) -> ConversionError {
    ConversionError::ArityMismatch {
        location: CellLocation::default(),
        expected,
        got,
    }
}
