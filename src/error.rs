//! Shared error type for the result-chunk decoding core.

use thiserror::Error;

use crate::catalog::LogicalType;

/// Zero-based coordinates identifying the cell a [`ConversionError`] occurred at.
///
/// Carried on every variant that can be attributed to a single cell: a bad
/// cell is fatal for that cell only, never for the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellLocation {
    /// Index of the chunk within the result set.
    pub chunk_index: usize,
    /// Index of the row within the chunk.
    pub row_index: usize,
    /// Index of the column within the row.
    pub column_index: usize,
}

impl CellLocation {
    /// Construct a new cell location.
    #[must_use]
    pub fn new(chunk_index: usize, row_index: usize, column_index: usize) -> Self {
        Self {
            chunk_index,
            row_index,
            column_index,
        }
    }
}

impl std::fmt::Display for CellLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chunk {} row {} column {}",
            self.chunk_index, self.row_index, self.column_index
        )
    }
}

/// Errors produced while decoding a cell, materializing a structured value, or
/// binding fields into a caller-supplied target type.
///
/// Every variant that can be tied to a single cell carries a [`CellLocation`].
/// None of these are fatal beyond the affected cell: the iterator is never
/// advanced or poisoned by a conversion error (see `chunk-arrow`'s
/// `ChunkIterator`).
#[derive(Debug, Error, Clone)]
pub enum ConversionError {
    /// No conversion path exists for the (logical type, physical width) pair.
    #[error("{location}: unsupported conversion for {logical_type:?} from {physical_hint}")]
    UnsupportedType {
        /// Where the error occurred.
        location: CellLocation,
        /// The logical type that was requested.
        logical_type: LogicalType,
        /// A short description of the physical encoding that was supplied.
        physical_hint: &'static str,
    },

    /// The raw value does not fit in the requested native width.
    #[error("{location}: value overflows the requested width for {logical_type:?}")]
    Overflow {
        /// Where the error occurred.
        location: CellLocation,
        /// The logical type being converted.
        logical_type: LogicalType,
    },

    /// Malformed UTF-8, malformed JSON, or a malformed Arrow struct arity.
    #[error("{location}: invalid encoding: {message}")]
    InvalidEncoding {
        /// Where the error occurred.
        location: CellLocation,
        /// Human-readable detail, including a byte offset when available.
        message: String,
    },

    /// `PROPERTIES_ORDER` binding received the wrong number of fields.
    #[error("{location}: arity mismatch binding struct: expected {expected} fields, got {got}")]
    ArityMismatch {
        /// Where the error occurred.
        location: CellLocation,
        /// Number of fields the target type declares.
        expected: usize,
        /// Number of JSON pairs actually present.
        got: usize,
    },

    /// `CONSTRUCTOR` binding found zero or more than one matching constructor.
    #[error("{location}: no single matching constructor for arity {arity}")]
    NoMatchingConstructor {
        /// Where the error occurred.
        location: CellLocation,
        /// The argument count that was being matched against.
        arity: usize,
    },

    /// The type catalog was asked for container metadata on a non-container type.
    #[error("{0:?} is not a container type")]
    NotAContainer(LogicalType),

    /// Internal bug: the Arrow column cache was read after a batch change
    /// without being reset. Surfaced rather than panicking so a driver can at
    /// least report it instead of crashing the process.
    #[error("{location}: internal error: column cache read after batch change without reset")]
    CacheInvariantViolated {
        /// Where the error occurred.
        location: CellLocation,
    },
}

impl ConversionError {
    /// The cell location carried by this error, if any.
    #[must_use]
    pub fn location(&self) -> Option<CellLocation> {
        match self {
            ConversionError::UnsupportedType { location, .. }
            | ConversionError::Overflow { location, .. }
            | ConversionError::InvalidEncoding { location, .. }
            | ConversionError::ArityMismatch { location, .. }
            | ConversionError::NoMatchingConstructor { location, .. }
            | ConversionError::CacheInvariantViolated { location } => Some(*location),
            ConversionError::NotAContainer(_) => None,
        }
    }
}
