#![deny(missing_docs)]
//! Arrow-backed physical layer for the result-chunk decoding core.
//!
//! `chunk-core` is physical-encoding-agnostic; this crate supplies the two
//! pieces that need to know about Arrow specifically: the [`ChunkIterator`]
//! cursor (advances through a chunk's batches, dispatching to the JSON or
//! Arrow path per cell) and the Arrow Column Cache that backs it
//! (materializes each column's native buffer once per batch).
//!
//! No new error type is introduced here — every fallible operation returns
//! `chunk_core::error::ConversionError`, the same type the JSON-only core
//! uses, so a caller handles one error type end to end.
//!
//! # Quick Start
//!
//! ```
//! use arrow_array::{Int32Array, RecordBatch};
//! use arrow_schema::{DataType, Field, Schema};
//! use chunk_arrow::ResultChunk;
//! use chunk_core::{
//!     catalog::LogicalType, config::DecodeConfig, scalar::NativeScalar, structured::StructuredValue,
//! };
//! use std::sync::Arc;
//!
//! let schema = Arc::new(Schema::new(vec![Field::new("amount_cents", DataType::Int32, false)]));
//! let batch = RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![12345]))]).unwrap();
//!
//! let chunk = ResultChunk::from_arrow(0, vec![batch], vec![LogicalType::decimal(2, 10)]).unwrap();
//! let mut iter = chunk.iter(DecodeConfig::default());
//! assert!(iter.next());
//! let StructuredValue::Scalar(NativeScalar::Decimal(amount)) = iter.extract_cell(0).unwrap() else {
//!     panic!("expected a decimal scalar");
//! };
//! assert_eq!(amount.to_string(), "123.45");
//! ```

mod cache;
mod chunk;
mod extract;

pub mod error;

pub use chunk::{ChunkIterator, ResultChunk};
