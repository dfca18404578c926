#![deny(missing_docs)]
//! Result-chunk decoding core for a cloud warehouse client driver.
//!
//! This crate is the physical-encoding-agnostic half of the decoder: it
//! owns the SQL type catalog, exact scalar conversion, JSON tokenizing,
//! structured-value materialization, and object binding. The Arrow-specific
//! physical layer (chunk iteration, column caching) lives in the sibling
//! `chunk-arrow` crate, which depends on this one.
//!
//! # Quick Start
//!
//! ```
//! use chunk_core::prelude::*;
//!
//! let config = DecodeConfig::default();
//! let location = CellLocation::new(0, 0, 0);
//! let value = chunk_core::json::parse(br#"{"city":"Reno","state":"NV"}"#, location).unwrap();
//! let ty = LogicalType::StructuredObject {
//!     fields: vec![
//!         ("city".to_string(), LogicalType::Text),
//!         ("state".to_string(), LogicalType::Text),
//!     ],
//! };
//! let materialized = chunk_core::structured::materialize(&value, &ty, &config, location).unwrap();
//! assert!(matches!(materialized, StructuredValue::Object(_)));
//! ```
//!
//! # Cargo Features
//!
//! | Feature  | Default | Description                                         |
//! |----------|---------|------------------------------------------------------|
//! | `derive` | ✓       | Enables [`#[derive(BindTarget)]`](derive@BindTarget) |
//!
//! # Core Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | The closed [`LogicalType`] enumeration (Type Catalog) |
//! | [`decimal`] | Exact scaled-integer [`decimal::Decimal`] |
//! | [`scalar`] | Pure `(raw bits, logical type)` -> native value functions (Scalar Converter) |
//! | [`json`] | Strict JSON tokenizer preserving number text and key order (JSON Tokenizer) |
//! | [`structured`] | Recursive JSON -> [`structured::StructuredValue`] materialization (Structured Reader) |
//! | [`binder`] | Binds a materialized object's fields into a caller type (Object Binder) |
//! | [`error`] | Shared [`error::ConversionError`] and [`error::CellLocation`] |
//! | [`config`] | Runtime-recognized [`config::DecodeConfig`] options |

pub mod binder;
pub mod catalog;
pub mod config;
pub mod decimal;
pub mod error;
pub mod json;
pub mod scalar;
pub mod structured;

// Re-export the derive macro when enabled.
#[cfg(feature = "derive")]
pub use chunk_derive::BindTarget;

/// Prelude exporting the most common traits and types.
pub mod prelude {
    #[cfg(feature = "derive")]
    pub use chunk_derive::BindTarget;

    pub use crate::{
        binder::{bind, widen_decimal_to_f64, BindTarget, BinderStrategy, FieldDescriptor, FromStructured, MapEntries},
        catalog::LogicalType,
        config::{DecimalWideningPolicy, DecodeConfig},
        decimal::Decimal,
        error::{CellLocation, ConversionError},
        scalar::NativeScalar,
        structured::{materialize, StructuredValue},
    };
}
