//! Object Binder: binds a materialized [`StructuredValue::Object`]'s pairs
//! into a caller-supplied target Rust type, by one of three strategies.
//!
//! A target type opts in by implementing [`BindTarget`] (normally via
//! `#[derive(BindTarget)]` from `chunk-derive`). [`FromStructured`] is the
//! complementary leaf-conversion trait: it turns one [`StructuredValue`]
//! into one Rust value, and is what lets a derived `BindTarget` recurse into
//! nested structs, `Vec<T>`, `Option<T>`, and the handful of scalar leaf
//! coercions (`Text` -> `Uuid`, any temporal -> `chrono` type, ...).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::{
    config::DecodeConfig,
    decimal::Decimal,
    error::{CellLocation, ConversionError},
    scalar::NativeScalar,
    structured::StructuredValue,
};

pub use crate::config::BinderStrategy;

/// Declares one field a [`BindTarget`] expects, for `PROPERTIES_ORDER`
/// arity diagnostics and for documentation; not consulted for `PROPERTIES_NAMES`
/// matching (the derive-generated `bind_by_name` does that matching itself).
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// The field's declared name.
    pub name: &'static str,
}

/// A Rust type that can be constructed from a materialized struct's fields.
///
/// Implemented by `#[derive(BindTarget)]` for ordinary structs. A struct
/// literal has exactly one constructor shape, so `bind_by_constructor`'s
/// "pick the single matching overload by arity" semantics degrade to "arity
/// must equal the field count" for derived types; a hand-written impl for a
/// type with genuinely distinct constructor shapes (e.g. an enum) may
/// implement richer matching and return
/// [`ConversionError::NoMatchingConstructor`] when the arity is ambiguous.
pub trait BindTarget: Sized {
    /// The target's declared fields, in its own declaration order.
    fn field_descriptors() -> &'static [FieldDescriptor];

    /// `PROPERTIES_NAMES`: match JSON pairs to fields by name.
    ///
    /// # Errors
    /// Implementations return whatever [`ConversionError`] a failed leaf
    /// conversion produces.
    fn bind_by_name(
        pairs: &[(String, StructuredValue)],
        config: &DecodeConfig,
        location: CellLocation,
    ) -> Result<Self, ConversionError>;

    /// `PROPERTIES_ORDER`: bind positionally, requiring an exact arity match.
    ///
    /// # Errors
    /// Returns [`ConversionError::ArityMismatch`] when `values.len()` does
    /// not equal [`BindTarget::field_descriptors`]'s length.
    fn bind_by_order(values: &[StructuredValue], location: CellLocation) -> Result<Self, ConversionError>;

    /// `CONSTRUCTOR`: bind positionally via the single matching constructor.
    ///
    /// # Errors
    /// Returns [`ConversionError::NoMatchingConstructor`] when no declared
    /// constructor shape matches `values.len()`.
    fn bind_by_constructor(values: &[StructuredValue], location: CellLocation) -> Result<Self, ConversionError>;
}

/// Bind a materialized object's `pairs` into `T` using `strategy`.
///
/// # Errors
/// Propagates whatever [`ConversionError`] the chosen [`BindTarget`] method
/// produces.
pub fn bind<T: BindTarget>(
    strategy: BinderStrategy,
    pairs: Vec<(String, StructuredValue)>,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<T, ConversionError> {
    match strategy {
        BinderStrategy::PropertiesNames => T::bind_by_name(&pairs, config, location),
        BinderStrategy::PropertiesOrder => {
            let values: Vec<StructuredValue> = pairs.into_iter().map(|(_, v)| v).collect();
            T::bind_by_order(&values, location)
        }
        BinderStrategy::Constructor => {
            let values: Vec<StructuredValue> = pairs.into_iter().map(|(_, v)| v).collect();
            T::bind_by_constructor(&values, location)
        }
    }
}

/// Convert one materialized [`StructuredValue`] into a concrete Rust value.
///
/// Blanket-implemented for `Option<T>`, `Vec<T>`, the `chrono` temporal
/// types, `String`, numeric primitives, [`Decimal`], `Vec<u8>`, and (behind
/// the `uuid` leaf coercion) `uuid::Uuid`; any `T: BindTarget` gets a nested
/// struct impl for free via the blanket below.
pub trait FromStructured: Sized {
    /// # Errors
    /// Returns [`ConversionError::UnsupportedType`] when `value`'s shape
    /// doesn't match `Self`.
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError>;
}

fn scalar_mismatch(location: CellLocation) -> ConversionError {
    ConversionError::InvalidEncoding {
        location,
        message: "structured value does not hold the expected scalar".to_string(),
    }
}

/// Bind a `Fixed{scale>0}` cell straight to `f64`, honoring
/// `config.decimal_widening_policy` rather than silently going through the
/// always-lossy [`Decimal::to_f64_lossy`].
///
/// This is a standalone function rather than a blanket `FromStructured for
/// f64` coercion, since [`FromStructured::from_structured`] has no access to
/// `DecodeConfig` — a target field that wants a decimal widened to `f64`
/// calls this explicitly instead of deriving the field as `f64`.
///
/// # Errors
/// Returns [`ConversionError::UnsupportedType`] when `config.decimal_widening_policy`
/// is `LosslessOnly`, or when `value` isn't a `Decimal` scalar.
pub fn widen_decimal_to_f64(
    value: StructuredValue,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<f64, ConversionError> {
    match value {
        StructuredValue::Scalar(NativeScalar::Decimal(d)) => d.to_f64(config.decimal_widening_policy, location),
        _ => Err(scalar_mismatch(location)),
    }
}

impl<T: FromStructured> FromStructured for Option<T> {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(T::from_structured(value, location)?))
        }
    }
}

impl<T: FromStructured> FromStructured for Vec<T> {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Array(items) => items
                .into_iter()
                .map(|item| T::from_structured(item, location))
                .collect(),
            _ => Err(scalar_mismatch(location)),
        }
    }
}

/// `StructuredMap` entries, preserving source order (a `HashMap` would
/// silently apply last-wins on duplicate keys before the caller ever sees
/// them). A dedicated wrapper rather than a blanket `Vec<(K, V)>` impl,
/// since that would overlap with the `Vec<T>` impl above.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntries<K, V>(pub Vec<(K, V)>);

impl<K: FromStructured, V: FromStructured> FromStructured for MapEntries<K, V> {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Map(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((K::from_structured(k, location)?, V::from_structured(v, location)?)))
                .collect::<Result<Vec<_>, _>>()
                .map(MapEntries),
            _ => Err(scalar_mismatch(location)),
        }
    }
}

macro_rules! from_scalar {
    ($ty:ty, $pat:pat => $out:expr) => {
        impl FromStructured for $ty {
            fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
                match value {
                    StructuredValue::Scalar($pat) => Ok($out),
                    _ => Err(scalar_mismatch(location)),
                }
            }
        }
    };
}

from_scalar!(String, NativeScalar::Text(s) => s);
from_scalar!(bool, NativeScalar::Bool(b) => b);
from_scalar!(f64, NativeScalar::Double(d) => d);
from_scalar!(Decimal, NativeScalar::Decimal(d) => d);
from_scalar!(Vec<u8>, NativeScalar::Binary(b) => b);
from_scalar!(NaiveDate, NativeScalar::Date(d) => d);
from_scalar!(NaiveTime, NativeScalar::Time(t) => t);

impl FromStructured for i64 {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Scalar(NativeScalar::Integer(i)) => Ok(i),
            _ => Err(scalar_mismatch(location)),
        }
    }
}

/// Any of the three timestamp flavors binds to a naive wall clock: `Ntz`
/// already is one, `Ltz`/`Tz` drop their offset via `naive_local`. This is
/// the "calendar-wall-clock" half of the dual rendering a caller gets to
/// pick between for any temporal cell.
impl FromStructured for NaiveDateTime {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Scalar(NativeScalar::TimestampNtz(dt)) => Ok(dt),
            StructuredValue::Scalar(NativeScalar::TimestampLtz(dt) | NativeScalar::TimestampTz(dt)) => {
                Ok(dt.naive_local())
            }
            _ => Err(scalar_mismatch(location)),
        }
    }
}

/// Any of the three timestamp flavors binds to an instant-with-offset:
/// `Ltz`/`Tz` already carry one, `Ntz` is reinterpreted as UTC (the
/// warehouse gives no zone to assume otherwise). This is the
/// "instant-with-offset" half of the dual rendering described for
/// structured-reader temporal leaves.
impl FromStructured for DateTime<FixedOffset> {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Scalar(NativeScalar::TimestampLtz(dt) | NativeScalar::TimestampTz(dt)) => Ok(dt),
            StructuredValue::Scalar(NativeScalar::TimestampNtz(naive)) => {
                Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).fixed_offset())
            }
            _ => Err(scalar_mismatch(location)),
        }
    }
}

/// Leaf coercion: a `Text` cell holding a standard UUID rendering parses
/// into `uuid::Uuid`.
impl FromStructured for uuid::Uuid {
    fn from_structured(value: StructuredValue, location: CellLocation) -> Result<Self, ConversionError> {
        match value {
            StructuredValue::Scalar(NativeScalar::Text(s)) => uuid::Uuid::parse_str(&s).map_err(|_| {
                ConversionError::InvalidEncoding {
                    location,
                    message: format!("not a uuid: {s}"),
                }
            }),
            _ => Err(scalar_mismatch(location)),
        }
    }
}

/// Materialize a nested `StructuredObject` into a `T: BindTarget`, using
/// `PROPERTIES_NAMES` (the only strategy that makes sense for a field
/// embedded inside another struct, where there's no outer call site to pick
/// a strategy for it).
///
/// `#[derive(BindTarget)]` emits a one-line `FromStructured` impl that calls
/// this for every nested-struct field; it can't be a blanket
/// `impl<T: BindTarget> FromStructured for T`, since that would conflict
/// with the concrete scalar impls above under coherence.
///
/// # Errors
/// Returns whatever [`ConversionError`] `T::bind_by_name` produces, or
/// an error if `value` isn't a `StructuredValue::Object`.
pub fn nested_from_structured<T: BindTarget>(
    value: StructuredValue,
    location: CellLocation,
) -> Result<T, ConversionError> {
    match value {
        StructuredValue::Object(pairs) => T::bind_by_name(&pairs, &DecodeConfig::default(), location),
        _ => Err(scalar_mismatch(location)),
    }
}
