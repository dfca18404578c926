//! Translates one cached Arrow column slot plus a row index into a
//! [`chunk_core::scalar::NativeScalar`], per the conversion table in
//! `chunk_core::scalar`.
//!
//! Structured types (`StructuredObject`/`Array`/`Map`) over the Arrow
//! physical encoding are not implemented here: the glossary calls nested
//! Arrow structures a future extension, carried today only over the JSON
//! path. An Arrow column declared as a structured type fails with
//! `UnsupportedType` rather than silently dropping data.

use arrow_array::{
    Array, BinaryArray, BooleanArray, Date32Array, Float64Array, Int32Array, Int64Array,
    LargeBinaryArray, LargeStringArray, StringArray,
};
use chunk_core::{
    catalog::LogicalType,
    config::DecodeConfig,
    error::{CellLocation, ConversionError},
    scalar::{self, NativeScalar, RawScalar},
    structured::StructuredValue,
};

use crate::{
    cache::CacheSlot,
    error::{bad_struct_arity, type_mismatch},
};

/// Extract the logical value of `row` from `slot`, which must already be the
/// materialized cache entry for the declared `logical_type`.
pub(crate) fn extract(
    slot: &CacheSlot,
    row: usize,
    logical_type: &LogicalType,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<StructuredValue, ConversionError> {
    let scalar_slot = match slot {
        CacheSlot::Empty => unreachable!("caller must materialize before extracting"),
        CacheSlot::Scalar(array) => array,
        CacheSlot::Struct(fields) => {
            return extract_temporal_struct(fields, row, logical_type, config, location)
        }
    };

    if scalar_slot.is_null(row) {
        return Ok(StructuredValue::Null);
    }

    match logical_type {
        LogicalType::Fixed { scale: 0, .. } => {
            let raw = read_i64(scalar_slot, row, logical_type, location)?;
            let value = scalar::convert_integer(raw, 64, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Integer(value)))
        }
        LogicalType::Fixed { scale, .. } => {
            let raw = read_i64(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Decimal(
                scalar::convert_decimal(i128::from(raw), *scale),
            )))
        }
        LogicalType::Real => {
            let array = downcast::<Float64Array>(scalar_slot, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Double(
                scalar::convert_real(array.value(row)),
            )))
        }
        LogicalType::Boolean => {
            let array = downcast::<BooleanArray>(scalar_slot, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Bool(array.value(row))))
        }
        LogicalType::Text => {
            let text = read_text(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Text(text)))
        }
        LogicalType::Binary => {
            let bytes = read_binary(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Binary(bytes)))
        }
        LogicalType::Date => {
            let array = downcast::<Date32Array>(scalar_slot, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Date(
                scalar::convert_date(array.value(row)),
            )))
        }
        LogicalType::Time { scale } => {
            let raw = read_i64(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::Time(
                scalar::convert_time(raw, *scale, location)?,
            )))
        }
        LogicalType::TimestampNtz { scale } => {
            let raw = read_i64(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::TimestampNtz(
                scalar::convert_timestamp_ntz(RawScalar::TimestampPacked(raw), *scale, location)?,
            )))
        }
        LogicalType::TimestampLtz { scale } => {
            let raw = read_i64(scalar_slot, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::TimestampLtz(
                scalar::convert_timestamp_ltz(
                    RawScalar::TimestampPacked(raw),
                    *scale,
                    config.session_offset_minutes,
                    location,
                )?,
            )))
        }
        LogicalType::TimestampTz { .. } => Err(type_mismatch(
            location,
            logical_type,
            scalar_slot.data_type(),
        )),
        LogicalType::StructuredObject { .. }
        | LogicalType::StructuredArray { .. }
        | LogicalType::StructuredMap { .. } => Err(ConversionError::UnsupportedType {
            location,
            logical_type: logical_type.clone(),
            physical_hint: "structured types over the Arrow physical encoding are not yet implemented",
        }),
    }
}

fn extract_temporal_struct(
    fields: &[arrow_array::ArrayRef],
    row: usize,
    logical_type: &LogicalType,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<StructuredValue, ConversionError> {
    let any_null = fields.iter().any(|f| f.is_null(row));
    if any_null {
        return Ok(StructuredValue::Null);
    }
    match (logical_type, fields.len()) {
        (LogicalType::TimestampNtz { scale }, 2) => {
            let raw = split_raw(fields, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::TimestampNtz(
                scalar::convert_timestamp_ntz(raw, *scale, location)?,
            )))
        }
        (LogicalType::TimestampLtz { scale }, 2) => {
            let raw = split_raw(fields, row, logical_type, location)?;
            Ok(StructuredValue::Scalar(NativeScalar::TimestampLtz(
                scalar::convert_timestamp_ltz(raw, *scale, config.session_offset_minutes, location)?,
            )))
        }
        (LogicalType::TimestampTz { scale }, 2) => {
            let packed = downcast::<Int64Array>(&fields[0], logical_type, location)?.value(row);
            let stored_offset = downcast::<Int32Array>(&fields[1], logical_type, location)?.value(row);
            Ok(StructuredValue::Scalar(NativeScalar::TimestampTz(
                scalar::convert_timestamp_tz(
                    RawScalar::TimestampTzPacked { packed, stored_offset },
                    *scale,
                    location,
                )?,
            )))
        }
        (LogicalType::TimestampTz { scale }, 3) => {
            let epoch_seconds = downcast::<Int64Array>(&fields[0], logical_type, location)?.value(row);
            let fraction_nanos = downcast::<Int64Array>(&fields[1], logical_type, location)?.value(row);
            let stored_offset = downcast::<Int32Array>(&fields[2], logical_type, location)?.value(row);
            Ok(StructuredValue::Scalar(NativeScalar::TimestampTz(
                scalar::convert_timestamp_tz(
                    RawScalar::TimestampTzSplit {
                        epoch_seconds,
                        fraction_nanos,
                        stored_offset,
                    },
                    *scale,
                    location,
                )?,
            )))
        }
        (_, got) => Err(bad_struct_arity(location, logical_type, got)),
    }
}

fn split_raw<'a>(
    fields: &[arrow_array::ArrayRef],
    row: usize,
    logical_type: &LogicalType,
    location: CellLocation,
) -> Result<RawScalar<'a>, ConversionError> {
    let epoch_seconds = downcast::<Int64Array>(&fields[0], logical_type, location)?.value(row);
    let fraction_nanos = downcast::<Int64Array>(&fields[1], logical_type, location)?.value(row);
    Ok(RawScalar::TimestampSplit {
        epoch_seconds,
        fraction_nanos,
    })
}

fn downcast<'a, T: 'static>(
    array: &'a dyn Array,
    logical_type: &LogicalType,
    location: CellLocation,
) -> Result<&'a T, ConversionError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| type_mismatch(location, logical_type, array.data_type()))
}

fn read_i64(
    array: &dyn Array,
    row: usize,
    logical_type: &LogicalType,
    location: CellLocation,
) -> Result<i64, ConversionError> {
    if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
        return Ok(a.value(row));
    }
    if let Some(a) = array.as_any().downcast_ref::<Int32Array>() {
        return Ok(i64::from(a.value(row)));
    }
    Err(type_mismatch(location, logical_type, array.data_type()))
}

fn read_text(
    array: &dyn Array,
    row: usize,
    logical_type: &LogicalType,
    location: CellLocation,
) -> Result<String, ConversionError> {
    if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
        return Ok(a.value(row).to_string());
    }
    if let Some(a) = array.as_any().downcast_ref::<LargeStringArray>() {
        return Ok(a.value(row).to_string());
    }
    if let Some(a) = array.as_any().downcast_ref::<BinaryArray>() {
        return scalar::convert_text(a.value(row), location);
    }
    Err(type_mismatch(location, logical_type, array.data_type()))
}

fn read_binary(
    array: &dyn Array,
    row: usize,
    logical_type: &LogicalType,
    location: CellLocation,
) -> Result<Vec<u8>, ConversionError> {
    if let Some(a) = array.as_any().downcast_ref::<BinaryArray>() {
        return Ok(a.value(row).to_vec());
    }
    if let Some(a) = array.as_any().downcast_ref::<LargeBinaryArray>() {
        return Ok(a.value(row).to_vec());
    }
    Err(type_mismatch(location, logical_type, array.data_type()))
}
