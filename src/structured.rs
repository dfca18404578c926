//! Structured Reader: recursive materialization of a JSON value tree into a
//! [`StructuredValue`] tree, driven by the declared [`LogicalType`] at each
//! level.
//!
//! This module never sees a caller's target Rust type — it only knows the
//! warehouse's own declared schema (a `LogicalType` tree built from
//! chunk-header metadata). Binding a materialized `StructuredObject` into a
//! concrete Rust type is the Object Binder's job (`crate::binder`), invoked
//! separately once a target type is in scope.

use base64::Engine;

use crate::{
    catalog::LogicalType,
    config::DecodeConfig,
    error::{CellLocation, ConversionError},
    json::JsonValue,
    scalar::{self, NativeScalar, RawScalar},
};

/// A value materialized from JSON against a declared [`LogicalType`], one
/// step short of a caller's target host type.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredValue {
    /// SQL `NULL`, or a missing struct field.
    Null,
    /// A leaf scalar, already converted by the Scalar Converter.
    Scalar(NativeScalar),
    /// `StructuredArray` elements, in source order.
    Array(Vec<StructuredValue>),
    /// `StructuredMap` entries, in source order (duplicates kept; last-wins
    /// is a binder-level concern).
    Map(Vec<(StructuredValue, StructuredValue)>),
    /// `StructuredObject` fields, in declared-schema order. Missing JSON
    /// keys materialize as `StructuredValue::Null`.
    Object(Vec<(String, StructuredValue)>),
}

impl StructuredValue {
    /// `true` for `StructuredValue::Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, StructuredValue::Null)
    }
}

/// Recursively materialize `value` against the declared `target` type.
///
/// # Errors
/// Returns [`ConversionError::InvalidEncoding`] when the JSON shape doesn't
/// match what `target` declares (e.g. a JSON array where an object was
/// expected), or whatever scalar-leaf error the Scalar Converter raises.
pub fn materialize(
    value: &JsonValue,
    target: &LogicalType,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<StructuredValue, ConversionError> {
    if value.is_null() {
        return Ok(StructuredValue::Null);
    }
    if !config.structured_types_enabled && target.is_structured() {
        return Ok(StructuredValue::Scalar(NativeScalar::Text(json_to_text(value))));
    }
    match target {
        LogicalType::StructuredArray { element } => {
            let items = value.as_array().ok_or_else(|| ConversionError::InvalidEncoding {
                location,
                message: "expected a JSON array for StructuredArray".to_string(),
            })?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(materialize(item, element, config, location)?);
            }
            Ok(StructuredValue::Array(out))
        }
        LogicalType::StructuredMap { key, value: value_ty } => {
            let pairs = value.as_object().ok_or_else(|| ConversionError::InvalidEncoding {
                location,
                message: "expected a JSON object for StructuredMap".to_string(),
            })?;
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                let key_value = materialize_scalar_text(k, key, config, location)?;
                let entry_value = materialize(v, value_ty, config, location)?;
                out.push((StructuredValue::Scalar(key_value), entry_value));
            }
            Ok(StructuredValue::Map(out))
        }
        LogicalType::StructuredObject { fields } => {
            let json_pairs = value.as_object().ok_or_else(|| ConversionError::InvalidEncoding {
                location,
                message: "expected a JSON object for StructuredObject".to_string(),
            })?;
            let mut out = Vec::with_capacity(fields.len());
            for (decl_name, decl_type) in fields {
                let found = json_pairs
                    .iter()
                    .find(|(k, _)| names_match(k, decl_name, config));
                let materialized = match found {
                    Some((_, v)) => materialize(v, decl_type, config, location)?,
                    None => StructuredValue::Null,
                };
                out.push((decl_name.clone(), materialized));
            }
            Ok(StructuredValue::Object(out))
        }
        scalar_type => Ok(StructuredValue::Scalar(materialize_scalar(
            value,
            scalar_type,
            config,
            location,
        )?)),
    }
}

fn names_match(a: &str, b: &str, config: &DecodeConfig) -> bool {
    if config.case_insensitive_names {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Convert a JSON object key (always syntactically a string) into a scalar
/// of the map's declared key type — e.g. a `Text` map key is used verbatim,
/// an `Integer` map key is re-parsed from its decimal text.
fn materialize_scalar_text(
    key_text: &str,
    key_type: &LogicalType,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<NativeScalar, ConversionError> {
    materialize_scalar(&JsonValue::String(key_text.to_string()), key_type, config, location)
}

fn materialize_scalar(
    value: &JsonValue,
    ty: &LogicalType,
    config: &DecodeConfig,
    location: CellLocation,
) -> Result<NativeScalar, ConversionError> {
    let text = scalar_text(value);
    match ty {
        LogicalType::Fixed { scale: 0, .. } => {
            let raw = parse_i64(text.as_deref(), ty, location)?;
            Ok(NativeScalar::Integer(scalar::convert_integer(raw, 64, location)?))
        }
        LogicalType::Fixed { scale, .. } => {
            let raw = text.as_deref().ok_or_else(|| unsupported(ty, value, location))?;
            Ok(NativeScalar::Decimal(parse_decimal_text(raw, *scale, location)?))
        }
        LogicalType::Real => {
            let raw = text.as_deref().ok_or_else(|| unsupported(ty, value, location))?;
            let parsed: f64 = raw
                .parse()
                .map_err(|_| invalid_encoding(location, format!("not a real number: {raw}")))?;
            Ok(NativeScalar::Double(scalar::convert_real(parsed)))
        }
        LogicalType::Boolean => match value {
            JsonValue::Bool(b) => Ok(NativeScalar::Bool(*b)),
            other => Err(unsupported(ty, other, location)),
        },
        LogicalType::Text => Ok(NativeScalar::Text(json_to_text(value))),
        LogicalType::Binary => {
            let raw = value.as_str().ok_or_else(|| unsupported(ty, value, location))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(raw)
                .map_err(|e| invalid_encoding(location, format!("invalid base64: {e}")))?;
            Ok(NativeScalar::Binary(bytes))
        }
        LogicalType::Date => {
            let raw = parse_i32(text.as_deref(), ty, location)?;
            Ok(NativeScalar::Date(scalar::convert_date(raw)))
        }
        LogicalType::Time { scale } => {
            let raw = parse_i64(text.as_deref(), ty, location)?;
            Ok(NativeScalar::Time(scalar::convert_time(raw, *scale, location)?))
        }
        LogicalType::TimestampNtz { scale } => {
            let raw = timestamp_raw_ntz(value, *scale, ty, location)?;
            Ok(NativeScalar::TimestampNtz(scalar::convert_timestamp_ntz(
                raw, *scale, location,
            )?))
        }
        LogicalType::TimestampLtz { scale } => {
            let raw = timestamp_raw_ntz(value, *scale, ty, location)?;
            Ok(NativeScalar::TimestampLtz(scalar::convert_timestamp_ltz(
                raw,
                *scale,
                config.session_offset_minutes,
                location,
            )?))
        }
        LogicalType::TimestampTz { scale } => {
            let raw = timestamp_raw_tz(value, ty, location)?;
            Ok(NativeScalar::TimestampTz(scalar::convert_timestamp_tz(
                raw, *scale, location,
            )?))
        }
        LogicalType::StructuredObject { .. }
        | LogicalType::StructuredArray { .. }
        | LogicalType::StructuredMap { .. } => Err(unsupported(ty, value, location)),
    }
}

fn scalar_text(value: &JsonValue) -> Option<&str> {
    match value {
        JsonValue::Number(s) => Some(s.as_str()),
        JsonValue::String(s) => Some(s.as_str()),
        _ => None,
    }
}

fn parse_i64(text: Option<&str>, ty: &LogicalType, location: CellLocation) -> Result<i64, ConversionError> {
    let text = text.ok_or_else(|| unsupported_hint(ty, "non-numeric json value", location))?;
    text.parse()
        .map_err(|_| invalid_encoding(location, format!("not an integer: {text}")))
}

fn parse_i32(text: Option<&str>, ty: &LogicalType, location: CellLocation) -> Result<i32, ConversionError> {
    let text = text.ok_or_else(|| unsupported_hint(ty, "non-numeric json value", location))?;
    text.parse()
        .map_err(|_| invalid_encoding(location, format!("not an integer: {text}")))
}

/// Parse exact decimal text (e.g. `"-123.450"`) into an unscaled `i128` at
/// `target_scale`, padding or truncating fractional digits as needed.
fn parse_decimal_text(text: &str, target_scale: u8, location: CellLocation) -> Result<crate::decimal::Decimal, ConversionError> {
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_encoding(location, format!("not a decimal: {text}")));
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_encoding(location, format!("not a decimal: {text}")));
    }
    let scale = usize::from(target_scale);
    let mut digits = String::with_capacity(int_part.len() + scale);
    digits.push_str(int_part);
    if frac_part.len() >= scale {
        digits.push_str(&frac_part[..scale]);
    } else {
        digits.push_str(frac_part);
        digits.extend(std::iter::repeat('0').take(scale - frac_part.len()));
    }
    let magnitude: i128 = digits
        .parse()
        .map_err(|_| invalid_encoding(location, format!("decimal digits overflow: {text}")))?;
    let unscaled = if negative { -magnitude } else { magnitude };
    Ok(crate::decimal::Decimal::new(unscaled, target_scale))
}

fn timestamp_raw_ntz<'a>(
    value: &'a JsonValue,
    _scale: u8,
    ty: &LogicalType,
    location: CellLocation,
) -> Result<RawScalar<'a>, ConversionError> {
    match value {
        JsonValue::Number(s) | JsonValue::String(s) => {
            let packed: i64 = s
                .parse()
                .map_err(|_| invalid_encoding(location, format!("not a packed timestamp: {s}")))?;
            Ok(RawScalar::TimestampPacked(packed))
        }
        JsonValue::Array(items) if items.len() == 2 => {
            let epoch_seconds = number_as_i64(&items[0], location)?;
            let fraction_nanos = number_as_i64(&items[1], location)?;
            Ok(RawScalar::TimestampSplit {
                epoch_seconds,
                fraction_nanos,
            })
        }
        other => Err(unsupported(ty, other, location)),
    }
}

fn timestamp_raw_tz<'a>(
    value: &'a JsonValue,
    ty: &LogicalType,
    location: CellLocation,
) -> Result<RawScalar<'a>, ConversionError> {
    match value {
        JsonValue::Array(items) if items.len() == 2 => {
            let packed = number_as_i64(&items[0], location)?;
            let stored_offset = i32::try_from(number_as_i64(&items[1], location)?)
                .map_err(|_| invalid_encoding(location, "offset out of range".to_string()))?;
            Ok(RawScalar::TimestampTzPacked { packed, stored_offset })
        }
        JsonValue::Array(items) if items.len() == 3 => {
            let epoch_seconds = number_as_i64(&items[0], location)?;
            let fraction_nanos = number_as_i64(&items[1], location)?;
            let stored_offset = i32::try_from(number_as_i64(&items[2], location)?)
                .map_err(|_| invalid_encoding(location, "offset out of range".to_string()))?;
            Ok(RawScalar::TimestampTzSplit {
                epoch_seconds,
                fraction_nanos,
                stored_offset,
            })
        }
        other => Err(unsupported(ty, other, location)),
    }
}

fn number_as_i64(value: &JsonValue, location: CellLocation) -> Result<i64, ConversionError> {
    scalar_text(value)
        .ok_or_else(|| invalid_encoding(location, "expected a json number".to_string()))?
        .parse()
        .map_err(|_| invalid_encoding(location, "expected a json integer".to_string()))
}

/// Re-serialize a JSON subtree to text, for `Text`-typed cells that carry a
/// `Variant` or a raw `Object`/`Array` payload.
fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.clone(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => {
            let inner: Vec<String> = items.iter().map(json_to_text_quoted).collect();
            format!("[{}]", inner.join(","))
        }
        JsonValue::Object(pairs) => {
            let inner: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}:{}", quote(k), json_to_text_quoted(v)))
                .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}

fn json_to_text_quoted(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => quote(s),
        other => json_to_text(other),
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unsupported(ty: &LogicalType, value: &JsonValue, location: CellLocation) -> ConversionError {
    let hint = match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "json-bool",
        JsonValue::Number(_) => "json-number",
        JsonValue::String(_) => "json-string",
        JsonValue::Array(_) => "json-array",
        JsonValue::Object(_) => "json-object",
    };
    unsupported_hint(ty, hint, location)
}

fn unsupported_hint(ty: &LogicalType, hint: &'static str, location: CellLocation) -> ConversionError {
    ConversionError::UnsupportedType {
        location,
        logical_type: ty.clone(),
        physical_hint: hint,
    }
}

fn invalid_encoding(location: CellLocation, message: String) -> ConversionError {
    ConversionError::InvalidEncoding { location, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> CellLocation {
        CellLocation::new(0, 0, 0)
    }

    #[test]
    fn object_with_missing_field_materializes_as_null() {
        let value = crate::json::parse(br#"{"city":"San Mateo","state":"CA"}"#, loc()).unwrap();
        let ty = LogicalType::StructuredObject {
            fields: vec![
                ("city".to_string(), LogicalType::Text),
                ("state".to_string(), LogicalType::Text),
                ("zip".to_string(), LogicalType::Text),
            ],
        };
        let materialized = materialize(&value, &ty, &DecodeConfig::default(), loc()).unwrap();
        let StructuredValue::Object(pairs) = materialized else {
            panic!("expected an object");
        };
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2].0, "zip");
        assert!(pairs[2].1.is_null());
    }

    #[test]
    fn array_of_decimal_elements() {
        let value = crate::json::parse(b"[\"1.50\", \"2.25\"]", loc()).unwrap();
        let ty = LogicalType::StructuredArray {
            element: Box::new(LogicalType::decimal(2, 10)),
        };
        let materialized = materialize(&value, &ty, &DecodeConfig::default(), loc()).unwrap();
        let StructuredValue::Array(items) = materialized else {
            panic!("expected an array");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            StructuredValue::Scalar(NativeScalar::Decimal(crate::decimal::Decimal::new(150, 2)))
        );
    }

    #[test]
    fn map_with_text_keys() {
        let value = crate::json::parse(br#"{"Warsaw":{"prefix":"01","postfix":"234"}}"#, loc()).unwrap();
        let ty = LogicalType::StructuredMap {
            key: Box::new(LogicalType::Text),
            value: Box::new(LogicalType::StructuredObject {
                fields: vec![
                    ("prefix".to_string(), LogicalType::Text),
                    ("postfix".to_string(), LogicalType::Text),
                ],
            }),
        };
        let materialized = materialize(&value, &ty, &DecodeConfig::default(), loc()).unwrap();
        let StructuredValue::Map(entries) = materialized else {
            panic!("expected a map");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].0,
            StructuredValue::Scalar(NativeScalar::Text("Warsaw".to_string()))
        );
    }

    #[test]
    fn negative_decimal_text_parses_exactly() {
        let d = parse_decimal_text("-123.4", 3, loc()).unwrap();
        assert_eq!(d.to_string(), "-123.400");
    }

    #[test]
    fn binary_field_decodes_base64() {
        let value = crate::json::parse(br#""aGVsbG8=""#, loc()).unwrap();
        let materialized = materialize(&value, &LogicalType::Binary, &DecodeConfig::default(), loc()).unwrap();
        assert_eq!(
            materialized,
            StructuredValue::Scalar(NativeScalar::Binary(b"hello".to_vec()))
        );
    }

    #[test]
    fn structured_types_disabled_falls_back_to_raw_json_text() {
        let value = crate::json::parse(br#"{"city":"Reno"}"#, loc()).unwrap();
        let ty = LogicalType::StructuredObject {
            fields: vec![("city".to_string(), LogicalType::Text)],
        };
        let mut config = DecodeConfig::default();
        config.structured_types_enabled = false;
        let materialized = materialize(&value, &ty, &config, loc()).unwrap();
        assert_eq!(
            materialized,
            StructuredValue::Scalar(NativeScalar::Text(r#"{"city":"Reno"}"#.to_string()))
        );
    }

    #[test]
    fn null_json_value_is_structured_null_regardless_of_target_type() {
        let value = JsonValue::Null;
        let materialized = materialize(&value, &LogicalType::Text, &DecodeConfig::default(), loc()).unwrap();
        assert_eq!(materialized, StructuredValue::Null);
    }
}
