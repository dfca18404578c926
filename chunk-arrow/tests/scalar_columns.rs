use std::sync::Arc;

use arrow_array::{Int32Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chunk_core::{
    catalog::LogicalType,
    config::DecodeConfig,
    error::ConversionError,
    scalar::NativeScalar,
    structured::StructuredValue,
};
use chunk_arrow::ResultChunk;

fn single_column_chunk(data_type: DataType, array: arrow_array::ArrayRef, schema: LogicalType) -> ResultChunk {
    let arrow_schema = Arc::new(Schema::new(vec![Field::new("v", data_type, true)]));
    let batch = RecordBatch::try_new(arrow_schema, vec![array]).expect("valid batch");
    ResultChunk::from_arrow(0, vec![batch], vec![schema]).expect("schema width matches batch")
}

#[test]
fn fixed_point_with_scale() {
    let chunk = single_column_chunk(
        DataType::Int32,
        Arc::new(Int32Array::from(vec![12345])),
        LogicalType::decimal(2, 10),
    );
    let mut iter = chunk.iter(DecodeConfig::default());
    assert!(iter.next());
    let StructuredValue::Scalar(NativeScalar::Decimal(amount)) = iter.extract_cell(0).unwrap() else {
        panic!("expected a decimal scalar");
    };
    assert_eq!(amount.to_string(), "123.45");
}

#[test]
fn time_scale_six() {
    let chunk = single_column_chunk(
        DataType::Int64,
        Arc::new(Int64Array::from(vec![51_605_000_000_i64])),
        LogicalType::Time { scale: 6 },
    );
    let mut iter = chunk.iter(DecodeConfig::default());
    assert!(iter.next());
    let StructuredValue::Scalar(NativeScalar::Time(wall_clock)) = iter.extract_cell(0).unwrap() else {
        panic!("expected a time scalar");
    };
    assert_eq!(wall_clock.to_string(), "14:20:05");
}

#[test]
fn null_cell_short_circuits_before_type_dispatch() {
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Utf8, true)]));
    let array: arrow_array::ArrayRef = Arc::new(StringArray::from(vec![None::<&str>]));
    let batch = RecordBatch::try_new(schema, vec![array]).unwrap();
    let chunk = ResultChunk::from_arrow(0, vec![batch], vec![LogicalType::Text]).unwrap();
    let mut iter = chunk.iter(DecodeConfig::default());
    assert!(iter.next());
    assert_eq!(iter.extract_cell(0).unwrap(), StructuredValue::Null);
}

#[test]
fn structured_type_over_arrow_is_unsupported() {
    let chunk = single_column_chunk(
        DataType::Utf8,
        Arc::new(StringArray::from(vec!["{}"])),
        LogicalType::StructuredObject { fields: vec![] },
    );
    let mut iter = chunk.iter(DecodeConfig::default());
    assert!(iter.next());
    let err = iter.extract_cell(0).unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedType { .. }));
}

#[test]
fn column_count_mismatch_is_rejected_at_construction() {
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]));
    let array: arrow_array::ArrayRef = Arc::new(Int32Array::from(vec![1]));
    let batch = RecordBatch::try_new(schema, vec![array]).unwrap();
    let err = ResultChunk::from_arrow(0, vec![batch], vec![LogicalType::Text, LogicalType::Text])
        .unwrap_err();
    assert!(matches!(err, ConversionError::ArityMismatch { .. }));
}
