use std::sync::Arc;

use arrow_array::{Int64Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use chunk_core::{catalog::LogicalType, config::DecodeConfig, scalar::NativeScalar, structured::StructuredValue};
use chunk_arrow::ResultChunk;

fn int64_batch(values: Vec<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
}

fn value_at(iter: &mut chunk_arrow::ChunkIterator) -> i64 {
    let StructuredValue::Scalar(NativeScalar::Integer(n)) = iter.extract_cell(0).unwrap() else {
        panic!("expected an integer scalar");
    };
    n
}

#[test]
fn next_crosses_batch_boundaries_and_skips_empty_batches() {
    let batches = vec![
        int64_batch(vec![1, 2]),
        int64_batch(vec![]),
        int64_batch(vec![3]),
    ];
    let chunk = ResultChunk::from_arrow(0, batches, vec![LogicalType::integer(18)]).unwrap();
    let mut iter = chunk.iter(DecodeConfig::default());

    assert_eq!(iter.batch_index(), 0);
    assert_eq!(iter.row_index(), -1);

    assert!(iter.next());
    assert_eq!((iter.batch_index(), iter.row_index()), (0, 0));
    assert_eq!(value_at(&mut iter), 1);

    assert!(iter.next());
    assert_eq!((iter.batch_index(), iter.row_index()), (0, 1));
    assert_eq!(value_at(&mut iter), 2);

    assert!(iter.next());
    assert_eq!((iter.batch_index(), iter.row_index()), (2, 0));
    assert_eq!(value_at(&mut iter), 3);

    assert!(!iter.next());
}

#[test]
fn rewind_crosses_batch_boundaries_backward() {
    let batches = vec![int64_batch(vec![10, 11]), int64_batch(vec![12])];
    let chunk = ResultChunk::from_arrow(0, batches, vec![LogicalType::integer(18)]).unwrap();
    let mut iter = chunk.iter(DecodeConfig::default());

    assert!(iter.next());
    assert!(iter.next());
    assert!(iter.next());
    assert_eq!((iter.batch_index(), iter.row_index()), (1, 0));
    assert_eq!(value_at(&mut iter), 12);

    assert!(iter.rewind());
    assert_eq!((iter.batch_index(), iter.row_index()), (0, 1));
    assert_eq!(value_at(&mut iter), 11);

    assert!(iter.rewind());
    assert_eq!((iter.batch_index(), iter.row_index()), (0, 0));
    assert_eq!(value_at(&mut iter), 10);

    assert!(!iter.rewind());
    assert_eq!(iter.row_index(), -1);
}

#[test]
fn extract_cell_before_first_next_reports_cache_invariant_violation() {
    let chunk = ResultChunk::from_arrow(0, vec![int64_batch(vec![1])], vec![LogicalType::integer(18)]).unwrap();
    let mut iter = chunk.iter(DecodeConfig::default());
    let err = iter.extract_cell(0).unwrap_err();
    assert!(matches!(
        err,
        chunk_core::error::ConversionError::CacheInvariantViolated { .. }
    ));
}

#[test]
fn row_count_and_column_count_span_every_batch() {
    let batches = vec![int64_batch(vec![1, 2]), int64_batch(vec![3])];
    let chunk = ResultChunk::from_arrow(0, batches, vec![LogicalType::integer(18)]).unwrap();
    assert_eq!(chunk.row_count(), 3);
    assert_eq!(chunk.column_count(), 1);
}

#[test]
fn json_backed_chunk_decodes_row_arrays() {
    let schema = vec![LogicalType::Text, LogicalType::integer(18)];
    let batches = vec![br#"[["a",1],["b",2]]"#.to_vec()];
    let chunk = ResultChunk::from_json(0, batches, schema);
    assert_eq!(chunk.row_count(), 2);
    let mut iter = chunk.iter(DecodeConfig::default());

    assert!(iter.next());
    let StructuredValue::Scalar(NativeScalar::Text(label)) = iter.extract_cell(0).unwrap() else {
        panic!("expected a text scalar");
    };
    assert_eq!(label, "a");
    let StructuredValue::Scalar(NativeScalar::Integer(n)) = iter.extract_cell(1).unwrap() else {
        panic!("expected an integer scalar");
    };
    assert_eq!(n, 1);

    assert!(iter.next());
    let StructuredValue::Scalar(NativeScalar::Integer(n)) = iter.extract_cell(1).unwrap() else {
        panic!("expected an integer scalar");
    };
    assert_eq!(n, 2);

    assert!(!iter.next());
}
