use std::sync::Arc;

use arrow_array::{Int32Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use chunk_arrow::ResultChunk;
use chunk_core::{catalog::LogicalType, config::DecodeConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const ROWS: usize = 50_000;

fn synthetic_batch() -> (RecordBatch, Vec<LogicalType>) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("amount_cents", DataType::Int32, false),
        Field::new("label", DataType::Utf8, false),
    ]));
    let ids: Vec<i64> = (0..ROWS as i64).collect();
    let amounts: Vec<i32> = (0..ROWS as i32).map(|v| v % 10_000).collect();
    let labels: Vec<String> = (0..ROWS).map(|i| format!("row-{i}")).collect();
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(Int64Array::from(ids)),
            Arc::new(Int32Array::from(amounts)),
            Arc::new(StringArray::from(labels)),
        ],
    )
    .expect("valid batch");
    let columns = vec![
        LogicalType::integer(18),
        LogicalType::decimal(2, 10),
        LogicalType::Text,
    ];
    (batch, columns)
}

fn extract_cell_benchmark(c: &mut Criterion) {
    let (batch, schema) = synthetic_batch();
    c.bench_function("extract_cell over 50k-row batch, 3 columns", |b| {
        b.iter(|| {
            let chunk = ResultChunk::from_arrow(0, vec![batch.clone()], schema.clone())
                .expect("schema width matches batch");
            let mut iter = chunk.iter(DecodeConfig::default());
            let mut touched = 0usize;
            while iter.next() {
                for column in 0..3 {
                    black_box(iter.extract_cell(column).expect("cell decodes"));
                }
                touched += 1;
            }
            black_box(touched)
        });
    });
}

criterion_group!(benches, extract_cell_benchmark);
criterion_main!(benches);
