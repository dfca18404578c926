//! Decode a single JSON result cell into a bound Rust struct, and show the
//! `tracing` diagnostics produced when a cell doesn't fit.
//!
//! Run with `RUST_LOG=debug cargo run --example decode_chunk` to see the
//! `tracing::debug!` span emitted by the deliberate overflow below.

use chunk_core::prelude::*;

#[derive(BindTarget, Debug)]
struct Customer {
    name: String,
    #[bind(name = "zip_code")]
    zip: Option<String>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = DecodeConfig::default();
    let location = CellLocation::new(0, 0, 0);

    let raw = br#"{"name":"Ada Lovelace","zip_code":"89501"}"#;
    let parsed = chunk_core::json::parse(raw, location).expect("valid JSON");
    let ty = LogicalType::StructuredObject {
        fields: vec![
            ("name".to_string(), LogicalType::Text),
            ("zip_code".to_string(), LogicalType::Text),
        ],
    };
    let materialized =
        chunk_core::structured::materialize(&parsed, &ty, &config, location).expect("schema matches");

    let pairs = match materialized {
        StructuredValue::Object(pairs) => pairs,
        other => panic!("expected an object, got {other:?}"),
    };
    let customer: Customer =
        bind(BinderStrategy::PropertiesNames, pairs, &config, location).expect("fields bind");
    println!("decoded: {customer:?}");

    // A cell too wide for its declared width logs a debug span instead of
    // panicking; with RUST_LOG=debug this prints the overflowing raw value.
    match chunk_core::scalar::convert_integer(1 << 40, 32, location) {
        Ok(value) => println!("unexpected fit: {value}"),
        Err(err) => println!("overflow rejected as expected: {err}"),
    }
}
