use chunk_core::binder::{bind, BinderStrategy, FromStructured};
use chunk_core::config::DecodeConfig;
use chunk_core::error::CellLocation;
use chunk_core::scalar::NativeScalar;
use chunk_core::structured::StructuredValue;
use chunk_derive::BindTarget;

#[derive(BindTarget)]
struct Address {
    city: String,
    zip: Option<String>,
}

fn main() {
    let pairs = vec![
        ("city".to_string(), StructuredValue::Scalar(NativeScalar::Text("Reno".to_string()))),
        ("zip".to_string(), StructuredValue::Null),
    ];
    let addr: Address = bind(
        BinderStrategy::PropertiesNames,
        pairs,
        &DecodeConfig::default(),
        CellLocation::default(),
    )
    .unwrap();
    assert_eq!(addr.city, "Reno");
    assert_eq!(addr.zip, None);

    let nested = StructuredValue::Object(vec![
        ("city".to_string(), StructuredValue::Scalar(NativeScalar::Text("Reno".to_string()))),
        ("zip".to_string(), StructuredValue::Null),
    ]);
    let addr2 = Address::from_structured(nested, CellLocation::default()).unwrap();
    assert_eq!(addr2.city, "Reno");
}
