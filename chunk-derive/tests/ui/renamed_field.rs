use chunk_core::binder::{bind, BinderStrategy};
use chunk_core::config::DecodeConfig;
use chunk_core::error::CellLocation;
use chunk_core::scalar::NativeScalar;
use chunk_core::structured::StructuredValue;
use chunk_derive::BindTarget;

#[derive(BindTarget)]
struct Employee {
    #[bind(name = "full_name")]
    name: String,
}

fn main() {
    let pairs = vec![(
        "FULL_NAME".to_string(),
        StructuredValue::Scalar(NativeScalar::Text("Ada Lovelace".to_string())),
    )];
    let employee: Employee = bind(
        BinderStrategy::PropertiesNames,
        pairs,
        &DecodeConfig::default(),
        CellLocation::default(),
    )
    .unwrap();
    assert_eq!(employee.name, "Ada Lovelace");
}
