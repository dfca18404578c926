use syn::{Attribute, LitStr};

/// `#[bind(name = "...")]` on a field: override the name matched against
/// JSON pairs under `PROPERTIES_NAMES`, without changing the Rust field name.
pub(crate) fn parse_field_rename(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if attr.path().is_ident("bind") {
            let mut renamed: Option<String> = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    renamed = Some(s.value());
                } else if let Ok(v) = meta.value() {
                    let _expr: syn::Expr = v.parse()?;
                }
                Ok(())
            })?;
            if renamed.is_some() {
                return Ok(renamed);
            }
        }
    }
    Ok(None)
}
