use proc_macro::TokenStream;
use syn::{Data, DataStruct, DeriveInput, Fields};

use crate::attrs::parse_field_rename;

pub(crate) fn derive_bind_target(input: &DeriveInput) -> TokenStream {
    match impl_bind_target(input) {
        Ok(ts) => ts.into(),
        Err(e) => e.into_compile_error().into(),
    }
}

fn impl_bind_target(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Struct(DataStruct {
        fields: Fields::Named(fields),
        ..
    }) = &input.data
    else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(BindTarget)] only supports structs with named fields",
        ));
    };

    let len = fields.named.len();
    let mut field_descriptor_entries = Vec::with_capacity(len);
    let mut bind_by_name_entries = Vec::with_capacity(len);
    let mut bind_by_order_entries = Vec::with_capacity(len);

    for (i, f) in fields.named.iter().enumerate() {
        let fname = f.ident.as_ref().expect("named");
        let fty = &f.ty;
        let idx = syn::Index::from(i);
        let matched_name = parse_field_rename(&f.attrs)?.unwrap_or_else(|| fname.to_string());

        field_descriptor_entries.push(quote::quote! {
            ::chunk_core::binder::FieldDescriptor { name: #matched_name }
        });

        bind_by_name_entries.push(quote::quote! {
            #fname: {
                let __found = __pairs
                    .iter()
                    .find(|(k, _)| {
                        if config.case_insensitive_names {
                            k.eq_ignore_ascii_case(#matched_name)
                        } else {
                            k == #matched_name
                        }
                    })
                    .map(|(_, v)| v.clone())
                    .unwrap_or(::chunk_core::structured::StructuredValue::Null);
                <#fty as ::chunk_core::binder::FromStructured>::from_structured(__found, location)?
            }
        });

        bind_by_order_entries.push(quote::quote! {
            #fname: <#fty as ::chunk_core::binder::FromStructured>::from_structured(
                __values[#idx].clone(),
                location,
            )?
        });
    }

    let expanded = quote::quote! {
        impl ::chunk_core::binder::BindTarget for #name {
            fn field_descriptors() -> &'static [::chunk_core::binder::FieldDescriptor] {
                static FIELDS: &[::chunk_core::binder::FieldDescriptor] = &[
                    #(#field_descriptor_entries),*
                ];
                FIELDS
            }

            fn bind_by_name(
                __pairs: &[(::std::string::String, ::chunk_core::structured::StructuredValue)],
                config: &::chunk_core::config::DecodeConfig,
                location: ::chunk_core::error::CellLocation,
            ) -> ::std::result::Result<Self, ::chunk_core::error::ConversionError> {
                ::std::result::Result::Ok(#name {
                    #(#bind_by_name_entries),*
                })
            }

            fn bind_by_order(
                __values: &[::chunk_core::structured::StructuredValue],
                location: ::chunk_core::error::CellLocation,
            ) -> ::std::result::Result<Self, ::chunk_core::error::ConversionError> {
                if __values.len() != #len {
                    return ::std::result::Result::Err(
                        ::chunk_core::error::ConversionError::ArityMismatch {
                            location,
                            expected: #len,
                            got: __values.len(),
                        },
                    );
                }
                ::std::result::Result::Ok(#name {
                    #(#bind_by_order_entries),*
                })
            }

            fn bind_by_constructor(
                __values: &[::chunk_core::structured::StructuredValue],
                location: ::chunk_core::error::CellLocation,
            ) -> ::std::result::Result<Self, ::chunk_core::error::ConversionError> {
                if __values.len() != #len {
                    return ::std::result::Result::Err(
                        ::chunk_core::error::ConversionError::NoMatchingConstructor {
                            location,
                            arity: __values.len(),
                        },
                    );
                }
                <#name as ::chunk_core::binder::BindTarget>::bind_by_order(__values, location)
            }
        }

        impl ::chunk_core::binder::FromStructured for #name {
            fn from_structured(
                value: ::chunk_core::structured::StructuredValue,
                location: ::chunk_core::error::CellLocation,
            ) -> ::std::result::Result<Self, ::chunk_core::error::ConversionError> {
                ::chunk_core::binder::nested_from_structured::<#name>(value, location)
            }
        }
    };

    Ok(expanded)
}
