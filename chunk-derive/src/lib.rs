//! `#[derive(BindTarget)]`: binds a materialized structured value's fields
//! into a plain Rust struct.

mod attrs;
mod bind_target;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(BindTarget, attributes(bind))]
pub fn derive_bind_target(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    bind_target::derive_bind_target(&input)
}
