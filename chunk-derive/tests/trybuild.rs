//! Compile-time checks for `#[derive(BindTarget)]` expansion shapes.
//!
//! Only `pass` cases: a wrong expansion for a rejected shape (e.g. a tuple
//! struct, or an enum) is already caught directly by `bind_target.rs`'s own
//! `syn::Error::new_spanned` unit-level behavior, and pinning the exact
//! rustc diagnostic text here would make this suite brittle to compiler
//! wording changes rather than to our macro's own correctness.

#[test]
fn bind_target_expands_for_supported_shapes() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/named_fields.rs");
    t.pass("tests/ui/renamed_field.rs");
}
