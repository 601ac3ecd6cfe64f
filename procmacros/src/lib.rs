#![recursion_limit = "128"]

extern crate proc_macro;

mod entity;
mod paths;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Implements `Entity` and `Record` for a struct so it can be registered as
/// a model.
///
/// Columns default to the snake-cased field name. `#[orm("column=name")]` on
/// a field overrides it; the string is stored verbatim as the field's tag.
/// `#[orm(table = "name")]` on the struct overrides the table name.
///
/// # Example
///
/// ```rust
/// use quarry::Entity;
///
/// #[derive(Entity, Debug, Default)]
/// #[orm(table = "people")]
/// struct Person {
///     id: i64,
///     #[orm("column=given_name")]
///     first_name: String,
///     nickname: Option<String>,
/// }
/// ```
///
/// Tuple and unit structs derive an opaque entity, which registration
/// rejects. Generic structs are not supported.
#[proc_macro_derive(Entity, attributes(orm))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match entity::generate_entity(input) {
        Ok(expanded) => expanded.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
