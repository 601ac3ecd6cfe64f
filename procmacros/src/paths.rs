//! Fully-qualified paths for generated code.
//!
//! The `quarry::` prefix (without a leading `::`) lets tests inside the
//! workspace provide a `mod quarry { ... }` shim re-exporting the core crate.

use proc_macro2::TokenStream;
use quote::quote;

pub mod std {
    use super::*;

    pub fn result() -> TokenStream {
        quote!(::std::result::Result)
    }

    pub fn option() -> TokenStream {
        quote!(::std::option::Option)
    }

    pub fn offset_of() -> TokenStream {
        quote!(::std::mem::offset_of)
    }
}

pub mod core {
    use super::*;

    pub fn entity() -> TokenStream {
        quote!(quarry::core::Entity)
    }

    pub fn entity_def() -> TokenStream {
        quote!(quarry::core::EntityDef)
    }

    pub fn field_def() -> TokenStream {
        quote!(quarry::core::FieldDef)
    }

    pub fn shape() -> TokenStream {
        quote!(quarry::core::Shape)
    }

    pub fn record() -> TokenStream {
        quote!(quarry::core::Record)
    }

    pub fn sql_type() -> TokenStream {
        quote!(quarry::core::SqlType)
    }

    pub fn value() -> TokenStream {
        quote!(quarry::core::Value)
    }

    pub fn orm_error() -> TokenStream {
        quote!(quarry::core::OrmError)
    }

    pub fn result() -> TokenStream {
        quote!(quarry::core::Result)
    }
}
