//! `#[derive(Entity)]` code generation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Result};

use crate::paths::{core as core_paths, std as std_paths};

/// Container-level `#[orm(table = "...")]`.
fn parse_table_name(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut table = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                table = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unsupported orm attribute, expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(table)
}

/// Field-level `#[orm("key=value,...")]`, kept verbatim.
fn parse_field_tag(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut tag = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("orm")) {
        if tag.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate orm attribute"));
        }
        tag = Some(attr.parse_args::<LitStr>()?);
    }
    Ok(tag)
}

pub fn generate_entity(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Entity can only be derived for structs",
        ));
    };

    let entity = core_paths::entity();
    let entity_def = core_paths::entity_def();
    let field_def = core_paths::field_def();
    let shape = core_paths::shape();
    let record = core_paths::record();
    let sql_type = core_paths::sql_type();
    let value = core_paths::value();
    let orm_error = core_paths::orm_error();
    let result = core_paths::result();
    let std_result = std_paths::result();
    let option = std_paths::option();
    let offset_of = std_paths::offset_of();

    let type_name = name.to_string();
    let table_name = match parse_table_name(&input.attrs)? {
        Some(table) => quote!(#option::Some(#table)),
        None => quote!(#option::None),
    };

    let named = match &data.fields {
        Fields::Named(fields) => Some(&fields.named),
        Fields::Unnamed(_) | Fields::Unit => None,
    };

    let (shape_expr, get_arms, set_arms) = match named {
        Some(fields) => {
            let mut defs = Vec::with_capacity(fields.len());
            let mut get_arms = Vec::with_capacity(fields.len());
            let mut set_arms = Vec::with_capacity(fields.len());
            for (index, field) in fields.iter().enumerate() {
                let Some(ident) = field.ident.as_ref() else {
                    continue;
                };
                let ty = &field.ty;
                let field_name = ident.to_string();
                let tag = parse_field_tag(&field.attrs)?
                    .map(|t| t.value())
                    .unwrap_or_default();
                defs.push(quote! {
                    #field_def {
                        name: #field_name,
                        tag: #tag,
                        ty: <#ty as #sql_type>::VALUE_TYPE,
                        offset: #offset_of!(#name, #ident),
                    }
                });
                get_arms.push(quote! {
                    #index => #std_result::Ok(<#ty as #sql_type>::to_value(&self.#ident)),
                });
                set_arms.push(quote! {
                    #index => {
                        self.#ident = <#ty as #sql_type>::from_value(value)?;
                        #std_result::Ok(())
                    }
                });
            }
            (quote!(#shape::Struct(&[#(#defs),*])), get_arms, set_arms)
        }
        None => (quote!(#shape::Opaque), Vec::new(), Vec::new()),
    };

    let value_arg = if set_arms.is_empty() {
        quote!(_value)
    } else {
        quote!(value)
    };

    Ok(quote! {
        // SAFETY: every FieldDef is generated from the struct's own field
        // list, with the offset and SqlType of that field.
        unsafe impl #entity for #name {
            fn entity_def() -> &'static #entity_def {
                static DEF: #entity_def = #entity_def {
                    type_name: #type_name,
                    table_name: #table_name,
                    shape: #shape_expr,
                };
                &DEF
            }
        }

        impl #record for #name {
            fn field_value(&self, index: usize) -> #result<#value> {
                match index {
                    #(#get_arms)*
                    _ => #std_result::Err(#orm_error::UnknownField(index.to_string())),
                }
            }

            fn set_field_value(&mut self, index: usize, #value_arg: #value) -> #result<()> {
                match index {
                    #(#set_arms)*
                    _ => #std_result::Err(#orm_error::UnknownField(index.to_string())),
                }
            }
        }
    })
}
