//! `#[derive(Event)]` implementation.
//!
//! # Attributes
//!
//! | Key | Example | Required | Description |
//! |-----|---------|----------|-------------|
//! | `name` | `"member.joined"` | No | Event name (default: the type name in snake_case) |

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, LitStr, spanned::Spanned};

pub fn derive_event(input: &DeriveInput) -> syn::Result<TokenStream> {
    if let Data::Union(_) = input.data {
        return Err(syn::Error::new(
            input.span(),
            "Event cannot be derived for unions",
        ));
    }

    let name = &input.ident;
    let event_name = match parse_event_name(&input.attrs)? {
        Some(lit) => lit,
        None => LitStr::new(&to_snake_case(&name.to_string()), name.span()),
    };
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::herald_core::Event for #name #ty_generics #where_clause {
            fn event_name(&self) -> &'static str {
                #event_name
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn into_any(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::sync::Arc<dyn ::std::any::Any + ::std::marker::Send + ::std::marker::Sync>
            {
                self
            }
        }
    })
}

fn parse_event_name(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut name = None;

    for attr in attrs {
        if !attr.path().is_ident("event") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                name = Some(meta.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                Err(meta.error("unknown event attribute, expected `name`"))
            }
        })?;
    }

    Ok(name)
}

fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    let mut prev_lower = false;

    for ch in ident.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out
}
