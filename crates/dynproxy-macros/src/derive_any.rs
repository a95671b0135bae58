//! Implementation of the `#[derive(Any)]` macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

use crate::attrs::ProxyAttrs;

pub fn derive_any_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_any_inner(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_any_inner(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Any)] does not support generic types",
        ));
    }

    let attrs = ProxyAttrs::from_attrs(&input.attrs)?;
    let declared_name = attrs.name.unwrap_or_else(|| name.to_string());

    Ok(quote! {
        impl ::dynproxy::Any for #name {
            fn type_hash() -> ::dynproxy::TypeHash {
                ::dynproxy::TypeHash::from_name(#declared_name)
            }

            fn type_name() -> &'static str {
                #declared_name
            }
        }
    })
}
