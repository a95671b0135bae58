//! Implementation of the `#[dynproxy::interface]` attribute macro.
//!
//! Turns a Rust trait into an interface declaration plus a typed adapter:
//!
//! - the trait itself, unchanged apart from `#[proxy(...)]` helper attributes
//! - `{Trait}Proxy`, a newtype over `ProxyObject` implementing
//!   `ProxyInterface`, with one forwarding inherent method per trait method

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{FnArg, ItemTrait, ReturnType, TraitItem, Type, TypeParamBound};

use crate::attrs::{InterfaceAttrs, ProxyAttrs, is_proxy_attr};

/// Marker supertraits that are not interfaces.
const MARKER_TRAITS: &[&str] = &["Send", "Sync", "Sized", "Unpin"];

pub fn interface_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut attrs = InterfaceAttrs::default();
    let parser = syn::meta::parser(|meta| attrs.parse_item(meta));
    if let Err(err) = syn::parse::Parser::parse(parser, attr) {
        return err.to_compile_error().into();
    }

    let input = syn::parse_macro_input!(item as ItemTrait);

    match interface_inner(&attrs, input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct MethodInfo {
    ident: syn::Ident,
    declared_name: String,
    param_types: Vec<Type>,
    return_type: Type,
    is_void: bool,
}

fn interface_inner(attrs: &InterfaceAttrs, mut input: ItemTrait) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic interfaces cannot be proxied",
        ));
    }

    let trait_name = input.ident.clone();
    let vis = input.vis.clone();
    let proxy_name = format_ident!("{}Proxy", trait_name);
    let declared_name = attrs.name.clone().unwrap_or_else(|| trait_name.to_string());

    let methods = collect_methods(&mut input)?;
    let bases = collect_bases(&input);

    let namespace = attrs.namespace.as_ref().map(|ns| quote! { .with_namespace(#ns) });

    let method_entries = methods.iter().map(|m| {
        let name = &m.declared_name;
        let params = &m.param_types;
        let ret = &m.return_type;
        quote! {
            .with_method(::dynproxy::MethodSignature::new(
                #name,
                vec![#(<#params as ::dynproxy::Any>::data_type()),*],
                <#ret as ::dynproxy::Any>::data_type(),
            ))
        }
    });

    let base_entries = bases.iter().map(|base| {
        quote! { .with_base(<#base as ::dynproxy::ProxyInterface>::type_hash()) }
    });

    let base_registrations = bases.iter().map(|base| {
        quote! { <#base as ::dynproxy::ProxyInterface>::register(kinds)?; }
    });

    let forwarders = methods.iter().map(generate_forwarder);

    let proxy_doc = format!("Typed proxy adapter for the `{declared_name}` interface.");

    Ok(quote! {
        #input

        #[doc = #proxy_doc]
        #vis struct #proxy_name(::dynproxy::ProxyObject);

        impl #proxy_name {
            #(#forwarders)*
        }

        impl ::dynproxy::ProxyInterface for #proxy_name {
            fn interface_entry() -> ::dynproxy::InterfaceEntry {
                ::dynproxy::InterfaceEntry::new(#declared_name)
                    #namespace
                    #(#method_entries)*
                    #(#base_entries)*
            }

            fn type_hash() -> ::dynproxy::TypeHash {
                ::dynproxy::TypeHash::from_name(#declared_name)
            }

            fn register_bases(
                kinds: &mut ::dynproxy::KindRegistry,
            ) -> ::std::result::Result<(), ::dynproxy::RegistrationError> {
                #(#base_registrations)*
                Ok(())
            }

            fn from_object_unchecked(object: ::dynproxy::ProxyObject) -> Self {
                Self(object)
            }

            fn object(&self) -> &::dynproxy::ProxyObject {
                &self.0
            }

            fn object_mut(&mut self) -> &mut ::dynproxy::ProxyObject {
                &mut self.0
            }

            fn into_object(self) -> ::dynproxy::ProxyObject {
                self.0
            }
        }
    })
}

/// Validate the trait's methods and strip our helper attributes.
fn collect_methods(input: &mut ItemTrait) -> syn::Result<Vec<MethodInfo>> {
    let mut methods = Vec::new();

    for item in &mut input.items {
        let method = match item {
            TraitItem::Fn(method) => method,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "only methods can be proxied (no properties, constants or associated types)",
                ));
            }
        };

        let attrs = ProxyAttrs::from_attrs(&method.attrs)?;
        method.attrs.retain(|attr| !is_proxy_attr(attr));

        let sig = &method.sig;
        if !sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &sig.generics,
                "generic methods cannot be proxied",
            ));
        }
        if sig.receiver().is_none() {
            return Err(syn::Error::new_spanned(
                sig,
                "proxied methods must take `&self` or `&mut self`",
            ));
        }

        let mut param_types = Vec::new();
        for arg in &sig.inputs {
            if let FnArg::Typed(pat_type) = arg {
                reject_references(&pat_type.ty, "by-reference parameters cannot be proxied")?;
                param_types.push((*pat_type.ty).clone());
            }
        }

        let (return_type, is_void) = match &sig.output {
            ReturnType::Default => (syn::parse_quote!(()), true),
            ReturnType::Type(_, ty) => {
                reject_references(ty, "reference return types cannot be proxied")?;
                let is_unit = matches!(&**ty, Type::Tuple(t) if t.elems.is_empty());
                ((**ty).clone(), is_unit)
            }
        };

        methods.push(MethodInfo {
            ident: sig.ident.clone(),
            declared_name: attrs.name.unwrap_or_else(|| sig.ident.to_string()),
            param_types,
            return_type,
            is_void,
        });
    }

    Ok(methods)
}

fn reject_references(ty: &Type, message: &str) -> syn::Result<()> {
    match ty {
        Type::Reference(_) | Type::Ptr(_) => Err(syn::Error::new_spanned(ty, message)),
        Type::Paren(inner) => reject_references(&inner.elem, message),
        Type::Group(inner) => reject_references(&inner.elem, message),
        _ => Ok(()),
    }
}

/// Supertraits become base interfaces: `Trait: Base` → `BaseProxy`.
fn collect_bases(input: &ItemTrait) -> Vec<syn::Path> {
    input
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => Some(&bound.path),
            _ => None,
        })
        .filter(|path| {
            path.segments
                .last()
                .is_some_and(|seg| !MARKER_TRAITS.contains(&seg.ident.to_string().as_str()))
        })
        .map(|path| {
            let mut path = path.clone();
            if let Some(last) = path.segments.last_mut() {
                last.ident = format_ident!("{}Proxy", last.ident);
                last.arguments = syn::PathArguments::None;
            }
            path
        })
        .collect()
}

fn generate_forwarder(method: &MethodInfo) -> TokenStream2 {
    let ident = &method.ident;
    let name = &method.declared_name;
    let ret = &method.return_type;
    let params = &method.param_types;
    let args: Vec<_> = (0..params.len()).map(|i| format_ident!("arg{}", i)).collect();
    let doc = format!("Forward `{name}` through the proxy.");

    let call = quote! {
        self.0.call_signature(
            ::dynproxy::TypeHash::from_signature(
                #name,
                &[#(<#params as ::dynproxy::Any>::data_type().type_hash),*],
            ),
            vec![#(::dynproxy::IntoDynamic::into_dynamic(#args)),*],
        )
    };

    let body = if method.is_void {
        quote! {
            #call?;
            Ok(())
        }
    } else {
        quote! {
            let value = #call?.unwrap_or(::dynproxy::Dynamic::Null);
            <#ret as ::dynproxy::FromDynamic>::from_dynamic(value).map_err(::dynproxy::ProxyError::from)
        }
    };

    quote! {
        #[doc = #doc]
        pub fn #ident(&mut self, #(#args: #params),*) -> ::std::result::Result<#ret, ::dynproxy::ProxyError> {
            #body
        }
    }
}
