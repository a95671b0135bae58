//! Attribute parsing utilities for dynproxy macros.

use syn::{Attribute, LitStr, meta::ParseNestedMeta};

/// Parsed `#[proxy(...)]` attributes on a type or a trait method.
#[derive(Debug, Default)]
pub struct ProxyAttrs {
    /// Override the declared name (default: the Rust identifier).
    pub name: Option<String>,
}

impl ProxyAttrs {
    /// Parse attributes from a list of `#[proxy(...)]` attributes.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !is_proxy_attr(attr) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    result.name = Some(value.value());
                    Ok(())
                } else {
                    Err(unknown(&meta))
                }
            })?;
        }

        Ok(result)
    }
}

/// Parsed arguments of `#[dynproxy::interface(...)]`.
#[derive(Debug, Default)]
pub struct InterfaceAttrs {
    /// Override the interface name.
    pub name: Option<String>,
    /// Namespace annotation.
    pub namespace: Option<String>,
}

impl InterfaceAttrs {
    /// Handle one `key = "value"` item.
    pub fn parse_item(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            let value: LitStr = meta.value()?.parse()?;
            self.name = Some(value.value());
            Ok(())
        } else if meta.path.is_ident("namespace") {
            let value: LitStr = meta.value()?.parse()?;
            self.namespace = Some(value.value());
            Ok(())
        } else {
            Err(unknown(&meta))
        }
    }
}

/// Check if an attribute is one of ours.
pub fn is_proxy_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("proxy")
}

fn unknown(meta: &ParseNestedMeta) -> syn::Error {
    meta.error(format!(
        "unknown proxy attribute: {}",
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    ))
}
