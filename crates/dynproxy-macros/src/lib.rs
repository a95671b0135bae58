//! dynproxy Proc Macros
//!
//! Procedural macros for declaring proxied interfaces and the types that
//! flow through them.
//!
//! # Macros
//!
//! - `#[derive(Any)]` - Give a type a declared identity
//! - `#[dynproxy::interface]` - Declare an interface from a trait and
//!   generate its typed proxy adapter
//!
//! # Example
//!
//! ```ignore
//! use dynproxy::{Any, interface};
//!
//! #[derive(Any)]
//! #[proxy(name = "Point")]
//! pub struct Point {
//!     pub x: i32,
//! }
//!
//! #[interface(namespace = "Geometry")]
//! pub trait IShape {
//!     fn area(&self) -> f64;
//!     #[proxy(name = "Move")]
//!     fn move_to(&mut self, x: i32, y: i32);
//! }
//! ```

use proc_macro::TokenStream;

mod attrs;
mod derive_any;
mod interface;

/// Derive the `Any` trait for a type.
///
/// The type becomes a reference type named after the Rust identifier.
///
/// # Attributes
///
/// - `#[proxy(name = "...")]` - Override the declared type name
#[proc_macro_derive(Any, attributes(proxy))]
pub fn derive_any(input: TokenStream) -> TokenStream {
    derive_any::derive_any_impl(input)
}

/// Declare an interface from a Rust trait.
///
/// The trait is emitted unchanged. Alongside it, a `{Trait}Proxy` newtype
/// is generated that implements `ProxyInterface` and carries one inherent
/// forwarding method per trait method, returning `Result<_, ProxyError>`.
///
/// Every parameter and return type must implement `Any`, `IntoDynamic` and
/// `FromDynamic`. Supertraits other than marker traits become base
/// interfaces and must themselves be declared with this attribute.
///
/// # Arguments
///
/// - `name = "..."` - Override the interface name
/// - `namespace = "..."` - Namespace annotation
///
/// # Method Attributes
///
/// - `#[proxy(name = "...")]` - Override the declared method name
///
/// # Example
///
/// ```ignore
/// #[dynproxy::interface(name = "ICalc")]
/// pub trait Calculator: Resettable {
///     #[proxy(name = "Add")]
///     fn add(&mut self, a: i32, b: i32) -> i32;
/// }
/// ```
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    interface::interface_impl(attr, item)
}
