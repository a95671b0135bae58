//! dynproxy: dispatch proxies for arbitrary interfaces.
//!
//! Given an interface and a dispatcher base, synthesizes on first use a
//! concrete implementation of the interface that forwards every call
//! through the two-operation [`Dispatch`] contract:
//!
//! - constructors forward to the base constructor with the same parameters
//! - each method packs its arguments (or passes [`Arguments::NoArgs`]),
//!   calls [`Dispatch::invoke`] with its name, and converts the result to
//!   its declared return type with [`Dispatch::convert_return_value`],
//!   skipping the conversion for methods that return nothing
//!
//! Synthesized types are cached per (base, interface) pairing for the life
//! of the [`ProxyFactory`].
//!
//! ## Crates
//!
//! - `dynproxy-core`: type identity, boxed values, the dispatch contract
//! - `dynproxy-registry`: the kind registry and interface flattening
//! - `dynproxy-emit`: verified straight-line code emission
//! - `dynproxy-macros`: `#[derive(Any)]` and `#[dynproxy::interface]`
//!
//! ## Example
//!
//! ```ignore
//! use dynproxy::{Arguments, Dispatch, DispatchError, DispatcherEntry, Dynamic, ProxyFactory};
//!
//! #[dynproxy::interface]
//! pub trait ICalc {
//!     #[proxy(name = "Add")]
//!     fn add(&self, a: i32, b: i32) -> i32;
//! }
//!
//! struct Summing;
//!
//! impl Dispatch for Summing {
//!     fn invoke(&mut self, _: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
//!         let total: i32 = args.as_slice().iter().filter_map(|a| match a {
//!             Dynamic::Int32(v) => Some(*v),
//!             _ => None,
//!         }).sum();
//!         Ok(Some(Dynamic::Int32(total)))
//!     }
//! }
//!
//! let factory = ProxyFactory::new();
//! let base = factory.register_dispatcher(
//!     DispatcherEntry::new("Summing").with_default_constructor(|| Summing),
//! )?;
//! let mut calc: ICalcProxy = factory.create(base, vec![])?;
//! assert_eq!(calc.add(1, 2)?, 3);
//! ```

// Lets the macros' `::dynproxy::` paths resolve inside this crate.
extern crate self as dynproxy;

mod cache;
mod config;
mod error;
mod factory;
mod interface;
mod proxy_type;
mod runtime;
mod synth;

pub use cache::ProxyTypeCache;
pub use config::{DEFAULT_MODULE_NAME, FactoryConfig};
pub use error::{InvalidArgument, ProxyError, Result};
pub use factory::ProxyFactory;
pub use interface::ProxyInterface;
pub use proxy_type::ProxyType;
pub use runtime::ProxyObject;
pub use synth::proxy_type_name;

// Core types
pub use dynproxy_core::{
    Any, Arguments, AsAny, ClassEntry, ConstructorEntry, ConversionError, DataType, Dispatch,
    DispatchError, DispatcherEntry, Dynamic, FromDynamic, Handle, InterfaceEntry, IntoDynamic,
    MethodSignature, Nullable, ObjectRef, PrimitiveKind, RegistrationError, Slot, TypeCategory, TypeEntry,
    TypeHash, convert_exact, primitives,
};
pub use dynproxy_core::dispatch::{CONTRACT_NAME, contract_type_hash};

// Registry
pub use dynproxy_registry::{FlattenedInterface, KindRegistry};

// Emission, for inspecting synthesized bodies
pub use dynproxy_emit::{EmitError, EmittedMember, EmittedType, MemberFlags, MethodBody, OpCode};

// Macros
pub use dynproxy_macros::{Any, interface};
