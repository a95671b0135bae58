//! dynproxy core types.
//!
//! Everything a dispatcher, an interface declaration and the synthesis engine
//! have in common:
//!
//! - [`type_hash`]: deterministic identities for kinds, signatures and proxies
//! - [`data_type`]: declared parameter and return types
//! - [`dynamic`]: boxed values and unboxed frame slots
//! - [`dispatch`]: the two-operation dispatch contract
//! - [`entries`]: catalog entries for interfaces, dispatchers and classes
//! - [`convert`]: conversions between Rust values and [`Dynamic`]

mod any;
pub mod convert;
pub mod data_type;
pub mod dispatch;
pub mod dynamic;
pub mod entries;
mod error;
mod primitive_kind;
mod signature;
pub mod type_hash;

pub use any::{Any, Nullable};
pub use convert::{FromDynamic, Handle, IntoDynamic};
pub use data_type::{DataType, TypeCategory};
pub use dispatch::{Arguments, AsAny, Dispatch, convert_exact};
pub use dynamic::{Dynamic, ObjectRef, Slot};
pub use entries::{
    ClassEntry, ConstructorEntry, ConstructorFn, DispatcherEntry, InterfaceEntry, TypeEntry,
};
pub use error::{ConversionError, DispatchError, RegistrationError};
pub use primitive_kind::PrimitiveKind;
pub use signature::MethodSignature;
pub use type_hash::{TypeHash, primitives};
