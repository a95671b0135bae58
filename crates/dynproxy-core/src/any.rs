//! Type identity for Rust types that appear in proxied signatures.
//!
//! Every parameter and return type of a `#[dynproxy::interface]` trait must
//! implement [`Any`], which maps the Rust type to its declared [`DataType`].
//!
//! ```
//! use dynproxy_core::{Any, TypeHash};
//!
//! struct Point {
//!     x: i32,
//! }
//!
//! impl Any for Point {
//!     fn type_hash() -> TypeHash {
//!         TypeHash::from_name("Point")
//!     }
//!
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! assert!(Point::data_type().is_reference());
//! ```
//!
//! With the derive macro from `dynproxy-macros`:
//!
//! ```ignore
//! #[derive(Any)]
//! #[proxy(name = "Point")]
//! pub struct Point {
//!     pub x: i32,
//! }
//! ```

use crate::{DataType, PrimitiveKind, TypeHash, primitives};

/// Trait for types with a declared identity.
pub trait Any: 'static {
    /// Get the type hash for this type.
    fn type_hash() -> TypeHash;

    /// Get the declared type name.
    fn type_name() -> &'static str;

    /// Get the declared type. User types are reference types.
    fn data_type() -> DataType {
        DataType::reference_with_hash(Self::type_name(), Self::type_hash())
    }
}

impl Any for () {
    fn type_hash() -> TypeHash {
        primitives::VOID
    }

    fn type_name() -> &'static str {
        "void"
    }

    fn data_type() -> DataType {
        DataType::void()
    }
}

impl Any for String {
    fn type_hash() -> TypeHash {
        primitives::STRING
    }

    fn type_name() -> &'static str {
        "string"
    }

    fn data_type() -> DataType {
        DataType::string()
    }
}

/// Reference types, whose values may be null.
///
/// `Option<T>` of a nullable type declares the same type as `T` and maps
/// `None` to a null reference.
pub trait Nullable: Any {}

impl Nullable for String {}

impl<T: Nullable> Any for Option<T> {
    fn type_hash() -> TypeHash {
        T::type_hash()
    }

    fn type_name() -> &'static str {
        T::type_name()
    }

    fn data_type() -> DataType {
        T::data_type()
    }
}

macro_rules! impl_any_primitive {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Any for $ty {
                fn type_hash() -> TypeHash {
                    PrimitiveKind::$kind.type_hash()
                }

                fn type_name() -> &'static str {
                    PrimitiveKind::$kind.name()
                }

                fn data_type() -> DataType {
                    DataType::primitive(PrimitiveKind::$kind)
                }
            }
        )*
    };
}

impl_any_primitive!(
    bool => Bool,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float,
    f64 => Double,
);
