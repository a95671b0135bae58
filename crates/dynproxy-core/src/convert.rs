//! Conversion traits between Rust values and [`Dynamic`].
//!
//! - [`IntoDynamic`]: box a Rust value.
//! - [`FromDynamic`]: extract a Rust value. Strict: the variant must match the
//!   target exactly, no widening or narrowing.
//!
//! Null converts only into `Option<T>` of a [`Nullable`] type.
//!
//! ## Example
//!
//! ```
//! use dynproxy_core::{Dynamic, FromDynamic, IntoDynamic};
//!
//! let boxed = 42i32.into_dynamic();
//! assert_eq!(i32::from_dynamic(boxed).unwrap(), 42);
//! assert!(i64::from_dynamic(Dynamic::Int32(42)).is_err());
//! ```

use std::sync::Arc;

use crate::{Any, ConversionError, Dynamic, Nullable, ObjectRef};

/// Extract a value from a [`Dynamic`].
pub trait FromDynamic: Sized {
    /// Extract a value, failing if `value` is not exactly of this type.
    fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError>;
}

/// Convert a value into a [`Dynamic`].
pub trait IntoDynamic {
    /// Box this value.
    fn into_dynamic(self) -> Dynamic;
}

fn mismatch(expected: &'static str, actual: &Dynamic) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

macro_rules! impl_convert_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromDynamic for $ty {
                fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError> {
                    match value {
                        Dynamic::$variant(v) => Ok(v),
                        Dynamic::Null => Err(ConversionError::NullValue {
                            expected: <$ty as Any>::type_name().to_string(),
                        }),
                        other => Err(mismatch(<$ty as Any>::type_name(), &other)),
                    }
                }
            }

            impl IntoDynamic for $ty {
                fn into_dynamic(self) -> Dynamic {
                    Dynamic::$variant(self)
                }
            }
        )*
    };
}

impl_convert_primitive!(
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

impl FromDynamic for String {
    fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::String(v) => Ok(v),
            Dynamic::Null => Err(ConversionError::NullReference {
                expected: String::type_name().to_string(),
            }),
            other => Err(mismatch(String::type_name(), &other)),
        }
    }
}

impl IntoDynamic for String {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self)
    }
}

impl IntoDynamic for &str {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::String(self.to_string())
    }
}

impl FromDynamic for Dynamic {
    fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl IntoDynamic for Dynamic {
    fn into_dynamic(self) -> Dynamic {
        self
    }
}

impl IntoDynamic for ObjectRef {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Object(self)
    }
}

impl<T: Nullable + FromDynamic> FromDynamic for Option<T> {
    fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Null => Ok(None),
            other => T::from_dynamic(other).map(Some),
        }
    }
}

impl<T: Nullable + IntoDynamic> IntoDynamic for Option<T> {
    fn into_dynamic(self) -> Dynamic {
        self.map_or(Dynamic::Null, IntoDynamic::into_dynamic)
    }
}

/// Void results carry no value; anything converts to `()`.
impl FromDynamic for () {
    fn from_dynamic(_value: Dynamic) -> Result<Self, ConversionError> {
        Ok(())
    }
}

/// A typed shared handle to a user object, usable as a reference-typed
/// parameter or return value.
pub struct Handle<T>(Arc<T>);

impl<T: Any + Send + Sync> Handle<T> {
    /// Wrap a value in a new handle.
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Get the shared value.
    pub fn into_arc(self) -> Arc<T> {
        self.0
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Any + Send + Sync> Any for Handle<T> {
    fn type_hash() -> crate::TypeHash {
        T::type_hash()
    }

    fn type_name() -> &'static str {
        T::type_name()
    }

    fn data_type() -> crate::DataType {
        T::data_type()
    }
}

impl<T: Any + Send + Sync> Nullable for Handle<T> {}

impl<T: Any + Send + Sync> IntoDynamic for Handle<T> {
    fn into_dynamic(self) -> Dynamic {
        Dynamic::Object(ObjectRef::from_arc(self.0))
    }
}

impl<T: Any + Send + Sync> FromDynamic for Handle<T> {
    fn from_dynamic(value: Dynamic) -> Result<Self, ConversionError> {
        match value {
            Dynamic::Object(obj) => obj
                .downcast::<T>()
                .map(Handle)
                .ok_or_else(|| ConversionError::TypeMismatch {
                    expected: T::type_name().to_string(),
                    actual: obj.type_name().to_string(),
                }),
            Dynamic::Null => Err(ConversionError::NullReference {
                expected: T::type_name().to_string(),
            }),
            other => Err(mismatch(T::type_name(), &other)),
        }
    }
}
