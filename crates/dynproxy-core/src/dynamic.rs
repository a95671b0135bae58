//! Boxed values and unboxed frame slots.
//!
//! - [`Dynamic`]: the uniform, self-describing representation every argument
//!   and result takes when it crosses the dispatch contract.
//! - [`Slot`]: the frame representation. Value types are held as raw 64-bit
//!   words that mean nothing without their declared type; reference types are
//!   held as a `Dynamic` already.
//! - [`ObjectRef`]: a shared handle to a user object (reference type).
//!
//! Boxing a raw slot needs the statically declared [`PrimitiveKind`]; that is
//! why generated method bodies carry an explicit `box <kind>` for every
//! value-typed parameter.

use std::fmt;
use std::sync::Arc;

use crate::{Any, ConversionError, DataType, PrimitiveKind, TypeCategory, TypeHash, primitives};

/// A boxed value of any type.
#[derive(Clone)]
pub enum Dynamic {
    /// Null reference.
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    /// Owned string (reference type).
    String(String),
    /// Shared user object (reference type).
    Object(ObjectRef),
}

impl Dynamic {
    /// Get a human-readable name for the runtime type of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::String(_) => "string",
            Dynamic::Object(obj) => obj.type_name(),
            other => other.primitive_kind().map(PrimitiveKind::name).unwrap_or("?"),
        }
    }

    /// Get the runtime type identity of this value.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            Dynamic::Null => primitives::NULL,
            Dynamic::String(_) => primitives::STRING,
            Dynamic::Object(obj) => obj.type_hash(),
            other => other
                .primitive_kind()
                .map(PrimitiveKind::type_hash)
                .unwrap_or(TypeHash::EMPTY),
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    /// The value kind, if this is a boxed value type.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Dynamic::Bool(_) => PrimitiveKind::Bool,
            Dynamic::Int8(_) => PrimitiveKind::Int8,
            Dynamic::Int16(_) => PrimitiveKind::Int16,
            Dynamic::Int32(_) => PrimitiveKind::Int32,
            Dynamic::Int64(_) => PrimitiveKind::Int64,
            Dynamic::Uint8(_) => PrimitiveKind::Uint8,
            Dynamic::Uint16(_) => PrimitiveKind::Uint16,
            Dynamic::Uint32(_) => PrimitiveKind::Uint32,
            Dynamic::Uint64(_) => PrimitiveKind::Uint64,
            Dynamic::Float(_) => PrimitiveKind::Float,
            Dynamic::Double(_) => PrimitiveKind::Double,
            Dynamic::Null | Dynamic::String(_) | Dynamic::Object(_) => return None,
        })
    }

    /// Check if this value is exactly an instance of `ty`.
    ///
    /// No widening or narrowing: an `int8` is not an `int`. `null` is an
    /// instance of every reference type, and `object` accepts any value.
    pub fn is_instance_of(&self, ty: &DataType) -> bool {
        match ty.category {
            TypeCategory::Void => false,
            TypeCategory::Value(kind) => self.primitive_kind() == Some(kind),
            TypeCategory::Array => self.is_null(),
            TypeCategory::Reference => {
                self.is_null()
                    || ty.type_hash == TypeHash::from_name("object")
                    || (self.primitive_kind().is_none() && self.type_hash() == ty.type_hash)
            }
        }
    }

    /// Unbox this value into a frame slot of the declared type.
    pub fn unbox(self, ty: &DataType) -> Result<Slot, ConversionError> {
        if !self.is_instance_of(ty) {
            return Err(match (&self, ty.is_value_type()) {
                (Dynamic::Null, true) => ConversionError::NullValue {
                    expected: ty.name.to_string(),
                },
                _ => ConversionError::TypeMismatch {
                    expected: ty.name.to_string(),
                    actual: self.type_name().to_string(),
                },
            });
        }

        match self.raw_bits() {
            Some(bits) if ty.is_value_type() => Ok(Slot::Raw(bits)),
            _ => Ok(Slot::Ref(self)),
        }
    }

    /// Box a raw frame word, interpreting it as `kind`.
    pub fn from_raw(kind: PrimitiveKind, bits: u64) -> Self {
        match kind {
            PrimitiveKind::Bool => Dynamic::Bool(bits != 0),
            PrimitiveKind::Int8 => Dynamic::Int8(bits as i8),
            PrimitiveKind::Int16 => Dynamic::Int16(bits as i16),
            PrimitiveKind::Int32 => Dynamic::Int32(bits as i32),
            PrimitiveKind::Int64 => Dynamic::Int64(bits as i64),
            PrimitiveKind::Uint8 => Dynamic::Uint8(bits as u8),
            PrimitiveKind::Uint16 => Dynamic::Uint16(bits as u16),
            PrimitiveKind::Uint32 => Dynamic::Uint32(bits as u32),
            PrimitiveKind::Uint64 => Dynamic::Uint64(bits),
            PrimitiveKind::Float => Dynamic::Float(f32::from_bits(bits as u32)),
            PrimitiveKind::Double => Dynamic::Double(f64::from_bits(bits)),
        }
    }

    fn raw_bits(&self) -> Option<u64> {
        Some(match *self {
            Dynamic::Bool(v) => v as u64,
            Dynamic::Int8(v) => v as i64 as u64,
            Dynamic::Int16(v) => v as i64 as u64,
            Dynamic::Int32(v) => v as i64 as u64,
            Dynamic::Int64(v) => v as u64,
            Dynamic::Uint8(v) => v as u64,
            Dynamic::Uint16(v) => v as u64,
            Dynamic::Uint32(v) => v as u64,
            Dynamic::Uint64(v) => v,
            Dynamic::Float(v) => v.to_bits() as u64,
            Dynamic::Double(v) => v.to_bits(),
            _ => return None,
        })
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dynamic::Null, Dynamic::Null) => true,
            (Dynamic::String(a), Dynamic::String(b)) => a == b,
            (Dynamic::Object(a), Dynamic::Object(b)) => a.ptr_eq(b),
            (Dynamic::Float(a), Dynamic::Float(b)) => a == b,
            (Dynamic::Double(a), Dynamic::Double(b)) => a == b,
            (a, b) => a.primitive_kind().is_some()
                && a.primitive_kind() == b.primitive_kind()
                && a.raw_bits() == b.raw_bits(),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "Null"),
            Dynamic::Bool(v) => write!(f, "Bool({v})"),
            Dynamic::Int8(v) => write!(f, "Int8({v})"),
            Dynamic::Int16(v) => write!(f, "Int16({v})"),
            Dynamic::Int32(v) => write!(f, "Int32({v})"),
            Dynamic::Int64(v) => write!(f, "Int64({v})"),
            Dynamic::Uint8(v) => write!(f, "Uint8({v})"),
            Dynamic::Uint16(v) => write!(f, "Uint16({v})"),
            Dynamic::Uint32(v) => write!(f, "Uint32({v})"),
            Dynamic::Uint64(v) => write!(f, "Uint64({v})"),
            Dynamic::Float(v) => write!(f, "Float({v})"),
            Dynamic::Double(v) => write!(f, "Double({v})"),
            Dynamic::String(v) => write!(f, "String({v:?})"),
            Dynamic::Object(obj) => write!(f, "Object({})", obj.type_name()),
        }
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dynamic::Null => write!(f, "null"),
            Dynamic::Bool(v) => write!(f, "{v}"),
            Dynamic::Int8(v) => write!(f, "{v}"),
            Dynamic::Int16(v) => write!(f, "{v}"),
            Dynamic::Int32(v) => write!(f, "{v}"),
            Dynamic::Int64(v) => write!(f, "{v}"),
            Dynamic::Uint8(v) => write!(f, "{v}"),
            Dynamic::Uint16(v) => write!(f, "{v}"),
            Dynamic::Uint32(v) => write!(f, "{v}"),
            Dynamic::Uint64(v) => write!(f, "{v}"),
            Dynamic::Float(v) => write!(f, "{v}"),
            Dynamic::Double(v) => write!(f, "{v}"),
            Dynamic::String(v) => f.write_str(v),
            Dynamic::Object(obj) => write!(f, "<{}>", obj.type_name()),
        }
    }
}

/// A frame slot: an unboxed value word or a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Unboxed value type. Meaningless without its declared kind.
    Raw(u64),
    /// Reference type (string, object or null).
    Ref(Dynamic),
}

impl Slot {
    /// Box this slot as the declared type.
    ///
    /// Reference slots are returned unchanged; raw slots are boxed with the
    /// declared value kind. A raw slot declared as a reference type boxes to
    /// null, which the body verifier rules out for emitted code.
    pub fn into_dynamic(self, ty: &DataType) -> Dynamic {
        match (self, ty.primitive_kind()) {
            (Slot::Raw(bits), Some(kind)) => Dynamic::from_raw(kind, bits),
            (Slot::Ref(value), _) => value,
            (Slot::Raw(_), None) => Dynamic::Null,
        }
    }
}

/// A shared, type-erased handle to a user object.
#[derive(Clone)]
pub struct ObjectRef {
    type_hash: TypeHash,
    type_name: &'static str,
    value: Arc<dyn std::any::Any + Send + Sync>,
}

impl ObjectRef {
    /// Wrap a value in a new shared handle.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an existing shared value.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            type_hash: T::type_hash(),
            type_name: T::type_name(),
            value,
        }
    }

    /// Type identity of the referenced object.
    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    /// Type name of the referenced object.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the object as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Get a shared handle to the object as `T`.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Check if two handles refer to the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("type_name", &self.type_name)
            .field("type_hash", &self.type_hash)
            .finish_non_exhaustive()
    }
}
