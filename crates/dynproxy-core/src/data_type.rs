//! Declared parameter, return and local types.

use std::fmt;
use std::sync::Arc;

use crate::{PrimitiveKind, TypeHash, primitives};

/// How values of a type travel through a call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    /// No value (method returns nothing).
    Void,
    /// Value type, held unboxed in frame slots.
    Value(PrimitiveKind),
    /// Reference type (strings, objects); already uniform, may be null.
    Reference,
    /// Array of boxed values (the packed argument array).
    Array,
}

/// A declared type as it appears in a signature.
///
/// Equality is by identity hash and category; the name is for display.
#[derive(Clone)]
pub struct DataType {
    /// Type identity.
    pub type_hash: TypeHash,
    /// Display name.
    pub name: Arc<str>,
    /// Frame representation.
    pub category: TypeCategory,
}

impl DataType {
    /// The `void` type.
    pub fn void() -> Self {
        Self {
            type_hash: primitives::VOID,
            name: Arc::from("void"),
            category: TypeCategory::Void,
        }
    }

    /// A value type.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self {
            type_hash: kind.type_hash(),
            name: Arc::from(kind.name()),
            category: TypeCategory::Value(kind),
        }
    }

    /// The built-in `string` reference type.
    pub fn string() -> Self {
        Self::reference_with_hash("string", primitives::STRING)
    }

    /// The universal `object` reference type (the boxed result of a dispatch).
    pub fn object() -> Self {
        Self::reference("object")
    }

    /// A named reference type; identity is `TypeHash::from_name(name)`.
    pub fn reference(name: &str) -> Self {
        Self::reference_with_hash(name, TypeHash::from_name(name))
    }

    /// A reference type with an explicit identity.
    pub fn reference_with_hash(name: &str, type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            name: Arc::from(name),
            category: TypeCategory::Reference,
        }
    }

    /// `object[]`, the packed argument array type.
    pub fn object_array() -> Self {
        Self {
            type_hash: TypeHash::from_name("object[]"),
            name: Arc::from("object[]"),
            category: TypeCategory::Array,
        }
    }

    /// Check if this is `void`.
    pub fn is_void(&self) -> bool {
        self.category == TypeCategory::Void
    }

    /// Check if values of this type must be boxed to enter an object array.
    pub fn is_value_type(&self) -> bool {
        matches!(self.category, TypeCategory::Value(_))
    }

    /// Check if values of this type are references (null allowed).
    pub fn is_reference(&self) -> bool {
        matches!(self.category, TypeCategory::Reference | TypeCategory::Array)
    }

    /// The value kind, if this is a value type.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.category {
            TypeCategory::Value(kind) => Some(kind),
            _ => None,
        }
    }
}

impl PartialEq for DataType {
    fn eq(&self, other: &Self) -> bool {
        self.type_hash == other.type_hash && self.category == other.category
    }
}

impl Eq for DataType {}

impl std::hash::Hash for DataType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_hash.hash(state);
        self.category.hash(state);
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataType({})", self.name)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
