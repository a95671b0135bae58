//! Plain object kind entry.

use crate::{Any, DataType, TypeHash};

/// Registry entry for a plain object kind.
///
/// Plain kinds can appear in signatures (as reference types) but can be
/// neither proxied nor used as a dispatcher base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// Kind name.
    pub name: String,
    /// Type hash for identity.
    pub type_hash: TypeHash,
}

impl ClassEntry {
    /// Create a new class entry.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self { name, type_hash }
    }

    /// Create a class entry from a type implementing [`Any`].
    pub fn of<T: Any>() -> Self {
        Self {
            name: T::type_name().to_string(),
            type_hash: T::type_hash(),
        }
    }

    /// The reference type naming this kind.
    pub fn data_type(&self) -> DataType {
        DataType::reference_with_hash(&self.name, self.type_hash)
    }
}
