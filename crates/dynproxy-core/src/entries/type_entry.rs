//! TypeEntry enum for unified kind storage.

use crate::{PrimitiveKind, TypeHash};

use super::{ClassEntry, DispatcherEntry, InterfaceEntry};

/// Unified entry for kind registry storage.
#[derive(Debug, Clone)]
pub enum TypeEntry {
    /// Built-in value type.
    Primitive(PrimitiveKind),
    /// Plain object kind.
    Class(ClassEntry),
    /// Interface kind.
    Interface(InterfaceEntry),
    /// Dispatcher base kind.
    Dispatcher(DispatcherEntry),
}

impl TypeEntry {
    /// Get the type hash for this entry.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            TypeEntry::Primitive(kind) => kind.type_hash(),
            TypeEntry::Class(e) => e.type_hash,
            TypeEntry::Interface(e) => e.type_hash,
            TypeEntry::Dispatcher(e) => e.type_hash,
        }
    }

    /// Get the kind name.
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::Primitive(kind) => kind.name(),
            TypeEntry::Class(e) => &e.name,
            TypeEntry::Interface(e) => &e.name,
            TypeEntry::Dispatcher(e) => &e.name,
        }
    }

    /// Describe what sort of kind this is, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeEntry::Primitive(_) => "primitive",
            TypeEntry::Class(_) => "class",
            TypeEntry::Interface(_) => "interface",
            TypeEntry::Dispatcher(_) => "dispatcher",
        }
    }

    // === Type Checks ===

    /// Check if this is an interface.
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeEntry::Interface(_))
    }

    /// Check if this is a dispatcher base.
    pub fn is_dispatcher(&self) -> bool {
        matches!(self, TypeEntry::Dispatcher(_))
    }

    // === Downcasts ===

    /// Get as an interface entry.
    pub fn as_interface(&self) -> Option<&InterfaceEntry> {
        match self {
            TypeEntry::Interface(e) => Some(e),
            _ => None,
        }
    }

    /// Get as a dispatcher entry.
    pub fn as_dispatcher(&self) -> Option<&DispatcherEntry> {
        match self {
            TypeEntry::Dispatcher(e) => Some(e),
            _ => None,
        }
    }

    /// Get as a class entry.
    pub fn as_class(&self) -> Option<&ClassEntry> {
        match self {
            TypeEntry::Class(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InterfaceEntry> for TypeEntry {
    fn from(entry: InterfaceEntry) -> Self {
        TypeEntry::Interface(entry)
    }
}

impl From<DispatcherEntry> for TypeEntry {
    fn from(entry: DispatcherEntry) -> Self {
        TypeEntry::Dispatcher(entry)
    }
}

impl From<ClassEntry> for TypeEntry {
    fn from(entry: ClassEntry) -> Self {
        TypeEntry::Class(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let entry = TypeEntry::from(InterfaceEntry::new("IFoo"));
        assert!(entry.is_interface());
        assert!(!entry.is_dispatcher());
        assert_eq!(entry.name(), "IFoo");
        assert_eq!(entry.kind_name(), "interface");
        assert!(entry.as_dispatcher().is_none());

        let prim = TypeEntry::Primitive(PrimitiveKind::Int32);
        assert_eq!(prim.type_hash(), PrimitiveKind::Int32.type_hash());
        assert_eq!(prim.name(), "int");
    }
}
