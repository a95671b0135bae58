//! The kind registry.
//!
//! Stores every kind the proxy factory can be asked about, keyed by
//! [`TypeHash`]: built-in primitives, plain classes, interfaces and dispatcher
//! bases. A fresh registry already contains the primitives, `string`,
//! `object` and the abstract dispatch contract itself.

use rustc_hash::{FxHashMap, FxHashSet};

use dynproxy_core::dispatch::CONTRACT_NAME;
use dynproxy_core::{
    ClassEntry, DispatcherEntry, InterfaceEntry, PrimitiveKind, RegistrationError, TypeEntry,
    TypeHash,
};

/// Reserved for synthesized proxy names; registered kinds cannot use it.
pub const RESERVED_SEPARATOR: char = '$';

/// Catalog of kinds by identity.
#[derive(Debug)]
pub struct KindRegistry {
    types: FxHashMap<TypeHash, TypeEntry>,
    by_name: FxHashMap<String, TypeHash>,
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KindRegistry {
    /// Create a registry with the built-in kinds.
    pub fn new() -> Self {
        let mut registry = Self {
            types: FxHashMap::default(),
            by_name: FxHashMap::default(),
        };

        let builtins = PrimitiveKind::ALL
            .into_iter()
            .map(TypeEntry::Primitive)
            .chain([
                TypeEntry::Class(ClassEntry::new("string")),
                TypeEntry::Class(ClassEntry::new("object")),
                TypeEntry::Dispatcher(DispatcherEntry::new(CONTRACT_NAME).as_abstract()),
            ]);
        for entry in builtins {
            registry.insert_unchecked(entry);
        }
        registry
    }

    fn insert_unchecked(&mut self, entry: TypeEntry) -> TypeHash {
        let hash = entry.type_hash();
        self.by_name.insert(entry.name().to_string(), hash);
        self.types.insert(hash, entry);
        hash
    }

    fn insert(&mut self, entry: TypeEntry) -> Result<TypeHash, RegistrationError> {
        if entry.name().is_empty() || entry.name().contains(RESERVED_SEPARATOR) {
            return Err(RegistrationError::InvalidName(entry.name().to_string()));
        }
        if self.types.contains_key(&entry.type_hash()) || self.by_name.contains_key(entry.name()) {
            return Err(RegistrationError::DuplicateType(entry.name().to_string()));
        }
        tracing::debug!(kind = entry.kind_name(), name = entry.name(), "registered kind");
        Ok(self.insert_unchecked(entry))
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register an interface.
    ///
    /// Base interfaces are resolved lazily, so interfaces can be registered
    /// in any order; inheritance problems surface from
    /// [`flatten_interface`](Self::flatten_interface).
    pub fn register_interface(&mut self, entry: InterfaceEntry) -> Result<TypeHash, RegistrationError> {
        let mut seen = FxHashSet::default();
        for method in &entry.methods {
            if !seen.insert(method.signature_hash()) {
                return Err(RegistrationError::DuplicateMethod {
                    interface: entry.name.clone(),
                    method: method.to_string(),
                });
            }
        }
        self.insert(TypeEntry::Interface(entry))
    }

    /// Register a dispatcher base.
    pub fn register_dispatcher(&mut self, entry: DispatcherEntry) -> Result<TypeHash, RegistrationError> {
        let mut seen = FxHashSet::default();
        for ctor in &entry.constructors {
            if !seen.insert(ctor.hash(entry.type_hash)) {
                return Err(RegistrationError::DuplicateConstructor {
                    dispatcher: entry.name.clone(),
                    signature: ctor.param_list(),
                });
            }
        }
        self.insert(TypeEntry::Dispatcher(entry))
    }

    /// Register a plain class.
    pub fn register_class(&mut self, entry: ClassEntry) -> Result<TypeHash, RegistrationError> {
        self.insert(TypeEntry::Class(entry))
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get an entry by identity.
    pub fn get(&self, hash: TypeHash) -> Option<&TypeEntry> {
        self.types.get(&hash)
    }

    /// Get an entry by name.
    pub fn get_by_name(&self, name: &str) -> Option<&TypeEntry> {
        self.by_name.get(name).and_then(|hash| self.types.get(hash))
    }

    /// Get an interface entry.
    pub fn interface(&self, hash: TypeHash) -> Option<&InterfaceEntry> {
        self.get(hash).and_then(TypeEntry::as_interface)
    }

    /// Get a dispatcher entry.
    pub fn dispatcher(&self, hash: TypeHash) -> Option<&DispatcherEntry> {
        self.get(hash).and_then(TypeEntry::as_dispatcher)
    }

    /// Check if a kind is registered.
    pub fn contains(&self, hash: TypeHash) -> bool {
        self.types.contains_key(&hash)
    }

    /// Number of registered kinds, built-ins included.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    /// Iterate over all interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceEntry> {
        self.types.values().filter_map(TypeEntry::as_interface)
    }
}
