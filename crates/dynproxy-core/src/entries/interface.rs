//! Interface kind entry.

use crate::{DataType, MethodSignature, TypeHash};

/// Registry entry for an interface kind.
///
/// Interfaces define a contract of methods. A generated proxy implements
/// every method declared here plus every method inherited through
/// `base_interfaces`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    /// Unqualified name.
    pub name: String,
    /// Namespace annotation. Stored and exposed, never consulted.
    pub namespace: Option<String>,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    /// Methods declared directly on this interface, in declaration order.
    pub methods: Vec<MethodSignature>,
    /// Base interface type hashes, in declaration order.
    pub base_interfaces: Vec<TypeHash>,
}

impl InterfaceEntry {
    /// Create a new interface entry.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self {
            name,
            namespace: None,
            type_hash,
            methods: Vec::new(),
            base_interfaces: Vec::new(),
        }
    }

    /// Set the namespace annotation.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a method signature.
    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a base interface.
    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base_interfaces.push(base);
        self
    }

    /// Name including the namespace annotation, for display.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}::{}", self.name),
            None => self.name.clone(),
        }
    }

    /// The reference type naming this interface.
    pub fn data_type(&self) -> DataType {
        DataType::reference_with_hash(&self.name, self.type_hash)
    }

    /// Find a directly declared method by name.
    pub fn find_method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveKind;

    #[test]
    fn builder() {
        let base = InterfaceEntry::new("IBase");
        let entry = InterfaceEntry::new("ICalc")
            .with_namespace("Tests.Fixtures")
            .with_method(MethodSignature::new(
                "Add",
                vec![DataType::primitive(PrimitiveKind::Int32)],
                DataType::primitive(PrimitiveKind::Int32),
            ))
            .with_base(base.type_hash);

        assert_eq!(entry.type_hash, TypeHash::from_name("ICalc"));
        assert_eq!(entry.qualified_name(), "Tests.Fixtures::ICalc");
        assert_eq!(entry.base_interfaces, vec![base.type_hash]);
        assert!(entry.find_method("Add").is_some());
        assert!(entry.find_method("Sub").is_none());
    }

    #[test]
    fn namespace_does_not_change_identity() {
        let plain = InterfaceEntry::new("IFoo");
        let annotated = InterfaceEntry::new("IFoo").with_namespace("Somewhere");
        assert_eq!(plain.type_hash, annotated.type_hash);
    }
}
