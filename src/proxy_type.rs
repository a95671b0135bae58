//! Synthesized proxy types.

use std::fmt::Write as _;

use dynproxy_core::{DispatcherEntry, InterfaceEntry, TypeHash};
use dynproxy_emit::{EmittedMember, EmittedType};
use dynproxy_registry::FlattenedInterface;

/// A generated implementation of one interface over one dispatcher base.
///
/// Created once per pairing by a [`ProxyFactory`](crate::ProxyFactory) and
/// shared, read-only, by every instance built for that pairing.
#[derive(Debug)]
pub struct ProxyType {
    emitted: EmittedType,
    base: DispatcherEntry,
    interface: InterfaceEntry,
    /// The interface and all its ancestors.
    implemented: Vec<TypeHash>,
}

impl ProxyType {
    pub(crate) fn new(
        emitted: EmittedType,
        base: DispatcherEntry,
        interface: InterfaceEntry,
        contract: FlattenedInterface,
    ) -> Self {
        Self {
            emitted,
            base,
            interface,
            implemented: contract.interfaces,
        }
    }

    /// Generated type name, e.g. `Recorder$ICalcProxy`.
    pub fn name(&self) -> &str {
        &self.emitted.name
    }

    /// Identity of the generated type.
    pub fn type_hash(&self) -> TypeHash {
        self.emitted.type_hash
    }

    /// Name of the code module the type was emitted into.
    pub fn module(&self) -> &str {
        &self.emitted.module
    }

    /// The dispatcher base the type extends.
    pub fn base(&self) -> &DispatcherEntry {
        &self.base
    }

    /// The interface the type implements.
    pub fn interface(&self) -> &InterfaceEntry {
        &self.interface
    }

    /// The emitted type with its member bodies.
    pub fn emitted(&self) -> &EmittedType {
        &self.emitted
    }

    /// Forwarding constructors, one per base constructor.
    pub fn constructors(&self) -> &[EmittedMember] {
        self.emitted.constructors()
    }

    /// Forwarding methods, one per interface method including inherited ones.
    pub fn methods(&self) -> &[EmittedMember] {
        self.emitted.methods()
    }

    /// Find a method by signature hash.
    pub fn method(&self, signature_hash: TypeHash) -> Option<&EmittedMember> {
        self.emitted.method(signature_hash)
    }

    /// Check if the type implements `interface`, directly or through
    /// inheritance.
    pub fn implements(&self, interface: TypeHash) -> bool {
        self.implemented.contains(&interface)
    }

    /// IL-like listing of every member.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            ".class {} extends {} implements {}",
            self.name(),
            self.base.name,
            self.interface.name
        );
        for member in self.constructors().iter().chain(self.methods()) {
            let params: Vec<String> = member.params.iter().map(|p| p.to_string()).collect();
            let _ = writeln!(
                out,
                "\n.method {} {}({})",
                member.return_type,
                member.name,
                params.join(", ")
            );
            out.push_str(&member.body.disassemble());
        }
        out
    }
}
