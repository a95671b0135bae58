//! Finished, immutable emitted types.

use rustc_hash::FxHashMap;

use dynproxy_core::{DataType, TypeHash};

use crate::{MemberFlags, MethodBody};

/// A constructor or method of an emitted type.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedMember {
    /// Member name (`.ctor` for constructors).
    pub name: String,
    /// Attribute flags.
    pub flags: MemberFlags,
    /// Declared parameters, excluding the receiver.
    pub params: Vec<DataType>,
    /// Declared return type.
    pub return_type: DataType,
    /// Signature identity (constructor hash for constructors).
    pub signature_hash: TypeHash,
    /// Verified body.
    pub body: MethodBody,
}

impl EmittedMember {
    /// Check if this member is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.flags.is_constructor()
    }
}

/// A finished type from a [`CodeModule`](crate::CodeModule).
#[derive(Debug, Clone)]
pub struct EmittedType {
    /// Name of the module the type was defined in.
    pub module: String,
    /// Type name.
    pub name: String,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    /// Base kind.
    pub base: DataType,
    /// Implemented interfaces.
    pub interfaces: Vec<DataType>,
    constructors: Vec<EmittedMember>,
    methods: Vec<EmittedMember>,
    method_index: FxHashMap<TypeHash, usize>,
}

impl EmittedType {
    pub(crate) fn new(
        module: String,
        name: String,
        type_hash: TypeHash,
        base: DataType,
        interfaces: Vec<DataType>,
        members: Vec<EmittedMember>,
    ) -> Self {
        let (constructors, methods): (Vec<_>, Vec<_>) =
            members.into_iter().partition(EmittedMember::is_constructor);
        let method_index = methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.signature_hash, i))
            .collect();
        Self {
            module,
            name,
            type_hash,
            base,
            interfaces,
            constructors,
            methods,
            method_index,
        }
    }

    /// The reference type naming this type.
    pub fn data_type(&self) -> DataType {
        DataType::reference_with_hash(&self.name, self.type_hash)
    }

    /// Constructors, in definition order.
    pub fn constructors(&self) -> &[EmittedMember] {
        &self.constructors
    }

    /// Methods, in definition order.
    pub fn methods(&self) -> &[EmittedMember] {
        &self.methods
    }

    /// Find a method by signature hash.
    pub fn method(&self, signature_hash: TypeHash) -> Option<&EmittedMember> {
        self.method_index
            .get(&signature_hash)
            .map(|&i| &self.methods[i])
    }

    /// All methods with the given name.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EmittedMember> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Check if this type implements `interface`.
    pub fn implements(&self, interface: TypeHash) -> bool {
        self.interfaces.iter().any(|i| i.type_hash == interface)
    }
}
