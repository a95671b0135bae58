//! Code module and type builders.
//!
//! A [`CodeModule`] is the container every emitted type is defined in. A
//! [`TypeBuilder`] collects constructors and methods, each with a body
//! written through a [`BodyEmitter`], and [`TypeBuilder::create_type`]
//! verifies every body and freezes the result into an [`EmittedType`].
//!
//! # Example
//!
//! ```
//! use dynproxy_core::{DataType, TypeHash};
//! use dynproxy_emit::{CodeModule, MemberFlags, MethodRef, OpCode};
//!
//! let base = DataType::reference("Base");
//! let mut module = CodeModule::new("Demo");
//! let mut ty = module
//!     .define_type("Derived", TypeHash::from_name("Derived"), base.clone(), vec![])
//!     .unwrap();
//!
//! let ctor = ty.define_constructor(MemberFlags::CONSTRUCTOR, vec![]).unwrap();
//! let il = ctor.body();
//! il.emit_load_arg(0);
//! il.emit_call(MethodRef::constructor(&base, vec![]));
//! il.emit(OpCode::Ret);
//!
//! let emitted = ty.create_type().unwrap();
//! assert_eq!(emitted.constructors().len(), 1);
//! assert!(module.contains("Derived"));
//! ```

use rustc_hash::FxHashMap;

use dynproxy_core::{DataType, TypeHash};

use crate::verify::{BodySignature, verify};
use crate::{BodyEmitter, EmitError, EmittedMember, EmittedType, MemberFlags, MethodRef};

/// Container for emitted types. Type names are unique within a module.
#[derive(Debug)]
pub struct CodeModule {
    name: String,
    types: FxHashMap<String, TypeHash>,
    verify: bool,
    trace: bool,
}

impl CodeModule {
    /// Create an empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: FxHashMap::default(),
            verify: true,
            trace: false,
        }
    }

    /// Enable or disable body verification in `create_type` (on by default).
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Enable or disable the per-instruction emission trace.
    pub fn with_emission_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of created types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types have been created.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check if a type with this name has been created.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Start defining a type.
    ///
    /// Fails if a type with this name has already been created.
    pub fn define_type(
        &mut self,
        name: impl Into<String>,
        type_hash: TypeHash,
        base: DataType,
        interfaces: Vec<DataType>,
    ) -> Result<TypeBuilder<'_>, EmitError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(EmitError::DuplicateType {
                module: self.name.clone(),
                name,
            });
        }
        Ok(TypeBuilder {
            module: self,
            name,
            type_hash,
            base,
            interfaces,
            members: Vec::new(),
        })
    }
}

/// A constructor or method under construction.
#[derive(Debug)]
pub struct MemberBuilder {
    name: String,
    flags: MemberFlags,
    params: Vec<DataType>,
    return_type: DataType,
    signature_hash: TypeHash,
    il: BodyEmitter,
}

impl MemberBuilder {
    /// The body emitter for this member.
    pub fn body(&mut self) -> &mut BodyEmitter {
        &mut self.il
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters.
    pub fn params(&self) -> &[DataType] {
        &self.params
    }

    /// Declared return type.
    pub fn return_type(&self) -> &DataType {
        &self.return_type
    }
}

/// Builder for a single type in a [`CodeModule`].
#[derive(Debug)]
pub struct TypeBuilder<'m> {
    module: &'m mut CodeModule,
    name: String,
    type_hash: TypeHash,
    base: DataType,
    interfaces: Vec<DataType>,
    members: Vec<MemberBuilder>,
}

impl TypeBuilder<'_> {
    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The reference type naming the type being built.
    pub fn data_type(&self) -> DataType {
        DataType::reference_with_hash(&self.name, self.type_hash)
    }

    /// Define a constructor with the given parameters.
    pub fn define_constructor(
        &mut self,
        flags: MemberFlags,
        params: Vec<DataType>,
    ) -> Result<&mut MemberBuilder, EmitError> {
        let hashes: Vec<TypeHash> = params.iter().map(|p| p.type_hash).collect();
        let signature_hash = TypeHash::from_constructor(self.type_hash, &hashes);
        self.push_member(
            MethodRef::CONSTRUCTOR_NAME,
            flags | MemberFlags::RT_SPECIAL_NAME,
            params,
            DataType::void(),
            signature_hash,
        )
    }

    /// Define a method.
    pub fn define_method(
        &mut self,
        name: &str,
        flags: MemberFlags,
        return_type: DataType,
        params: Vec<DataType>,
    ) -> Result<&mut MemberBuilder, EmitError> {
        let hashes: Vec<TypeHash> = params.iter().map(|p| p.type_hash).collect();
        let signature_hash = TypeHash::from_signature(name, &hashes);
        self.push_member(name, flags, params, return_type, signature_hash)
    }

    fn push_member(
        &mut self,
        name: &str,
        flags: MemberFlags,
        params: Vec<DataType>,
        return_type: DataType,
        signature_hash: TypeHash,
    ) -> Result<&mut MemberBuilder, EmitError> {
        if self
            .members
            .iter()
            .any(|m| m.signature_hash == signature_hash && m.flags.is_constructor() == flags.is_constructor())
        {
            return Err(EmitError::DuplicateMember {
                type_name: self.name.clone(),
                member: describe(name, &params),
            });
        }

        let label = format!("{}::{}", self.name, describe(name, &params));
        let index = self.members.len();
        self.members.push(MemberBuilder {
            name: name.to_string(),
            flags,
            params,
            return_type,
            signature_hash,
            il: BodyEmitter::new(label).with_trace(self.module.trace),
        });
        Ok(&mut self.members[index])
    }

    /// Verify every body and freeze the type.
    ///
    /// The type name is only taken in the module once this succeeds.
    pub fn create_type(self) -> Result<EmittedType, EmitError> {
        let this_type = self.data_type();
        let mut members = Vec::with_capacity(self.members.len());

        for member in self.members {
            let label = format!("{}::{}", self.name, describe(&member.name, &member.params));
            let body = member.il.finish();
            if self.module.verify {
                let sig = BodySignature {
                    this_type: Some(&this_type),
                    params: &member.params,
                    return_type: &member.return_type,
                };
                verify(&label, sig, &body)?;
            }
            members.push(EmittedMember {
                name: member.name,
                flags: member.flags,
                params: member.params,
                return_type: member.return_type,
                signature_hash: member.signature_hash,
                body,
            });
        }

        tracing::debug!(
            module = %self.module.name,
            type_name = %self.name,
            members = members.len(),
            "created type"
        );

        self.module.types.insert(self.name.clone(), self.type_hash);
        Ok(EmittedType::new(
            self.module.name.clone(),
            self.name,
            self.type_hash,
            self.base,
            self.interfaces,
            members,
        ))
    }
}

fn describe(name: &str, params: &[DataType]) -> String {
    let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
    format!("{name}({})", params.join(", "))
}
