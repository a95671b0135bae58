//! Emission errors.

use thiserror::Error;

/// Errors raised while defining types or verifying member bodies.
///
/// Verification errors carry the member and the offset of the offending
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A type with this name already exists in the code module.
    #[error("type '{name}' is already defined in module '{module}'")]
    DuplicateType { module: String, name: String },

    /// A member with the same name and parameter list was defined twice.
    #[error("'{type_name}' already defines member {member}")]
    DuplicateMember { type_name: String, member: String },

    /// A member was defined without a body.
    #[error("{member}: body is empty")]
    EmptyBody { member: String },

    /// The body does not end with `ret`.
    #[error("{member}: body does not end with ret")]
    MissingReturn { member: String },

    /// Instructions follow a `ret`.
    #[error("{member} @ {offset:#06x}: unreachable code after ret")]
    CodeAfterReturn { member: String, offset: usize },

    /// An instruction pops more values than the stack holds.
    #[error("{member} @ {offset:#06x}: stack underflow in '{opcode}'")]
    StackUnderflow {
        member: String,
        offset: usize,
        opcode: String,
    },

    /// An instruction found a value of the wrong type on the stack.
    #[error("{member} @ {offset:#06x}: expected {expected}, found {found}")]
    TypeMismatch {
        member: String,
        offset: usize,
        expected: String,
        found: String,
    },

    /// An argument index is out of range.
    #[error("{member} @ {offset:#06x}: no argument {index}")]
    UnknownArgument {
        member: String,
        offset: usize,
        index: u16,
    },

    /// A local index was never declared.
    #[error("{member} @ {offset:#06x}: no local {index}")]
    UnknownLocal {
        member: String,
        offset: usize,
        index: u16,
    },

    /// A local is read before anything is stored in it.
    #[error("{member} @ {offset:#06x}: local {index} read before it is written")]
    UninitializedLocal {
        member: String,
        offset: usize,
        index: u16,
    },

    /// A member declares more parameters than argument indices can address.
    #[error("{member}: {count} parameters exceed the argument index range")]
    TooManyParameters { member: String, count: usize },

    /// A generic call has no type argument.
    #[error("{member} @ {offset:#06x}: generic call without a type argument")]
    MissingTypeArgument { member: String, offset: usize },

    /// The stack is not in the shape `ret` requires.
    #[error("{member} @ {offset:#06x}: {depth} value(s) left on the stack at ret")]
    UnbalancedStack {
        member: String,
        offset: usize,
        depth: usize,
    },
}

impl EmitError {
    /// Offset of the offending instruction, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            EmitError::CodeAfterReturn { offset, .. }
            | EmitError::StackUnderflow { offset, .. }
            | EmitError::TypeMismatch { offset, .. }
            | EmitError::UnknownArgument { offset, .. }
            | EmitError::UnknownLocal { offset, .. }
            | EmitError::UninitializedLocal { offset, .. }
            | EmitError::MissingTypeArgument { offset, .. }
            | EmitError::UnbalancedStack { offset, .. } => Some(*offset),
            EmitError::DuplicateType { .. }
            | EmitError::DuplicateMember { .. }
            | EmitError::EmptyBody { .. }
            | EmitError::MissingReturn { .. }
            | EmitError::TooManyParameters { .. } => None,
        }
    }
}
