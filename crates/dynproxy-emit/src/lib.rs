//! dynproxy emission helpers.
//!
//! A generic, verified code emitter. Knows nothing about proxies:
//!
//! - [`opcode`]: the straight-line instruction set (`OpCode`, `MethodRef`)
//! - [`body`]: append-only [`BodyEmitter`] and frozen [`MethodBody`]
//! - [`builder`]: [`CodeModule`] and [`TypeBuilder`]
//! - [`verify`]: abstract stack verifier run by `create_type`
//! - [`emitted`]: finished [`EmittedType`]s

pub mod body;
pub mod builder;
pub mod emitted;
mod error;
mod flags;
pub mod opcode;
pub mod verify;

pub use body::{BodyEmitter, MethodBody};
pub use builder::{CodeModule, MemberBuilder, TypeBuilder};
pub use emitted::{EmittedMember, EmittedType};
pub use error::EmitError;
pub use flags::MemberFlags;
pub use opcode::{MethodRef, OpCode};
pub use verify::BodySignature;
