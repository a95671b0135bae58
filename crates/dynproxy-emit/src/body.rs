//! Method bodies and the append-only body emitter.
//!
//! The [`BodyEmitter`] provides a small high-level API over raw instruction
//! emission, and hands out local slots as indices so a body can never refer
//! to a local it did not declare.
//!
//! # Example
//!
//! ```
//! use dynproxy_core::DataType;
//! use dynproxy_emit::{BodyEmitter, OpCode};
//!
//! let mut il = BodyEmitter::new("Demo::Fn0");
//! let args = il.declare_local(DataType::object_array());
//! il.emit(OpCode::LoadNull);
//! il.emit(OpCode::StoreLocal(args));
//! il.emit(OpCode::Ret);
//!
//! let body = il.finish();
//! assert_eq!(body.len(), 3);
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use dynproxy_core::DataType;

use crate::{MethodRef, OpCode};

/// A finished, immutable method body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodBody {
    /// The instructions.
    code: Vec<OpCode>,
    /// Declared local types, indexed by slot.
    locals: Vec<DataType>,
}

impl MethodBody {
    /// Get the instructions.
    pub fn code(&self) -> &[OpCode] {
        &self.code
    }

    /// Get the declared locals.
    pub fn locals(&self) -> &[DataType] {
        &self.locals
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the body has no instructions.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Render an IL-like listing, one instruction per line.
    ///
    /// ```text
    /// .locals init ([0] int, [1] object[])
    /// 0x0000: nop
    /// 0x0001: ldarg.0
    /// ```
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        if !self.locals.is_empty() {
            let locals: Vec<String> = self
                .locals
                .iter()
                .enumerate()
                .map(|(i, ty)| format!("[{i}] {ty}"))
                .collect();
            let _ = writeln!(out, ".locals init ({})", locals.join(", "));
        }
        for (offset, op) in self.code.iter().enumerate() {
            let _ = writeln!(out, "{offset:#06x}: {op}");
        }
        out
    }
}

/// Append-only instruction emitter for a single member body.
#[derive(Debug)]
pub struct BodyEmitter {
    /// Label used in the emission trace.
    label: String,
    /// Instructions emitted so far.
    code: Vec<OpCode>,
    /// Declared locals.
    locals: Vec<DataType>,
    /// Log every instruction at trace level.
    trace: bool,
}

impl BodyEmitter {
    /// Create an emitter for the member called `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: Vec::new(),
            locals: Vec::new(),
            trace: false,
        }
    }

    /// Log every emitted instruction.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an instruction and return its offset.
    pub fn emit(&mut self, op: OpCode) -> usize {
        let offset = self.code.len();
        if self.trace {
            tracing::trace!(member = %self.label, "{offset:#06x}: {op}");
        }
        self.code.push(op);
        offset
    }

    /// Declare a local of type `ty` and return its slot.
    pub fn declare_local(&mut self, ty: DataType) -> u16 {
        let slot = self.locals.len() as u16;
        self.locals.push(ty);
        slot
    }

    /// Offset of the next instruction.
    pub fn offset(&self) -> usize {
        self.code.len()
    }

    /// Declared locals so far.
    pub fn locals(&self) -> &[DataType] {
        &self.locals
    }

    // ==========================================================================
    // Convenience
    // ==========================================================================

    /// Emit `ldarg`.
    pub fn emit_load_arg(&mut self, index: u16) -> usize {
        self.emit(OpCode::LoadArg(index))
    }

    /// Emit `ldstr`.
    pub fn emit_str(&mut self, value: &str) -> usize {
        self.emit(OpCode::LoadStr(Arc::from(value)))
    }

    /// Emit `ldc.i4`.
    pub fn emit_int(&mut self, value: i32) -> usize {
        self.emit(OpCode::LoadInt(value))
    }

    /// Emit a non-virtual call.
    pub fn emit_call(&mut self, method: MethodRef) -> usize {
        self.emit(OpCode::Call {
            method,
            type_arg: None,
        })
    }

    /// Emit a virtual call, optionally instantiating a generic return.
    pub fn emit_callvirt(&mut self, method: MethodRef, type_arg: Option<DataType>) -> usize {
        self.emit(OpCode::CallVirt { method, type_arg })
    }

    /// Finish emission.
    pub fn finish(self) -> MethodBody {
        MethodBody {
            code: self.code,
            locals: self.locals,
        }
    }
}
