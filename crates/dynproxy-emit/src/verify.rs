//! Body verifier.
//!
//! Runs an abstract interpretation of a straight-line body over stack
//! *kinds* and rejects anything the interpreter could not execute safely:
//! stack underflow, type mismatches (including storing an unboxed value type
//! into an object array), undeclared or unwritten locals, unknown arguments
//! and a stack that is not exactly the return value at `ret`.

use std::fmt;

use dynproxy_core::{DataType, PrimitiveKind, TypeCategory};

use crate::{EmitError, MethodBody, OpCode};

/// The shape of the member a body belongs to.
#[derive(Debug, Clone, Copy)]
pub struct BodySignature<'a> {
    /// Receiver type for instance members (argument 0).
    pub this_type: Option<&'a DataType>,
    /// Declared parameters.
    pub params: &'a [DataType],
    /// Declared return type.
    pub return_type: &'a DataType,
}

/// What the verifier knows about a stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackKind {
    /// Unboxed value type.
    Value(PrimitiveKind),
    /// Non-null reference (string, object, receiver).
    Ref,
    /// Object array.
    Array,
    /// The null literal.
    Null,
}

impl StackKind {
    fn of(ty: &DataType) -> Option<StackKind> {
        match ty.category {
            TypeCategory::Void => None,
            TypeCategory::Value(kind) => Some(StackKind::Value(kind)),
            TypeCategory::Reference => Some(StackKind::Ref),
            TypeCategory::Array => Some(StackKind::Array),
        }
    }

    fn assignable_to(self, target: &DataType) -> bool {
        match target.category {
            TypeCategory::Void => false,
            TypeCategory::Value(kind) => self == StackKind::Value(kind),
            TypeCategory::Reference => {
                matches!(self, StackKind::Ref | StackKind::Array | StackKind::Null)
            }
            TypeCategory::Array => matches!(self, StackKind::Array | StackKind::Null),
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Value(kind) => write!(f, "unboxed {kind}"),
            StackKind::Ref => write!(f, "object reference"),
            StackKind::Array => write!(f, "object[]"),
            StackKind::Null => write!(f, "null"),
        }
    }
}

struct Verifier<'a> {
    member: &'a str,
    sig: BodySignature<'a>,
    locals: &'a [DataType],
    written: Vec<bool>,
    stack: Vec<StackKind>,
    offset: usize,
}

/// Verify `body` against the member's signature.
pub fn verify(member: &str, sig: BodySignature<'_>, body: &MethodBody) -> Result<(), EmitError> {
    let code = body.code();
    if code.is_empty() {
        return Err(EmitError::EmptyBody {
            member: member.to_string(),
        });
    }

    let mut verifier = Verifier {
        member,
        sig,
        locals: body.locals(),
        written: vec![false; body.locals().len()],
        stack: Vec::new(),
        offset: 0,
    };

    for (offset, op) in code.iter().enumerate() {
        verifier.offset = offset;
        verifier.step(op)?;
        if matches!(op, OpCode::Ret) {
            if offset + 1 < code.len() {
                return Err(EmitError::CodeAfterReturn {
                    member: member.to_string(),
                    offset: offset + 1,
                });
            }
            return Ok(());
        }
    }

    Err(EmitError::MissingReturn {
        member: member.to_string(),
    })
}

impl Verifier<'_> {
    fn step(&mut self, op: &OpCode) -> Result<(), EmitError> {
        match op {
            OpCode::Nop => {}
            OpCode::LoadArg(index) => {
                let kind = self.arg_kind(*index)?;
                self.stack.push(kind);
            }
            OpCode::LoadNull => self.stack.push(StackKind::Null),
            OpCode::LoadStr(_) => self.stack.push(StackKind::Ref),
            OpCode::LoadInt(_) => self.stack.push(StackKind::Value(PrimitiveKind::Int32)),
            OpCode::LoadLocal(index) => {
                let ty = self.local(*index)?;
                if !self.written[*index as usize] {
                    return Err(EmitError::UninitializedLocal {
                        member: self.member.to_string(),
                        offset: self.offset,
                        index: *index,
                    });
                }
                if let Some(kind) = StackKind::of(ty) {
                    self.stack.push(kind);
                }
            }
            OpCode::StoreLocal(index) => {
                let ty = self.local(*index)?.clone();
                let found = self.pop(op)?;
                self.expect(found, &ty)?;
                self.written[*index as usize] = true;
            }
            OpCode::NewArray => {
                let len = self.pop(op)?;
                self.expect_kind(len, StackKind::Value(PrimitiveKind::Int32))?;
                self.stack.push(StackKind::Array);
            }
            OpCode::StoreElem => {
                let value = self.pop(op)?;
                let index = self.pop(op)?;
                let array = self.pop(op)?;
                self.expect(value, &DataType::object())?;
                self.expect_kind(index, StackKind::Value(PrimitiveKind::Int32))?;
                self.expect_kind(array, StackKind::Array)?;
            }
            OpCode::Box(kind) => {
                let value = self.pop(op)?;
                self.expect_kind(value, StackKind::Value(*kind))?;
                self.stack.push(StackKind::Ref);
            }
            OpCode::Call { method, type_arg } | OpCode::CallVirt { method, type_arg } => {
                let result = method.result_type(type_arg.as_ref()).ok_or_else(|| {
                    EmitError::MissingTypeArgument {
                        member: self.member.to_string(),
                        offset: self.offset,
                    }
                })?;
                for param in method.params.iter().rev() {
                    let found = self.pop(op)?;
                    self.expect(found, param)?;
                }
                if method.has_this {
                    let receiver = self.pop(op)?;
                    self.expect_kind(receiver, StackKind::Ref)?;
                }
                if let Some(kind) = StackKind::of(&result) {
                    self.stack.push(kind);
                }
            }
            OpCode::Pop => {
                self.pop(op)?;
            }
            OpCode::Ret => self.check_return()?,
        }
        Ok(())
    }

    fn check_return(&mut self) -> Result<(), EmitError> {
        let return_type = self.sig.return_type;
        let expected_depth = usize::from(!return_type.is_void());
        if self.stack.len() != expected_depth {
            return Err(EmitError::UnbalancedStack {
                member: self.member.to_string(),
                offset: self.offset,
                depth: self.stack.len(),
            });
        }
        if let Some(found) = self.stack.pop() {
            self.expect(found, return_type)?;
        }
        Ok(())
    }

    fn arg_kind(&self, index: u16) -> Result<StackKind, EmitError> {
        let param_index = match self.sig.this_type {
            Some(_) if index == 0 => return Ok(StackKind::Ref),
            Some(_) => index as usize - 1,
            None => index as usize,
        };
        self.sig
            .params
            .get(param_index)
            .and_then(StackKind::of)
            .ok_or_else(|| EmitError::UnknownArgument {
                member: self.member.to_string(),
                offset: self.offset,
                index,
            })
    }

    fn local(&self, index: u16) -> Result<&DataType, EmitError> {
        self.locals
            .get(index as usize)
            .ok_or_else(|| EmitError::UnknownLocal {
                member: self.member.to_string(),
                offset: self.offset,
                index,
            })
    }

    fn pop(&mut self, op: &OpCode) -> Result<StackKind, EmitError> {
        self.stack.pop().ok_or_else(|| EmitError::StackUnderflow {
            member: self.member.to_string(),
            offset: self.offset,
            opcode: op.mnemonic().to_string(),
        })
    }

    fn expect(&self, found: StackKind, target: &DataType) -> Result<(), EmitError> {
        if found.assignable_to(target) {
            Ok(())
        } else {
            Err(self.mismatch(target.to_string(), found))
        }
    }

    fn expect_kind(&self, found: StackKind, expected: StackKind) -> Result<(), EmitError> {
        if found == expected {
            Ok(())
        } else {
            Err(self.mismatch(expected.to_string(), found))
        }
    }

    fn mismatch(&self, expected: String, found: StackKind) -> EmitError {
        EmitError::TypeMismatch {
            member: self.member.to_string(),
            offset: self.offset,
            expected,
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyEmitter, MethodRef};

    fn int() -> DataType {
        DataType::primitive(PrimitiveKind::Int32)
    }

    fn this() -> DataType {
        DataType::reference("Proxy")
    }

    fn sink() -> MethodRef {
        MethodRef::instance(
            &DataType::reference("Sink"),
            "take",
            vec![DataType::object_array()],
            DataType::void(),
        )
    }

    /// `this.take(new object[] { a })` for `void M(int a)`.
    fn pack_one(boxed: bool) -> MethodBody {
        let mut il = BodyEmitter::new("Proxy::M");
        let args = il.declare_local(DataType::object_array());
        il.emit_load_arg(0);
        il.emit_int(1);
        il.emit(OpCode::NewArray);
        il.emit(OpCode::StoreLocal(args));
        il.emit(OpCode::LoadLocal(args));
        il.emit_int(0);
        il.emit_load_arg(1);
        if boxed {
            il.emit(OpCode::Box(PrimitiveKind::Int32));
        }
        il.emit(OpCode::StoreElem);
        il.emit(OpCode::LoadLocal(args));
        il.emit_callvirt(sink(), None);
        il.emit(OpCode::Ret);
        il.finish()
    }

    #[test]
    fn accepts_boxed_packing() {
        let this = this();
        let params = [int()];
        let sig = BodySignature {
            this_type: Some(&this),
            params: &params,
            return_type: &DataType::void(),
        };
        verify("Proxy::M", sig, &pack_one(true)).unwrap();
    }

    #[test]
    fn rejects_unboxed_value_in_object_array() {
        let this = this();
        let params = [int()];
        let sig = BodySignature {
            this_type: Some(&this),
            params: &params,
            return_type: &DataType::void(),
        };
        let err = verify("Proxy::M", sig, &pack_one(false)).unwrap_err();
        assert!(matches!(err, EmitError::TypeMismatch { offset: 7, .. }), "{err}");
    }

    #[test]
    fn rejects_missing_ret_and_trailing_code() {
        let sig = BodySignature {
            this_type: None,
            params: &[],
            return_type: &DataType::void(),
        };

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::Nop);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::MissingReturn { .. })
        ));

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::Ret);
        il.emit(OpCode::Nop);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::CodeAfterReturn { offset: 1, .. })
        ));

        assert!(matches!(
            verify("F", sig, &BodyEmitter::new("F").finish()),
            Err(EmitError::EmptyBody { .. })
        ));
    }

    #[test]
    fn rejects_wrong_local_slot() {
        // Storing an array into the int-typed RET slot is caught
        let sig = BodySignature {
            this_type: None,
            params: &[],
            return_type: &DataType::void(),
        };
        let mut il = BodyEmitter::new("F");
        let ret = il.declare_local(int());
        il.declare_local(DataType::object_array());
        il.emit_int(1);
        il.emit(OpCode::NewArray);
        il.emit(OpCode::StoreLocal(ret));
        il.emit(OpCode::Ret);

        let err = verify("F", sig, &il.finish()).unwrap_err();
        assert!(matches!(err, EmitError::TypeMismatch { offset: 2, .. }));
    }

    #[test]
    fn rejects_unknown_and_unwritten_locals() {
        let sig = BodySignature {
            this_type: None,
            params: &[],
            return_type: &DataType::void(),
        };

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::LoadLocal(0));
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::UnknownLocal { index: 0, .. })
        ));

        let mut il = BodyEmitter::new("F");
        let slot = il.declare_local(DataType::string());
        il.emit(OpCode::LoadLocal(slot));
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::UninitializedLocal { index: 0, .. })
        ));
    }

    #[test]
    fn ret_requires_exact_stack_shape() {
        let int = int();
        let sig = BodySignature {
            this_type: None,
            params: std::slice::from_ref(&int),
            return_type: &int,
        };

        let mut il = BodyEmitter::new("F");
        il.emit_load_arg(0);
        il.emit(OpCode::Ret);
        verify("F", sig, &il.finish()).unwrap();

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::Ret);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::UnbalancedStack { depth: 0, .. })
        ));

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::LoadNull);
        il.emit(OpCode::Ret);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_unknown_argument_and_underflow() {
        let this = this();
        let sig = BodySignature {
            this_type: Some(&this),
            params: &[],
            return_type: &DataType::void(),
        };

        let mut il = BodyEmitter::new("F");
        il.emit_load_arg(1);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::UnknownArgument { index: 1, .. })
        ));

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::Pop);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::StackUnderflow { offset: 0, .. })
        ));
    }

    #[test]
    fn generic_call_needs_type_argument() {
        let sig = BodySignature {
            this_type: None,
            params: &[],
            return_type: &DataType::void(),
        };
        let generic = MethodRef::instance(
            &DataType::reference("D"),
            "convert",
            vec![DataType::object()],
            DataType::object(),
        )
        .with_generic_return();

        let mut il = BodyEmitter::new("F");
        il.emit(OpCode::LoadNull);
        il.emit(OpCode::LoadNull);
        il.emit_callvirt(generic, None);
        il.emit(OpCode::Pop);
        il.emit(OpCode::Ret);
        assert!(matches!(
            verify("F", sig, &il.finish()),
            Err(EmitError::MissingTypeArgument { offset: 2, .. })
        ));
    }
}
