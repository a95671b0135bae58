//! Instruction set for emitted method bodies.
//!
//! A stack machine with an IL-like instruction set. Bodies are straight-line:
//! there are no branch instructions. Argument 0 of an instance member is the
//! receiver (`this`); declared parameters start at argument 1.

use std::fmt;
use std::sync::Arc;

use dynproxy_core::{DataType, PrimitiveKind, TypeHash};

/// A reference to a callable member, as it appears in a call instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    /// Identity of the declaring kind.
    pub owner: TypeHash,
    /// Display name of the declaring kind.
    pub owner_name: Arc<str>,
    /// Member name (`.ctor` for constructors).
    pub name: Arc<str>,
    /// Parameter types, excluding the receiver.
    pub params: Vec<DataType>,
    /// Declared return type. Ignored when `generic_return` is set.
    pub return_type: DataType,
    /// Instance member: the receiver is popped before the arguments.
    pub has_this: bool,
    /// The return type is the call's type argument (`!!0`).
    pub generic_return: bool,
}

impl MethodRef {
    /// Name used for constructors.
    pub const CONSTRUCTOR_NAME: &'static str = ".ctor";

    /// Reference an instance method.
    pub fn instance(
        owner: &DataType,
        name: &str,
        params: Vec<DataType>,
        return_type: DataType,
    ) -> Self {
        Self {
            owner: owner.type_hash,
            owner_name: Arc::clone(&owner.name),
            name: Arc::from(name),
            params,
            return_type,
            has_this: true,
            generic_return: false,
        }
    }

    /// Reference a constructor.
    pub fn constructor(owner: &DataType, params: Vec<DataType>) -> Self {
        Self::instance(owner, Self::CONSTRUCTOR_NAME, params, DataType::void())
    }

    /// Make the return type the call's type argument.
    pub fn with_generic_return(mut self) -> Self {
        self.generic_return = true;
        self
    }

    /// Check if this references a constructor.
    pub fn is_constructor(&self) -> bool {
        &*self.name == Self::CONSTRUCTOR_NAME
    }

    /// The type a call leaves on the stack, given its type argument.
    ///
    /// Returns `None` for a generic return without a type argument.
    pub fn result_type(&self, type_arg: Option<&DataType>) -> Option<DataType> {
        if self.generic_return {
            type_arg.cloned()
        } else {
            Some(self.return_type.clone())
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_this {
            write!(f, "instance ")?;
        }
        if self.generic_return {
            write!(f, "!!0 ")?;
        } else {
            write!(f, "{} ", self.return_type)?;
        }
        write!(f, "{}::{}(", self.owner_name, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum OpCode {
    /// Do nothing.
    Nop,

    // =========================================================================
    // Loads
    // =========================================================================
    /// Push argument N (argument 0 is the receiver).
    LoadArg(u16),
    /// Push a null reference.
    LoadNull,
    /// Push a string literal.
    LoadStr(Arc<str>),
    /// Push a 32-bit integer literal.
    LoadInt(i32),

    // =========================================================================
    // Locals
    // =========================================================================
    /// Push local N.
    LoadLocal(u16),
    /// Pop into local N.
    StoreLocal(u16),

    // =========================================================================
    // Arrays
    // =========================================================================
    /// Pop a length, push a new object array of that length.
    NewArray,
    /// Pop value, index and array; store the value. The value must be a
    /// reference: value types are boxed first.
    StoreElem,

    // =========================================================================
    // Boxing
    // =========================================================================
    /// Pop a value of the given kind, push it boxed as an object.
    Box(PrimitiveKind),

    // =========================================================================
    // Calls
    // =========================================================================
    /// Non-virtual call.
    Call {
        method: MethodRef,
        type_arg: Option<DataType>,
    },
    /// Virtual call through the receiver.
    CallVirt {
        method: MethodRef,
        type_arg: Option<DataType>,
    },

    // =========================================================================
    // Stack / Control
    // =========================================================================
    /// Discard the top of the stack.
    Pop,
    /// Return from the member.
    Ret,
}

impl OpCode {
    /// IL mnemonic, without operands.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpCode::Nop => "nop",
            OpCode::LoadArg(_) => "ldarg",
            OpCode::LoadNull => "ldnull",
            OpCode::LoadStr(_) => "ldstr",
            OpCode::LoadInt(_) => "ldc.i4",
            OpCode::LoadLocal(_) => "ldloc",
            OpCode::StoreLocal(_) => "stloc",
            OpCode::NewArray => "newarr",
            OpCode::StoreElem => "stelem.ref",
            OpCode::Box(_) => "box",
            OpCode::Call { .. } => "call",
            OpCode::CallVirt { .. } => "callvirt",
            OpCode::Pop => "pop",
            OpCode::Ret => "ret",
        }
    }

    /// Check if this is a call instruction.
    pub fn is_call(&self) -> bool {
        matches!(self, OpCode::Call { .. } | OpCode::CallVirt { .. })
    }
}

/// Short forms for small operands, as an IL disassembler prints them.
fn short_form(f: &mut fmt::Formatter<'_>, op: &str, n: u16, max_short: u16) -> fmt::Result {
    if n <= max_short {
        write!(f, "{op}.{n}")
    } else {
        write!(f, "{op}.s {n}")
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::LoadArg(n) => short_form(f, "ldarg", *n, 3),
            OpCode::LoadLocal(n) => short_form(f, "ldloc", *n, 3),
            OpCode::StoreLocal(n) => short_form(f, "stloc", *n, 3),
            OpCode::LoadStr(s) => write!(f, "ldstr {s:?}"),
            OpCode::LoadInt(n @ 0..=8) => write!(f, "ldc.i4.{n}"),
            OpCode::LoadInt(n) => write!(f, "ldc.i4.s {n}"),
            OpCode::NewArray => write!(f, "newarr object"),
            OpCode::Box(kind) => write!(f, "box {kind}"),
            OpCode::Call { method, type_arg } | OpCode::CallVirt { method, type_arg } => {
                write!(f, "{} ", self.mnemonic())?;
                match type_arg {
                    // Splice the type argument between name and parameter list
                    Some(arg) => {
                        let text = method.to_string();
                        match text.find('(') {
                            Some(at) => write!(f, "{}<{arg}>{}", &text[..at], &text[at..]),
                            None => write!(f, "{text}<{arg}>"),
                        }
                    }
                    None => write!(f, "{method}"),
                }
            }
            other => f.write_str(other.mnemonic()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch() -> DataType {
        DataType::reference("Dispatch")
    }

    #[test]
    fn display_short_forms() {
        assert_eq!(OpCode::LoadArg(0).to_string(), "ldarg.0");
        assert_eq!(OpCode::LoadArg(4).to_string(), "ldarg.s 4");
        assert_eq!(OpCode::StoreLocal(1).to_string(), "stloc.1");
        assert_eq!(OpCode::LoadInt(2).to_string(), "ldc.i4.2");
        assert_eq!(OpCode::LoadInt(12).to_string(), "ldc.i4.s 12");
        assert_eq!(OpCode::LoadStr(Arc::from("Fn2")).to_string(), "ldstr \"Fn2\"");
        assert_eq!(OpCode::Box(PrimitiveKind::Int32).to_string(), "box int");
        assert_eq!(OpCode::StoreElem.to_string(), "stelem.ref");
    }

    #[test]
    fn display_calls() {
        let invoke = MethodRef::instance(
            &dispatch(),
            "invoke",
            vec![DataType::string(), DataType::object_array()],
            DataType::object(),
        );
        let op = OpCode::CallVirt {
            method: invoke,
            type_arg: None,
        };
        assert_eq!(
            op.to_string(),
            "callvirt instance object Dispatch::invoke(string, object[])"
        );

        let convert = MethodRef::instance(
            &dispatch(),
            "convert_return_value",
            vec![DataType::object()],
            DataType::object(),
        )
        .with_generic_return();
        let op = OpCode::CallVirt {
            method: convert,
            type_arg: Some(DataType::primitive(PrimitiveKind::Int32)),
        };
        assert_eq!(
            op.to_string(),
            "callvirt instance !!0 Dispatch::convert_return_value<int>(object)"
        );
    }

    #[test]
    fn result_type() {
        let ctor = MethodRef::constructor(&DataType::reference("Base"), vec![]);
        assert!(ctor.is_constructor());
        assert_eq!(ctor.result_type(None), Some(DataType::void()));

        let generic = ctor.clone().with_generic_return();
        assert_eq!(generic.result_type(None), None);
        assert_eq!(
            generic.result_type(Some(&DataType::string())),
            Some(DataType::string())
        );
    }
}
