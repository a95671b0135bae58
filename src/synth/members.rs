//! Member body generation.
//!
//! Constructor bodies forward every argument to the matching base
//! constructor. Method bodies pack their arguments, call
//! `Dispatch::invoke` with the method name and, unless the method returns
//! nothing, pass the raw result through `Dispatch::convert_return_value`
//! instantiated with the declared return type.
//!
//! A method `int Fn2(int, int)` compiles to:
//!
//! ```text
//! .locals init ([0] int, [1] object[])
//! 0x0000: nop
//! 0x0001: ldarg.0
//! 0x0002: ldarg.0
//! 0x0003: ldstr "Fn2"
//! 0x0004: ldc.i4.2
//! 0x0005: newarr object
//! 0x0006: stloc.1
//! 0x0007: ldloc.1
//! 0x0008: ldc.i4.0
//! 0x0009: ldarg.1
//! 0x000a: box int
//! 0x000b: stelem.ref
//! 0x000c: ldloc.1
//! 0x000d: ldc.i4.1
//! 0x000e: ldarg.2
//! 0x000f: box int
//! 0x0010: stelem.ref
//! 0x0011: ldloc.1
//! 0x0012: callvirt instance object Dispatch::invoke(string, object[])
//! 0x0013: callvirt instance !!0 Dispatch::convert_return_value<int>(object)
//! 0x0014: stloc.0
//! 0x0015: ldloc.0
//! 0x0016: ret
//! ```

use dynproxy_core::{DataType, DispatcherEntry, MethodSignature};
use dynproxy_emit::{BodyEmitter, EmitError, MemberFlags, OpCode, TypeBuilder};

use super::contract;

/// Emit a constructor with `params` that forwards to the base constructor
/// with the identical parameter list.
pub fn emit_constructor(
    ty: &mut TypeBuilder<'_>,
    base: &DispatcherEntry,
    params: &[DataType],
) -> Result<(), EmitError> {
    let arity = arity(&base.name, params)?;
    let ctor = ty.define_constructor(MemberFlags::CONSTRUCTOR, params.to_vec())?;
    let il = ctor.body();

    // Receiver plus every declared argument, in order
    for index in 0..=arity {
        il.emit_load_arg(index);
    }
    il.emit_call(contract::base_constructor(base, params));
    il.emit(OpCode::Ret);
    Ok(())
}

/// Emit the forwarding implementation of `method`.
pub fn emit_forwarder(ty: &mut TypeBuilder<'_>, method: &MethodSignature) -> Result<(), EmitError> {
    let arity = arity(&method.name, &method.params)?;
    let member = ty.define_method(
        &method.name,
        MemberFlags::INTERFACE_METHOD,
        method.return_type.clone(),
        method.params.clone(),
    )?;
    let il = member.body();

    let returns_value = !method.is_void();
    let result_local = returns_value.then(|| il.declare_local(method.return_type.clone()));
    let args_local = (!method.params.is_empty()).then(|| il.declare_local(DataType::object_array()));

    il.emit(OpCode::Nop);
    il.emit_load_arg(0);
    if returns_value {
        // Receiver for convert_return_value, consumed after invoke
        il.emit_load_arg(0);
    }
    il.emit_str(&method.name);

    match args_local {
        Some(args) => emit_pack_arguments(il, args, arity, &method.params),
        None => {
            il.emit(OpCode::LoadNull);
        }
    }

    il.emit_callvirt(contract::invoke(), None);

    match result_local {
        Some(result) => {
            il.emit_callvirt(
                contract::convert_return_value(),
                Some(method.return_type.clone()),
            );
            il.emit(OpCode::StoreLocal(result));
            il.emit(OpCode::LoadLocal(result));
        }
        None => {
            il.emit(OpCode::Pop);
        }
    }
    il.emit(OpCode::Ret);
    Ok(())
}

/// Parameter count of a member. Argument 0 is the receiver, so the count is
/// also the last argument index and must fit in a `u16`.
fn arity(member: &str, params: &[DataType]) -> Result<u16, EmitError> {
    u16::try_from(params.len()).map_err(|_| EmitError::TooManyParameters {
        member: member.to_string(),
        count: params.len(),
    })
}

/// Allocate `object[arity]` in `args`, fill it in declaration order and
/// leave it on the stack.
fn emit_pack_arguments(il: &mut BodyEmitter, args: u16, arity: u16, params: &[DataType]) {
    il.emit_int(i32::from(arity));
    il.emit(OpCode::NewArray);
    il.emit(OpCode::StoreLocal(args));

    for (param, index) in params.iter().zip(0..arity) {
        il.emit(OpCode::LoadLocal(args));
        il.emit_int(i32::from(index));
        il.emit_load_arg(index + 1);
        if let Some(kind) = param.primitive_kind() {
            il.emit(OpCode::Box(kind));
        }
        il.emit(OpCode::StoreElem);
    }

    il.emit(OpCode::LoadLocal(args));
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynproxy_core::{PrimitiveKind, TypeHash};
    use dynproxy_emit::{CodeModule, EmittedType};

    fn int() -> DataType {
        DataType::primitive(PrimitiveKind::Int32)
    }

    fn build(method: &MethodSignature) -> EmittedType {
        let base = DispatcherEntry::new("Base");
        let mut module = CodeModule::new("Test");
        let mut ty = module
            .define_type("T", TypeHash::from_name("T"), base.data_type(), vec![])
            .unwrap();
        emit_constructor(&mut ty, &base, &[]).unwrap();
        emit_forwarder(&mut ty, method).unwrap();
        ty.create_type().unwrap()
    }

    #[test]
    fn two_int_method_listing() {
        let ty = build(&MethodSignature::new("Fn2", vec![int(), int()], int()));
        let listing = ty.methods()[0].body.disassemble();
        let expected = "\
.locals init ([0] int, [1] object[])
0x0000: nop
0x0001: ldarg.0
0x0002: ldarg.0
0x0003: ldstr \"Fn2\"
0x0004: ldc.i4.2
0x0005: newarr object
0x0006: stloc.1
0x0007: ldloc.1
0x0008: ldc.i4.0
0x0009: ldarg.1
0x000a: box int
0x000b: stelem.ref
0x000c: ldloc.1
0x000d: ldc.i4.1
0x000e: ldarg.2
0x000f: box int
0x0010: stelem.ref
0x0011: ldloc.1
0x0012: callvirt instance object Dispatch::invoke(string, object[])
0x0013: callvirt instance !!0 Dispatch::convert_return_value<int>(object)
0x0014: stloc.0
0x0015: ldloc.0
0x0016: ret
";
        assert_eq!(listing, expected);
    }

    #[test]
    fn parameterless_method_passes_null() {
        let ty = build(&MethodSignature::new("Fn0", vec![], DataType::string()));
        let body = &ty.methods()[0].body;
        assert_eq!(body.locals(), &[DataType::string()]);
        assert!(body.code().contains(&OpCode::LoadNull));
        assert!(!body.code().contains(&OpCode::NewArray));
    }

    #[test]
    fn void_method_discards_the_result() {
        let ty = build(&MethodSignature::void("Notify", vec![DataType::string()]));
        let body = &ty.methods()[0].body;
        let code = body.code();

        assert_eq!(body.locals(), &[DataType::object_array()]);
        assert_eq!(&code[code.len() - 2..], &[OpCode::Pop, OpCode::Ret]);
        assert!(!code.iter().any(|op| matches!(op, OpCode::Box(_))));
        let converts = code
            .iter()
            .filter(|op| matches!(op, OpCode::CallVirt { type_arg: Some(_), .. }))
            .count();
        assert_eq!(converts, 0);
    }

    #[test]
    fn constructor_forwards_every_argument() {
        let base = DispatcherEntry::new("Base");
        let mut module = CodeModule::new("Test");
        let mut ty = module
            .define_type("T", TypeHash::from_name("T"), base.data_type(), vec![])
            .unwrap();
        emit_constructor(&mut ty, &base, &[int(), DataType::string()]).unwrap();
        let ty = ty.create_type().unwrap();

        let listing = ty.constructors()[0].body.disassemble();
        assert_eq!(
            listing,
            "0x0000: ldarg.0\n0x0001: ldarg.1\n0x0002: ldarg.2\n\
             0x0003: call instance void Base::.ctor(int, string)\n0x0004: ret\n"
        );
        assert_eq!(ty.constructors()[0].flags, MemberFlags::CONSTRUCTOR);
    }

    #[test]
    fn oversized_parameter_lists_are_rejected() {
        let base = DispatcherEntry::new("Base");
        let mut module = CodeModule::new("Test");
        let mut ty = module
            .define_type("T", TypeHash::from_name("T"), base.data_type(), vec![])
            .unwrap();
        let params = vec![int(); u16::MAX as usize + 1];

        let err = emit_forwarder(&mut ty, &MethodSignature::new("Wide", params.clone(), int())).unwrap_err();
        assert_eq!(
            err,
            EmitError::TooManyParameters { member: "Wide".into(), count: 65536 }
        );
        let err = emit_constructor(&mut ty, &base, &params).unwrap_err();
        assert!(matches!(err, EmitError::TooManyParameters { count: 65536, .. }));

        // One fewer still fits: the last argument index is u16::MAX
        emit_forwarder(&mut ty, &MethodSignature::void("Widest", vec![int(); 65535])).unwrap();
    }
}
