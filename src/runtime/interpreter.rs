//! Body interpreter.
//!
//! Executes one emitted member body against a receiver. The receiver of a
//! constructor body starts out empty: the base constructor call creates the
//! dispatcher. Method bodies run against an existing dispatcher and reach it
//! only through the two dispatch contract calls.
//!
//! Arguments are unboxed into frame slots on entry, strictly, so a value of
//! the wrong type never reaches a body. Arrays live in a per-frame arena and
//! are referenced by index from the stack and from locals.

use dynproxy_core::{Arguments, DataType, Dispatch, Dynamic, Slot};
use dynproxy_emit::{EmittedMember, MethodRef, OpCode};

use crate::synth::contract;
use crate::{ProxyError, ProxyType, Result};

/// The `this` of a running body.
pub(crate) enum Receiver<'a> {
    /// A constructor body; holds the dispatcher once the base constructor
    /// has run.
    Constructing(Option<Box<dyn Dispatch>>),
    /// A method body on a constructed proxy.
    Bound(&'a mut dyn Dispatch),
}

/// A stack entry or local value.
#[derive(Debug, Clone)]
enum Operand {
    /// The receiver.
    This,
    /// Unboxed value type.
    Raw(u64),
    /// Reference: string, boxed value, object or null.
    Ref(Dynamic),
    /// Object array, by arena index.
    Array(usize),
    /// Result of `invoke`, not yet converted. `None` is no result at all.
    Returned(Option<Dynamic>),
}

impl From<Slot> for Operand {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Raw(bits) => Operand::Raw(bits),
            Slot::Ref(value) => Operand::Ref(value),
        }
    }
}

enum Flow {
    Continue,
    Return(Option<Dynamic>),
}

struct Frame<'a> {
    proxy: &'a ProxyType,
    member: &'a EmittedMember,
    this: Receiver<'a>,
    args: Vec<Slot>,
    locals: Vec<Option<Operand>>,
    arrays: Vec<Vec<Dynamic>>,
    stack: Vec<Operand>,
    offset: usize,
}

/// Run a constructor body and return the dispatcher it created.
pub(crate) fn construct(
    proxy: &ProxyType,
    ctor: &EmittedMember,
    args: Vec<Dynamic>,
) -> Result<Box<dyn Dispatch>> {
    let mut frame = Frame::new(proxy, ctor, Receiver::Constructing(None), args)?;
    frame.run()?;
    match frame.this {
        Receiver::Constructing(Some(dispatcher)) => Ok(dispatcher),
        _ => Err(fault(proxy, ctor, frame.offset, "constructor never called a base constructor")),
    }
}

/// Run a method body against `this`.
pub(crate) fn call(
    proxy: &ProxyType,
    method: &EmittedMember,
    this: &mut dyn Dispatch,
    args: Vec<Dynamic>,
) -> Result<Option<Dynamic>> {
    let mut frame = Frame::new(proxy, method, Receiver::Bound(this), args)?;
    frame.run()
}

fn fault(proxy: &ProxyType, member: &EmittedMember, offset: usize, message: &str) -> ProxyError {
    ProxyError::Execution {
        member: format!("{}::{}", proxy.name(), member.name),
        offset,
        message: message.to_string(),
    }
}

impl<'a> Frame<'a> {
    fn new(
        proxy: &'a ProxyType,
        member: &'a EmittedMember,
        this: Receiver<'a>,
        args: Vec<Dynamic>,
    ) -> Result<Self> {
        if args.len() != member.params.len() {
            return Err(fault(proxy, member, 0, "argument count does not match the declaration"));
        }
        let args = member
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| arg.unbox(param))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            proxy,
            member,
            this,
            args,
            locals: vec![None; member.body.locals().len()],
            arrays: Vec::new(),
            stack: Vec::new(),
            offset: 0,
        })
    }

    fn run(&mut self) -> Result<Option<Dynamic>> {
        let member = self.member;
        for (offset, op) in member.body.code().iter().enumerate() {
            self.offset = offset;
            if let Flow::Return(value) = self.step(op)? {
                return Ok(value);
            }
        }
        Err(self.fault("body does not end with ret"))
    }

    fn fault(&self, message: &str) -> ProxyError {
        fault(self.proxy, self.member, self.offset, message)
    }

    fn pop(&mut self) -> Result<Operand> {
        self.stack.pop().ok_or_else(|| self.fault("stack underflow"))
    }

    fn pop_receiver(&mut self) -> Result<()> {
        match self.pop()? {
            Operand::This => Ok(()),
            _ => Err(self.fault("call receiver is not this")),
        }
    }

    fn to_slot(&self, operand: Operand) -> Result<Slot> {
        match operand {
            Operand::Raw(bits) => Ok(Slot::Raw(bits)),
            Operand::Ref(value) => Ok(Slot::Ref(value)),
            Operand::Returned(value) => Ok(Slot::Ref(value.unwrap_or(Dynamic::Null))),
            Operand::This | Operand::Array(_) => Err(self.fault("value is not a declared type")),
        }
    }

    fn dispatcher(&mut self) -> Result<&mut dyn Dispatch> {
        match &mut self.this {
            Receiver::Bound(dispatcher) => Ok(&mut **dispatcher),
            Receiver::Constructing(Some(dispatcher)) => Ok(dispatcher.as_mut()),
            Receiver::Constructing(None) => Err(fault(
                self.proxy,
                self.member,
                self.offset,
                "dispatcher used before the base constructor ran",
            )),
        }
    }

    fn step(&mut self, op: &'a OpCode) -> Result<Flow> {
        match op {
            OpCode::Nop => {}
            OpCode::LoadArg(0) => self.stack.push(Operand::This),
            OpCode::LoadArg(index) => {
                let slot = self
                    .args
                    .get(*index as usize - 1)
                    .cloned()
                    .ok_or_else(|| self.fault("no such argument"))?;
                self.stack.push(slot.into());
            }
            OpCode::LoadNull => self.stack.push(Operand::Ref(Dynamic::Null)),
            OpCode::LoadStr(value) => self.stack.push(Operand::Ref(Dynamic::String(value.to_string()))),
            OpCode::LoadInt(value) => self.stack.push(Operand::Raw(*value as i64 as u64)),
            OpCode::LoadLocal(index) => {
                let value = self
                    .locals
                    .get(*index as usize)
                    .cloned()
                    .flatten()
                    .ok_or_else(|| self.fault("local read before it is written"))?;
                self.stack.push(value);
            }
            OpCode::StoreLocal(index) => {
                let value = self.pop()?;
                let index = *index as usize;
                if index >= self.locals.len() {
                    return Err(self.fault("no such local"));
                }
                self.locals[index] = Some(value);
            }
            OpCode::NewArray => {
                let len = match self.pop()? {
                    Operand::Raw(bits) => usize::try_from(bits as i32).ok(),
                    _ => None,
                }
                .ok_or_else(|| self.fault("array length is not a non-negative int"))?;
                self.arrays.push(vec![Dynamic::Null; len]);
                self.stack.push(Operand::Array(self.arrays.len() - 1));
            }
            OpCode::StoreElem => self.store_element()?,
            OpCode::Box(kind) => match self.pop()? {
                Operand::Raw(bits) => self.stack.push(Operand::Ref(Dynamic::from_raw(*kind, bits))),
                _ => return Err(self.fault("box of a non-value operand")),
            },
            OpCode::Call { method, .. } => self.call_base_constructor(method)?,
            OpCode::CallVirt { method, type_arg } => {
                if contract::is_contract_member(method, contract::INVOKE) {
                    self.call_invoke()?;
                } else if contract::is_contract_member(method, contract::CONVERT_RETURN_VALUE) {
                    let target = type_arg
                        .as_ref()
                        .ok_or_else(|| self.fault("conversion without a target type"))?;
                    self.call_convert(target)?;
                } else {
                    return Err(self.fault("virtual call outside the dispatch contract"));
                }
            }
            OpCode::Pop => {
                self.pop()?;
            }
            OpCode::Ret => return self.ret().map(Flow::Return),
        }
        Ok(Flow::Continue)
    }

    fn store_element(&mut self) -> Result<()> {
        let value = match self.pop()? {
            Operand::Ref(value) => value,
            Operand::Returned(value) => value.unwrap_or(Dynamic::Null),
            _ => return Err(self.fault("only references can be stored in an object array")),
        };
        let index = match self.pop()? {
            Operand::Raw(bits) => usize::try_from(bits as i32).ok(),
            _ => None,
        };
        let array = match self.pop()? {
            Operand::Array(array) => array,
            _ => return Err(self.fault("element store into a non-array")),
        };

        match index {
            Some(index) if index < self.arrays[array].len() => {
                self.arrays[array][index] = value;
                Ok(())
            }
            _ => Err(self.fault("array index out of range")),
        }
    }

    fn pop_call_arguments(&mut self, params: &[DataType]) -> Result<Vec<Dynamic>> {
        let mut values = Vec::with_capacity(params.len());
        for param in params.iter().rev() {
            let operand = self.pop()?;
            values.push(self.to_slot(operand)?.into_dynamic(param));
        }
        values.reverse();
        Ok(values)
    }

    fn call_base_constructor(&mut self, method: &MethodRef) -> Result<()> {
        let base = self.proxy.base();
        if !method.is_constructor() || method.owner != base.type_hash {
            return Err(self.fault("call target is not a base constructor"));
        }

        let args = self.pop_call_arguments(&method.params)?;
        self.pop_receiver()?;

        let ctor = base
            .constructors
            .iter()
            .find(|ctor| ctor.params == method.params)
            .ok_or_else(|| self.fault("base constructor does not exist"))?;

        match self.this {
            Receiver::Constructing(None) => {
                let dispatcher = (ctor.factory)(args)?;
                self.this = Receiver::Constructing(Some(dispatcher));
                Ok(())
            }
            _ => Err(self.fault("base constructor called on a constructed object")),
        }
    }

    fn call_invoke(&mut self) -> Result<()> {
        let arguments = match self.pop()? {
            Operand::Ref(Dynamic::Null) => Arguments::NoArgs,
            Operand::Array(array) => Arguments::Packed(self.arrays[array].clone()),
            _ => return Err(self.fault("invoke expects an object array or null")),
        };
        let method = match self.pop()? {
            Operand::Ref(Dynamic::String(name)) => name,
            _ => return Err(self.fault("invoke expects a method name")),
        };
        self.pop_receiver()?;

        let result = self.dispatcher()?.invoke(&method, arguments)?;
        self.stack.push(Operand::Returned(result));
        Ok(())
    }

    fn call_convert(&mut self, target: &DataType) -> Result<()> {
        let raw = match self.pop()? {
            Operand::Returned(raw) => raw,
            Operand::Ref(value) => Some(value),
            _ => return Err(self.fault("convert expects an object")),
        };
        self.pop_receiver()?;

        let value = self.dispatcher()?.convert_return_value(raw, target)?;
        let slot = value.unbox(target)?;
        self.stack.push(slot.into());
        Ok(())
    }

    fn ret(&mut self) -> Result<Option<Dynamic>> {
        let return_type = &self.member.return_type;
        if return_type.is_void() {
            return if self.stack.is_empty() {
                Ok(None)
            } else {
                Err(self.fault("values left on the stack at ret"))
            };
        }

        let operand = self.pop()?;
        if !self.stack.is_empty() {
            return Err(self.fault("values left on the stack at ret"));
        }
        Ok(Some(self.to_slot(operand)?.into_dynamic(return_type)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynproxy_core::{DispatchError, DispatcherEntry, InterfaceEntry, PrimitiveKind, TypeHash};
    use dynproxy_core::ConversionError;
    use dynproxy_emit::{CodeModule, MemberFlags, TypeBuilder};
    use dynproxy_registry::FlattenedInterface;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<(String, Arguments)>,
    }

    impl Dispatch for Recorder {
        fn invoke(&mut self, method: &str, args: Arguments) -> std::result::Result<Option<Dynamic>, DispatchError> {
            self.seen.push((method.to_string(), args));
            Ok(None)
        }
    }

    fn int() -> DataType {
        DataType::primitive(PrimitiveKind::Int32)
    }

    fn base() -> DispatcherEntry {
        DispatcherEntry::new("Recorder").with_default_constructor(Recorder::default)
    }

    /// Build a proxy type with hand-written, unverified bodies.
    fn proxy_with(build: impl FnOnce(&mut TypeBuilder<'_>)) -> ProxyType {
        let base = base();
        let iface = InterfaceEntry::new("IRecord");
        let mut module = CodeModule::new("Test").with_verification(false);
        let mut ty = module
            .define_type("T", TypeHash::from_name("T"), base.data_type(), vec![iface.data_type()])
            .unwrap();
        build(&mut ty);
        let emitted = ty.create_type().unwrap();
        ProxyType::new(emitted, base, iface, FlattenedInterface::default())
    }

    fn emit_default_constructor(ty: &mut TypeBuilder<'_>) {
        let il = ty.define_constructor(MemberFlags::CONSTRUCTOR, vec![]).unwrap().body();
        il.emit_load_arg(0);
        il.emit_call(contract::base_constructor(&base(), &[]));
        il.emit(OpCode::Ret);
    }

    #[test]
    fn constructor_creates_the_dispatcher() {
        let proxy = proxy_with(emit_default_constructor);
        let dispatcher = construct(&proxy, &proxy.constructors()[0], vec![]).unwrap();
        assert!((*dispatcher).as_any().downcast_ref::<Recorder>().is_some());
    }

    #[test]
    fn constructor_must_call_the_base() {
        let proxy = proxy_with(|ty| {
            ty.define_constructor(MemberFlags::CONSTRUCTOR, vec![])
                .unwrap()
                .body()
                .emit(OpCode::Ret);
        });
        let err = construct(&proxy, &proxy.constructors()[0], vec![]).err().unwrap();
        assert!(matches!(err, ProxyError::Execution { .. }));
    }

    #[test]
    fn packed_arguments_reach_invoke() {
        let proxy = proxy_with(|ty| {
            let il = ty
                .define_method("Go", MemberFlags::INTERFACE_METHOD, DataType::void(), vec![int()])
                .unwrap()
                .body();
            let args = il.declare_local(DataType::object_array());
            il.emit_load_arg(0);
            il.emit_str("Go");
            il.emit_int(1);
            il.emit(OpCode::NewArray);
            il.emit(OpCode::StoreLocal(args));
            il.emit(OpCode::LoadLocal(args));
            il.emit_int(0);
            il.emit_load_arg(1);
            il.emit(OpCode::Box(PrimitiveKind::Int32));
            il.emit(OpCode::StoreElem);
            il.emit(OpCode::LoadLocal(args));
            il.emit_callvirt(contract::invoke(), None);
            il.emit(OpCode::Pop);
            il.emit(OpCode::Ret);
        });

        let mut recorder = Recorder::default();
        let result = call(&proxy, &proxy.methods()[0], &mut recorder, vec![Dynamic::Int32(7)]).unwrap();
        assert_eq!(result, None);
        assert_eq!(
            recorder.seen,
            [("Go".to_string(), Arguments::Packed(vec![Dynamic::Int32(7)]))]
        );

        let err = call(&proxy, &proxy.methods()[0], &mut recorder, vec![Dynamic::Int64(7)]).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Conversion(ConversionError::TypeMismatch { .. })
        ));
        assert_eq!(recorder.seen.len(), 1);
    }

    #[test]
    fn unverified_faults_report_the_offset() {
        let proxy = proxy_with(|ty| {
            let il = ty
                .define_method("Broken", MemberFlags::INTERFACE_METHOD, DataType::void(), vec![])
                .unwrap()
                .body();
            il.emit(OpCode::Nop);
            il.emit(OpCode::Pop);
        });

        let mut recorder = Recorder::default();
        match call(&proxy, &proxy.methods()[0], &mut recorder, vec![]) {
            Err(ProxyError::Execution { member, offset, message }) => {
                assert_eq!(member, "T::Broken");
                assert_eq!(offset, 1);
                assert_eq!(message, "stack underflow");
            }
            other => panic!("expected an execution fault, got {other:?}"),
        }
    }

    #[test]
    fn unboxed_values_cannot_be_stored_in_arrays() {
        let proxy = proxy_with(|ty| {
            let il = ty
                .define_method("Bad", MemberFlags::INTERFACE_METHOD, DataType::void(), vec![int()])
                .unwrap()
                .body();
            il.emit_int(1);
            il.emit(OpCode::NewArray);
            il.emit_int(0);
            il.emit_load_arg(1);
            il.emit(OpCode::StoreElem);
            il.emit(OpCode::Ret);
        });

        let mut recorder = Recorder::default();
        let err = call(&proxy, &proxy.methods()[0], &mut recorder, vec![Dynamic::Int32(1)]).unwrap_err();
        assert!(matches!(err, ProxyError::Execution { offset: 4, .. }));
    }
}
