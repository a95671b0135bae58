//! Proxy instances.

use std::fmt;
use std::sync::Arc;

use dynproxy_core::{Dispatch, Dynamic, TypeHash};
use dynproxy_emit::EmittedMember;

use super::interpreter;
use crate::{ProxyError, ProxyType, Result};

/// An instance of a synthesized proxy type.
///
/// Owns the dispatcher created by the forwarded base constructor. Every
/// call runs the generated forwarding body, which reaches the dispatcher
/// only through [`Dispatch::invoke`] and [`Dispatch::convert_return_value`].
pub struct ProxyObject {
    proxy_type: Arc<ProxyType>,
    dispatcher: Box<dyn Dispatch>,
}

impl ProxyObject {
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub(crate) fn construct(proxy_type: Arc<ProxyType>, args: Vec<Dynamic>) -> Result<Self> {
        let ctor = find_constructor(&proxy_type, &args).ok_or_else(|| {
            ProxyError::NoMatchingConstructor {
                type_name: proxy_type.base().name.clone(),
                arity: args.len(),
            }
        })?;
        let dispatcher = interpreter::construct(&proxy_type, ctor, args)?;
        Ok(Self {
            proxy_type,
            dispatcher,
        })
    }

    /// The proxy type this object is an instance of.
    pub fn proxy_type(&self) -> &Arc<ProxyType> {
        &self.proxy_type
    }

    /// Check if this object implements `interface`.
    pub fn implements(&self, interface: TypeHash) -> bool {
        self.proxy_type.implements(interface)
    }

    /// Call a method by name.
    ///
    /// The method is chosen by exact name and argument types; no conversion
    /// is applied to find a match. Returns `None` for methods that return
    /// nothing.
    pub fn call(&mut self, name: &str, args: Vec<Dynamic>) -> Result<Option<Dynamic>> {
        let proxy_type = Arc::clone(&self.proxy_type);
        let method = proxy_type
            .emitted()
            .methods_named(name)
            .find(|m| accepts(m, &args))
            .ok_or_else(|| ProxyError::MethodNotFound {
                type_name: proxy_type.name().to_string(),
                method: describe_call(name, &args),
            })?;
        self.invoke_member(&proxy_type, method, args)
    }

    /// Call the method with the given signature hash.
    ///
    /// Arguments are checked against the declared parameter types.
    pub fn call_signature(
        &mut self,
        signature: TypeHash,
        args: Vec<Dynamic>,
    ) -> Result<Option<Dynamic>> {
        let proxy_type = Arc::clone(&self.proxy_type);
        let method = proxy_type
            .method(signature)
            .filter(|m| m.params.len() == args.len())
            .ok_or_else(|| ProxyError::MethodNotFound {
                type_name: proxy_type.name().to_string(),
                method: signature.to_string(),
            })?;
        self.invoke_member(&proxy_type, method, args)
    }

    fn invoke_member(
        &mut self,
        proxy_type: &ProxyType,
        method: &EmittedMember,
        args: Vec<Dynamic>,
    ) -> Result<Option<Dynamic>> {
        tracing::trace!(
            proxy = %proxy_type.name(),
            method = %method.name,
            args = args.len(),
            "proxied call"
        );
        interpreter::call(proxy_type, method, self.dispatcher.as_mut(), args)
    }

    /// Borrow the dispatcher as its concrete type.
    pub fn dispatcher<T: Dispatch + 'static>(&self) -> Option<&T> {
        (*self.dispatcher).as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the dispatcher as its concrete type.
    pub fn dispatcher_mut<T: Dispatch + 'static>(&mut self) -> Option<&mut T> {
        (*self.dispatcher).as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyObject")
            .field("proxy_type", &self.proxy_type.name())
            .finish_non_exhaustive()
    }
}

fn accepts(member: &EmittedMember, args: &[Dynamic]) -> bool {
    member.params.len() == args.len()
        && member
            .params
            .iter()
            .zip(args)
            .all(|(param, arg)| arg.is_instance_of(param))
}

/// The forwarding constructor whose base constructor accepts `args`.
fn find_constructor<'a>(proxy_type: &'a ProxyType, args: &[Dynamic]) -> Option<&'a EmittedMember> {
    let base_ctor = proxy_type.base().find_constructor(args)?;
    proxy_type
        .constructors()
        .iter()
        .find(|ctor| ctor.params == base_ctor.params)
}

fn describe_call(name: &str, args: &[Dynamic]) -> String {
    let args: Vec<&str> = args.iter().map(Dynamic::type_name).collect();
    format!("{name}({})", args.join(", "))
}
