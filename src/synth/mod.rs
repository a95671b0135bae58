//! Proxy type synthesis.
//!
//! Given a dispatcher base and an interface, defines a type in the code
//! module that extends the base, implements the interface and consists
//! solely of forwarding members:
//!
//! - one constructor per base constructor, with the identical parameter list
//! - one method per interface method, inherited ones included
//!
//! Synthesis knows nothing about caching; see
//! [`ProxyFactory`](crate::ProxyFactory).

pub(crate) mod contract;
mod members;

use dynproxy_core::{DispatcherEntry, InterfaceEntry, TypeHash};
use dynproxy_emit::{CodeModule, EmitError, EmittedType};
use dynproxy_registry::FlattenedInterface;

/// Name of the proxy type for a pairing.
///
/// The registry reserves `$` for this, so distinct pairings never collide.
pub fn proxy_type_name(base: &DispatcherEntry, interface: &InterfaceEntry) -> String {
    format!("{}${}Proxy", base.name, interface.name)
}

/// Define, fill and create the proxy type for `base` and `interface`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn synthesize(
    module: &mut CodeModule,
    base: &DispatcherEntry,
    interface: &InterfaceEntry,
    contract: &FlattenedInterface,
) -> Result<EmittedType, EmitError> {
    let mut ty = module.define_type(
        proxy_type_name(base, interface),
        TypeHash::from_proxy(base.type_hash, interface.type_hash),
        base.data_type(),
        vec![interface.data_type()],
    )?;

    for ctor in &base.constructors {
        members::emit_constructor(&mut ty, base, &ctor.params)?;
    }
    for method in &contract.methods {
        members::emit_forwarder(&mut ty, method)?;
    }

    ty.create_type()
}
