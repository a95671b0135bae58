//! Typed proxy adapters.
//!
//! [`ProxyInterface`] ties a Rust type to an interface declaration. It is
//! normally implemented by `#[dynproxy::interface]`, which generates a
//! `{Trait}Proxy` newtype over [`ProxyObject`] with one forwarding method
//! per trait method.

use dynproxy_core::{InterfaceEntry, RegistrationError, TypeHash};
use dynproxy_registry::KindRegistry;

use crate::{InvalidArgument, ProxyError, ProxyObject, Result};

/// A typed view of a proxy object as one interface.
pub trait ProxyInterface: Sized {
    /// The interface declaration.
    fn interface_entry() -> InterfaceEntry;

    /// Identity of the interface.
    fn type_hash() -> TypeHash;

    /// Register every base interface. The default has none.
    fn register_bases(kinds: &mut KindRegistry) -> std::result::Result<(), RegistrationError> {
        let _ = kinds;
        Ok(())
    }

    /// Register the interface and its bases, if not already registered.
    fn register(kinds: &mut KindRegistry) -> std::result::Result<(), RegistrationError> {
        Self::register_bases(kinds)?;
        if kinds.contains(Self::type_hash()) {
            return Ok(());
        }
        kinds.register_interface(Self::interface_entry())?;
        Ok(())
    }

    /// Wrap an object without checking that it implements the interface.
    fn from_object_unchecked(object: ProxyObject) -> Self;

    /// Borrow the underlying object.
    fn object(&self) -> &ProxyObject;

    /// Mutably borrow the underlying object.
    fn object_mut(&mut self) -> &mut ProxyObject;

    /// Unwrap the underlying object.
    fn into_object(self) -> ProxyObject;

    /// Wrap an object that implements the interface.
    fn from_object(object: ProxyObject) -> Result<Self> {
        if object.implements(Self::type_hash()) {
            Ok(Self::from_object_unchecked(object))
        } else {
            Err(ProxyError::InvalidArgument(InvalidArgument::NotImplemented {
                proxy: object.proxy_type().name().to_string(),
                interface: Self::interface_entry().name,
            }))
        }
    }

    /// View the same object as another interface it implements, such as a
    /// base interface.
    fn cast<Q: ProxyInterface>(self) -> Result<Q> {
        Q::from_object(self.into_object())
    }
}
