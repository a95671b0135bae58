//! dynproxy kind registry.
//!
//! [`KindRegistry`] catalogs the kinds a proxy factory works with and
//! flattens interface inheritance into a single method contract.

mod inheritance;
mod registry;

pub use inheritance::FlattenedInterface;
pub use registry::{KindRegistry, RESERVED_SEPARATOR};

// Re-export the entry types for convenience
pub use dynproxy_core::{
    ClassEntry, ConstructorEntry, DispatcherEntry, InterfaceEntry, RegistrationError, TypeEntry,
};
