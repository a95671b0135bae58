//! Kind catalog entry types.
//!
//! - [`TypeEntry`] - Unified enum wrapping all entries
//! - [`InterfaceEntry`] - Interface kinds (method contracts)
//! - [`DispatcherEntry`] - Dispatcher base kinds with their constructors
//! - [`ClassEntry`] - Plain object kinds
//!
//! Supporting types:
//! - [`ConstructorEntry`], [`ConstructorFn`] - Dispatcher constructors

mod class;
mod dispatcher;
mod interface;
mod type_entry;

pub use class::ClassEntry;
pub use dispatcher::{ConstructorEntry, ConstructorFn, DispatcherEntry};
pub use interface::InterfaceEntry;

// Unified type entry
pub use type_entry::TypeEntry;
