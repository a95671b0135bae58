//! Error types shared by every dynproxy crate.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ConversionError   - a value is not exactly of its declared type
//! DispatchError     - a dispatcher failed to handle a call
//! RegistrationError - a kind could not be added to the kind registry
//! ```
//!
//! The root crate wraps these in its top-level `ProxyError`.

use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// Errors converting between boxed values and declared types.
///
/// Conversions are exact: no implicit widening or narrowing is ever applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The value has a different runtime type than the declared type.
    #[error("type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch { expected: String, actual: String },

    /// A null reference was produced where a value type is declared.
    #[error("null value cannot be converted to value type '{expected}'")]
    NullValue { expected: String },

    /// A null reference was produced for a reference type declared without
    /// `Option`.
    #[error("null reference cannot be converted to non-optional '{expected}'")]
    NullReference { expected: String },

    /// The dispatcher produced no result for a non-void call.
    #[error("no value returned where '{expected}' was expected")]
    MissingValue { expected: String },

    /// A dispatcher-specific conversion failure.
    #[error("{0}")]
    Custom(String),
}

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Errors raised by a dispatcher while handling a call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatcher does not recognise the method.
    #[error("dispatcher does not handle method '{0}'")]
    UnknownMethod(String),

    /// The dispatcher rejected the call.
    #[error("dispatch failed: {0}")]
    Failed(String),

    /// An argument could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Any other dispatcher error.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while registering kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A kind with this identity is already registered.
    #[error("type '{0}' is already registered")]
    DuplicateType(String),

    /// The name is empty or contains the reserved `$` separator.
    #[error("'{0}' is not a valid kind name")]
    InvalidName(String),

    /// A base interface has not been registered.
    #[error("interface '{interface}' extends unknown interface '{base}'")]
    UnknownBaseInterface { interface: String, base: String },

    /// A declared base is registered but is not an interface.
    #[error("interface '{interface}' extends '{base}', which is not an interface")]
    BaseNotInterface { interface: String, base: String },

    /// The interface inheritance graph contains a cycle.
    #[error("interface '{0}' inherits from itself")]
    InheritanceCycle(String),

    /// Two inherited methods share a name and parameter list but disagree
    /// on the return type.
    #[error("interface '{interface}' inherits conflicting declarations of '{method}'")]
    ConflictingMethod { interface: String, method: String },

    /// An interface declares the same method twice.
    #[error("interface '{interface}' declares '{method}' more than once")]
    DuplicateMethod { interface: String, method: String },

    /// A dispatcher declares two constructors with the same parameter list.
    #[error("dispatcher '{dispatcher}' declares constructor {signature} more than once")]
    DuplicateConstructor { dispatcher: String, signature: String },
}
