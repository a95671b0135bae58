//! Top-level error type.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ProxyError
//! ├── InvalidArgument       - a request names kinds that cannot be proxied
//! │   ├── Registration      - interface inheritance is broken
//! │   └── Malformed         - emitted code failed verification
//! ├── NoMatchingConstructor - no base constructor takes the given arguments
//! ├── MethodNotFound        - a dynamic call names no method of the proxy
//! ├── Conversion            - a value is not exactly of its declared type
//! ├── Dispatch              - the dispatcher failed
//! └── Execution             - an unverified body could not be executed
//! ```

use thiserror::Error;

use dynproxy_core::{ConversionError, DispatchError, RegistrationError};
use dynproxy_emit::EmitError;

/// Result type for proxy factory operations.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors surfaced by the proxy factory and proxy objects.
///
/// All of them are terminal: nothing is retried.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The requested pairing cannot be proxied.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// No constructor of the dispatcher base matches the given arguments.
    #[error("'{type_name}' has no constructor taking {arity} argument(s) of the given types")]
    NoMatchingConstructor { type_name: String, arity: usize },

    /// A dynamic call names no method of the proxy.
    #[error("'{type_name}' has no method {method}")]
    MethodNotFound { type_name: String, method: String },

    /// A value could not be converted to its declared type.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The dispatcher failed to handle a call.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A body could not be executed. Only reachable with verification off.
    #[error("{member} @ {offset:#06x}: {message}")]
    Execution {
        member: String,
        offset: usize,
        message: String,
    },
}

/// Why a request was rejected as an invalid argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// The identity names no registered kind.
    #[error("unknown kind {0}")]
    UnknownType(String),

    /// The kind is not an interface.
    #[error("'{0}' is not an interface")]
    NotAnInterface(String),

    /// The kind is not a dispatcher base.
    #[error("'{0}' is not a dispatcher base")]
    NotADispatcher(String),

    /// The dispatcher base is abstract.
    #[error("'{0}' is abstract and cannot be extended")]
    AbstractDispatcher(String),

    /// The proxy object does not implement the requested interface.
    #[error("'{proxy}' does not implement '{interface}'")]
    NotImplemented { proxy: String, interface: String },

    /// The interface could not be registered or flattened.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Code generation produced a body that failed verification.
    #[error("malformed proxy: {0}")]
    Malformed(#[from] EmitError),
}

impl From<RegistrationError> for ProxyError {
    fn from(err: RegistrationError) -> Self {
        ProxyError::InvalidArgument(err.into())
    }
}

impl From<EmitError> for ProxyError {
    fn from(err: EmitError) -> Self {
        ProxyError::InvalidArgument(err.into())
    }
}

impl ProxyError {
    /// Check if this is an invalid-argument error.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ProxyError::InvalidArgument(_))
    }

    /// Check if this is a conversion error.
    pub fn is_conversion(&self) -> bool {
        matches!(self, ProxyError::Conversion(_))
    }
}
