//! The dispatch contract.
//!
//! A dispatcher receives every call made on a generated proxy through exactly
//! two operations:
//!
//! - [`Dispatch::invoke`]: handle a call by method name with packed arguments.
//! - [`Dispatch::convert_return_value`]: turn the opaque result of `invoke`
//!   into a value of the call site's declared return type.
//!
//! Generated proxies hold no state of their own; all state lives in the
//! dispatcher.
//!
//! # Example
//!
//! ```
//! use dynproxy_core::{Arguments, Dispatch, DispatchError, Dynamic};
//!
//! struct Echo;
//!
//! impl Dispatch for Echo {
//!     fn invoke(&mut self, method: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
//!         match args {
//!             Arguments::NoArgs => Ok(Some(Dynamic::String(method.to_string()))),
//!             Arguments::Packed(values) => Ok(values.into_iter().next()),
//!         }
//!     }
//! }
//! ```

use crate::{ConversionError, DataType, DispatchError, Dynamic, TypeHash};

/// Name under which the dispatch contract itself is catalogued.
pub const CONTRACT_NAME: &str = "Dispatch";

/// Identity of the dispatch contract.
pub fn contract_type_hash() -> TypeHash {
    TypeHash::from_name(CONTRACT_NAME)
}

/// Arguments handed to [`Dispatch::invoke`].
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    /// The method declares no parameters.
    ///
    /// Distinct from `Packed(vec![])`: a parameterless method never produces
    /// an empty array.
    NoArgs,
    /// Every argument boxed, in declaration order.
    Packed(Vec<Dynamic>),
}

impl Arguments {
    /// Number of arguments (zero for `NoArgs`).
    pub fn len(&self) -> usize {
        match self {
            Arguments::NoArgs => 0,
            Arguments::Packed(values) => values.len(),
        }
    }

    /// Check if there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is the no-arguments marker.
    pub fn is_no_args(&self) -> bool {
        matches!(self, Arguments::NoArgs)
    }

    /// Borrow the packed values (empty for `NoArgs`).
    pub fn as_slice(&self) -> &[Dynamic] {
        match self {
            Arguments::NoArgs => &[],
            Arguments::Packed(values) => values,
        }
    }

    /// Take the packed values (empty for `NoArgs`).
    pub fn into_vec(self) -> Vec<Dynamic> {
        match self {
            Arguments::NoArgs => Vec::new(),
            Arguments::Packed(values) => values,
        }
    }
}

/// Access to the concrete type behind a trait object.
pub trait AsAny {
    /// Borrow as `dyn Any`.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Mutably borrow as `dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

impl<T: std::any::Any> AsAny for T {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// The uniform forwarding contract every dispatcher base implements.
pub trait Dispatch: AsAny + Send {
    /// Handle a call to `method`.
    ///
    /// Called exactly once per proxied call. `Ok(None)` means no result.
    fn invoke(&mut self, method: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError>;

    /// Convert the raw result of [`invoke`](Dispatch::invoke) to `target`.
    ///
    /// Never called for methods that return nothing. The default performs
    /// no coercion at all; see [`convert_exact`].
    fn convert_return_value(
        &self,
        raw: Option<Dynamic>,
        target: &DataType,
    ) -> Result<Dynamic, ConversionError> {
        convert_exact(raw, target)
    }
}

/// Accept `raw` only if it is already exactly of type `target`.
///
/// A missing result is null for reference types and an error for value
/// types.
pub fn convert_exact(raw: Option<Dynamic>, target: &DataType) -> Result<Dynamic, ConversionError> {
    match raw {
        None if target.is_value_type() => Err(ConversionError::MissingValue {
            expected: target.name.to_string(),
        }),
        None => Ok(Dynamic::Null),
        Some(Dynamic::Null) if target.is_value_type() => Err(ConversionError::NullValue {
            expected: target.name.to_string(),
        }),
        Some(value) if value.is_instance_of(target) => Ok(value),
        Some(value) => Err(ConversionError::TypeMismatch {
            expected: target.name.to_string(),
            actual: value.type_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveKind;

    struct Counter {
        calls: usize,
    }

    impl Dispatch for Counter {
        fn invoke(&mut self, _method: &str, _args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
            self.calls += 1;
            Ok(Some(Dynamic::Uint64(self.calls as u64)))
        }
    }

    #[test]
    fn no_args_is_not_an_empty_pack() {
        assert_ne!(Arguments::NoArgs, Arguments::Packed(Vec::new()));
        assert!(Arguments::NoArgs.is_no_args());
        assert!(Arguments::Packed(Vec::new()).is_empty());
        assert!(!Arguments::Packed(Vec::new()).is_no_args());
    }

    #[test]
    fn convert_exact_rejects_widening() {
        let int = DataType::primitive(PrimitiveKind::Int32);
        assert_eq!(convert_exact(Some(Dynamic::Int32(3)), &int).unwrap(), Dynamic::Int32(3));
        assert!(matches!(
            convert_exact(Some(Dynamic::Int16(3)), &int),
            Err(ConversionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn convert_exact_handles_missing_values() {
        let int = DataType::primitive(PrimitiveKind::Int32);
        assert!(matches!(
            convert_exact(None, &int),
            Err(ConversionError::MissingValue { .. })
        ));
        assert!(matches!(
            convert_exact(Some(Dynamic::Null), &int),
            Err(ConversionError::NullValue { .. })
        ));
        assert_eq!(convert_exact(None, &DataType::string()).unwrap(), Dynamic::Null);
    }

    #[test]
    fn downcast_through_trait_object() {
        let mut boxed: Box<dyn Dispatch> = Box::new(Counter { calls: 0 });
        boxed.invoke("Tick", Arguments::NoArgs).unwrap();

        let counter = (*boxed).as_any().downcast_ref::<Counter>().unwrap();
        assert_eq!(counter.calls, 1);

        (*boxed).as_any_mut().downcast_mut::<Counter>().unwrap().calls = 10;
        let result = boxed.invoke("Tick", Arguments::NoArgs).unwrap();
        assert_eq!(result, Some(Dynamic::Uint64(11)));
    }
}
