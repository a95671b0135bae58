//! Method descriptors.

use std::fmt;

use crate::{DataType, TypeHash};

/// A method as declared on an interface: name, ordered parameter types and
/// return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method name.
    pub name: String,
    /// Parameter types in declaration order.
    pub params: Vec<DataType>,
    /// Declared return type (`void` for none).
    pub return_type: DataType,
}

impl MethodSignature {
    /// Create a new method signature.
    pub fn new(name: impl Into<String>, params: Vec<DataType>, return_type: DataType) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
        }
    }

    /// Create a method with no return value.
    pub fn void(name: impl Into<String>, params: Vec<DataType>) -> Self {
        Self::new(name, params, DataType::void())
    }

    /// Identity of this method for matching: name plus parameter types.
    ///
    /// Two declarations with the same name and parameter list occupy the
    /// same slot regardless of where they are declared.
    pub fn signature_hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(|p| p.type_hash).collect();
        TypeHash::from_signature(&self.name, &params)
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Check if this method returns nothing.
    pub fn is_void(&self) -> bool {
        self.return_type.is_void()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ")")
    }
}
