//! Dispatcher base kind entry.

use std::fmt;
use std::sync::Arc;

use crate::{Any, DataType, Dispatch, DispatchError, Dynamic, TypeHash};

/// Native constructor for a dispatcher base.
///
/// Receives the forwarded arguments, already checked against the declared
/// parameter types.
pub type ConstructorFn =
    Arc<dyn Fn(Vec<Dynamic>) -> Result<Box<dyn Dispatch>, DispatchError> + Send + Sync>;

/// A constructor declared by a dispatcher base.
#[derive(Clone)]
pub struct ConstructorEntry {
    /// Declared parameter types, in order.
    pub params: Vec<DataType>,
    /// Native constructor.
    pub factory: ConstructorFn,
}

impl ConstructorEntry {
    /// Check if `args` match the declared parameters exactly.
    pub fn accepts(&self, args: &[Dynamic]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| arg.is_instance_of(param))
    }

    /// Constructor identity within `owner`.
    pub fn hash(&self, owner: TypeHash) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(|p| p.type_hash).collect();
        TypeHash::from_constructor(owner, &params)
    }

    /// Display form of the parameter list, e.g. `(int, string)`.
    pub fn param_list(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        format!("({})", params.join(", "))
    }
}

impl fmt::Debug for ConstructorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorEntry")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Registry entry for a dispatcher base kind.
///
/// A dispatcher base implements [`Dispatch`] and can be extended by
/// generated proxies. Abstract bases cannot.
#[derive(Debug, Clone)]
pub struct DispatcherEntry {
    /// Kind name.
    pub name: String,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    /// Abstract bases cannot be instantiated or proxied.
    pub is_abstract: bool,
    /// Declared constructors, in declaration order.
    pub constructors: Vec<ConstructorEntry>,
}

impl DispatcherEntry {
    /// Create a new dispatcher entry with no constructors.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_hash = TypeHash::from_name(&name);
        Self {
            name,
            type_hash,
            is_abstract: false,
            constructors: Vec::new(),
        }
    }

    /// Create a dispatcher entry from a type implementing [`Any`].
    pub fn of<T: Any>() -> Self {
        Self {
            name: T::type_name().to_string(),
            type_hash: T::type_hash(),
            is_abstract: false,
            constructors: Vec::new(),
        }
    }

    /// Mark this base as abstract.
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Add a constructor.
    pub fn with_constructor<D, F>(mut self, params: Vec<DataType>, factory: F) -> Self
    where
        D: Dispatch + 'static,
        F: Fn(Vec<Dynamic>) -> Result<D, DispatchError> + Send + Sync + 'static,
    {
        let ctor: ConstructorFn =
            Arc::new(move |args| factory(args).map(|d| Box::new(d) as Box<dyn Dispatch>));
        self.constructors.push(ConstructorEntry {
            params,
            factory: ctor,
        });
        self
    }

    /// Add a parameterless constructor.
    pub fn with_default_constructor<D, F>(self, factory: F) -> Self
    where
        D: Dispatch + 'static,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.with_constructor(Vec::new(), move |_| Ok(factory()))
    }

    /// Find the constructor whose parameters match `args` exactly.
    pub fn find_constructor(&self, args: &[Dynamic]) -> Option<&ConstructorEntry> {
        self.constructors.iter().find(|ctor| ctor.accepts(args))
    }

    /// The reference type naming this kind.
    pub fn data_type(&self) -> DataType {
        DataType::reference_with_hash(&self.name, self.type_hash)
    }
}
