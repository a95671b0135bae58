//! The proxy factory.
//!
//! Owns the kind registry, the code module proxies are emitted into and the
//! cache of synthesized proxy types. A factory is `Send + Sync` and meant to
//! be shared: lookups take a read lock on the cache, and synthesis is
//! serialized by the code module lock with a second cache check, so each
//! pairing is synthesized at most once and no caller ever sees a partially
//! built type.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use dynproxy_core::{ClassEntry, Dynamic, DispatcherEntry, InterfaceEntry, TypeEntry, TypeHash};
use dynproxy_emit::CodeModule;
use dynproxy_registry::KindRegistry;

use crate::cache::ProxyTypeCache;
use crate::synth;
use crate::{FactoryConfig, InvalidArgument, ProxyInterface, ProxyObject, ProxyType, Result};

/// Synthesizes, caches and instantiates proxy types.
///
/// ```
/// use dynproxy::{
///     Arguments, DataType, Dispatch, DispatchError, DispatcherEntry, Dynamic, InterfaceEntry,
///     MethodSignature, PrimitiveKind, ProxyFactory,
/// };
///
/// struct Adder;
///
/// impl Dispatch for Adder {
///     fn invoke(&mut self, _: &str, args: Arguments) -> Result<Option<Dynamic>, DispatchError> {
///         let sum = args.as_slice().iter().map(|a| match a {
///             Dynamic::Int32(v) => *v,
///             _ => 0,
///         });
///         Ok(Some(Dynamic::Int32(sum.sum())))
///     }
/// }
///
/// let int = DataType::primitive(PrimitiveKind::Int32);
/// let factory = ProxyFactory::new();
/// let base = factory
///     .register_dispatcher(DispatcherEntry::new("Adder").with_default_constructor(|| Adder))
///     .unwrap();
/// let calc = factory
///     .register_interface_entry(
///         InterfaceEntry::new("ICalc")
///             .with_method(MethodSignature::new("Add", vec![int.clone(), int.clone()], int)),
///     )
///     .unwrap();
///
/// let mut proxy = factory.create_instance(base, calc, vec![]).unwrap();
/// let sum = proxy.call("Add", vec![Dynamic::Int32(1), Dynamic::Int32(2)]).unwrap();
/// assert_eq!(sum, Some(Dynamic::Int32(3)));
/// ```
#[derive(Debug)]
pub struct ProxyFactory {
    kinds: RwLock<KindRegistry>,
    cache: RwLock<ProxyTypeCache>,
    module: Mutex<CodeModule>,
    config: FactoryConfig,
    syntheses: AtomicUsize,
}

impl Default for ProxyFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyFactory {
    /// Create a factory with a fresh registry and the default configuration.
    pub fn new() -> Self {
        Self::with_config(FactoryConfig::default())
    }

    /// Create a factory with a fresh registry.
    pub fn with_config(config: FactoryConfig) -> Self {
        Self::with_registry(KindRegistry::new(), config)
    }

    /// Create a factory over an existing registry.
    pub fn with_registry(kinds: KindRegistry, config: FactoryConfig) -> Self {
        let module = CodeModule::new(config.module_name.clone())
            .with_verification(config.verify_bodies)
            .with_emission_trace(config.trace_emission);
        Self {
            kinds: RwLock::new(kinds),
            cache: RwLock::new(ProxyTypeCache::new()),
            module: Mutex::new(module),
            config,
            syntheses: AtomicUsize::new(0),
        }
    }

    /// The factory configuration.
    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a dispatcher base.
    pub fn register_dispatcher(&self, entry: DispatcherEntry) -> Result<TypeHash> {
        Ok(self.kinds.write().register_dispatcher(entry)?)
    }

    /// Register an interface from its declaration.
    pub fn register_interface_entry(&self, entry: InterfaceEntry) -> Result<TypeHash> {
        Ok(self.kinds.write().register_interface(entry)?)
    }

    /// Register a typed interface and its bases, if not already registered.
    pub fn register_interface<P: ProxyInterface>(&self) -> Result<TypeHash> {
        P::register(&mut self.kinds.write())?;
        Ok(P::type_hash())
    }

    /// Register a plain class.
    pub fn register_class(&self, entry: ClassEntry) -> Result<TypeHash> {
        Ok(self.kinds.write().register_class(entry)?)
    }

    /// Read access to the kind registry.
    pub fn kinds(&self) -> RwLockReadGuard<'_, KindRegistry> {
        self.kinds.read()
    }

    // ==========================================================================
    // Synthesis
    // ==========================================================================

    /// Get the proxy type for `base` and `interface`, synthesizing it on
    /// first use.
    ///
    /// Fails with [`InvalidArgument`] unless `interface` is a registered
    /// interface and `base` a registered, non-abstract dispatcher base.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn create_type(&self, base: TypeHash, interface: TypeHash) -> Result<Arc<ProxyType>> {
        if let Some(proxy) = self.cache.read().get(base, interface) {
            tracing::debug!(proxy = %proxy.name(), "proxy type cache hit");
            return Ok(Arc::clone(proxy));
        }

        let mut module = self.module.lock();

        // Another thread may have finished the same pairing while we waited
        if let Some(proxy) = self.cache.read().get(base, interface) {
            tracing::debug!(proxy = %proxy.name(), "proxy type cache hit after wait");
            return Ok(Arc::clone(proxy));
        }

        let proxy = {
            let kinds = self.kinds.read();
            let (base_entry, interface_entry) = resolve_pairing(&kinds, base, interface)?;
            let contract = kinds.flatten_interface(interface_entry)?;

            tracing::debug!(
                base = %base_entry.name,
                interface = %interface_entry.name,
                constructors = base_entry.constructors.len(),
                methods = contract.methods.len(),
                "proxy type cache miss, synthesizing"
            );

            let emitted = synth::synthesize(&mut module, base_entry, interface_entry, &contract)?;
            Arc::new(ProxyType::new(
                emitted,
                base_entry.clone(),
                interface_entry.clone(),
                contract,
            ))
        };

        self.syntheses.fetch_add(1, Ordering::Relaxed);
        Ok(self.cache.write().insert(base, interface, proxy))
    }

    /// Typed form of [`create_type`](Self::create_type). Registers `P` if
    /// needed.
    pub fn create_type_for<P: ProxyInterface>(&self, base: TypeHash) -> Result<Arc<ProxyType>> {
        let interface = self.ensure_registered::<P>()?;
        self.create_type(base, interface)
    }

    // ==========================================================================
    // Instantiation
    // ==========================================================================

    /// Create a proxy instance, forwarding `args` unchanged to the base
    /// constructor whose parameter types match them exactly.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn create_instance(
        &self,
        base: TypeHash,
        interface: TypeHash,
        args: Vec<Dynamic>,
    ) -> Result<ProxyObject> {
        let proxy_type = self.create_type(base, interface)?;
        ProxyObject::construct(proxy_type, args)
    }

    /// Create a typed proxy instance. Registers `P` if needed.
    pub fn create<P: ProxyInterface>(&self, base: TypeHash, args: Vec<Dynamic>) -> Result<P> {
        let interface = self.ensure_registered::<P>()?;
        let object = self.create_instance(base, interface, args)?;
        Ok(P::from_object_unchecked(object))
    }

    fn ensure_registered<P: ProxyInterface>(&self) -> Result<TypeHash> {
        let hash = P::type_hash();
        if !self.kinds.read().contains(hash) {
            P::register(&mut self.kinds.write())?;
        }
        Ok(hash)
    }

    // ==========================================================================
    // Introspection
    // ==========================================================================

    /// Number of cached proxy types.
    pub fn cached_type_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Number of proxy types synthesized so far.
    ///
    /// Equal to [`cached_type_count`](Self::cached_type_count): a pairing is
    /// never synthesized twice.
    pub fn synthesis_count(&self) -> usize {
        self.syntheses.load(Ordering::Relaxed)
    }

    /// Check if a pairing has been synthesized.
    pub fn is_cached(&self, base: TypeHash, interface: TypeHash) -> bool {
        self.cache.read().contains(base, interface)
    }
}

/// Validate a pairing against the registry.
fn resolve_pairing(
    kinds: &KindRegistry,
    base: TypeHash,
    interface: TypeHash,
) -> Result<(&DispatcherEntry, &InterfaceEntry)> {
    let interface_entry = match kinds.get(interface) {
        Some(TypeEntry::Interface(entry)) => entry,
        Some(other) => return Err(InvalidArgument::NotAnInterface(other.name().to_string()).into()),
        None => return Err(InvalidArgument::UnknownType(interface.to_string()).into()),
    };

    let base_entry = match kinds.get(base) {
        Some(TypeEntry::Dispatcher(entry)) if entry.is_abstract => {
            return Err(InvalidArgument::AbstractDispatcher(entry.name.clone()).into());
        }
        Some(TypeEntry::Dispatcher(entry)) => entry,
        Some(other) => return Err(InvalidArgument::NotADispatcher(other.name().to_string()).into()),
        None => return Err(InvalidArgument::UnknownType(base.to_string()).into()),
    };

    Ok((base_entry, interface_entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProxyError;
    use dynproxy_core::{Arguments, DataType, Dispatch, DispatchError, MethodSignature, dispatch, primitives};

    struct Silent;

    impl Dispatch for Silent {
        fn invoke(&mut self, _: &str, _: Arguments) -> std::result::Result<Option<Dynamic>, DispatchError> {
            Ok(None)
        }
    }

    fn setup() -> (ProxyFactory, TypeHash, TypeHash) {
        let factory = ProxyFactory::new();
        let base = factory
            .register_dispatcher(DispatcherEntry::new("Silent").with_default_constructor(|| Silent))
            .unwrap();
        let iface = factory
            .register_interface_entry(
                InterfaceEntry::new("INotify").with_method(MethodSignature::void("Ping", vec![])),
            )
            .unwrap();
        (factory, base, iface)
    }

    #[test]
    fn create_type_is_idempotent() {
        let (factory, base, iface) = setup();
        let first = factory.create_type(base, iface).unwrap();
        let second = factory.create_type(base, iface).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.synthesis_count(), 1);
        assert_eq!(factory.cached_type_count(), 1);
        assert!(factory.is_cached(base, iface));
    }

    #[test]
    fn swapped_arguments_are_rejected() {
        let (factory, base, iface) = setup();
        let err = factory.create_type(iface, base).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::InvalidArgument(InvalidArgument::NotAnInterface(ref name)) if name == "Silent"
        ));
        assert_eq!(factory.cached_type_count(), 0);
    }

    #[test]
    fn non_dispatcher_bases_are_rejected() {
        let (factory, _, iface) = setup();
        let err = factory.create_type(primitives::STRING, iface).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::InvalidArgument(InvalidArgument::NotADispatcher(_))
        ));

        let err = factory.create_type(dispatch::contract_type_hash(), iface).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::InvalidArgument(InvalidArgument::AbstractDispatcher(_))
        ));

        let err = factory.create_type(TypeHash::from_name("Nowhere"), iface).unwrap_err();
        assert!(matches!(
            err,
            ProxyError::InvalidArgument(InvalidArgument::UnknownType(_))
        ));
    }

    #[test]
    fn broken_inheritance_is_an_invalid_argument() {
        let (factory, base, _) = setup();
        let orphan = factory
            .register_interface_entry(
                InterfaceEntry::new("IOrphan").with_base(TypeHash::from_name("IMissing")),
            )
            .unwrap();
        let err = factory.create_type(base, orphan).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(factory.synthesis_count(), 0);
    }

    #[test]
    fn module_name_comes_from_config() {
        let factory = ProxyFactory::with_config(FactoryConfig::default().with_module_name("Mocks"));
        let base = factory
            .register_dispatcher(DispatcherEntry::new("Silent").with_default_constructor(|| Silent))
            .unwrap();
        let iface = factory
            .register_interface_entry(InterfaceEntry::new("IEmpty"))
            .unwrap();

        let proxy = factory.create_type(base, iface).unwrap();
        assert_eq!(proxy.module(), "Mocks");
        assert_eq!(proxy.name(), "Silent$IEmptyProxy");
        assert_eq!(proxy.emitted().base, DataType::reference("Silent"));
    }
}
