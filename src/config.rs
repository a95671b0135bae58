//! Proxy factory configuration.

/// Default name of the code module proxies are emitted into.
pub const DEFAULT_MODULE_NAME: &str = "EmittedProxies";

/// Configuration for a [`ProxyFactory`](crate::ProxyFactory).
///
/// ```
/// use dynproxy::FactoryConfig;
///
/// let config = FactoryConfig::default()
///     .with_module_name("TestProxies")
///     .with_emission_trace(true);
/// assert!(config.verify_bodies);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Name of the code module every proxy type is defined in.
    pub module_name: String,
    /// Run the body verifier when a proxy type is created.
    pub verify_bodies: bool,
    /// Log every emitted instruction at trace level.
    pub trace_emission: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            verify_bodies: true,
            trace_emission: false,
        }
    }
}

impl FactoryConfig {
    /// Set the code module name.
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Enable or disable body verification.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify_bodies = verify;
        self
    }

    /// Enable or disable the emission trace.
    pub fn with_emission_trace(mut self, trace: bool) -> Self {
        self.trace_emission = trace;
        self
    }
}
