//! Proxy type cache.
//!
//! Maps (dispatcher base, interface) → synthesized proxy type. Entries are
//! never evicted: a proxy type lives as long as the factory that made it.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use dynproxy_core::TypeHash;

use crate::ProxyType;

/// Cache of synthesized proxy types, keyed by pairing.
#[derive(Debug, Default)]
pub struct ProxyTypeCache {
    /// (base, interface) → proxy type
    types: FxHashMap<(TypeHash, TypeHash), Arc<ProxyType>>,
}

impl ProxyTypeCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the proxy type for a pairing.
    pub fn get(&self, base: TypeHash, interface: TypeHash) -> Option<&Arc<ProxyType>> {
        self.types.get(&(base, interface))
    }

    /// Store the proxy type for a pairing, returning the one that is cached
    /// afterwards. An existing entry is never replaced.
    pub fn insert(&mut self, base: TypeHash, interface: TypeHash, proxy: Arc<ProxyType>) -> Arc<ProxyType> {
        Arc::clone(self.types.entry((base, interface)).or_insert(proxy))
    }

    /// Check if a pairing has been synthesized.
    pub fn contains(&self, base: TypeHash, interface: TypeHash) -> bool {
        self.types.contains_key(&(base, interface))
    }

    /// Number of cached proxy types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over every cached proxy type.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ProxyType>> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynproxy_core::{DispatcherEntry, InterfaceEntry};
    use dynproxy_emit::CodeModule;
    use dynproxy_registry::FlattenedInterface;

    fn proxy(module: &mut CodeModule, base: &DispatcherEntry, iface: &InterfaceEntry) -> Arc<ProxyType> {
        let emitted =
            crate::synth::synthesize(module, base, iface, &FlattenedInterface::default()).unwrap();
        Arc::new(ProxyType::new(
            emitted,
            base.clone(),
            iface.clone(),
            FlattenedInterface::default(),
        ))
    }

    #[test]
    fn cache_new_is_empty() {
        let cache = ProxyTypeCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn pairings_are_keyed_independently() {
        let mut module = CodeModule::new("Test");
        let base = DispatcherEntry::new("Base");
        let x = InterfaceEntry::new("IX");
        let y = InterfaceEntry::new("IY");

        let mut cache = ProxyTypeCache::new();
        cache.insert(base.type_hash, x.type_hash, proxy(&mut module, &base, &x));
        cache.insert(base.type_hash, y.type_hash, proxy(&mut module, &base, &y));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(base.type_hash, x.type_hash));
        assert!(!cache.contains(x.type_hash, base.type_hash));
        assert_eq!(cache.get(base.type_hash, y.type_hash).unwrap().name(), "Base$IYProxy");
    }

    #[test]
    fn insert_keeps_the_first_entry() {
        let mut module = CodeModule::new("Test");
        let mut other = CodeModule::new("Other");
        let base = DispatcherEntry::new("Base");
        let x = InterfaceEntry::new("IX");

        let mut cache = ProxyTypeCache::new();
        let first = cache.insert(base.type_hash, x.type_hash, proxy(&mut module, &base, &x));
        let kept = cache.insert(base.type_hash, x.type_hash, proxy(&mut other, &base, &x));

        assert!(Arc::ptr_eq(&first, &kept));
        assert_eq!(kept.module(), "Test");
    }

    #[test]
    fn iter_visits_every_pairing() {
        let mut module = CodeModule::new("Test");
        let base = DispatcherEntry::new("Base");
        let x = InterfaceEntry::new("IX");
        let y = InterfaceEntry::new("IY");

        let mut cache = ProxyTypeCache::new();
        assert_eq!(cache.iter().count(), 0);
        cache.insert(base.type_hash, x.type_hash, proxy(&mut module, &base, &x));
        cache.insert(base.type_hash, y.type_hash, proxy(&mut module, &base, &y));

        let mut names: Vec<_> = cache.iter().map(|proxy| proxy.name().to_string()).collect();
        names.sort();
        assert_eq!(names, ["Base$IXProxy", "Base$IYProxy"]);
    }
}
