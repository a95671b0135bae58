//! Interface inheritance flattening.
//!
//! Builds the inheritance graph reachable from an interface with `petgraph`,
//! rejects cycles, then walks it depth-first: an interface's own methods come
//! first, then each base interface in declaration order. Every interface is
//! visited once, so diamonds contribute their shared methods a single time.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use dynproxy_core::{InterfaceEntry, MethodSignature, RegistrationError, TypeEntry, TypeHash};

use crate::KindRegistry;

/// The complete method contract of an interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedInterface {
    /// Every method, own and inherited, deduplicated by name and parameter
    /// types.
    pub methods: Vec<MethodSignature>,
    /// The interface itself followed by every ancestor, in visit order.
    pub interfaces: Vec<TypeHash>,
}

struct Walk<'a> {
    root: &'a InterfaceEntry,
    visited: FxHashSet<TypeHash>,
    slots: FxHashMap<TypeHash, usize>,
    out: FlattenedInterface,
}

impl KindRegistry {
    /// Collect every method `root` requires, including inherited ones.
    ///
    /// `root` need not be registered itself; its bases must be.
    pub fn flatten_interface(&self, root: &InterfaceEntry) -> Result<FlattenedInterface, RegistrationError> {
        let graph = self.inheritance_graph(root)?;
        if let Err(cycle) = toposort(&graph, None) {
            let hash = graph[cycle.node_id()];
            let name = match self.get(hash) {
                Some(entry) if hash != root.type_hash => entry.name().to_string(),
                _ => root.name.clone(),
            };
            return Err(RegistrationError::InheritanceCycle(name));
        }

        let mut walk = Walk {
            root,
            visited: FxHashSet::default(),
            slots: FxHashMap::default(),
            out: FlattenedInterface::default(),
        };
        self.collect(&mut walk, root)?;
        Ok(walk.out)
    }

    fn inheritance_graph(&self, root: &InterfaceEntry) -> Result<DiGraph<TypeHash, ()>, RegistrationError> {
        let mut graph = DiGraph::new();
        let mut nodes: FxHashMap<TypeHash, NodeIndex> = FxHashMap::default();
        nodes.insert(root.type_hash, graph.add_node(root.type_hash));

        let mut pending = vec![root];
        while let Some(iface) = pending.pop() {
            let from = nodes[&iface.type_hash];
            for &base in &iface.base_interfaces {
                let base_entry = self.resolve_base(root, iface, base)?;
                let to = match nodes.get(&base) {
                    Some(&index) => index,
                    None => {
                        let index = graph.add_node(base);
                        nodes.insert(base, index);
                        pending.push(base_entry);
                        index
                    }
                };
                graph.add_edge(from, to, ());
            }
        }
        Ok(graph)
    }

    fn resolve_base<'a>(
        &'a self,
        root: &'a InterfaceEntry,
        child: &InterfaceEntry,
        base: TypeHash,
    ) -> Result<&'a InterfaceEntry, RegistrationError> {
        if base == root.type_hash {
            return Ok(root);
        }
        match self.get(base) {
            Some(TypeEntry::Interface(entry)) => Ok(entry),
            Some(other) => Err(RegistrationError::BaseNotInterface {
                interface: child.name.clone(),
                base: other.name().to_string(),
            }),
            None => Err(RegistrationError::UnknownBaseInterface {
                interface: child.name.clone(),
                base: base.to_string(),
            }),
        }
    }

    fn collect<'a>(&'a self, walk: &mut Walk<'a>, iface: &'a InterfaceEntry) -> Result<(), RegistrationError> {
        if !walk.visited.insert(iface.type_hash) {
            return Ok(());
        }
        walk.out.interfaces.push(iface.type_hash);

        for method in &iface.methods {
            let signature = method.signature_hash();
            match walk.slots.get(&signature) {
                Some(&slot) if walk.out.methods[slot].return_type == method.return_type => {}
                Some(_) => {
                    return Err(RegistrationError::ConflictingMethod {
                        interface: walk.root.name.clone(),
                        method: method.to_string(),
                    });
                }
                None => {
                    walk.slots.insert(signature, walk.out.methods.len());
                    walk.out.methods.push(method.clone());
                }
            }
        }

        for &base in &iface.base_interfaces {
            let base = self.resolve_base(walk.root, iface, base)?;
            self.collect(walk, base)?;
        }
        Ok(())
    }
}
