use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::call_graph::graph::MethodCallGraph;
use crate::models::split_method_id;

/// Interface name to implementing class names, built while classes are
/// loaded and applied to the graph in one pass afterwards.
#[derive(Debug, Clone, Default)]
pub struct InterfaceIndex {
    implementations: BTreeMap<String, BTreeSet<String>>,
}

impl InterfaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `implementation` implements `interface` directly.
    pub fn record(&mut self, interface: impl Into<String>, implementation: impl Into<String>) {
        self.implementations
            .entry(interface.into())
            .or_default()
            .insert(implementation.into());
    }

    pub fn implementations(&self, interface: &str) -> Option<&BTreeSet<String>> {
        self.implementations.get(interface)
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }

    /// Adds a concrete edge for every known implementor of an
    /// interface-typed callee. The original interface edge stays in
    /// place. Must run after the whole class set has been loaded,
    /// otherwise late implementors are missed.
    pub fn resolve(&self, graph: &mut MethodCallGraph) {
        let mut added = 0usize;
        for callees in graph.edges_mut().values_mut() {
            let mut additions = BTreeSet::new();
            for callee in callees.iter() {
                let Some((owner, method)) = split_method_id(callee) else {
                    continue;
                };
                let Some(implementations) = self.implementations.get(owner) else {
                    continue;
                };
                for implementation in implementations {
                    additions.insert(format!("{implementation}.{method}"));
                }
            }
            for addition in additions {
                if callees.insert(addition) {
                    added += 1;
                }
            }
        }
        debug!(
            interfaces = self.implementations.len(),
            added, "Resolved interface calls to implementations"
        );
    }
}
