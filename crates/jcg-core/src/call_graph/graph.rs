use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

static EMPTY_CALLEES: BTreeSet<String> = BTreeSet::new();

/// Caller-to-callee adjacency over method identifiers
/// (`com.acme.UserService.findAll`). Ordered maps keep serialized
/// output stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodCallGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl MethodCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a call edge; duplicates collapse into one.
    pub fn add_edge(&mut self, caller: impl Into<String>, callee: impl Into<String>) {
        self.edges
            .entry(caller.into())
            .or_default()
            .insert(callee.into());
    }

    /// Methods called by `method`, empty for unknown callers.
    pub fn callees(&self, method: &str) -> &BTreeSet<String> {
        self.edges.get(method).unwrap_or(&EMPTY_CALLEES)
    }

    /// Methods with an edge into `method`.
    pub fn callers(&self, method: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, callees)| callees.contains(method))
            .map(|(caller, _)| caller.as_str())
            .collect()
    }

    /// True when `method` has at least one outgoing edge.
    pub fn contains(&self, method: &str) -> bool {
        self.edges.contains_key(method)
    }

    /// Number of callers with recorded edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.edges.iter()
    }

    /// Everything reachable from `entry`, as a new graph. Traversal is
    /// breadth-first with a visited set, so cycles and self-loops
    /// terminate. Leaf methods appear only as callee values, never as
    /// keys.
    pub fn subgraph_from(&self, entry: &str) -> MethodCallGraph {
        let mut subgraph = MethodCallGraph::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(entry.to_string());

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            let callees = self.callees(&current);
            if callees.is_empty() {
                continue;
            }
            for callee in callees {
                subgraph.add_edge(current.clone(), callee.clone());
                if !visited.contains(callee) {
                    queue.push_back(callee.clone());
                }
            }
        }
        subgraph
    }

    pub(crate) fn edges_mut(&mut self) -> &mut BTreeMap<String, BTreeSet<String>> {
        &mut self.edges
    }
}
