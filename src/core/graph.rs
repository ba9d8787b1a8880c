//! Dependency graph over tasks and subtasks.
//!
//! The graph is backed by petgraph's `DiGraph`. Nodes are tasks, edges are
//! either hierarchy links (parent -> subtask) or dependency links
//! (dependent -> required task). Cycles are allowed: the graph records what
//! the document says and leaves interpretation to the consumer.

use crate::core::task::{Category, Priority, TaskId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Target is a subtask of source.
    Hierarchy,
    /// Target must complete before source proceeds.
    Dependency,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Hierarchy => write!(f, "hierarchy"),
            EdgeKind::Dependency => write!(f, "dependency"),
        }
    }
}

/// A task as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: TaskId,
    pub label: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: TaskId,
    pub target: TaskId,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

/// Wire shape of the graph: flat node and edge lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Directed graph of task nodes with typed edges.
#[derive(Clone, Serialize, Deserialize)]
#[serde(into = "GraphSnapshot", from = "GraphSnapshot")]
pub struct DependencyGraph {
    graph: DiGraph<Node, EdgeKind>,
    node_index: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Add a node. A node whose id is already present is not replaced;
    /// the existing index is returned.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&index) = self.node_index.get(&node.id) {
            return index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_index.insert(id, index);
        index
    }

    /// Add an edge between two known nodes.
    ///
    /// Returns `false` without modifying the graph when either endpoint is
    /// unknown or the same edge already exists.
    pub fn add_edge(&mut self, source: &TaskId, target: &TaskId, kind: EdgeKind) -> bool {
        let (Some(&from), Some(&to)) = (self.node_index.get(source), self.node_index.get(target))
        else {
            return false;
        };
        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == kind);
        if duplicate {
            return false;
        }
        self.graph.add_edge(from, to, kind);
        true
    }

    pub fn node(&self, id: &TaskId) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .map(|edge| Edge {
                source: self.graph[edge.source()].id.clone(),
                target: self.graph[edge.target()].id.clone(),
                kind: *edge.weight(),
            })
            .collect()
    }

    /// Edges as node index pairs, for numeric consumers such as the layout.
    pub fn index_edges(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
            .collect()
    }

    pub fn node_ids(&self) -> BTreeSet<TaskId> {
        self.node_index.keys().cloned().collect()
    }

    /// Edge identity set, independent of insertion order.
    pub fn edge_set(&self) -> BTreeSet<(TaskId, TaskId, EdgeKind)> {
        self.edges()
            .into_iter()
            .map(|edge| (edge.source, edge.target, edge.kind))
            .collect()
    }

    /// Nodes this node depends on.
    pub fn dependencies_of(&self, id: &TaskId) -> Vec<&Node> {
        self.neighbors_by_kind(id, Direction::Outgoing, EdgeKind::Dependency)
    }

    /// Nodes that depend on this node.
    pub fn dependents_of(&self, id: &TaskId) -> Vec<&Node> {
        self.neighbors_by_kind(id, Direction::Incoming, EdgeKind::Dependency)
    }

    /// Direct subtasks of this node.
    pub fn children_of(&self, id: &TaskId) -> Vec<&Node> {
        self.neighbors_by_kind(id, Direction::Outgoing, EdgeKind::Hierarchy)
    }

    fn neighbors_by_kind(&self, id: &TaskId, dir: Direction, kind: EdgeKind) -> Vec<&Node> {
        let Some(&index) = self.node_index.get(id) else {
            return Vec::new();
        };
        let mut found: Vec<NodeIndex> = self
            .graph
            .edges_directed(index, dir)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| match dir {
                Direction::Outgoing => edge.target(),
                Direction::Incoming => edge.source(),
            })
            .collect();
        found.sort();
        found.dedup();
        found.into_iter().map(|i| &self.graph[i]).collect()
    }

    /// Groups of nodes that depend on each other in a loop.
    ///
    /// Only dependency edges count; hierarchy edges never form cycles on
    /// their own. Each group lists ids in node order, groups are ordered by
    /// their first member.
    pub fn cycle_members(&self) -> Vec<Vec<TaskId>> {
        let mut deps: DiGraph<(), ()> =
            DiGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        for _ in self.graph.node_indices() {
            deps.add_node(());
        }
        for edge in self.graph.edge_references() {
            if *edge.weight() == EdgeKind::Dependency {
                deps.add_edge(edge.source(), edge.target(), ());
            }
        }

        let mut groups: Vec<Vec<NodeIndex>> = tarjan_scc(&deps)
            .into_iter()
            .filter(|scc| scc.len() > 1 || deps.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc
            })
            .collect();
        groups.sort();

        groups
            .into_iter()
            .map(|scc| scc.into_iter().map(|i| self.graph[i].id.clone()).collect())
            .collect()
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycle_members().is_empty()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.node_ids() == other.node_ids()
            && self.edge_set() == other.edge_set()
            && self.nodes().all(|n| other.node(&n.id) == Some(n))
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    /// Flat copy of nodes and edges in insertion order.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self.edges(),
        }
    }
}

impl From<DependencyGraph> for GraphSnapshot {
    fn from(graph: DependencyGraph) -> Self {
        graph.snapshot()
    }
}

impl From<GraphSnapshot> for DependencyGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        let mut graph = DependencyGraph::new();
        for node in snapshot.nodes {
            graph.add_node(node);
        }
        for edge in snapshot.edges {
            graph.add_edge(&edge.source, &edge.target, edge.kind);
        }
        graph
    }
}
