//! Relation graph module: construction, persistence, and bounded
//! neighborhood extraction.
//!
//! An edge `word -> token` exists when the token appears in the word's
//! processed definition and is itself a dictionary headword.

mod builder;
mod neighborhood;
mod store;

pub use builder::build_graph;
pub use neighborhood::{extract_neighborhood, Directions, Neighborhood};
pub use store::{load_graph, save_graph};

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Index of a node inside the graph arena.
pub type NodeId = usize;

/// Directed graph of words with both-way adjacency.
///
/// Nodes and edges are stored in insertion order; `successors` and
/// `predecessors` are maintained at insertion time so extraction never
/// scans the edge list. Construction and querying are separate phases:
/// once built (or loaded) the graph is treated as read-only.
#[derive(Debug)]
pub struct RelationGraph {
    words: Vec<String>,
    index: HashMap<String, NodeId>,
    successors: Vec<Vec<NodeId>>,
    predecessors: Vec<Vec<NodeId>>,
    edges: Vec<(NodeId, NodeId)>,
    edge_set: HashSet<(NodeId, NodeId)>,
}

/// Basic graph statistics
#[derive(Debug, Clone, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub avg_degree: f64,
}

/// Capped outgoing/incoming neighbor lists for a single word.
#[derive(Debug, Clone, Serialize)]
pub struct Connections {
    pub outgoing: Vec<String>,
    pub incoming: Vec<String>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self {
            words: Vec::new(),
            index: HashMap::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            edges: Vec::new(),
            edge_set: HashSet::new(),
        }
    }

    /// Insert a word as a node, returning its id. Idempotent.
    pub fn add_node(&mut self, word: &str) -> NodeId {
        if let Some(&id) = self.index.get(word) {
            return id;
        }
        let id = self.words.len();
        self.words.push(word.to_string());
        self.index.insert(word.to_string(), id);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        id
    }

    /// Insert a directed edge between two existing nodes.
    ///
    /// Returns true if the edge was inserted. Self-loops, duplicate
    /// edges, and edges with an unknown endpoint insert nothing — the
    /// last case is how out-of-vocabulary tokens are dropped rather
    /// than stored as dangling nodes.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let (from_id, to_id) = match (self.index.get(from), self.index.get(to)) {
            (Some(&f), Some(&t)) => (f, t),
            _ => return false,
        };
        if from_id == to_id {
            return false;
        }
        if !self.edge_set.insert((from_id, to_id)) {
            return false;
        }
        self.successors[from_id].push(to_id);
        self.predecessors[to_id].push(from_id);
        self.edges.push((from_id, to_id));
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn node_id(&self, word: &str) -> Option<NodeId> {
        self.index.get(word).copied()
    }

    pub fn word(&self, id: NodeId) -> &str {
        &self.words[id]
    }

    /// Outgoing neighbors of a node in edge insertion order.
    pub fn successors(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id]
    }

    /// Incoming neighbors of a node in edge insertion order.
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id]
    }

    pub fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_set.contains(&(from, to))
    }

    pub fn node_count(&self) -> usize {
        self.words.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words in node insertion order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| w.as_str())
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.edges.iter().copied()
    }

    pub fn stats(&self) -> GraphStats {
        let nodes = self.node_count();
        let edges = self.edge_count();
        // Degree counts each edge at both endpoints
        let avg_degree = if nodes == 0 {
            0.0
        } else {
            (edges * 2) as f64 / nodes as f64
        };
        GraphStats {
            nodes,
            edges,
            avg_degree,
        }
    }

    /// Up to `limit` outgoing and incoming neighbors of a word.
    /// None when the word is not a node.
    pub fn connections(&self, word: &str, limit: usize) -> Option<Connections> {
        let id = self.node_id(word)?;
        let collect = |ids: &[NodeId]| {
            ids.iter()
                .take(limit)
                .map(|&n| self.words[n].clone())
                .collect()
        };
        Some(Connections {
            outgoing: collect(&self.successors[id]),
            incoming: collect(&self.predecessors[id]),
        })
    }
}

impl Default for RelationGraph {
    fn default() -> Self {
        Self::new()
    }
}
