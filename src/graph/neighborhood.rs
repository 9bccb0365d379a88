//! Bounded neighborhood extraction: depth-limited, per-node
//! fanout-capped breadth-first expansion plus the induced subgraph.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{LexigraphError, Result};
use crate::graph::{NodeId, RelationGraph};

/// Which edge directions an expansion follows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Directions {
    #[serde(default = "default_true")]
    pub outgoing: bool,
    #[serde(default = "default_true")]
    pub incoming: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Directions {
    fn default() -> Self {
        Self {
            outgoing: true,
            incoming: true,
        }
    }
}

/// An induced subgraph around a root word.
///
/// `nodes` is in admission order: root first, then closer layers before
/// farther ones. `edges` holds every graph edge with both endpoints in
/// `nodes`, not only the edges the traversal walked. Created fresh per
/// request and never mutated afterwards.
#[derive(Debug)]
pub struct Neighborhood {
    pub root: NodeId,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
}

impl Neighborhood {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Extract the bounded neighborhood of `root`.
///
/// Runs exactly `depth` expansion layers (stopping early if a frontier
/// empties). Each frontier node contributes at most `fanout` successors
/// and at most `fanout` predecessors, truncated independently in the
/// graph's adjacency (construction) order before the visited check, so
/// a hub node can never pull in more than `fanout` new candidates per
/// direction. `fanout = 0` or `depth = 0` yields just the root.
///
/// There is no overall node ceiling here; the visualization layer
/// truncates on top of this so the traversal's termination stays a
/// function of depth, fanout, and graph shape alone.
pub fn extract_neighborhood(
    graph: &RelationGraph,
    root: &str,
    depth: usize,
    fanout: usize,
    directions: &Directions,
) -> Result<Neighborhood> {
    if root.is_empty() {
        return Err(LexigraphError::InvalidInput(
            "root word must not be empty".to_string(),
        ));
    }

    let root_id = graph
        .node_id(root)
        .ok_or_else(|| LexigraphError::WordNotFound(root.to_string()))?;

    let mut included: Vec<NodeId> = vec![root_id];
    let mut visited: HashSet<NodeId> = HashSet::from([root_id]);
    let mut frontier: Vec<NodeId> = vec![root_id];

    for _ in 0..depth {
        let mut next: Vec<NodeId> = Vec::new();
        for &node in &frontier {
            if directions.outgoing {
                admit(graph.successors(node), fanout, &mut visited, &mut included, &mut next);
            }
            if directions.incoming {
                admit(graph.predecessors(node), fanout, &mut visited, &mut included, &mut next);
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    // Induced edge set: every original edge between included nodes,
    // iterated in node admission order then adjacency order.
    let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
    for &node in &included {
        for &succ in graph.successors(node) {
            if visited.contains(&succ) {
                edges.push((node, succ));
            }
        }
    }

    Ok(Neighborhood {
        root: root_id,
        nodes: included,
        edges,
    })
}

/// Admit up to `fanout` candidates from one adjacency list.
///
/// The adjacency list is truncated first, then filtered through the
/// visited set: the fanout bound counts adjacency positions, so it is
/// exact per node and direction.
fn admit(
    candidates: &[NodeId],
    fanout: usize,
    visited: &mut HashSet<NodeId>,
    included: &mut Vec<NodeId>,
    next: &mut Vec<NodeId>,
) {
    for &nb in candidates.iter().take(fanout) {
        if visited.insert(nb) {
            included.push(nb);
            next.push(nb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::preprocess::ProcessedEntry;

    fn entry(word: &str, tokens: &[&str]) -> ProcessedEntry {
        ProcessedEntry {
            word: word.to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn sample_graph() -> RelationGraph {
        // cat -> feline, cat -> animal, feline -> cat
        build_graph(&[
            entry("cat", &["feline", "animal"]),
            entry("feline", &["cat"]),
            entry("animal", &["organism"]),
        ])
    }

    fn words(graph: &RelationGraph, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| graph.word(id).to_string()).collect()
    }

    #[test]
    fn test_extract_depth_one_both_directions() {
        let graph = sample_graph();
        let nb =
            extract_neighborhood(&graph, "cat", 1, 5, &Directions::default()).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["cat", "feline", "animal"]);
        // Induced subgraph carries all three edges, including feline -> cat
        assert_eq!(nb.edge_count(), 3);
    }

    #[test]
    fn test_extract_root_not_found() {
        let graph = sample_graph();
        let err = extract_neighborhood(&graph, "missing", 2, 5, &Directions::default())
            .unwrap_err();
        assert!(matches!(err, LexigraphError::WordNotFound(_)));
    }

    #[test]
    fn test_extract_empty_root_rejected() {
        let graph = sample_graph();
        let err =
            extract_neighborhood(&graph, "", 2, 5, &Directions::default()).unwrap_err();
        assert!(matches!(err, LexigraphError::InvalidInput(_)));
    }

    #[test]
    fn test_extract_depth_zero_is_root_only() {
        let graph = sample_graph();
        let nb =
            extract_neighborhood(&graph, "cat", 0, 5, &Directions::default()).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["cat"]);
        assert!(nb.edges.is_empty());
    }

    #[test]
    fn test_extract_fanout_zero_is_root_only() {
        let graph = sample_graph();
        let nb =
            extract_neighborhood(&graph, "cat", 3, 0, &Directions::default()).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["cat"]);
        assert!(nb.edges.is_empty());
    }

    #[test]
    fn test_extract_fanout_truncates_in_adjacency_order() {
        // cat's successors are [feline, animal] in construction order;
        // fanout 1 admits only feline
        let graph = sample_graph();
        let directions = Directions {
            outgoing: true,
            incoming: false,
        };
        let nb = extract_neighborhood(&graph, "cat", 1, 1, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["cat", "feline"]);
    }

    #[test]
    fn test_extract_outgoing_only() {
        let graph = build_graph(&[
            entry("a", &[]),
            entry("b", &["a"]),
            entry("c", &["a"]),
        ]);
        let directions = Directions {
            outgoing: true,
            incoming: false,
        };
        // a has no successors; b and c are only reachable via incoming edges
        let nb = extract_neighborhood(&graph, "a", 2, 5, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["a"]);

        let directions = Directions {
            outgoing: false,
            incoming: true,
        };
        let nb = extract_neighborhood(&graph, "a", 1, 5, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extract_depth_bound() {
        // chain a -> b -> c -> d
        let graph = build_graph(&[
            entry("a", &["b"]),
            entry("b", &["c"]),
            entry("c", &["d"]),
            entry("d", &[]),
        ]);
        let directions = Directions {
            outgoing: true,
            incoming: false,
        };
        let nb = extract_neighborhood(&graph, "a", 2, 5, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["a", "b", "c"]);
        let nb = extract_neighborhood(&graph, "a", 3, 5, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_extract_cycle_terminates() {
        let graph = build_graph(&[
            entry("a", &["b"]),
            entry("b", &["c"]),
            entry("c", &["a"]),
        ]);
        let nb =
            extract_neighborhood(&graph, "a", 10, 5, &Directions::default()).unwrap();
        assert_eq!(nb.node_count(), 3);
        assert_eq!(nb.edge_count(), 3);
    }

    #[test]
    fn test_extract_induced_edges_beyond_walked() {
        // a -> b, a -> c, b -> c. Walking from a at depth 1 reaches b and
        // c directly; the induced subgraph must still contain b -> c.
        let graph = build_graph(&[
            entry("a", &["b", "c"]),
            entry("b", &["c"]),
            entry("c", &[]),
        ]);
        let nb =
            extract_neighborhood(&graph, "a", 1, 5, &Directions::default()).unwrap();
        let edge_words: Vec<(String, String)> = nb
            .edges
            .iter()
            .map(|&(f, t)| (graph.word(f).to_string(), graph.word(t).to_string()))
            .collect();
        assert!(edge_words.contains(&("b".to_string(), "c".to_string())));
        assert_eq!(nb.edge_count(), 3);
    }

    #[test]
    fn test_extract_fanout_bound_per_layer() {
        // hub with 4 successors, fanout 2: exactly 2 admitted
        let graph = build_graph(&[
            entry("hub", &["n1", "n2", "n3", "n4"]),
            entry("n1", &[]),
            entry("n2", &[]),
            entry("n3", &[]),
            entry("n4", &[]),
        ]);
        let directions = Directions {
            outgoing: true,
            incoming: false,
        };
        let nb = extract_neighborhood(&graph, "hub", 1, 2, &directions).unwrap();
        assert_eq!(words(&graph, &nb.nodes), vec!["hub", "n1", "n2"]);
    }

    #[test]
    fn test_extract_early_stop_on_empty_frontier() {
        let graph = build_graph(&[entry("lone", &[])]);
        let nb =
            extract_neighborhood(&graph, "lone", 100, 5, &Directions::default()).unwrap();
        assert_eq!(nb.node_count(), 1);
    }
}
