//! Graph construction from tokenized dictionary entries.

use crate::graph::RelationGraph;
use crate::preprocess::ProcessedEntry;

/// Build the relation graph from processed dictionary entries.
///
/// The vocabulary is the set of entry words; every vocabulary word
/// becomes a node even when none of its tokens match. An edge
/// `word -> token` is inserted iff the token is itself a vocabulary
/// word and differs from `word` — the sole edge-creation rule.
/// Entry order defines node and adjacency construction order, which
/// downstream extraction and projection rely on for determinism.
///
/// An empty slice yields an empty graph, not an error.
pub fn build_graph(entries: &[ProcessedEntry]) -> RelationGraph {
    let mut graph = RelationGraph::new();

    // Nodes first, so edge insertion can test vocabulary membership
    // through the graph itself.
    for entry in entries {
        graph.add_node(&entry.word);
    }

    let mut edge_count = 0usize;
    for entry in entries {
        for token in &entry.tokens {
            // add_edge drops out-of-vocabulary tokens, self-references,
            // and duplicates.
            if graph.add_edge(&entry.word, token) {
                edge_count += 1;
            }
        }
    }

    log::info!(
        "Graph constructed: {} nodes, {} relationships",
        graph.node_count(),
        edge_count
    );

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, tokens: &[&str]) -> ProcessedEntry {
        ProcessedEntry {
            word: word.to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_cat_feline_animal() {
        // "organism" is not a headword, so animal -> organism is dropped
        let entries = vec![
            entry("cat", &["feline", "animal"]),
            entry("feline", &["cat"]),
            entry("animal", &["organism"]),
        ];
        let graph = build_graph(&entries);

        let nodes: Vec<&str> = graph.words().collect();
        assert_eq!(nodes, vec!["cat", "feline", "animal"]);
        assert_eq!(graph.edge_count(), 3);

        let cat = graph.node_id("cat").unwrap();
        let feline = graph.node_id("feline").unwrap();
        let animal = graph.node_id("animal").unwrap();
        assert!(graph.has_edge(cat, feline));
        assert!(graph.has_edge(cat, animal));
        assert!(graph.has_edge(feline, cat));
        assert!(!graph.has_edge(animal, cat));
    }

    #[test]
    fn test_build_empty_mapping() {
        let graph = build_graph(&[]);
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_build_no_self_loops() {
        // A word defined in terms of itself gets no self-edge
        let entries = vec![entry("recursion", &["recursion", "loop"]), entry("loop", &[])];
        let graph = build_graph(&entries);
        assert_eq!(graph.edge_count(), 1);
        let recursion = graph.node_id("recursion").unwrap();
        assert!(!graph.has_edge(recursion, recursion));
    }

    #[test]
    fn test_build_isolated_nodes_kept() {
        let entries = vec![entry("apple", &["fruit"]), entry("zebra", &["stripe"])];
        let graph = build_graph(&entries);
        // No token is a headword: zero edges, but both nodes exist
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_build_duplicate_tokens_idempotent() {
        let entries = vec![entry("cat", &["feline", "feline"]), entry("feline", &[])];
        let graph = build_graph(&entries);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_build_edge_iff_token_is_headword() {
        let entries = vec![
            entry("a", &["b", "x", "c"]),
            entry("b", &[]),
            entry("c", &["a"]),
        ];
        let graph = build_graph(&entries);
        let a = graph.node_id("a").unwrap();
        let b = graph.node_id("b").unwrap();
        let c = graph.node_id("c").unwrap();
        assert!(graph.has_edge(a, b));
        assert!(graph.has_edge(a, c));
        assert!(graph.has_edge(c, a));
        assert_eq!(graph.edge_count(), 3);
    }
}
