//! Projection of an extracted neighborhood into a display payload.

use std::collections::HashSet;

use crate::graph::{Directions, Neighborhood, NodeId, RelationGraph};
use crate::viz::{
    display_options, EdgeSmoothing, NodeRole, ProgressSink, VizEdge, VizNode, VizPayload,
};

/// Project a neighborhood into a presentation payload.
///
/// When the neighborhood exceeds `max_nodes`, nodes are kept in
/// extraction order (root first, closer layers first) until the cap is
/// reached; edges referencing dropped nodes are dropped with them.
/// The cap is floored at one node, so `max_nodes = 0` still yields a
/// payload containing the root.
/// Roles are assigned against the full graph's adjacency of the root,
/// so a retained node that really is a direct neighbor is marked as
/// one even if the traversal reached it another way.
///
/// Progress runs 30 -> 95 across node and edge emission and terminates
/// with exactly one 100 event. The projector only reads; the payload
/// owns all of its data.
pub fn project(
    graph: &RelationGraph,
    neighborhood: &Neighborhood,
    max_nodes: usize,
    directions: &Directions,
    sink: &dyn ProgressSink,
) -> VizPayload {
    sink.emit(30, "Processing graph data...");

    let root = neighborhood.root;
    let cap = max_nodes.max(1);
    let retained: &[NodeId] = if neighborhood.nodes.len() > cap {
        &neighborhood.nodes[..cap]
    } else {
        &neighborhood.nodes
    };
    let retained_set: HashSet<NodeId> = retained.iter().copied().collect();

    // Direct neighbors of the root in the enabled directions, looked up
    // against the full graph.
    let mut direct: HashSet<NodeId> = HashSet::new();
    if directions.outgoing {
        direct.extend(graph.successors(root).iter().copied());
    }
    if directions.incoming {
        direct.extend(graph.predecessors(root).iter().copied());
    }

    let node_count = retained.len();
    let node_step = (node_count / 10).max(1);
    let mut nodes = Vec::with_capacity(node_count);
    for (i, &id) in retained.iter().enumerate() {
        let role = if id == root {
            NodeRole::Target
        } else if direct.contains(&id) {
            NodeRole::Neighbor
        } else {
            NodeRole::Default
        };
        let word = graph.word(id);
        nodes.push(VizNode {
            id: word.to_string(),
            label: word.to_string(),
            role,
            size: role.size(),
            color: role.color(),
            title: format!("Word: {}", word),
        });

        if i % node_step == 0 {
            let percent = 30 + (i as f64 / node_count as f64 * 35.0) as u8;
            sink.emit(percent, &format!("Processing nodes ({}/{})...", i, node_count));
        }
    }

    let induced: Vec<(NodeId, NodeId)> = neighborhood
        .edges
        .iter()
        .copied()
        .filter(|(from, to)| retained_set.contains(from) && retained_set.contains(to))
        .collect();

    let edge_count = induced.len();
    let edge_step = (edge_count / 10).max(1);
    let mut edges = Vec::with_capacity(edge_count);
    for (i, (from, to)) in induced.into_iter().enumerate() {
        edges.push(VizEdge {
            from: graph.word(from).to_string(),
            to: graph.word(to).to_string(),
            arrows: "to",
            smooth: EdgeSmoothing::default(),
        });

        if i % edge_step == 0 {
            let percent = 65 + (i as f64 / edge_count as f64 * 30.0) as u8;
            sink.emit(percent, &format!("Processing edges ({}/{})...", i, edge_count));
        }
    }

    sink.emit(95, "Finalizing data...");

    let payload = VizPayload {
        nodes,
        edges,
        options: display_options(),
    };

    sink.emit(100, "Visualization data ready!");

    payload
}
