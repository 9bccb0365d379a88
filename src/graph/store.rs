//! Durable graph snapshots.
//!
//! Nodes and edges are written with explicit ordinals so a loaded
//! graph reproduces the construction order of the saved one — the
//! extraction and projection orderings depend on it.

use rusqlite::params;

use crate::db::Db;
use crate::error::{LexigraphError, Result};
use crate::graph::RelationGraph;

/// Save a graph snapshot, replacing any previous one in a single
/// transaction.
pub async fn save_graph(db: &Db, graph: &RelationGraph) -> Result<()> {
    let nodes: Vec<String> = graph.words().map(|w| w.to_string()).collect();
    let edges: Vec<(String, String)> = graph
        .edges()
        .map(|(f, t)| (graph.word(f).to_string(), graph.word(t).to_string()))
        .collect();

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM graph_edges", [])?;
        tx.execute("DELETE FROM graph_nodes", [])?;

        {
            let mut stmt =
                tx.prepare("INSERT INTO graph_nodes (ordinal, word) VALUES (?1, ?2)")?;
            for (ordinal, word) in nodes.iter().enumerate() {
                stmt.execute(params![ordinal as i64, word])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO graph_edges (ordinal, source, target) VALUES (?1, ?2, ?3)",
            )?;
            for (ordinal, (source, target)) in edges.iter().enumerate() {
                stmt.execute(params![ordinal as i64, source, target])?;
            }
        }

        tx.commit()?;

        log::info!(
            "Graph saved: {} nodes, {} edges",
            nodes.len(),
            edges.len()
        );
        Ok(())
    })
    .await
}

/// Load the persisted graph snapshot.
///
/// Fails with a Config error when no snapshot exists (run `build`
/// first).
pub async fn load_graph(db: &Db) -> Result<RelationGraph> {
    let (nodes, edges) = db
        .with_connection(|conn| {
            let mut stmt =
                conn.prepare("SELECT word FROM graph_nodes ORDER BY ordinal")?;
            let nodes: Vec<String> = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
                .map_err(LexigraphError::Database)?;

            let mut stmt = conn
                .prepare("SELECT source, target FROM graph_edges ORDER BY ordinal")?;
            let edges: Vec<(String, String)> = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
                .map_err(LexigraphError::Database)?;

            Ok((nodes, edges))
        })
        .await?;

    if nodes.is_empty() {
        return Err(LexigraphError::Config(
            "No graph snapshot found; run the build command first".to_string(),
        ));
    }

    let mut graph = RelationGraph::new();
    for word in &nodes {
        graph.add_node(word);
    }
    for (source, target) in &edges {
        graph.add_edge(source, target);
    }

    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}
