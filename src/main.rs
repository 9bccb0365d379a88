use anyhow::Result;
use clap::{Parser, Subcommand};
use lexigraph::db::{migrate, Db};
use lexigraph::graph::{build_graph, load_graph, save_graph};
use lexigraph::preprocess::{load_entries, process_dictionary, save_entries, DefaultTokenizer};
use lexigraph::server::VizServer;
use lexigraph::Config;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "lexigraph")]
#[command(about = "Dictionary relation graph builder and visualization server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tokenize the dictionary definitions and store the processed entries
    Process,
    /// Build the relation graph from processed entries and save a snapshot
    Build,
    /// Serve the visualization HTTP API
    Serve,
    /// Print graph and request statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"))
        .init();

    let cli = Cli::parse();

    let config = Config::load()?;
    log::info!("Configuration loaded successfully");

    let db = Db::new(config.db_path());
    let migrations_dir = Path::new("migrations");
    db.with_connection({
        let migrations_dir = migrations_dir.to_path_buf();
        move |conn| migrate::run_migrations(conn, &migrations_dir)
    })
    .await?;

    match cli.command {
        Command::Process => run_process(&config, &db).await?,
        Command::Build => run_build(&db).await?,
        Command::Serve => run_serve(config, db).await?,
        Command::Stats => run_stats(&db).await?,
    }

    Ok(())
}

/// Tokenize the dictionary and persist the processed entries
async fn run_process(config: &Config, db: &Db) -> Result<()> {
    log::info!("Processing dictionary {}", config.dictionary_file().display());

    let tokenizer = DefaultTokenizer::new();
    let entries = process_dictionary(config.dictionary_file(), &tokenizer)?;
    let count = save_entries(db, entries).await?;

    println!("Processed {} dictionary entries.", count);
    Ok(())
}

/// Build the graph from processed entries and save a snapshot
async fn run_build(db: &Db) -> Result<()> {
    let entries = load_entries(db).await?;
    if entries.is_empty() {
        anyhow::bail!("No processed entries found; run the process command first");
    }

    log::info!("Constructing graph from {} entries", entries.len());
    let graph = build_graph(&entries);
    save_graph(db, &graph).await?;

    let stats = graph.stats();
    println!("\n=== Graph Statistics ===");
    println!("Nodes: {}", stats.nodes);
    println!("Edges: {}", stats.edges);
    println!("Average Degree: {:.2}", stats.avg_degree);
    Ok(())
}

/// Load the persisted graph and run the HTTP server
async fn run_serve(config: Config, db: Db) -> Result<()> {
    log::info!("Starting lexigraph v{}", env!("CARGO_PKG_VERSION"));

    let graph = load_graph(&db).await?;
    let port = config.http_server.port;
    let server = VizServer::new(graph, db, &config);
    server.run(port).await?;

    Ok(())
}

/// Print graph table counts and request-log statistics for the last 24 hours
async fn run_stats(db: &Db) -> Result<()> {
    let (nodes, edges, requests) = db
        .with_connection(|conn| {
            let nodes: i64 =
                conn.query_row("SELECT COUNT(*) FROM graph_nodes", [], |row| row.get(0))?;
            let edges: i64 =
                conn.query_row("SELECT COUNT(*) FROM graph_edges", [], |row| row.get(0))?;

            let mut stmt = conn.prepare(
                "SELECT COUNT(*), AVG(latency_ms), MIN(latency_ms), MAX(latency_ms), \
                        AVG(node_count) \
                 FROM request_logs \
                 WHERE timestamp > datetime('now', '-24 hours')",
            )?;
            let requests = stmt.query_row([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<f64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            })?;

            Ok((nodes, edges, requests))
        })
        .await?;

    println!("\n=== Lexigraph Statistics ===\n");
    println!("Graph nodes: {}", nodes);
    println!("Graph edges: {}", edges);

    let (count, avg_latency, min_latency, max_latency, avg_nodes) = requests;
    println!("\nVisualization requests (last 24h): {}", count);
    if count > 0 {
        println!(
            "  Latency ms: avg {:.1}, min {}, max {}",
            avg_latency.unwrap_or(0.0),
            min_latency.unwrap_or(0),
            max_latency.unwrap_or(0)
        );
        println!("  Avg nodes returned: {:.1}", avg_nodes.unwrap_or(0.0));
    }

    Ok(())
}
