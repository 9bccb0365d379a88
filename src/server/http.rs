use crate::cache::{VizCache, VizCacheKey};
use crate::config::{Config, VisualizationConfig};
use crate::db::Db;
use crate::error::{LexigraphError, Result};
use crate::graph::{extract_neighborhood, Directions, RelationGraph};
use crate::viz::{project, NullProgress, ProgressSink, VizPayload};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .is_ok()
}

/// A single progress update relayed to the client over SSE.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub progress: u8,
    pub message: String,
}

/// Progress sink backed by an SSE relay channel.
struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

/// Removes a word's relay sender from the map when its SSE stream is
/// dropped, so a client that disconnects without ever posting a
/// visualization request does not leave a permanent entry behind.
///
/// The entry is only removed if it still holds this registration's
/// sender; a newer stream for the same word keeps its own entry.
struct ProgressRegistration {
    word: String,
    tx: mpsc::UnboundedSender<ProgressEvent>,
    progress: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<ProgressEvent>>>>,
}

impl Drop for ProgressRegistration {
    fn drop(&mut self) {
        let mut map = self.progress.lock().unwrap();
        if map
            .get(&self.word)
            .map_or(false, |current| current.same_channel(&self.tx))
        {
            map.remove(&self.word);
        }
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, percent: u8, message: &str) {
        // Receiver may have disconnected; progress is best-effort
        let _ = self.tx.send(ProgressEvent {
            progress: percent,
            message: message.to_string(),
        });
    }
}

/// Visualization HTTP server
///
/// Holds the relation graph loaded once at startup. The graph is
/// read-only for the server's lifetime; reloading means restarting.
pub struct VizServer {
    state: AppState,
    allowed_origins: Vec<String>,
}

impl VizServer {
    pub fn new(graph: RelationGraph, db: Db, config: &Config) -> Self {
        let cache = if config.visualization.cache_capacity > 0 {
            Some(Arc::new(VizCache::new(config.visualization.cache_capacity)))
        } else {
            None
        };

        Self {
            state: AppState {
                graph: Arc::new(graph),
                db: Arc::new(db),
                cache,
                viz: config.visualization.clone(),
                progress: Arc::new(Mutex::new(HashMap::new())),
            },
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server
    pub async fn run(&self, port: u16) -> Result<()> {
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting lexigraph HTTP server on http://{}", addr);
        log::info!(
            "Serving graph with {} nodes and {} edges",
            self.state.graph.node_count(),
            self.state.graph.edge_count()
        );

        if !check_port_available(port).await {
            return Err(LexigraphError::Config(format!(
                "Port {} is already in use. Stop the other process or set http_server.port in config.toml",
                port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(LexigraphError::Io)?;

        axum::serve(listener, app).await.map_err(|e| {
            LexigraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    fn create_router(&self) -> Router {
        // Restrict CORS to configured origins; empty config means local
        // dev, which gets Any.
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/visualize", post(handle_visualize))
            .route("/progress/:word", get(handle_progress))
            .route("/connections/:word", get(handle_connections))
            .route("/health", get(handle_health))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
            .with_state(self.state.clone())
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    graph: Arc<RelationGraph>,
    db: Arc<Db>,
    cache: Option<Arc<VizCache>>,
    viz: VisualizationConfig,
    // Progress relay: word -> sender feeding that word's SSE stream
    progress: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<ProgressEvent>>>>,
}

/// Visualization request body
#[derive(Debug, Deserialize)]
struct VisualizeRequest {
    word: String,
    max_nodes: Option<usize>,
    depth: Option<usize>,
    neighbor_limit: Option<usize>,
    #[serde(default)]
    directions: Directions,
}

/// Effective visualization parameters after defaults and clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EffectiveParams {
    max_nodes: usize,
    depth: usize,
    neighbor_limit: usize,
}

/// Resolve request parameters against the configured defaults and caps.
/// Omitted values take the defaults; values above a configured maximum
/// are clamped down to it.
fn clamp_params(request: &VisualizeRequest, viz: &VisualizationConfig) -> EffectiveParams {
    EffectiveParams {
        max_nodes: request
            .max_nodes
            .unwrap_or(viz.default_max_nodes)
            .min(viz.max_max_nodes),
        depth: request
            .depth
            .unwrap_or(viz.default_depth)
            .min(viz.max_depth),
        neighbor_limit: request
            .neighbor_limit
            .unwrap_or(viz.default_neighbor_limit)
            .min(viz.max_neighbor_limit),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn valid_word(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Handle POST /visualize
///
/// Validates and clamps parameters (the core itself never sees
/// out-of-range values), then extracts and projects the neighborhood
/// on the blocking pool, relaying progress to any SSE stream open for
/// the word. The progress sender is dropped when the request finishes
/// so the stream terminates after the 100 event.
async fn handle_visualize(
    State(state): State<AppState>,
    Json(request): Json<VisualizeRequest>,
) -> Response {
    let word = request.word.trim().to_lowercase();
    if !valid_word(&word) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid word provided");
    }

    // Clamp to configured upper bounds before any traversal
    let EffectiveParams {
        max_nodes,
        depth,
        neighbor_limit,
    } = clamp_params(&request, &state.viz);
    let directions = request.directions;

    let started = Instant::now();

    let sender = state.progress.lock().unwrap().get(&word).cloned();
    let sink: Box<dyn ProgressSink + Send + Sync> = match sender {
        Some(tx) => Box::new(ChannelProgress { tx }),
        None => Box::new(NullProgress),
    };

    sink.emit(5, "Loading graph data...");

    let cache_key = VizCacheKey::new(&word, depth, neighbor_limit, max_nodes, &directions);
    if let Some(cache) = &state.cache {
        if let Some(payload) = cache.get(&cache_key) {
            log::debug!("Visualization cache hit for '{}'", word);
            sink.emit(100, "Visualization data ready!");
            state.progress.lock().unwrap().remove(&word);
            return (
                StatusCode::OK,
                Json(serde_json::json!({ "graph_data": &*payload })),
            )
                .into_response();
        }
    }

    let graph = Arc::clone(&state.graph);
    let blocking_word = word.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<VizPayload> {
        let neighborhood =
            extract_neighborhood(&graph, &blocking_word, depth, neighbor_limit, &directions)?;
        Ok(project(&graph, &neighborhood, max_nodes, &directions, sink.as_ref()))
    })
    .await;

    // Drop the relay sender regardless of outcome so the SSE stream ends
    state.progress.lock().unwrap().remove(&word);

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            log::error!("Visualization task failed for '{}': {}", word, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    match result {
        Ok(payload) => {
            let payload = Arc::new(payload);
            let latency_ms = started.elapsed().as_millis() as i64;

            log_request(
                &state,
                &word,
                depth,
                neighbor_limit,
                max_nodes,
                &payload,
                latency_ms,
            )
            .await;

            if let Some(cache) = &state.cache {
                cache.put(cache_key, Arc::clone(&payload));
            }

            log::info!(
                "Visualization for '{}': {} nodes, {} edges in {}ms",
                word,
                payload.nodes.len(),
                payload.edges.len(),
                latency_ms
            );

            (
                StatusCode::OK,
                Json(serde_json::json!({ "graph_data": &*payload })),
            )
                .into_response()
        }
        Err(LexigraphError::WordNotFound(_)) => {
            log::info!("Visualization request for unknown word '{}'", word);
            error_response(StatusCode::NOT_FOUND, "Word not found in graph")
        }
        Err(LexigraphError::InvalidInput(msg)) => {
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
        Err(e) => {
            log::error!("Visualization error for word '{}': {}", word, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// Record the request in request_logs; failures are logged, not surfaced.
async fn log_request(
    state: &AppState,
    word: &str,
    depth: usize,
    neighbor_limit: usize,
    max_nodes: usize,
    payload: &VizPayload,
    latency_ms: i64,
) {
    let request_id = Uuid::new_v4().to_string();
    let word = word.to_string();
    let node_count = payload.nodes.len() as i64;
    let edge_count = payload.edges.len() as i64;
    let outcome = state
        .db
        .with_connection(move |conn| {
            conn.execute(
                "INSERT INTO request_logs \
                 (request_id, word, depth, neighbor_limit, max_nodes, node_count, edge_count, latency_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    request_id,
                    word,
                    depth as i64,
                    neighbor_limit as i64,
                    max_nodes as i64,
                    node_count,
                    edge_count,
                    latency_ms
                ],
            )?;
            Ok(())
        })
        .await;
    if let Err(e) = outcome {
        log::warn!("Failed to log visualization request: {}", e);
    }
}

/// Handle GET /progress/{word}
///
/// Opens an SSE stream that relays progress events for a subsequent
/// POST /visualize of the same word. The stream ends once the server
/// drops the sender after the terminal 100 event.
async fn handle_progress(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> std::result::Result<Sse<impl futures_util::Stream<Item = std::result::Result<Event, Infallible>>>, Response>
{
    let word = word.trim().to_lowercase();
    if !valid_word(&word) {
        return Err(error_response(StatusCode::BAD_REQUEST, "Invalid word format"));
    }

    let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
    state.progress.lock().unwrap().insert(word.clone(), tx.clone());
    let registration = ProgressRegistration {
        word,
        tx,
        progress: Arc::clone(&state.progress),
    };

    // The stream owns the registration: a client disconnect drops the
    // stream, which unregisters the sender instead of leaking it.
    let stream = tokio_stream::wrappers::UnboundedReceiverStream::new(rx).map(move |event| {
        let _ = &registration;
        let data = serde_json::to_string(&event).unwrap_or_default();
        std::result::Result::<Event, Infallible>::Ok(Event::default().data(data))
    });

    let keepalive = KeepAlive::new()
        .interval(std::time::Duration::from_secs(15))
        .text("ping");

    Ok(Sse::new(stream).keep_alive(keepalive))
}

#[derive(Debug, Deserialize)]
struct ConnectionsQuery {
    limit: Option<usize>,
}

/// Handle GET /connections/{word}
///
/// Flat outgoing/incoming neighbor lists for a single word, without a
/// full neighborhood extraction.
async fn handle_connections(
    State(state): State<AppState>,
    Path(word): Path<String>,
    axum::extract::Query(query): axum::extract::Query<ConnectionsQuery>,
) -> Response {
    let word = word.trim().to_lowercase();
    if !valid_word(&word) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid word provided");
    }

    let limit = query.limit.unwrap_or(10).min(state.viz.max_max_nodes);
    match state.graph.connections(&word, limit) {
        Some(connections) => (StatusCode::OK, Json(serde_json::json!(connections))).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Word not found in graph"),
    }
}

/// Handle health check endpoint
async fn handle_health(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "lexigraph",
            "version": env!("CARGO_PKG_VERSION"),
            "graph_nodes": state.graph.node_count(),
            "graph_edges": state.graph.edge_count(),
        })),
    )
        .into_response()
}
