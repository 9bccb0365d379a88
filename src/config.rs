use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub lexigraph: LexigraphConfig,
    #[serde(default)]
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Core paths and logging
#[derive(Debug, Clone, Deserialize)]
pub struct LexigraphConfig {
    /// Path to the source dictionary JSON (word -> definition).
    pub dictionary_file: PathBuf,
    /// Path to the SQLite database holding processed entries and the graph.
    pub db_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Visualization request defaults and host-side clamps
#[derive(Debug, Clone, Deserialize)]
pub struct VisualizationConfig {
    #[serde(default = "default_max_nodes")]
    pub default_max_nodes: usize,
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    #[serde(default = "default_neighbor_limit")]
    pub default_neighbor_limit: usize,
    /// Upper bound applied to requested max_nodes before extraction.
    #[serde(default = "default_max_max_nodes")]
    pub max_max_nodes: usize,
    /// Upper bound applied to requested depth before extraction.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Upper bound applied to requested neighbor_limit before extraction.
    #[serde(default = "default_max_neighbor_limit")]
    pub max_neighbor_limit: usize,
    /// Capacity of the projected-payload LRU cache (0 disables caching).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            default_max_nodes: default_max_nodes(),
            default_depth: default_depth(),
            default_neighbor_limit: default_neighbor_limit(),
            max_max_nodes: default_max_max_nodes(),
            max_depth: default_max_depth(),
            max_neighbor_limit: default_max_neighbor_limit(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            port: default_http_port(),
            allowed_origins: vec![],
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_nodes() -> usize {
    50
}

fn default_depth() -> usize {
    2
}

fn default_neighbor_limit() -> usize {
    5
}

fn default_max_max_nodes() -> usize {
    100
}

fn default_max_depth() -> usize {
    3
}

fn default_max_neighbor_limit() -> usize {
    10
}

fn default_cache_capacity() -> usize {
    64
}

fn default_http_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LEXIGRAPH_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors - file is optional)
        let _ = dotenv::dotenv();

        let config_path = std::env::var("LEXIGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.visualization.default_max_nodes == 0 {
            anyhow::bail!("visualization.default_max_nodes must be greater than 0");
        }

        if self.visualization.default_max_nodes > self.visualization.max_max_nodes {
            anyhow::bail!(
                "visualization.default_max_nodes ({}) exceeds max_max_nodes ({})",
                self.visualization.default_max_nodes,
                self.visualization.max_max_nodes
            );
        }

        if self.visualization.default_depth > self.visualization.max_depth {
            anyhow::bail!(
                "visualization.default_depth ({}) exceeds max_depth ({})",
                self.visualization.default_depth,
                self.visualization.max_depth
            );
        }

        if self.visualization.default_neighbor_limit > self.visualization.max_neighbor_limit {
            anyhow::bail!(
                "visualization.default_neighbor_limit ({}) exceeds max_neighbor_limit ({})",
                self.visualization.default_neighbor_limit,
                self.visualization.max_neighbor_limit
            );
        }

        // Unbounded depth x fanout expansion would let one request pull in the
        // whole graph; keep the clamps themselves sane.
        if self.visualization.max_depth > 10 {
            anyhow::bail!("visualization.max_depth must be at most 10");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.lexigraph.db_path
    }

    /// Get the source dictionary path
    pub fn dictionary_file(&self) -> &Path {
        &self.lexigraph.dictionary_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(temp_dir: &TempDir, body: &str) -> PathBuf {
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, body).unwrap();
        config_path
    }

    fn with_config_env(config_path: &Path, f: impl FnOnce()) {
        let original = std::env::var("LEXIGRAPH_CONFIG").ok();
        std::env::set_var("LEXIGRAPH_CONFIG", config_path.to_str().unwrap());
        f();
        std::env::remove_var("LEXIGRAPH_CONFIG");
        if let Some(val) = original {
            std::env::set_var("LEXIGRAPH_CONFIG", val);
        }
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[lexigraph]
dictionary_file = "./data/dictionary.json"
db_path = "./data/lexigraph.db"
log_level = "debug"

[visualization]
default_max_nodes = 40
default_depth = 2
default_neighbor_limit = 5

[http_server]
port = 9090
"#,
        );
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
            let config = config.unwrap();
            assert_eq!(config.lexigraph.log_level, "debug");
            assert_eq!(config.visualization.default_max_nodes, 40);
            assert_eq!(config.visualization.max_depth, 3);
            assert_eq!(config.http_server.port, 9090);
        });
    }

    #[test]
    fn test_config_defaults_applied() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[lexigraph]
dictionary_file = "./dictionary.json"
db_path = "./lexigraph.db"
"#,
        );
        with_config_env(&config_path, || {
            let config = Config::load().unwrap();
            assert_eq!(config.lexigraph.log_level, "info");
            assert_eq!(config.visualization.default_max_nodes, 50);
            assert_eq!(config.visualization.default_depth, 2);
            assert_eq!(config.visualization.default_neighbor_limit, 5);
            assert_eq!(config.visualization.max_max_nodes, 100);
            assert_eq!(config.http_server.port, 8080);
            assert!(config.http_server.allowed_origins.is_empty());
        });
    }

    #[test]
    fn test_config_rejects_default_over_clamp() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[lexigraph]
dictionary_file = "./dictionary.json"
db_path = "./lexigraph.db"

[visualization]
default_depth = 5
max_depth = 3
"#,
        );
        with_config_env(&config_path, || {
            let config = Config::load();
            assert!(config.is_err());
            assert!(config.unwrap_err().to_string().contains("default_depth"));
        });
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("LEXIGRAPH_CONFIG").ok();
        std::env::set_var("LEXIGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("LEXIGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("LEXIGRAPH_CONFIG", v);
        }
    }
}
