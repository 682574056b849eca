// rust/feed-core/src/config.rs

//! Configuration for sample feeding.
//!
//! Configuration is parsed from TOML, overridden from `GRAPH_FEED_*`
//! environment variables, and validated before use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::dataset::DEFAULT_VAL_FRACTION;
use crate::error::{FeedError, Result};
use crate::graph::{EdgeType, GraphFeedConfig};

// Top-level feeding configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub storage: StorageConfig,
    pub split: SplitConfig,
    pub batch: BatchConfig,
    pub graph: GraphFeedConfig,
}

// Storage configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    // Base path that relative sample file paths are resolved against.
    pub base_path: PathBuf,
    // Buffer size in bytes for buffered reads.
    pub buffer_size: usize,
    // Whether to use memory-mapped I/O for large files.
    pub use_mmap: bool,
    // File size threshold (bytes) above which to use mmap.
    pub mmap_threshold: u64,
}

// Train/validation split options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    // Fraction of lines assigned to validation, in `(0, 1)`.
    pub val_fraction: f64,
}

// Batching options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    // Number of samples per batch.
    pub batch_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            buffer_size: 64 * 1024, // 64 KB
            use_mmap: false,
            mmap_threshold: 1024 * 1024, // 1 MB
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            val_fraction: DEFAULT_VAL_FRACTION,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

impl FromStr for FeedConfig {
    type Err = FeedError;

    // Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| FeedError::config_with_source("failed to parse TOML config", e))
    }
}

impl FeedConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read, parsed, or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FeedError::storage_with_source(path, "failed to read config file", e)
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `GRAPH_FEED_` and use
    // underscores to separate nested fields. For example:
    // - `GRAPH_FEED_STORAGE_BASE_PATH` overrides `storage.base_path`
    // - `GRAPH_FEED_SPLIT_VAL_FRACTION` overrides `split.val_fraction`
    // - `GRAPH_FEED_BATCH_SIZE` overrides `batch.batch_size`
    // - `GRAPH_FEED_GRAPH_EDGE_SET` overrides `graph.edge_set` (comma separated)
    // - `GRAPH_FEED_GRAPH_EDGE_KEYS` overrides `graph.edge_keys`
    //
    // Values that fail to parse are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        // Storage overrides
        if let Ok(val) = std::env::var("GRAPH_FEED_STORAGE_BASE_PATH") {
            self.storage.base_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_STORAGE_BUFFER_SIZE") {
            if let Ok(v) = val.parse() {
                self.storage.buffer_size = v;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_STORAGE_USE_MMAP") {
            if let Ok(v) = val.parse() {
                self.storage.use_mmap = v;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_STORAGE_MMAP_THRESHOLD") {
            if let Ok(v) = val.parse() {
                self.storage.mmap_threshold = v;
            }
        }

        // Split and batch overrides
        if let Ok(val) = std::env::var("GRAPH_FEED_SPLIT_VAL_FRACTION") {
            if let Ok(v) = val.parse() {
                self.split.val_fraction = v;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_BATCH_SIZE") {
            if let Ok(v) = val.parse() {
                self.batch.batch_size = v;
            }
        }

        // Graph overrides
        if let Ok(val) = std::env::var("GRAPH_FEED_GRAPH_EDGE_SET") {
            let parsed: std::result::Result<Vec<EdgeType>, _> = val
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::parse)
                .collect();
            if let Ok(edge_set) = parsed {
                self.graph.edge_set = edge_set;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_GRAPH_MAX_NODE_TYPE") {
            if let Ok(v) = val.parse() {
                self.graph.max_node_type = v;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_GRAPH_MAX_NODE_SUBTOKEN") {
            if let Ok(v) = val.parse() {
                self.graph.max_node_subtoken = v;
            }
        }
        if let Ok(val) = std::env::var("GRAPH_FEED_GRAPH_EDGE_KEYS") {
            if let Ok(v) = val.parse() {
                self.graph.edge_keys = v;
            }
        }

        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.buffer_size == 0 {
            return Err(FeedError::config(
                "storage.buffer_size must be greater than 0",
            ));
        }

        let val_fraction = self.split.val_fraction;
        if !(val_fraction > 0.0 && val_fraction < 1.0) {
            return Err(FeedError::config(format!(
                "split.val_fraction must be strictly between 0 and 1, got {val_fraction}"
            )));
        }

        if self.batch.batch_size == 0 {
            return Err(FeedError::config(
                "batch.batch_size must be greater than 0",
            ));
        }

        if self.graph.edge_set.is_empty() {
            return Err(FeedError::config("graph.edge_set must not be empty"));
        }
        self.graph
            .check()
            .map_err(|e| FeedError::config_with_source("graph.edge_set is invalid", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeKeyPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();

        assert_eq!(config.storage.base_path, PathBuf::from("."));
        assert_eq!(config.storage.buffer_size, 64 * 1024);
        assert!(!config.storage.use_mmap);
        assert_eq!(config.storage.mmap_threshold, 1024 * 1024);

        assert_eq!(config.split.val_fraction, 0.2);
        assert_eq!(config.batch.batch_size, 32);

        assert_eq!(config.graph.edge_set, EdgeType::ALL.to_vec());
        assert_eq!(config.graph.max_node_type, 255);
        assert_eq!(config.graph.max_node_subtoken, 65_535);
        assert_eq!(config.graph.edge_keys, EdgeKeyPolicy::Lenient);
    }

    #[test]
    fn test_default_validates() {
        assert!(FeedConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_str_empty() {
        let config: FeedConfig = "".parse().unwrap();
        assert_eq!(config, FeedConfig::default());
    }

    #[test]
    fn test_from_str_partial() {
        let toml = r#"
            [split]
            val_fraction = 0.1

            [graph]
            max_node_type = 40
        "#;
        let config: FeedConfig = toml.parse().unwrap();

        assert_eq!(config.split.val_fraction, 0.1);
        assert_eq!(config.graph.max_node_type, 40);
        // Unset fields keep their defaults
        assert_eq!(config.graph.max_node_subtoken, 65_535);
        assert_eq!(config.batch.batch_size, 32);
    }

    #[test]
    fn test_from_str_full() {
        let toml = r#"
            [storage]
            base_path = "/data/samples"
            buffer_size = 131072
            use_mmap = true
            mmap_threshold = 2097152

            [split]
            val_fraction = 0.25

            [batch]
            batch_size = 128

            [graph]
            edge_set = ["ast_child", "next_token", "data_flow"]
            max_node_type = 100
            max_node_subtoken = 20000
            edge_keys = "strict"
        "#;

        let config: FeedConfig = toml.parse().unwrap();

        assert_eq!(config.storage.base_path, PathBuf::from("/data/samples"));
        assert_eq!(config.storage.buffer_size, 131072);
        assert!(config.storage.use_mmap);
        assert_eq!(config.storage.mmap_threshold, 2097152);
        assert_eq!(config.split.val_fraction, 0.25);
        assert_eq!(config.batch.batch_size, 128);
        assert_eq!(
            config.graph.edge_set,
            vec![EdgeType::AstChild, EdgeType::NextToken, EdgeType::DataFlow]
        );
        assert_eq!(config.graph.max_node_type, 100);
        assert_eq!(config.graph.max_node_subtoken, 20000);
        assert_eq!(config.graph.edge_keys, EdgeKeyPolicy::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<FeedConfig> = "[split\nval_fraction = ".parse();
        assert!(matches!(result, Err(FeedError::Config { .. })));
    }

    #[test]
    fn test_from_str_unknown_edge_type() {
        let result: Result<FeedConfig> = "[graph]\nedge_set = [\"calls\"]".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\nbatch_size = 7").unwrap();

        let config = FeedConfig::from_file(file.path()).unwrap();
        assert_eq!(config.batch.batch_size, 7);
    }

    #[test]
    fn test_from_file_not_found() {
        let result = FeedConfig::from_file("/nonexistent/feed.toml");
        assert!(matches!(result, Err(FeedError::Storage { .. })));
    }

    #[test]
    fn test_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[split]\nval_fraction = 1.0").unwrap();

        let result = FeedConfig::from_file(file.path());
        assert!(matches!(result, Err(FeedError::Config { .. })));
    }

    #[test]
    fn test_validate_invalid_buffer_size() {
        let mut config = FeedConfig::default();
        config.storage.buffer_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_val_fraction() {
        for fraction in [0.0, 1.0, -0.1, 2.0, f64::NAN] {
            let mut config = FeedConfig::default();
            config.split.val_fraction = fraction;
            assert!(config.validate().is_err(), "fraction {fraction} accepted");
        }
    }

    #[test]
    fn test_validate_invalid_batch_size() {
        let mut config = FeedConfig::default();
        config.batch.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_edge_set() {
        let mut config = FeedConfig::default();
        config.graph.edge_set = vec![EdgeType::LastRead, EdgeType::LastRead];
        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("graph.edge_set"));

        config.graph.edge_set.clear();
        assert!(config.validate().is_err());
    }

    // Helper to clear all GRAPH_FEED_ environment variables for test isolation
    fn clear_feed_env_vars() {
        for (key, _) in std::env::vars() {
            if key.starts_with("GRAPH_FEED_") {
                std::env::remove_var(&key);
            }
        }
    }

    // All environment override cases live in one test to avoid
    // race conditions when tests run in parallel, since env vars are global state.
    #[test]
    fn test_env_overrides() {
        clear_feed_env_vars();

        std::env::set_var("GRAPH_FEED_STORAGE_BASE_PATH", "/env/path");
        std::env::set_var("GRAPH_FEED_STORAGE_USE_MMAP", "true");
        std::env::set_var("GRAPH_FEED_SPLIT_VAL_FRACTION", "0.05");
        std::env::set_var("GRAPH_FEED_BATCH_SIZE", "256");
        std::env::set_var("GRAPH_FEED_GRAPH_EDGE_SET", "last_read, last_write");
        std::env::set_var("GRAPH_FEED_GRAPH_MAX_NODE_TYPE", "12");
        std::env::set_var("GRAPH_FEED_GRAPH_EDGE_KEYS", "STRICT");

        let config = FeedConfig::default().with_env_overrides();

        assert_eq!(config.storage.base_path, PathBuf::from("/env/path"));
        assert!(config.storage.use_mmap);
        assert_eq!(config.split.val_fraction, 0.05);
        assert_eq!(config.batch.batch_size, 256);
        assert_eq!(
            config.graph.edge_set,
            vec![EdgeType::LastRead, EdgeType::LastWrite]
        );
        assert_eq!(config.graph.max_node_type, 12);
        assert_eq!(config.graph.edge_keys, EdgeKeyPolicy::Strict);

        clear_feed_env_vars();

        // Unparseable values leave the current setting alone
        std::env::set_var("GRAPH_FEED_BATCH_SIZE", "not_a_number");
        std::env::set_var("GRAPH_FEED_GRAPH_EDGE_SET", "ast_child,calls");

        let config = FeedConfig::default().with_env_overrides();
        assert_eq!(config.batch.batch_size, 32);
        assert_eq!(config.graph.edge_set, EdgeType::ALL.to_vec());

        clear_feed_env_vars();
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = FeedConfig::default();
        config.graph.edge_set = vec![EdgeType::ReturnsTo];
        config.batch.batch_size = 9;

        let toml = toml::to_string(&config).unwrap();
        let parsed: FeedConfig = toml.parse().unwrap();
        assert_eq!(parsed, config);
    }
}
