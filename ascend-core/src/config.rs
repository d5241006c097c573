//! Configuration for the learning engine

use serde::{Deserialize, Serialize};

/// Configuration for the learning engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many times a version-conflicted save is retried before the
    /// request fails with a concurrency error.
    #[serde(default = "default_max_save_retries")]
    pub max_save_retries: u32,

    /// Bound on course-catalog reads, in milliseconds.
    #[serde(default = "default_catalog_timeout_ms")]
    pub catalog_timeout_ms: u64,

    /// How many trailing days of rollup rows are loaded for
    /// timeframe-scoped achievement criteria.
    #[serde(default = "default_stats_window_days")]
    pub stats_window_days: u32,
}

fn default_max_save_retries() -> u32 {
    3
}

fn default_catalog_timeout_ms() -> u64 {
    2000
}

fn default_stats_window_days() -> u32 {
    31
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_save_retries: default_max_save_retries(),
            catalog_timeout_ms: default_catalog_timeout_ms(),
            stats_window_days: default_stats_window_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_save_retries, 3);
        assert_eq!(config.catalog_timeout_ms, 2000);
        assert_eq!(config.stats_window_days, 31);
    }

    #[test]
    fn test_deserialize_toml() {
        let toml = r#"
            max_save_retries = 5
            catalog_timeout_ms = 500
        "#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_save_retries, 5);
        assert_eq!(config.catalog_timeout_ms, 500);
        assert_eq!(config.stats_window_days, 31); // defaulted
    }

    #[test]
    fn test_deserialize_toml_defaults() {
        let toml = r#""#;
        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_save_retries, 3);
    }
}
