use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config file: {}", e))?;

            let config: Config = toml::from_str(&content)
                .map_err(|e| format!("Failed to parse config: {}", e))?;

            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Override config with CLI arguments
    pub fn apply_cli_overrides(&mut self, args: &crate::cli::Args) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(bind_address) = &args.bind_address {
            self.server.bind_address = bind_address.clone();
        }

        if let Some(snapshot) = &args.snapshot {
            self.store.snapshot_path = Some(snapshot.clone());
        }
    }
}

impl CacheConfig {
    pub fn time_to_live(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Capacity clamped to at least one entry.
    pub fn bounded_capacity(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity.max(1)).unwrap_or(NonZeroUsize::MIN)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 3000,
            },
            cache: CacheConfig {
                capacity: cache::DEFAULT_CAPACITY,
                ttl_seconds: cache::DEFAULT_TTL.as_secs(),
            },
            store: StoreConfig {
                snapshot_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.cache.capacity, 300);
        assert_eq!(config.cache.time_to_live(), Duration::from_secs(3600));
        assert!(config.store.snapshot_path.is_none());
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/history.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.toml");
        fs::write(
            &path,
            r#"
[server]
bind_address = "127.0.0.1"
port = 8080

[cache]
capacity = 50
ttl_seconds = 120

[store]
snapshot_path = "/var/lib/history/snapshot.json"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.capacity, 50);
        assert_eq!(
            config.store.snapshot_path,
            Some(PathBuf::from("/var/lib/history/snapshot.json"))
        );
    }

    #[test]
    fn test_zero_cache_capacity_is_clamped() {
        let cache = CacheConfig {
            capacity: 0,
            ttl_seconds: 60,
        };
        assert_eq!(cache.bounded_capacity().get(), 1);
    }
}
