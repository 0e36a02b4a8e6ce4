//! Configuration loading from TOML files.
//!
//! Every knob that changes engine output is an explicit, validated field
//! with a documented default. Missing sections fall back to defaults so a
//! partial config file is enough to get started.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub recommendation: RecommendationSettings,
    pub backfill: BackfillConfig,
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path or URL.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "copurchase.db".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level in `tracing` env-filter syntax.
    pub level: String,
    /// Output format: `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Settings that shape recommendation output.
///
/// `threshold_percent` and `hide_if_in_cart` participate in the cache-key
/// fingerprint: changing either must never serve a result cached under the
/// old settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommendationSettings {
    /// Minimum fraction (0–100) of the anchor product's orders that must
    /// also contain a candidate for it to be recommended.
    pub threshold_percent: f64,
    /// Default number of recommendations returned.
    pub limit: usize,
    /// Drop candidates already present in the requester's cart.
    pub hide_if_in_cart: bool,
    /// TTL for cached recommendation lists, in seconds.
    pub cache_ttl_secs: u64,
    /// TTL for the slower-moving per-product order-count aggregate.
    pub stats_cache_ttl_secs: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            threshold_percent: 15.0,
            limit: 4,
            hide_if_in_cart: true,
            cache_ttl_secs: 6 * 60 * 60,
            stats_cache_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl RecommendationSettings {
    /// Deterministic fingerprint of every setting that changes query output.
    pub fn fingerprint(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.threshold_percent.to_bits().hash(&mut hasher);
        self.hide_if_in_cart.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Orders pulled per batch invocation.
    pub batch_size: i64,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self { batch_size: 50 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Pairs with a count below this floor are pruned as noise.
    pub min_count: i64,
    /// Pairs not updated within this window are pruned as stale.
    pub retention_days: i64,
    /// Distinct product ids checked per orphan-scan page.
    pub orphan_page_size: i64,
    /// Rows removed per stale-delete statement (LIMIT-and-loop).
    pub delete_batch_size: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            min_count: 2,
            retention_days: 365,
            orphan_page_size: 200,
            delete_batch_size: 500,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url",
                reason: "cannot be empty".into(),
            }
            .into());
        }
        if !(0.0..=100.0).contains(&self.recommendation.threshold_percent) {
            return Err(ConfigError::InvalidValue {
                field: "recommendation.threshold_percent",
                reason: format!(
                    "must be within 0.0..=100.0, got {}",
                    self.recommendation.threshold_percent
                ),
            }
            .into());
        }
        if self.recommendation.limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recommendation.limit",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.backfill.batch_size < 1 {
            return Err(ConfigError::InvalidValue {
                field: "backfill.batch_size",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.cleanup.min_count < 1 {
            return Err(ConfigError::InvalidValue {
                field: "cleanup.min_count",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.cleanup.retention_days < 1 {
            return Err(ConfigError::InvalidValue {
                field: "cleanup.retention_days",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.cleanup.orphan_page_size < 1 || self.cleanup.delete_batch_size < 1 {
            return Err(ConfigError::InvalidValue {
                field: "cleanup",
                reason: "page and batch sizes must be at least 1".into(),
            }
            .into());
        }
        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.format",
                    reason: format!("expected `pretty` or `json`, got `{other}`"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Install the global tracing subscriber according to the logging section.
    pub fn init_logging(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(self.logging.level.clone()));

        if self.logging.format == "json" {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }
}
