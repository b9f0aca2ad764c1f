//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/caz-chargeability/config.toml`).
//! Every section and field has a default, so an empty file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::errors::InfraError;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("caz-chargeability")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: DatabaseSettings,
    pub engine: EngineSettings,
    pub registries: RegistrySettings,
    pub compliance: ComplianceSettings,
    pub exemptions: ExemptionSettings,
    pub metrics: MetricsSettings,
}

impl AppConfig {
    /// Read and parse the file at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, InfraError> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error (or any EnvFilter directive)
    pub level: String,
    /// "plain" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "plain".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./caz-chargeability.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Vehicles per cache-population batch.
    pub bulk_check_batch_size: usize,
    /// Batches processed concurrently.
    pub worker_count: usize,
    /// Timeout for one external call.
    pub call_timeout_secs: u64,
    /// Timeout for one attempt at a cache-population batch.
    pub batch_timeout_secs: u64,
    /// Rows older than this are recalculated by `refresh_cache`.
    pub cache_refresh_days: i64,
    pub retry: RetrySettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            bulk_check_batch_size: 10,
            worker_count: 4,
            call_timeout_secs: 30,
            batch_timeout_secs: 300,
            cache_refresh_days: 7,
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            backoff_multiplier: 2.0,
            max_delay_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Max VRNs per bulk registry call.
    pub bulk_chunk_size: usize,
    /// Max registry calls in flight per source.
    pub max_concurrent_calls: usize,
    /// TTL of per-VRN lookup caches.
    pub lookup_cache_ttl_secs: u64,
    /// Use bulk endpoints where a registry offers them.
    pub use_bulk_endpoints: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            bulk_chunk_size: 50,
            max_concurrent_calls: 4,
            lookup_cache_ttl_secs: 300,
            use_bulk_endpoints: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceSettings {
    pub zone_overrides: Vec<ZoneOverrideSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneOverrideSettings {
    pub zone_id: uuid::Uuid,
    pub compliant_fuel_types: Vec<String>,
}

/// Vehicle attributes that exempt a vehicle outright, regardless of registry data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExemptionSettings {
    pub fuel_types: Vec<String>,
    pub tax_classes: Vec<String>,
    pub type_approvals: Vec<String>,
    pub agricultural: bool,
}

impl Default for ExemptionSettings {
    fn default() -> Self {
        Self {
            fuel_types: vec!["electric".into(), "steam".into(), "fuel cells".into()],
            tax_classes: vec!["electric".into(), "historic vehicle".into()],
            type_approvals: vec!["T1".into(), "T2".into(), "T3".into(), "T4".into(), "T5".into()],
            agricultural: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub listen: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: "127.0.0.1:9464".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.engine.bulk_check_batch_size, 10);
        assert_eq!(cfg.engine.retry.max_attempts, 3);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.compliance.zone_overrides.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [engine]
            worker_count = 8

            [[compliance.zone_overrides]]
            zone_id = "131af03c-f7f4-4aef-81ee-aae4f56dbeb5"
            compliant_fuel_types = ["electric"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.engine.worker_count, 8);
        assert_eq!(cfg.engine.bulk_check_batch_size, 10);
        assert_eq!(cfg.compliance.zone_overrides.len(), 1);
        assert_eq!(cfg.registries.bulk_chunk_size, 50);
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(AppConfig::from_toml("[engine\nworker_count = ").is_err());
    }
}
