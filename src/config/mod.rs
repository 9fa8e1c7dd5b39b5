//! Engine configuration
//!
//! Control-plane coordinates and alert timing, loaded from an optional YAML
//! file with environment overrides. Components receive these values as
//! explicit parameters; nothing reads configuration through ambient state.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Control-plane coordinates for the migration resources.
///
/// `namespace` is where the Mig* resources (and the velero/restic pods of a
/// migration) live; `config_namespace` is where the migration controller
/// itself runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigMeta {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_namespace")]
    pub config_namespace: String,
}

impl Default for MigMeta {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            config_namespace: default_namespace(),
        }
    }
}

/// Lifetimes for auto-dismissing user-facing alerts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfig {
    /// Lifetime of progress/success alerts, in milliseconds.
    #[serde(default = "default_alert_timeout_ms")]
    pub timeout_ms: u64,

    /// Lifetime of error alerts, in milliseconds. Configurable separately
    /// because error toasts often need to outlive the generic ones.
    #[serde(default = "default_alert_timeout_ms")]
    pub error_timeout_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_alert_timeout_ms(),
            error_timeout_ms: default_alert_timeout_ms(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub meta: MigMeta,

    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Config {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Apply environment overrides (`MIG_NAMESPACE`, `MIG_CONFIG_NAMESPACE`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(namespace) = std::env::var("MIG_NAMESPACE") {
            if !namespace.is_empty() {
                self.meta.namespace = namespace;
            }
        }
        if let Ok(namespace) = std::env::var("MIG_CONFIG_NAMESPACE") {
            if !namespace.is_empty() {
                self.meta.config_namespace = namespace;
            }
        }
        self
    }
}

fn default_namespace() -> String {
    "openshift-migration".to_string()
}

fn default_alert_timeout_ms() -> u64 {
    5000
}
