//! Configuration management for the survival predictor

use crate::models::artifact::ArtifactPaths;
use crate::training::TrainingParams;
use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Deployment environment label shown in the UI
    pub app_env: String,
    pub artifacts: ArtifactsConfig,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

/// Artifact file locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    pub model_path: String,
    pub columns_path: String,
    pub version_path: String,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Metrics reporting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between logged metrics summaries
    pub report_interval_secs: u64,
}

/// In-process training used when no model file exists yet
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// CSV to train from; bootstrap is disabled when unset
    #[serde(default)]
    pub dataset_path: Option<String>,
    pub test_fraction: f64,
    pub seed: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

/// Environment variables and the keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_ENV", "app_env"),
    ("MODEL_PATH", "artifacts.model_path"),
    ("COLUMNS_PATH", "artifacts.columns_path"),
    ("VERSION_PATH", "artifacts.version_path"),
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("METRICS_REPORT_INTERVAL_SECS", "metrics.report_interval_secs"),
    ("BOOTSTRAP_DATASET", "bootstrap.dataset_path"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

impl AppConfig {
    /// Load configuration from the process environment and `CONFIG_PATH`
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load defaults, then the optional file at `path`, then environment overrides from `env`
    pub fn load_with<P, F>(path: P, env: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("app_env", "dev")?
            .set_default("artifacts.model_path", "artifacts/model.json")?
            .set_default("artifacts.columns_path", "artifacts/columns.json")?
            .set_default("artifacts.version_path", "artifacts/version.txt")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8501_i64)?
            .set_default("metrics.report_interval_secs", 60_i64)?
            .set_default("bootstrap.test_fraction", 0.2)?
            .set_default("bootstrap.seed", 42_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::from(path.as_ref()).required(false));

        for &(var, key) in ENV_OVERRIDES {
            builder = builder
                .set_override_option(key, env(var))
                .with_context(|| format!("Invalid value for {var}"))?;
        }

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: PathBuf::from(&self.artifacts.model_path),
            columns: PathBuf::from(&self.artifacts.columns_path),
            version: PathBuf::from(&self.artifacts.version_path),
        }
    }

    /// File name of the model, for display
    pub fn model_name(&self) -> String {
        Path::new(&self.artifacts.model_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.artifacts.model_path.clone())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn bootstrap_params(&self) -> TrainingParams {
        TrainingParams {
            test_fraction: self.bootstrap.test_fraction,
            seed: self.bootstrap.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::load_with("/nonexistent/config.toml", no_env).unwrap();
        assert_eq!(config.app_env, "dev");
        assert_eq!(config.artifacts.model_path, "artifacts/model.json");
        assert_eq!(config.artifacts.columns_path, "artifacts/columns.json");
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.bootstrap.dataset_path, None);
        assert_eq!(config.bootstrap_params().seed, 42);
        assert_eq!(config.model_name(), "model.json");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("APP_ENV", "prod"),
            ("MODEL_PATH", "/models/titanic.json"),
            ("PORT", "9000"),
            ("BOOTSTRAP_DATASET", "data/titanic.csv"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::load_with("/nonexistent/config.toml", |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.app_env, "prod");
        assert_eq!(config.artifact_paths().model, PathBuf::from("/models/titanic.json"));
        assert_eq!(config.model_name(), "titanic.json");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(
            config.bootstrap.dataset_path.as_deref(),
            Some("data/titanic.csv")
        );
    }

    #[test]
    fn test_file_then_env_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "app_env = \"staging\"\n[server]\nport = 8080\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load_with(&path, |key| {
            (key == "APP_ENV").then(|| "prod".to_string())
        })
        .unwrap();

        assert_eq!(config.app_env, "prod");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
