// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Layers, lowest first: built-in defaults, a TOML file, `MEALGRAPH_*`
//! environment variables. CLI flags are applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which database a run reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live data
    Production,
    /// Scratch data for tests and experiments
    Test,
}

impl Environment {
    /// Directory name under the data dir
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one snapshot per environment
    pub data_dir: PathBuf,
    /// Selected environment
    pub environment: Environment,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            environment: Environment::Production,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Snapshot file for the selected environment
    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir
            .join(self.environment.as_str())
            .join("snapshot.json")
    }

    /// Apply command-line overrides
    #[must_use]
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, environment: Option<Environment>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(env) = environment {
            self.environment = env;
        }
        self
    }

    /// Parsed log level
    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .with_context(|| format!("Invalid log level: {}", self.log_level))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hyperpolymath", "mealgraph")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".mealgraph"))
}

/// Config file looked up when none is given
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist; the default config file is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = Config::default();
    let mut builder = config::Config::builder()
        .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
        .set_default("environment", defaults.environment.as_str())?
        .set_default("log_level", defaults.log_level)?;

    match path {
        Some(path) => {
            builder = builder.add_source(
                config::File::new(&path.to_string_lossy(), config::FileFormat::Toml).required(true),
            );
        }
        None => {
            if let Some(path) = default_config_file() {
                builder = builder.add_source(
                    config::File::new(&path.to_string_lossy(), config::FileFormat::Toml)
                        .required(false),
                );
            }
        }
    }

    let settings = builder
        .add_source(config::Environment::with_prefix("MEALGRAPH"))
        .build()
        .context("Failed to load configuration")?;
    let config: Config = settings
        .try_deserialize()
        .context("Invalid configuration")?;

    tracing::debug!(
        data_dir = %config.data_dir.display(),
        environment = %config.environment,
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_path_per_environment() {
        let config = Config {
            data_dir: PathBuf::from("/data"),
            environment: Environment::Test,
            log_level: "info".into(),
        };
        assert_eq!(config.snapshot_path(), PathBuf::from("/data/test/snapshot.json"));

        let prod = config.with_overrides(None, Some(Environment::Production));
        assert_eq!(prod.snapshot_path(), PathBuf::from("/data/production/snapshot.json"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mealgraph.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/meals\"\nenvironment = \"test\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/meals"));
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load(Some(&temp_dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let rendered = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_log_level() {
        let config = Config {
            log_level: "loud".into(),
            ..Config::default()
        };
        assert!(config.level().is_err());
    }
}
