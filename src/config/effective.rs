//! Effective configuration with provenance
//!
//! Records which layers contributed to the merged configuration so the
//! run log shows exactly where each release setting came from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::defaults::{ReleaseConfig, VERSION_PLACEHOLDER};
use super::merge::merge_layers;

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged configuration and the layers it came from
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub config: ReleaseConfig,
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Merge built-in defaults, an optional TOML file and CLI overrides.
    ///
    /// A file path that does not exist is skipped, mirroring an absent
    /// `release.toml` in the working root.
    pub fn build(config_file: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![ReleaseConfig::defaults_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = config_file {
            if path.exists() {
                let (value, digest) = load_toml_file(path)?;
                layers.push(value);
                sources.push(ConfigSource {
                    origin: ConfigOrigin::File,
                    path: Some(path.to_string_lossy().to_string()),
                    digest: Some(digest),
                });
            }
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);
        let config: ReleaseConfig = serde_json::from_value(merged)
            .map_err(|e| ConfigError::ParseError(format!("invalid configuration: {}", e)))?;
        validate(&config)?;

        Ok(Self { config, sources })
    }

    /// Serialize the merged config for logging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.config)
    }
}

fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path).map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    let digest = hex::encode(Sha256::digest(&bytes));

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("invalid UTF-8 in {}: {}", path.display(), e)))?;
    let value: Value = toml::from_str(&contents)
        .map_err(|e| ConfigError::ParseError(format!("TOML parse error in {}: {}", path.display(), e)))?;

    Ok((value, digest))
}

fn validate(config: &ReleaseConfig) -> Result<(), ConfigError> {
    if !config.source.url.contains(VERSION_PLACEHOLDER) {
        return Err(ConfigError::ValidationError(format!(
            "source.url must contain {}",
            VERSION_PLACEHOLDER
        )));
    }

    let required = [
        ("source.dir_prefix", config.source.dir_prefix.as_str()),
        ("xcode.app", config.xcode.app.as_str()),
        ("xcode.package", config.xcode.package.as_str()),
        ("tools.git", config.tools.git.as_str()),
        ("tools.meson", config.tools.meson.as_str()),
        ("build.buildtype", config.build.buildtype.as_str()),
        ("dist.archive_prefix", config.dist.archive_prefix.as_str()),
    ];
    for (key, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
        }
    }

    Ok(())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
