//! Release configuration
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. Config file (`release.toml` in the working root, or `--config`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::{
    BuildSettings, DistSettings, ReleaseConfig, SourceSettings, ToolSettings, XcodeSettings,
    VERSION_PLACEHOLDER,
};
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};

/// Default config file name looked up in the working root
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";
