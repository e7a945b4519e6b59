//! Built-in release defaults (layer 1)
//!
//! The typed configuration plus the values used when no config file or
//! CLI override supplies one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder substituted with the requested version in `source.url`
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Complete release configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub source: SourceSettings,
    pub build: BuildSettings,
    pub xcode: XcodeSettings,
    pub tools: ToolSettings,
    pub dist: DistSettings,
}

/// Where the upstream release comes from and how it is patched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Download URL template; must contain `{version}`
    pub url: String,

    /// Prefix of the directory the archive extracts to (`<prefix><version>`)
    pub dir_prefix: String,

    /// Supported-versions registry, relative to the working root
    pub registry: PathBuf,

    /// Directory holding one patch per supported version
    pub patches_dir: PathBuf,

    /// Patch file name prefix (`<prefix><version>.patch`)
    pub patch_prefix: String,

    /// Keep the extracted source tree after a successful run
    pub keep: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            url: "https://github.com/pygame-community/pygame-ce/archive/refs/tags/{version}.zip"
                .to_string(),
            dir_prefix: "pygame-ce-".to_string(),
            registry: PathBuf::from("patches/pygame-ce.json"),
            patches_dir: PathBuf::from("patches"),
            patch_prefix: "pygame-ce_".to_string(),
            keep: true,
        }
    }
}

/// Meson cross-build settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Directory of `<target>-crossbuild.txt` files, relative to the root.
    /// When unset, meson resolves the cross file inside the source tree.
    pub cross_files_dir: Option<PathBuf>,

    /// Value passed to `--buildtype`
    pub buildtype: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cross_files_dir: None,
            buildtype: "release".to_string(),
        }
    }
}

/// Xcode project skeleton layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XcodeSettings {
    /// Directory containing the Xcode project, relative to the root
    pub dir: PathBuf,

    /// App name: `<dir>/<app>/` and `<dir>/<app>.xcodeproj`
    pub app: String,

    /// Package directory created inside each `app_packages.<sdk>`
    pub package: String,

    /// Pristine `project.pbxproj`, relative to the root
    pub pbxproj_template: PathBuf,
}

impl Default for XcodeSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("xcode"),
            app: "pygios".to_string(),
            package: "pygame".to_string(),
            pbxproj_template: PathBuf::from("data/project.pbxproj"),
        }
    }
}

/// External programs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub git: String,
    pub meson: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            meson: "meson".to_string(),
        }
    }
}

/// Release archive output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistSettings {
    /// Output directory, relative to the root
    pub dir: PathBuf,

    /// Archive name prefix (`<prefix><version>.zip`)
    pub archive_prefix: String,

    /// Extra glob patterns left out of the archive
    pub exclude: Vec<String>,
}

impl Default for DistSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dist"),
            archive_prefix: "pygios-template-".to_string(),
            exclude: Vec::new(),
        }
    }
}

impl ReleaseConfig {
    /// Built-in defaults as a JSON layer for merging
    pub fn defaults_value() -> serde_json::Value {
        serde_json::to_value(Self::default()).unwrap_or(serde_json::Value::Null)
    }
}
