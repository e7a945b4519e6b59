//! Supported-versions registry
//!
//! A small JSON file listing the pygame-ce releases that have a matching
//! patch: `{"supportedVersions": ["2.4.1", "2.5.0"]}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read registry {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("pygame-ce version {version} is not supported (supported: {supported})")]
    Unsupported { version: String, supported: String },
}

#[derive(Debug, Deserialize, Serialize)]
struct RegistryFile {
    #[serde(rename = "supportedVersions")]
    supported_versions: Vec<String>,
}

/// Set of version tokens that may be released
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    versions: BTreeSet<String>,
}

impl Registry {
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Ok(Self::new(file.supported_versions))
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let json = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains(version)
    }

    /// Fail with [`RegistryError::Unsupported`] unless `version` is listed
    pub fn ensure_supported(&self, version: &str) -> Result<(), RegistryError> {
        if self.contains(version) {
            return Ok(());
        }
        Err(RegistryError::Unsupported {
            version: version.to_string(),
            supported: self.versions.iter().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(String::as_str)
    }
}
