//! Working-root layout
//!
//! Every path the release pipeline reads or writes is derived here from
//! the working root and the effective configuration.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ReleaseConfig, VERSION_PLACEHOLDER};
use crate::target::Target;

/// Working root plus the configuration that shapes its layout
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: ReleaseConfig,
}

impl Workspace {
    /// Create a workspace over `root`.
    ///
    /// A relative root is joined onto the current directory: the patch and
    /// cross file paths are handed to tools running inside the source tree
    /// and must not depend on the child's working directory.
    pub fn new(root: impl Into<PathBuf>, config: ReleaseConfig) -> Self {
        Self {
            root: absolute(root.into()),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Download URL with the version substituted verbatim
    pub fn download_url(&self, version: &str) -> String {
        self.config.source.url.replace(VERSION_PLACEHOLDER, version)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(&self.config.source.registry)
    }

    /// Directory the release archive extracts to
    pub fn source_dir(&self, version: &str) -> PathBuf {
        self.root
            .join(format!("{}{}", self.config.source.dir_prefix, version))
    }

    pub fn patch_path(&self, version: &str) -> PathBuf {
        self.root
            .join(&self.config.source.patches_dir)
            .join(format!("{}{}.patch", self.config.source.patch_prefix, version))
    }

    /// Cross file argument for meson.
    ///
    /// Without a configured directory the bare file name is passed and
    /// meson resolves it against the source tree.
    pub fn cross_file(&self, target: Target) -> PathBuf {
        match &self.config.build.cross_files_dir {
            Some(dir) => self.root.join(dir).join(target.cross_file_name()),
            None => PathBuf::from(target.cross_file_name()),
        }
    }

    pub fn xcode_dir(&self) -> PathBuf {
        self.root.join(&self.config.xcode.dir)
    }

    /// `<xcode>/<app>/app_packages.<sdk>`
    pub fn app_packages_dir(&self, target: Target) -> PathBuf {
        self.xcode_dir()
            .join(&self.config.xcode.app)
            .join(target.app_packages_dir_name())
    }

    /// `<xcode>/<app>/app_packages.<sdk>/<package>`
    pub fn package_dir(&self, target: Target) -> PathBuf {
        self.app_packages_dir(target).join(&self.config.xcode.package)
    }

    pub fn xcodeproj_dir(&self) -> PathBuf {
        self.xcode_dir()
            .join(format!("{}.xcodeproj", self.config.xcode.app))
    }

    pub fn pbxproj_template(&self) -> PathBuf {
        self.root.join(&self.config.xcode.pbxproj_template)
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.root.join(&self.config.dist.dir)
    }

    pub fn archive_name(&self, version: &str) -> String {
        format!("{}{}.zip", self.config.dist.archive_prefix, version)
    }

    pub fn archive_path(&self, version: &str) -> PathBuf {
        self.dist_dir().join(self.archive_name(version))
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
