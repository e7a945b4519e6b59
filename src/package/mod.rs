//! Release archive creation
//!
//! Compresses the finished Xcode template into
//! `dist/pygios-template-<version>.zip`. Entries are written in sorted order
//! with fixed timestamps, so identical trees produce identical archives and
//! the logged SHA-256 identifies a release.

mod exclude;

pub use exclude::{ExcludeError, ExcludeRules};

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::workspace::Workspace;

/// Errors for packaging
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("nothing to package: {0} is not a directory")]
    MissingSource(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Exclude rules error: {0}")]
    Exclude(#[from] ExcludeError),
}

/// A written release archive
#[derive(Debug, Clone)]
pub struct PackageResult {
    pub path: PathBuf,
    /// Number of file entries in the archive
    pub entries: usize,
    /// SHA-256 of the archive bytes
    pub sha256: String,
}

/// Package the Xcode directory for `version` into the dist directory
pub fn finalise(workspace: &Workspace, version: &str) -> Result<PackageResult, PackageError> {
    let dist = workspace.dist_dir();
    fs::create_dir_all(&dist).map_err(|source| PackageError::Io {
        path: dist.clone(),
        source,
    })?;

    let xcode_dir = workspace.xcode_dir();
    let archive = workspace.archive_path(version);
    let rules = ExcludeRules::new(workspace.config().dist.exclude.as_slice())?;

    info!("Compressing \"{}\"...", xcode_dir.display());
    let result = create_archive(&xcode_dir, &archive, &rules)?;

    info!(
        sha256 = %result.sha256,
        entries = result.entries,
        "Done! \"{}\" has been created under \"{}\".",
        workspace.archive_name(version),
        dist.display()
    );
    Ok(result)
}

/// Write every non-excluded file under `src` into a deflated zip at `dest`
pub fn create_archive(src: &Path, dest: &Path, rules: &ExcludeRules) -> Result<PackageResult, PackageError> {
    if !src.is_dir() {
        return Err(PackageError::MissingSource(src.to_path_buf()));
    }

    let file = File::create(dest).map_err(|source| PackageError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    let mut zip = ZipWriter::new(file);
    let mut entries = 0;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if rules.is_excluded(rel) {
            debug!(path = %rel.display(), "excluded from archive");
            continue;
        }

        let name = archive_name(rel);
        let mode = if is_executable(entry.path()) { 0o755 } else { 0o644 };
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(mode);
        zip.start_file(name, options)?;

        let io_error = |source| PackageError::Io {
            path: entry.path().to_path_buf(),
            source,
        };
        let mut input = File::open(entry.path()).map_err(io_error)?;
        io::copy(&mut input, &mut zip).map_err(io_error)?;
        entries += 1;
    }

    zip.finish()?;

    let bytes = fs::read(dest).map_err(|source| PackageError::Io {
        path: dest.to_path_buf(),
        source,
    })?;
    let sha256 = hex::encode(Sha256::digest(&bytes));

    Ok(PackageResult {
        path: dest.to_path_buf(),
        entries,
        sha256,
    })
}

/// Zip entry name: relative path with `/` separators
fn archive_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            return metadata.permissions().mode() & 0o111 != 0;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReleaseConfig;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn create_xcode_tree(root: &Path) {
        let xcode = root.join("xcode");
        fs::create_dir_all(xcode.join("pygios/app_packages.iphoneos/pygame")).unwrap();
        fs::create_dir_all(xcode.join("pygios.xcodeproj")).unwrap();
        fs::write(xcode.join("pygios/main.py"), "import pygame").unwrap();
        fs::write(xcode.join("pygios/app_packages.iphoneos/pygame/base.so"), "bin").unwrap();
        fs::write(xcode.join("pygios.xcodeproj/project.pbxproj"), "// pbx").unwrap();
        fs::write(xcode.join("pygios/.DS_Store"), "junk").unwrap();
    }

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(String::from).collect()
    }

    #[test]
    fn test_finalise_creates_dist_and_archive() {
        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let result = finalise(&workspace, "2.5.0").unwrap();

        assert_eq!(result.path, dir.path().join("dist/pygios-template-2.5.0.zip"));
        assert!(result.path.is_file());
        assert_eq!(result.entries, 3);
        assert_eq!(result.sha256.len(), 64);
    }

    #[test]
    fn test_entries_are_relative_and_sorted() {
        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let result = finalise(&workspace, "2.5.0").unwrap();

        let mut names = entry_names(&result.path);
        names.sort();
        assert_eq!(
            names,
            vec![
                "pygios.xcodeproj/project.pbxproj".to_string(),
                "pygios/app_packages.iphoneos/pygame/base.so".to_string(),
                "pygios/main.py".to_string(),
            ]
        );
    }

    #[test]
    fn test_entries_are_deflated_with_content() {
        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let result = finalise(&workspace, "2.5.0").unwrap();

        let mut archive = ZipArchive::new(File::open(&result.path).unwrap()).unwrap();
        let mut entry = archive.by_name("pygios/main.py").unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        let mut contents = String::new();
        entry.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "import pygame");
    }

    #[test]
    fn test_archive_is_reproducible() {
        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let first = finalise(&workspace, "2.5.0").unwrap();
        let second = finalise(&workspace, "2.5.0").unwrap();

        assert_eq!(first.sha256, second.sha256);
    }

    #[test]
    fn test_configured_excludes() {
        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let mut config = ReleaseConfig::default();
        config.dist.exclude = vec!["**/*.py".to_string()];
        let workspace = Workspace::new(dir.path(), config);

        let result = finalise(&workspace, "2.5.0").unwrap();

        assert!(!entry_names(&result.path).contains(&"pygios/main.py".to_string()));
    }

    #[test]
    fn test_missing_xcode_dir() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let err = finalise(&workspace, "2.5.0").unwrap_err();
        assert!(matches!(err, PackageError::MissingSource(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_bit_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        create_xcode_tree(dir.path());
        let script = dir.path().join("xcode/pygios/run.sh");
        fs::write(&script, "#!/bin/sh").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let workspace = Workspace::new(dir.path(), ReleaseConfig::default());

        let result = finalise(&workspace, "2.5.0").unwrap();

        let mut archive = ZipArchive::new(File::open(&result.path).unwrap()).unwrap();
        let entry = archive.by_name("pygios/run.sh").unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
    }
}
