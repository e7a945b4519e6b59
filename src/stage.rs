//! Artifact staging into the Xcode project
//!
//! For each target, `app_packages.<sdk>/pygame` is rebuilt from scratch:
//! the compiled extension modules from `build-<target>/src_c` go in first,
//! shared libraries are renamed to the `<name>.so` form the iOS loader
//! looks for, and the pure-Python sources from `src_py` are overlaid on top.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::target::Target;
use crate::workspace::Workspace;

/// Suffix of host-toolchain shared libraries
pub const DYLIB_SUFFIX: &str = ".dylib";

/// Suffix the embedded Python runtime loads extension modules from
pub const MODULE_SUFFIX: &str = ".so";

/// Conventional shared-library name prefix
pub const LIB_PREFIX: &str = "lib";

/// Native module output inside a meson build directory
const NATIVE_MODULES_DIR: &str = "src_c";

/// Pure-Python package sources inside the source tree
const PYTHON_SOURCES_DIR: &str = "src_py";

/// Errors for staging
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("missing build output for {target}: {path}")]
    MissingBuildOutput { target: Target, path: PathBuf },

    #[error("missing Python sources: {0}")]
    MissingPythonSources(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StageError + '_ {
    move |source| StageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Summary of one staged target
#[derive(Debug, Clone)]
pub struct StagedTarget {
    pub target: Target,
    pub package_dir: PathBuf,
    /// Module files renamed from `lib<X>.dylib` to `<X>.so`
    pub renamed: Vec<PathBuf>,
}

/// Map a shared-library file name to the name the iOS loader expects.
///
/// `libfoo.dylib` becomes `foo.so`; `foo.dylib` becomes `foo.so`. The
/// `lib` prefix is only stripped when something remains, so `lib.dylib`
/// becomes `lib.so`. Names without the dylib suffix return `None` and are
/// left alone.
pub fn module_file_name(name: &str) -> Option<String> {
    let stem = name.strip_suffix(DYLIB_SUFFIX)?;
    let stem = match stem.strip_prefix(LIB_PREFIX) {
        Some(rest) if !rest.is_empty() => rest,
        _ => stem,
    };
    Some(format!("{}{}", stem, MODULE_SUFFIX))
}

/// Rebuild the staged package for `target`
pub fn stage_target(
    workspace: &Workspace,
    source_dir: &Path,
    target: Target,
) -> Result<StagedTarget, StageError> {
    let native_dir = source_dir
        .join(target.build_dir_name())
        .join(NATIVE_MODULES_DIR);
    let python_dir = source_dir.join(PYTHON_SOURCES_DIR);
    if !native_dir.is_dir() {
        return Err(StageError::MissingBuildOutput {
            target,
            path: native_dir,
        });
    }
    if !python_dir.is_dir() {
        return Err(StageError::MissingPythonSources(python_dir));
    }

    let app_packages = workspace.app_packages_dir(target);
    let package_dir = workspace.package_dir(target);

    if app_packages.exists() {
        debug!(path = %app_packages.display(), "removing stale app_packages");
        fs::remove_dir_all(&app_packages).map_err(io_error(&app_packages))?;
    }

    copy_tree(&native_dir, &package_dir)?;
    let renamed = rename_modules(&package_dir)?;
    copy_tree(&python_dir, &package_dir)?;

    info!(
        "Copied scripts and binary modules to \"{}\" in the Xcode project.",
        target.app_packages_dir_name()
    );
    Ok(StagedTarget {
        target,
        package_dir,
        renamed,
    })
}

/// Rename every `*.dylib` under `dir` via [`module_file_name`]
pub fn rename_modules(dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    let mut pending = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(new_name) = module_file_name(&name) {
            pending.push((entry.path().to_path_buf(), new_name));
        }
    }

    let mut renamed = Vec::with_capacity(pending.len());
    for (from, new_name) in pending {
        let to = from.with_file_name(new_name);
        fs::rename(&from, &to).map_err(io_error(&from))?;
        debug!(from = %from.display(), to = %to.display(), "renamed module");
        renamed.push(to);
    }
    Ok(renamed)
}

/// Recursively copy `src` into `dst`, overwriting same-named files
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64, StageError> {
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let relative = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let target_path = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).map_err(io_error(&target_path))?;
        } else {
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent).map_err(io_error(parent))?;
            }
            fs::copy(entry.path(), &target_path).map_err(io_error(entry.path()))?;
            copied += 1;
        }
    }
    Ok(copied)
}
