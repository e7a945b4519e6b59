//! Xcode project reset
//!
//! Local Xcode sessions leave workspace state, per-user data and signing
//! settings in the `.xcodeproj`. Before packaging, the generated
//! directories are removed and `project.pbxproj` is replaced with the
//! checked-in template so no team, profile or identity leaks into a release.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::workspace::Workspace;

/// Generated directories removed from the `.xcodeproj`
pub const GENERATED_DIRS: &[&str] = &["project.xcworkspace", "xcuserdata", "xcshareddata"];

/// Project descriptor file name
pub const PBXPROJ: &str = "project.pbxproj";

/// Errors for resetting the project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Xcode project not found: {0}")]
    MissingProject(PathBuf),

    #[error("pristine project template not found: {0}")]
    MissingTemplate(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What the reset removed
#[derive(Debug, Clone, Default)]
pub struct ProjectReset {
    pub removed: Vec<PathBuf>,
}

/// Remove generated metadata and restore the pristine descriptor
pub fn reset_project(workspace: &Workspace) -> Result<ProjectReset, ProjectError> {
    let xcodeproj = workspace.xcodeproj_dir();
    if !xcodeproj.is_dir() {
        return Err(ProjectError::MissingProject(xcodeproj));
    }
    let template = workspace.pbxproj_template();
    if !template.is_file() {
        return Err(ProjectError::MissingTemplate(template));
    }

    let mut reset = ProjectReset::default();
    for name in GENERATED_DIRS {
        let path = xcodeproj.join(name);
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|source| ProjectError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "removed generated metadata");
            reset.removed.push(path);
        }
    }

    let current = xcodeproj.join(PBXPROJ);
    fs::copy(&template, &current).map_err(|source| ProjectError::Io {
        path: current.clone(),
        source,
    })?;

    info!("Reset .xcodeproj metadata.");
    Ok(reset)
}
