//! Release pipeline orchestration
//!
//! Runs the release steps strictly in order:
//! - Fetch the pygame-ce release
//! - Apply the version's patch
//! - Cross-build device, then simulator
//! - Stage device, then simulator packages into the Xcode project
//! - Reset Xcode project metadata
//! - Compress the template into the dist directory
//!
//! The first failing step aborts the run; nothing is retried.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::build::{meson_build, BuildError};
use crate::fetch::{fetch_release, FetchError, HttpTransport};
use crate::package::{finalise, PackageError, PackageResult};
use crate::patch::{apply_patch, PatchError};
use crate::process::CommandRunner;
use crate::project::{reset_project, ProjectError};
use crate::stage::{stage_target, StageError, StagedTarget};
use crate::target::Target;
use crate::workspace::Workspace;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const IO: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const TRANSPORT: i32 = 4;
    pub const PATCH: i32 = 5;
    pub const BUILD: i32 = 6;
    pub const STAGING: i32 = 7;
    pub const PACKAGE: i32 = 8;
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("staging error: {0}")]
    Stage(#[from] StageError),

    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    #[error("packaging error: {0}")]
    Package(#[from] PackageError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => exit_codes::CONFIG,
            PipelineError::Fetch(e) if e.is_configuration() => exit_codes::CONFIG,
            PipelineError::Fetch(FetchError::Transport(_)) => exit_codes::TRANSPORT,
            PipelineError::Fetch(_) => exit_codes::IO,
            PipelineError::Patch(_) => exit_codes::PATCH,
            PipelineError::Build(_) => exit_codes::BUILD,
            PipelineError::Stage(_) => exit_codes::STAGING,
            PipelineError::Project(_) => exit_codes::STAGING,
            PipelineError::Package(_) => exit_codes::PACKAGE,
            PipelineError::Io { .. } => exit_codes::IO,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything a successful run produced
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub version: String,
    pub source_dir: PathBuf,
    pub staged: Vec<StagedTarget>,
    pub package: PackageResult,
    /// Whether the extracted source tree was deleted after packaging
    pub source_removed: bool,
}

/// Release pipeline over a working root
pub struct Pipeline {
    workspace: Workspace,
    transport: Arc<dyn HttpTransport>,
    runner: Arc<dyn CommandRunner>,
}

impl Pipeline {
    pub fn new(
        workspace: Workspace,
        transport: Arc<dyn HttpTransport>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            workspace,
            transport,
            runner,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Run every step for `version`
    pub fn run(&self, version: &str) -> PipelineResult<ReleaseOutcome> {
        let span = info_span!("release", %version);
        let _enter = span.enter();

        let source_dir = fetch_release(&self.workspace, self.transport.as_ref(), version)?;
        apply_patch(&self.workspace, self.runner.as_ref(), &source_dir, version)?;

        for target in Target::ALL {
            meson_build(&self.workspace, self.runner.as_ref(), &source_dir, target)?;
        }

        let mut staged = Vec::with_capacity(Target::ALL.len());
        for target in Target::ALL {
            staged.push(stage_target(&self.workspace, &source_dir, target)?);
        }

        reset_project(&self.workspace)?;
        let package = finalise(&self.workspace, version)?;

        let source_removed = !self.workspace.config().source.keep;
        if source_removed {
            debug!(path = %source_dir.display(), "removing extracted source tree");
            fs::remove_dir_all(&source_dir).map_err(|source| PipelineError::Io {
                path: source_dir.clone(),
                source,
            })?;
            info!("Removed pygame-ce source tree.");
        }

        Ok(ReleaseOutcome {
            version: version.to_string(),
            source_dir,
            staged,
            package,
            source_removed,
        })
    }
}
