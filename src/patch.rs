//! Patch application
//!
//! Applies `patches/pygame-ce_<version>.patch` to the extracted tree with
//! `git apply`. A failing patch means the source and patch disagree and
//! needs a human, so there is no retry.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::process::{CommandOutput, CommandRunner, Invocation};
use crate::workspace::Workspace;

/// Errors for patch application
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("patch file not found: {0}")]
    MissingPatch(PathBuf),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to apply patch {patch} (exit {code})\nstdout: {stdout}\nstderr: {stderr}")]
    Rejected {
        patch: PathBuf,
        code: String,
        stdout: String,
        stderr: String,
    },
}

/// Apply the version's patch inside `source_dir`
pub fn apply_patch(
    workspace: &Workspace,
    runner: &dyn CommandRunner,
    source_dir: &Path,
    version: &str,
) -> Result<CommandOutput, PatchError> {
    let patch = workspace.patch_path(version);
    if !patch.is_file() {
        return Err(PatchError::MissingPatch(patch));
    }

    let git = &workspace.config().tools.git;
    let invocation = Invocation::new(git.as_str(), source_dir)
        .arg("apply")
        .path_arg(&patch);

    let output = runner.run(&invocation).map_err(|source| PatchError::Spawn {
        program: git.clone(),
        source,
    })?;

    if !output.is_success() {
        error!("Failed to apply git patch file.");
        error!("stdout: {}", output.stdout);
        error!("stderr: {}", output.stderr);
        return Err(PatchError::Rejected {
            patch,
            code: output.code_display(),
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    info!("Applied patch file.");
    Ok(output)
}
