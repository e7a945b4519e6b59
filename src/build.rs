//! Meson cross-builds
//!
//! Two phases per target, both run inside the source tree:
//! `meson setup build-<target> --cross-file <target>-crossbuild.txt --buildtype=release`
//! followed by `meson compile -C build-<target>`. Either phase exiting
//! non-zero aborts the release.

use std::fmt;
use std::io;
use std::path::Path;

use tracing::{debug, error, info};

use crate::process::{CommandOutput, CommandRunner, Invocation};
use crate::target::Target;
use crate::workspace::Workspace;

/// Meson phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Setup,
    Compile,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Setup => f.write_str("setup"),
            BuildPhase::Compile => f.write_str("compile"),
        }
    }
}

/// Errors for cross-builds
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to run meson {phase} for {target}: {source}")]
    Spawn {
        target: Target,
        phase: BuildPhase,
        #[source]
        source: io::Error,
    },

    #[error("meson {phase} failed for {target} (exit {code})\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        target: Target,
        phase: BuildPhase,
        code: String,
        stdout: String,
        stderr: String,
    },
}

/// Captured output of both phases of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub target: Target,
    pub setup: CommandOutput,
    pub compile: CommandOutput,
}

/// Configure and compile `target` inside `source_dir`
pub fn meson_build(
    workspace: &Workspace,
    runner: &dyn CommandRunner,
    source_dir: &Path,
    target: Target,
) -> Result<BuildOutput, BuildError> {
    let meson = workspace.config().tools.meson.as_str();
    let build_dir = target.build_dir_name();

    let setup = Invocation::new(meson, source_dir)
        .arg("setup")
        .arg(build_dir.as_str())
        .arg("--cross-file")
        .path_arg(&workspace.cross_file(target))
        .arg(format!("--buildtype={}", workspace.config().build.buildtype));
    let setup = run_phase(runner, &setup, target, BuildPhase::Setup)?;

    let compile = Invocation::new(meson, source_dir)
        .arg("compile")
        .arg("-C")
        .arg(build_dir.as_str());
    let compile = run_phase(runner, &compile, target, BuildPhase::Compile)?;

    info!("Built binary modules with Meson for target \"{}\".", target);
    Ok(BuildOutput {
        target,
        setup,
        compile,
    })
}

fn run_phase(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
    target: Target,
    phase: BuildPhase,
) -> Result<CommandOutput, BuildError> {
    debug!(%target, %phase, "{}", invocation);
    let output = runner.run(invocation).map_err(|source| BuildError::Spawn {
        target,
        phase,
        source,
    })?;

    if !output.is_success() {
        error!(%target, %phase, code = %output.code_display(), "meson failed");
        return Err(BuildError::Failed {
            target,
            phase,
            code: output.code_display(),
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }

    Ok(output)
}
