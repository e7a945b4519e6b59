//! pygios release packaging
//!
//! Produces the downloadable pygios iOS template: fetches and patches a
//! pygame-ce release, cross-builds its native modules for device and
//! simulator with meson, stages them into the Xcode skeleton, resets the
//! project metadata and zips the result under `dist/`.

pub mod build;
pub mod config;
pub mod fetch;
pub mod package;
pub mod patch;
pub mod pipeline;
pub mod process;
pub mod project;
pub mod registry;
pub mod stage;
pub mod target;
pub mod workspace;

pub use config::{EffectiveConfig, ReleaseConfig};
pub use fetch::{HttpTransport, ReqwestTransport, StubTransport};
pub use pipeline::{Pipeline, PipelineError, ReleaseOutcome};
pub use process::{CommandOutput, CommandRunner, Invocation, SystemRunner};
pub use target::Target;
pub use workspace::Workspace;
