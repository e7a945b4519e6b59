//! pygios release CLI
//!
//! Entry point for the `pygios-release` command-line tool.

use clap::error::ErrorKind;
use clap::Parser;
use pygios_release::config::{EffectiveConfig, DEFAULT_CONFIG_FILE};
use pygios_release::fetch::FetchError;
use pygios_release::pipeline::{exit_codes, PipelineResult};
use pygios_release::{Pipeline, PipelineError, ReleaseOutcome, ReqwestTransport, SystemRunner, Workspace};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pygios-release")]
#[command(about = "Build and package the pygios iOS template", version)]
struct Cli {
    /// pygame-ce version to package (must be listed in the registry)
    #[arg(value_name = "VERSION")]
    pygame_version: String,

    /// Working root containing patches/, data/ and xcode/ (default: current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Path to config file (default: <root>/release.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Delete the extracted pygame-ce source tree after packaging
    #[arg(long)]
    clean_source: bool,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return exit_code(parse_error_code(&e));
        }
    };

    setup_logging(cli.verbose);
    match run(cli) {
        Ok(outcome) => {
            info!(
                archive = %outcome.package.path.display(),
                sha256 = %outcome.package.sha256,
                "pygios template {} released",
                outcome.version
            );
            exit_code(exit_codes::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            exit_code(e.exit_code())
        }
    }
}

/// Exit status for a failed argument parse; help and version are not failures
fn parse_error_code(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
        _ => exit_codes::USAGE,
    }
}

fn run(cli: Cli) -> PipelineResult<ReleaseOutcome> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().map_err(|source| PipelineError::Io {
            path: PathBuf::from("."),
            source,
        })?,
    };
    let root = fs::canonicalize(&root).map_err(|source| PipelineError::Io {
        path: root.clone(),
        source,
    })?;
    let config_path = cli.config.unwrap_or_else(|| root.join(DEFAULT_CONFIG_FILE));

    let overrides = cli
        .clean_source
        .then(|| serde_json::json!({ "source": { "keep": false } }));

    let effective = EffectiveConfig::build(Some(&config_path), overrides)?;
    if let Ok(json) = effective.to_json() {
        debug!("effective config:\n{}", json);
    }
    for source in &effective.sources {
        debug!(origin = ?source.origin, path = ?source.path, digest = ?source.digest, "config layer");
    }

    let transport = ReqwestTransport::new().map_err(FetchError::from)?;

    let workspace = Workspace::new(root, effective.config);
    let pipeline = Pipeline::new(workspace, Arc::new(transport), Arc::new(SystemRunner));
    pipeline.run(&cli.pygame_version)
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
