//! Release fetching
//!
//! Resolves a version against the registry, downloads the pygame-ce source
//! archive and extracts it into the working root as `pygame-ce-<version>`.

mod transport;

pub use transport::{HttpTransport, ReqwestTransport, StubTransport, TransportError};

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::ZipArchive;

use crate::registry::{Registry, RegistryError};
use crate::workspace::Workspace;

/// Errors for fetching and extracting a release
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid release archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive entry escapes extraction root: {0}")]
    UnsafeEntry(String),

    #[error("archive did not contain expected directory {0}")]
    MissingSourceDir(PathBuf),
}

impl FetchError {
    /// Whether this error was raised before any download was attempted
    pub fn is_configuration(&self) -> bool {
        matches!(self, FetchError::Registry(_))
    }
}

/// Download and extract `version`, returning the extracted source tree.
///
/// The registry check happens first so an unsupported version never
/// reaches the transport or touches the filesystem. Any stale directory
/// from a previous run is removed before extraction.
pub fn fetch_release(
    workspace: &Workspace,
    transport: &dyn HttpTransport,
    version: &str,
) -> Result<PathBuf, FetchError> {
    let registry = Registry::load(&workspace.registry_path())?;
    registry.ensure_supported(version)?;

    let url = workspace.download_url(version);
    info!("Downloading pygame-ce v{}...", version);
    debug!(%url, "requesting release archive");
    let body = transport.get(&url)?;
    debug!(bytes = body.len(), "download complete");

    let source_dir = workspace.source_dir(version);
    if source_dir.exists() {
        debug!(path = %source_dir.display(), "removing stale source tree");
        fs::remove_dir_all(&source_dir).map_err(|source| FetchError::Io {
            path: source_dir.clone(),
            source,
        })?;
    }

    info!("Extracting...");
    let extracted = extract_zip(&body, workspace.root())?;
    debug!(entries = extracted, "archive extracted");

    if !source_dir.is_dir() {
        return Err(FetchError::MissingSourceDir(source_dir));
    }

    info!("pygame-ce v{} fetched.", version);
    Ok(source_dir)
}

/// Extract zip bytes under `dest`, returning the number of entries written
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<usize, FetchError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => return Err(FetchError::UnsafeEntry(entry.name().to_string())),
        };
        let out_path = dest.join(&relative);
        let io_error = |source| FetchError::Io {
            path: out_path.clone(),
            source,
        };

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(io_error)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let mut file = File::create(&out_path).map_err(io_error)?;
        io::copy(&mut entry, &mut file).map_err(io_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o777))
                    .map_err(io_error)?;
            }
        }
    }

    Ok(archive.len())
}
