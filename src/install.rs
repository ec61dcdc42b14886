//! Package installer.
//!
//! Idempotent sync of a package manifest into a destination tree. Each
//! package is independent: presence of its marker path means it is already
//! installed and is skipped, otherwise the archive is fetched (from the
//! remote drive, or read from the staging mirror in offline mode) and
//! extracted in place. Per-package failures are recorded and the sweep
//! continues; the batch fails as a whole afterwards.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::extract::{ExtractError, Extractor};
use crate::fetch::{self, FetchError};
use crate::manifest::Package;
use crate::output;

/// Errors raised by an installation run.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The extraction tool is not where the configuration says it is.
    /// Nothing was installed.
    #[error("cannot find extraction tool at {}", .0.display())]
    MissingTool(PathBuf),

    /// The destination root could not be created. Nothing was installed.
    #[error("cannot create destination {}: {source}", .path.display())]
    CreateDest {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One or more packages failed; the rest of the batch was still
    /// processed.
    #[error("{} package(s) failed to install: {}", .0.len(), .0.join(", "))]
    PackagesFailed(Vec<String>),
}

/// Per-package failure, recoverable at the batch level.
#[derive(Error, Debug)]
enum PackageError {
    #[error("no remote id and no staging server configured")]
    NoSource,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cannot find archive {}", .0.display())]
    MissingArchive(PathBuf),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("cannot remove downloaded archive {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Install every package of the manifest under the configured destination
/// root.
///
/// Missing tool and uncreatable destination are fatal and reported
/// immediately; everything else is recorded per package and surfaced as
/// [`InstallError::PackagesFailed`] once the whole manifest has been swept.
pub fn install_packages(
    config: &Config,
    packages: &[Package],
    title: &str,
) -> Result<(), InstallError> {
    output::block_start(title, "Start install package");

    if !config.tool.exists() {
        output::error(&format!(
            "cannot find extraction tool at {}",
            config.tool.display()
        ));
        output::block_end(title, "Finished with errors");
        return Err(InstallError::MissingTool(config.tool.clone()));
    }

    if let Err(source) = std::fs::create_dir_all(&config.dest_root) {
        output::error(&format!(
            "cannot create folder {}",
            config.dest_root.display()
        ));
        output::block_end(title, "Finished with errors");
        return Err(InstallError::CreateDest {
            path: config.dest_root.clone(),
            source,
        });
    }
    output::detail(&format!("local: {}", config.dest_root.display()));

    let extractor = Extractor::new(&config.tool);
    let mut failed = Vec::new();
    for package in packages {
        if let Err(err) = install_one(config, &extractor, package) {
            output::error(&format!("{}: {err}", package.archive));
            failed.push(package.archive.clone());
        }
    }

    if failed.is_empty() {
        output::success("packages updated, ready");
        output::block_end(title, "End");
        Ok(())
    } else {
        output::block_end(title, "Finished with errors");
        Err(InstallError::PackagesFailed(failed))
    }
}

fn install_one(
    config: &Config,
    extractor: &Extractor,
    package: &Package,
) -> Result<(), PackageError> {
    if package.marker_path(&config.dest_root).exists() {
        output::skip(&format!(
            "{} already installed, skipping",
            package.install_name()
        ));
        return Ok(());
    }
    output::detail(&format!("get package {}", package.archive));

    // Offline mode reads the archive straight from the mirror; online mode
    // downloads it next to the destination and cleans it up afterwards.
    let (archive_path, downloaded) = match &config.staging {
        Some(staging) => (staging.join(&package.archive), false),
        None => {
            let id = package.remote_id.as_deref().ok_or(PackageError::NoSource)?;
            let dest = config.dest_root.join(&package.archive);
            fetch::fetch(id, &dest)?;
            (dest, true)
        }
    };

    if !archive_path.exists() {
        return Err(PackageError::MissingArchive(archive_path));
    }

    extractor.extract(&archive_path, &config.dest_root)?;

    if downloaded {
        std::fs::remove_file(&archive_path).map_err(|source| PackageError::Cleanup {
            path: archive_path.clone(),
            source,
        })?;
    }

    Ok(())
}
