//! DLL stager.
//!
//! Copies the shared libraries declared by the manifest into the binary
//! output folders (`Release64`, `Profile64` and optionally `Debug64`) next
//! to the SDK tree. A stateless linear sweep: each copy short-circuits when
//! the destination is already newer than the source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::manifest::Package;
use crate::output;

const CONFIG_RELEASE: &str = "Release64";
const CONFIG_PROFILE: &str = "Profile64";
const CONFIG_DEBUG: &str = "Debug64";

/// A destination newer than its source by more than this is considered
/// already staged.
const STALE_TOLERANCE: Duration = Duration::from_secs(1);

/// Errors raised by a staging run.
#[derive(Error, Debug)]
pub enum StageError {
    /// A binary output folder could not be created. Nothing was staged.
    #[error("cannot create binary output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One or more DLL payloads failed to copy; the rest of the batch was
    /// still processed.
    #[error("{} DLL payload(s) failed to stage: {}", .0.len(), .0.join(", "))]
    DllsFailed(Vec<String>),
}

/// Per-file copy failure.
#[derive(Error, Debug)]
enum CopyError {
    #[error("cannot find DLL {}, is the package path correct?", .0.display())]
    MissingSource(PathBuf),

    #[error("no permission to copy {}: {source}", .path.display())]
    Permission {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Copy every declared DLL payload of the manifest into the binary output
/// folders beside `sdk_root`.
///
/// Per-payload failures are logged and recorded, and the sweep continues;
/// they surface as [`StageError::DllsFailed`] at the end.
pub fn stage_dlls(
    sdk_root: &Path,
    packages: &[Package],
    include_debug: bool,
    title: &str,
) -> Result<(), StageError> {
    output::block_start(title, "Start copy DLL into binary folder");

    let bin_dir = sdk_root
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("Bin");
    let release_dir = bin_dir.join(CONFIG_RELEASE);
    let profile_dir = bin_dir.join(CONFIG_PROFILE);
    let debug_dir = bin_dir.join(CONFIG_DEBUG);

    let mut targets = vec![&release_dir, &profile_dir];
    if include_debug {
        targets.push(&debug_dir);
    }
    for dir in targets {
        if let Err(source) = std::fs::create_dir_all(dir) {
            output::error(&format!("cannot create folder {}", dir.display()));
            output::block_end(title, "Finished with errors");
            return Err(StageError::CreateDir {
                path: dir.clone(),
                source,
            });
        }
    }

    let mut failed = Vec::new();
    for package in packages {
        let Some(dlls) = &package.dlls else { continue };
        let Some(src_dir) = package.dll_source_dir(sdk_root) else {
            continue;
        };

        // Release and Profile share the release binary; a failure stops the
        // remaining copies for this package only.
        let result = copy_if_needed(&dlls.release, &src_dir, &release_dir)
            .and_then(|()| copy_if_needed(&dlls.release, &src_dir, &profile_dir))
            .and_then(|()| {
                if include_debug {
                    copy_if_needed(&dlls.debug, &src_dir, &debug_dir)
                } else {
                    Ok(())
                }
            });

        if let Err(err) = result {
            output::error(&format!("{}: {err}", package.archive));
            failed.push(package.archive.clone());
        }
    }

    if failed.is_empty() {
        output::success("DLL copy ready");
        output::block_end(title, "End");
        Ok(())
    } else {
        output::block_end(title, "Finished with errors");
        Err(StageError::DllsFailed(failed))
    }
}

fn copy_if_needed(file: &str, src_dir: &Path, dest_dir: &Path) -> Result<(), CopyError> {
    let src = src_dir.join(file);
    if !src.exists() {
        return Err(CopyError::MissingSource(src));
    }

    let dest = dest_dir.join(file);
    if is_up_to_date(&src, &dest) {
        output::skip(&format!("skip up-to-date {file}"));
        return Ok(());
    }

    match std::fs::copy(&src, &dest) {
        Ok(_) => {
            output::success(&format!("DLL copied: {file}"));
            Ok(())
        }
        Err(source) if source.kind() == ErrorKind::PermissionDenied => {
            Err(CopyError::Permission { path: dest, source })
        }
        Err(source) => Err(CopyError::Copy { path: dest, source }),
    }
}

/// A destination strictly newer than the source by more than the tolerance
/// is already staged (and may be the source itself when the manifest maps a
/// package onto its own tree).
fn is_up_to_date(src: &Path, dest: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).ok()?.modified().ok();
    match (modified(dest), modified(src)) {
        (Some(dest_time), Some(src_time)) => match dest_time.duration_since(src_time) {
            Ok(age) => age > STALE_TOLERANCE,
            Err(_) => false,
        },
        _ => false,
    }
}
