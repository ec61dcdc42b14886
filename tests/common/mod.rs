//! Shared helpers for provisioning integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Write an executable shell script standing in for the extraction tool.
#[cfg(unix)]
pub fn write_fake_tool(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake7z");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Script body mimicking `7z x <archive> -o<dest> -aos`: creates a directory
/// named after the archive stem under the destination.
pub const EXTRACT_BODY: &str = r#"archive=$2
dest=${3#-o}
stem=$(basename "$archive")
stem=${stem%.*}
mkdir -p "$dest/$stem""#;

/// Fake tool that extracts like [`EXTRACT_BODY`].
#[cfg(unix)]
pub fn write_extracting_tool(dir: &Path) -> PathBuf {
    write_fake_tool(dir, EXTRACT_BODY)
}

/// Fake tool that records each invocation in `count_file` before extracting.
#[cfg(unix)]
pub fn write_counting_tool(dir: &Path, count_file: &Path) -> PathBuf {
    write_fake_tool(
        dir,
        &format!("echo run >> \"{}\"\n{EXTRACT_BODY}", count_file.display()),
    )
}

/// Fake tool that records each invocation and always exits non-zero.
#[cfg(unix)]
pub fn write_failing_tool(dir: &Path, count_file: &Path) -> PathBuf {
    write_fake_tool(
        dir,
        &format!("echo run >> \"{}\"\nexit 2", count_file.display()),
    )
}

/// Number of times a counting tool ran.
pub fn invocation_count(count_file: &Path) -> usize {
    std::fs::read_to_string(count_file)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}
