//! Installer configuration, populated once at the CLI boundary.

use std::path::PathBuf;

/// Configuration for one provisioning run.
///
/// The entry-point binaries build this from environment variables and flags;
/// nothing below the boundary reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Destination root the packages are extracted into.
    pub dest_root: PathBuf,
    /// Offline package staging directory. When set, archives are read from
    /// here instead of being downloaded, and are not deleted afterwards.
    pub staging: Option<PathBuf>,
    /// Path to the external extraction tool.
    pub tool: PathBuf,
    /// Continuous-integration logging mode.
    pub ci: bool,
}

impl Config {
    /// Create a configuration for the given destination root, with the
    /// default extraction tool.
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            dest_root: dest_root.into(),
            staging: None,
            tool: default_tool_path(),
            ci: false,
        }
    }

    /// Set the offline staging directory.
    pub fn staging(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging = Some(dir.into());
        self
    }

    /// Set the extraction tool path.
    pub fn tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.tool = tool.into();
        self
    }

    /// Set CI logging mode.
    pub fn ci(mut self, ci: bool) -> Self {
        self.ci = ci;
        self
    }
}

/// Default install location of the 7-Zip executable.
pub fn default_tool_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\7-Zip\7z.exe")
    } else {
        PathBuf::from("/usr/bin/7z")
    }
}
