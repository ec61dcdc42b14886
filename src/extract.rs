//! Archive extractor adapter.
//!
//! Wraps the external decompression tool. The tool is invoked as
//! `tool x <archive> -o<dest> -aos` (extract, overwrite-all, skip existing)
//! with its output suppressed, bounded by an escalating timeout and retried
//! on failure. The destination is not cleaned between attempts; the tool's
//! overwrite semantics make a retry over a half-finished tree converge.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

use crate::output;

/// Timeout for the first extraction attempt.
const BASE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Added to the timeout on each retry.
const TIMEOUT_STEP: Duration = Duration::from_secs(5 * 60);

/// Total number of attempts before giving up.
const MAX_ATTEMPTS: u32 = 3;

/// Errors raised by a failed extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot launch extraction tool {}: {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        source: std::io::Error,
    },

    #[error("failed waiting for extraction tool: {0}")]
    Wait(#[from] std::io::Error),

    #[error("extracting {archive} timed out after {}s", .timeout.as_secs())]
    Timeout { archive: String, timeout: Duration },

    #[error("extracting {archive} failed with exit code {code:?}")]
    Failed { archive: String, code: Option<i32> },
}

/// External extraction tool with its retry schedule.
#[derive(Debug, Clone)]
pub struct Extractor {
    tool: PathBuf,
    base_timeout: Duration,
    timeout_step: Duration,
    max_attempts: u32,
}

impl Extractor {
    /// Create an extractor for the given tool with the production schedule.
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            base_timeout: BASE_TIMEOUT,
            timeout_step: TIMEOUT_STEP,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Set the first attempt's timeout.
    pub fn base_timeout(mut self, timeout: Duration) -> Self {
        self.base_timeout = timeout;
        self
    }

    /// Set the per-retry timeout increment.
    pub fn timeout_step(mut self, step: Duration) -> Self {
        self.timeout_step = step;
        self
    }

    /// Extract `archive` into `dest`, retrying with a growing timeout.
    pub fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ExtractError> {
        let name = archive.display();
        let mut attempt = 0;
        loop {
            let timeout = self.timeout_for_attempt(attempt);
            match self.run_tool(archive, dest, timeout) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        output::error(&format!("extraction of {name} gave up: {err}"));
                        return Err(err);
                    }
                    output::warning(&format!(
                        "extraction of {name} failed ({err}), retrying ({}/{})",
                        attempt + 1,
                        self.max_attempts
                    ));
                }
            }
        }
    }

    fn timeout_for_attempt(&self, attempt: u32) -> Duration {
        self.base_timeout + self.timeout_step * attempt
    }

    fn run_tool(&self, archive: &Path, dest: &Path, timeout: Duration) -> Result<(), ExtractError> {
        let mut child = Command::new(&self.tool)
            .arg("x")
            .arg(archive)
            .arg(format!("-o{}", dest.display()))
            .arg("-aos")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ExtractError::Spawn {
                tool: self.tool.clone(),
                source,
            })?;

        match child.wait_timeout(timeout)? {
            Some(status) if status.success() => Ok(()),
            Some(status) => Err(ExtractError::Failed {
                archive: archive.display().to_string(),
                code: status.code(),
            }),
            None => {
                child.kill().ok();
                child.wait()?;
                Err(ExtractError::Timeout {
                    archive: archive.display().to_string(),
                    timeout,
                })
            }
        }
    }
}
