//! Leftover-stack sweeper.
//!
//! The sweeper is designed for test suites that provision real resources. A
//! crashed run can leave a stack directory with recorded state behind; the
//! sweeper finds such directories under a root, destroys what they track,
//! and fails if anything still remains afterwards.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Deserialize;
use thiserror::Error;

use crate::options::StackOptions;
use crate::runner::CommandRunner;
use crate::verify::{Verifier, VerifyError};

/// Environment variable naming the root directory to sweep.
pub const SWEEP_ROOT_ENV: &str = "SPROBA_SWEEP_ROOT";

/// State file name the provisioning tool records resources in.
pub const DEFAULT_STATE_FILE: &str = "terraform.tfstate";

/// Summary of sweeper work.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweepSummary {
    /// Number of child directories examined.
    pub scanned_dirs: usize,
    /// Number of stacks destroyed during the sweep.
    pub destroyed_stacks: usize,
}

/// Errors returned by the sweeper.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SweepError {
    /// Raised when the sweeper configuration is missing required values.
    #[error("missing {field}")]
    InvalidConfig {
        /// Name of the missing or invalid field.
        field: String,
    },
    /// Raised when the root directory cannot be listed.
    #[error("failed to scan {path}: {message}")]
    Scan {
        /// Root path that could not be read.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when a state file exists but cannot be read or parsed.
    #[error("failed to read state in {path}: {message}")]
    State {
        /// Stack directory whose state file is unusable.
        path: Utf8PathBuf,
        /// Read or parse error message.
        message: String,
    },
    /// Raised when destroying a dirty stack fails.
    #[error(transparent)]
    Destroy(#[from] VerifyError),
    /// Raised when stacks still track resources after the sweep.
    #[error("stacks remain after sweep: {message}")]
    NotClean {
        /// Human-readable description of what remains.
        message: String,
    },
}

/// Minimal view of a recorded state document.
#[derive(Debug, Deserialize)]
struct StateDoc {
    #[serde(default)]
    resources: Vec<serde_json::Value>,
}

struct ScanReport {
    scanned: usize,
    dirty: Vec<Utf8PathBuf>,
}

/// Destroys leftover stacks found under a root directory.
#[derive(Clone, Debug)]
pub struct Sweeper<R: CommandRunner> {
    verifier: Verifier<R>,
    root: Utf8PathBuf,
}

impl<R: CommandRunner> Sweeper<R> {
    /// Creates a sweeper over the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::InvalidConfig`] when the root path is blank.
    pub fn new(verifier: Verifier<R>, root: impl Into<Utf8PathBuf>) -> Result<Self, SweepError> {
        let trimmed_root = Utf8PathBuf::from(root.into().as_str().trim());
        if trimmed_root.as_str().is_empty() {
            return Err(SweepError::InvalidConfig {
                field: String::from("root"),
            });
        }
        Ok(Self {
            verifier,
            root: trimmed_root,
        })
    }

    /// Returns the root directory being swept.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Lists child directories whose state files still track resources.
    ///
    /// Directories are returned in sorted order for deterministic output.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Scan`] when the root cannot be listed and
    /// [`SweepError::State`] when a state file cannot be read or parsed.
    pub fn dirty_stacks(&self) -> Result<Vec<Utf8PathBuf>, SweepError> {
        self.scan().map(|report| report.dirty)
    }

    /// Destroys every dirty stack and verifies the root is clean afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError`] when scanning fails, a destroy fails, or dirty
    /// stacks remain after destruction.
    pub fn sweep(&self) -> Result<SweepSummary, SweepError> {
        let report = self.scan()?;

        let mut destroyed_stacks = 0;
        for dir in &report.dirty {
            self.destroy_stack(dir)?;
            destroyed_stacks += 1;
        }

        let remaining = self.dirty_stacks()?;
        if !remaining.is_empty() {
            let listing = remaining
                .iter()
                .map(|path| path.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SweepError::NotClean { message: listing });
        }

        Ok(SweepSummary {
            scanned_dirs: report.scanned,
            destroyed_stacks,
        })
    }

    fn destroy_stack(&self, dir: &Utf8Path) -> Result<(), SweepError> {
        let options = StackOptions::builder()
            .dir(dir)
            .retry(self.verifier.config().retry_policy())
            .build()
            .map_err(VerifyError::from)?;
        self.verifier.destroy(&options)?;
        Ok(())
    }

    fn scan(&self) -> Result<ScanReport, SweepError> {
        let entries = self.root.read_dir_utf8().map_err(|err| SweepError::Scan {
            path: self.root.clone(),
            message: err.to_string(),
        })?;

        let mut dirs = Vec::new();
        for entry_result in entries {
            let entry = entry_result.map_err(|err| SweepError::Scan {
                path: self.root.clone(),
                message: err.to_string(),
            })?;
            let file_type = entry.file_type().map_err(|err| SweepError::Scan {
                path: self.root.clone(),
                message: err.to_string(),
            })?;
            if file_type.is_dir() {
                dirs.push(entry.into_path());
            }
        }
        dirs.sort();

        let scanned = dirs.len();
        let mut dirty = Vec::new();
        for dir in dirs {
            if Self::tracks_resources(&dir)? {
                dirty.push(dir);
            }
        }

        Ok(ScanReport { scanned, dirty })
    }

    /// Reads a directory's state file and reports whether resources remain.
    ///
    /// A missing state file means the directory was never applied or was
    /// fully destroyed, so it counts as clean.
    fn tracks_resources(dir: &Utf8Path) -> Result<bool, SweepError> {
        let handle =
            Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| SweepError::State {
                path: dir.to_owned(),
                message: err.to_string(),
            })?;
        let raw = match handle.read_to_string(DEFAULT_STATE_FILE) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => {
                return Err(SweepError::State {
                    path: dir.to_owned(),
                    message: err.to_string(),
                });
            }
        };
        let doc: StateDoc = serde_json::from_str(&raw).map_err(|err| SweepError::State {
            path: dir.to_owned(),
            message: err.to_string(),
        })?;
        Ok(!doc.resources.is_empty())
    }
}
