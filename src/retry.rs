//! Transient failure classification for tool invocations.
//!
//! Provisioning runs fail intermittently for reasons outside the
//! configuration under test: provider registry hiccups, plugin handshake
//! timeouts, reset connections. A [`RetryPolicy`] carries the signatures of
//! those known failure classes so the harness can re-run a phase a bounded
//! number of times instead of failing the whole scenario.

use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::runner::CommandOutput;

/// Total attempts (including the first) made by the default policy.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts used by the default policy.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(5);

/// Known transient failure signatures, as `(pattern, note)` pairs.
///
/// The patterns cover failure text the tool prints for registry, network,
/// and plugin-handshake problems that resolve themselves on a re-run.
const DEFAULT_TRANSIENT_PATTERNS: &[(&str, &str)] = &[
    (
        "could not query provider registry",
        "provider registry unreachable",
    ),
    (
        "(?s)Error installing provider.*(TLS handshake timeout|connection reset by peer)",
        "provider download interrupted",
    ),
    (
        "(?s)Failed to load state.*(tcp|timeout)",
        "state backend timed out",
    ),
    (
        "timeout while waiting for plugin to start",
        "plugin did not start in time",
    ),
    (
        "timed out waiting for server handshake",
        "plugin handshake timed out",
    ),
    (
        "Client\\.Timeout exceeded while awaiting headers",
        "HTTP client timed out",
    ),
    ("connection reset by peer", "connection reset"),
    ("TLS handshake timeout", "TLS handshake timed out"),
];

/// Errors raised while building retry signatures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RetryError {
    /// Raised when a signature pattern is not a valid regular expression.
    #[error("invalid transient signature `{pattern}`: {message}")]
    InvalidPattern {
        /// Pattern as supplied.
        pattern: String,
        /// Regex compiler error text.
        message: String,
    },
}

/// One recognised transient failure class.
#[derive(Clone, Debug)]
pub struct TransientSignature {
    pattern: Regex,
    note: String,
}

impl TransientSignature {
    /// Compiles a signature from a regex pattern and a short human note.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::InvalidPattern`] when the pattern does not
    /// compile.
    pub fn new(pattern: &str, note: impl Into<String>) -> Result<Self, RetryError> {
        let compiled = Regex::new(pattern).map_err(|err| RetryError::InvalidPattern {
            pattern: pattern.to_owned(),
            message: err.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            note: note.into(),
        })
    }

    /// Short human description used when the signature matches.
    #[must_use]
    pub fn note(&self) -> &str {
        &self.note
    }

    fn matches(&self, output: &CommandOutput) -> bool {
        self.pattern.is_match(&output.stderr) || self.pattern.is_match(&output.stdout)
    }
}

/// Bounded retry policy applied to every phase invocation.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    signatures: Vec<TransientSignature>,
}

impl RetryPolicy {
    /// Policy that never retries: one attempt, no recognised signatures.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            signatures: Vec::new(),
        }
    }

    /// Policy recognising the default transient failure classes, retrying
    /// up to [`DEFAULT_MAX_ATTEMPTS`] times with [`DEFAULT_BACKOFF`] between
    /// attempts.
    #[must_use]
    pub fn transient_defaults() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            signatures: default_signatures(),
        }
    }

    /// Overrides the total attempt budget (including the first attempt).
    /// Values below one are clamped to one.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = if max_attempts == 0 { 1 } else { max_attempts };
        self
    }

    /// Overrides the pause between attempts.
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Adds a custom transient signature to the recognised set.
    #[must_use]
    pub fn with_signature(mut self, signature: TransientSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between attempts.
    #[must_use]
    pub const fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Returns the note of the first signature matching the failed output,
    /// or `None` when the failure is not recognised as transient.
    #[must_use]
    pub fn classify(&self, output: &CommandOutput) -> Option<&str> {
        self.signatures
            .iter()
            .find(|signature| signature.matches(output))
            .map(TransientSignature::note)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

#[expect(
    clippy::expect_used,
    reason = "default patterns are compile-time literals exercised by tests"
)]
fn default_signatures() -> Vec<TransientSignature> {
    DEFAULT_TRANSIENT_PATTERNS
        .iter()
        .map(|(pattern, note)| {
            TransientSignature::new(pattern, *note).expect("default transient pattern must compile")
        })
        .collect()
}
