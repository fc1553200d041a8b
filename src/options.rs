//! Stack options: the per-scenario handle passed to every phase.
//!
//! A [`StackOptions`] value names the target configuration directory, the
//! input variables supplied to it, whether colour codes are suppressed, and
//! the retry policy applied to phase invocations. It is immutable once
//! built and owned by a single scenario.

use std::collections::BTreeMap;
use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::retry::RetryPolicy;
use crate::vars::VarValue;

/// Errors raised while building or validating stack options.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OptionsError {
    /// Raised when a required field is missing or empty.
    #[error("missing or empty field: {0}")]
    Validation(String),
}

/// Immutable description of one target stack invocation.
#[derive(Clone, Debug)]
pub struct StackOptions {
    dir: Utf8PathBuf,
    vars: BTreeMap<String, VarValue>,
    no_color: bool,
    retry: RetryPolicy,
}

impl StackOptions {
    /// Starts a builder for [`StackOptions`].
    #[must_use]
    pub fn builder() -> StackOptionsBuilder {
        StackOptionsBuilder::new()
    }

    /// Target configuration directory, passed to the tool via `-chdir`.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Input variables in deterministic (name) order.
    #[must_use]
    pub const fn vars(&self) -> &BTreeMap<String, VarValue> {
        &self.vars
    }

    /// Whether colour codes are suppressed in tool output.
    #[must_use]
    pub const fn no_color(&self) -> bool {
        self.no_color
    }

    /// Retry policy applied to each phase invocation.
    #[must_use]
    pub const fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Validates the options, returning a descriptive error when a required
    /// field is missing.
    ///
    /// The variable values themselves are opaque here; schema checks belong
    /// to the tool.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Validation`] when the directory is empty or a
    /// variable name is blank.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.dir.as_str().is_empty() {
            return Err(OptionsError::Validation(String::from("dir")));
        }
        if self.vars.keys().any(|name| name.trim().is_empty()) {
            return Err(OptionsError::Validation(String::from("var name")));
        }
        Ok(())
    }

    /// Renders the input variables as `-var name=value` argument pairs.
    pub(crate) fn var_args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.vars.len() * 2);
        for (name, value) in &self.vars {
            args.push(OsString::from("-var"));
            args.push(OsString::from(format!("{name}={value}")));
        }
        args
    }
}

/// Builder for [`StackOptions`] that defers trimming and validation to
/// construction.
#[derive(Clone, Debug, Default)]
pub struct StackOptionsBuilder {
    dir: Utf8PathBuf,
    vars: BTreeMap<String, VarValue>,
    no_color: Option<bool>,
    retry: Option<RetryPolicy>,
}

impl StackOptionsBuilder {
    /// Creates an empty builder; the directory must be populated before
    /// build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target configuration directory.
    #[must_use]
    pub fn dir(mut self, value: impl Into<Utf8PathBuf>) -> Self {
        self.dir = value.into();
        self
    }

    /// Adds one input variable; setting the same name again replaces the
    /// previous value.
    #[must_use]
    pub fn var(mut self, name: impl Into<String>, value: impl Into<VarValue>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Adds several input variables at once.
    #[must_use]
    pub fn vars(mut self, pairs: impl IntoIterator<Item = (String, VarValue)>) -> Self {
        self.vars.extend(pairs);
        self
    }

    /// Overrides colour suppression; defaults to `true` so tool output is
    /// easy to match in assertions.
    #[must_use]
    pub const fn no_color(mut self, value: bool) -> Self {
        self.no_color = Some(value);
        self
    }

    /// Sets the retry policy; defaults to [`RetryPolicy::none`].
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Uses the default transient-failure retry policy.
    #[must_use]
    pub fn with_transient_retries(self) -> Self {
        self.retry(RetryPolicy::transient_defaults())
    }

    /// Builds and validates the [`StackOptions`], trimming the directory.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::Validation`] when the directory is empty or a
    /// variable name is blank.
    pub fn build(self) -> Result<StackOptions, OptionsError> {
        let options = StackOptions {
            dir: Utf8PathBuf::from(self.dir.as_str().trim()),
            vars: self.vars,
            no_color: self.no_color.unwrap_or(true),
            retry: self.retry.unwrap_or_default(),
        };
        options.validate()?;
        Ok(options)
    }
}

/// Produces a resource name that is unique per call, so concurrently
/// running scenarios never contend for one resource.
#[must_use]
pub fn unique_stack_name(prefix: &str) -> String {
    let trimmed = prefix.trim();
    let base = if trimmed.is_empty() { "sproba" } else { trimmed };
    format!("{base}-{}", Uuid::new_v4().simple())
}
