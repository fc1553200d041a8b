//! Typed input parameter values for the provisioning tool.
//!
//! The tool accepts `-var name=value` pairs where the value is a string,
//! integer, or boolean literal. This module defines the tagged value type,
//! its command-line rendering, and the `NAME=VALUE` parsing used by the CLI.

use std::fmt;

use thiserror::Error;

/// A single input parameter value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VarValue {
    /// String literal, passed through verbatim (for example `"2G"`).
    Str(String),
    /// Signed integer literal.
    Int(i64),
    /// Boolean literal, rendered as `true`/`false`.
    Bool(bool),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for VarValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for VarValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Errors raised while parsing a `NAME=VALUE` argument.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VarParseError {
    /// Raised when the argument contains no `=` separator.
    #[error("expected NAME=VALUE, got `{raw}`")]
    MissingSeparator {
        /// Argument as supplied.
        raw: String,
    },
    /// Raised when the name before `=` is empty or only whitespace.
    #[error("variable name must not be blank in `{raw}`")]
    BlankName {
        /// Argument as supplied.
        raw: String,
    },
}

/// Parses a `NAME=VALUE` pair, classifying the value as the narrowest
/// matching literal type.
///
/// Exact `true`/`false` become booleans and values that round-trip through
/// `i64` become integers (so `007` stays a string and keeps its zeros);
/// everything else is passed through as a string. The first `=` splits name
/// from value, so values may themselves contain `=`.
///
/// # Errors
///
/// Returns [`VarParseError`] when the separator is missing or the name is
/// blank.
pub fn parse_var_arg(raw: &str) -> Result<(String, VarValue), VarParseError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(VarParseError::MissingSeparator {
            raw: raw.to_owned(),
        });
    };

    let trimmed_name = name.trim();
    if trimmed_name.is_empty() {
        return Err(VarParseError::BlankName {
            raw: raw.to_owned(),
        });
    }

    Ok((trimmed_name.to_owned(), classify_value(value)))
}

fn classify_value(value: &str) -> VarValue {
    match value {
        "true" => return VarValue::Bool(true),
        "false" => return VarValue::Bool(false),
        _ => {}
    }

    if let Ok(number) = value.parse::<i64>()
        && number.to_string() == value
    {
        return VarValue::Int(number);
    }

    VarValue::Str(value.to_owned())
}
