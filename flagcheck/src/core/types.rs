//! Shared deterministic types for constraint evaluation.
//!
//! These types define the contract between constraint functions, the flag
//! store, and the validation pass. They carry no I/O and no global state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation mode, threaded explicitly into every constraint call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Report violations; never touch the store.
    #[default]
    Strict,
    /// Substitute the nearest acceptable value and announce the substitution.
    AutoCorrect,
}

impl Mode {
    pub fn corrects(self) -> bool {
        matches!(self, Mode::AutoCorrect)
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::AutoCorrect => "auto-correct",
        }
    }
}

/// Semantic type of a flag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Int,
    Uint,
    Bool,
    List,
}

impl FlagKind {
    pub fn label(self) -> &'static str {
        match self {
            FlagKind::Int => "signed integer",
            FlagKind::Uint => "unsigned integer",
            FlagKind::Bool => "boolean",
            FlagKind::List => "list",
        }
    }
}

/// A decoded flag value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Int(i64),
    Uint(u64),
    Bool(bool),
    /// Delimited list, kept verbatim.
    List(String),
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Int(_) => FlagKind::Int,
            FlagValue::Uint(_) => FlagKind::Uint,
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::List(_) => FlagKind::List,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FlagValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            FlagValue::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&str> {
        match self {
            FlagValue::List(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Int(value) => write!(f, "{value}"),
            FlagValue::Uint(value) => write!(f, "{value}"),
            FlagValue::Bool(value) => write!(f, "{value}"),
            FlagValue::List(value) => write!(f, "\"{value}\""),
        }
    }
}

/// Where a flag's current value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlagOrigin {
    #[default]
    Default,
    /// Explicitly set by the user.
    CommandLine,
    ConfigFile,
    /// Chosen by the runtime from the machine's resources.
    Ergonomic,
}

/// The single validation error kind.
///
/// `value` is the offending value; it is `None` only when a flag the
/// constraint reads is missing from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{reason}")]
pub struct ConstraintViolation {
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FlagValue>,
    pub reason: String,
}

impl ConstraintViolation {
    pub fn new(flag: &str, value: FlagValue, reason: impl Into<String>) -> Self {
        Self {
            flag: flag.to_string(),
            value: Some(value),
            reason: reason.into(),
        }
    }

    /// A flag could not be read as `expected`.
    pub fn unreadable(flag: &str, expected: FlagKind, found: Option<FlagValue>) -> Self {
        let reason = match &found {
            None => format!("{flag} is not set"),
            Some(value) => format!(
                "{flag} holds a {} value, expected a {}",
                value.kind().label(),
                expected.label()
            ),
        };
        Self {
            flag: flag.to_string(),
            value: found,
            reason,
        }
    }
}

/// `Ok(())` is *satisfied*; `Err` is *violated*.
pub type ConstraintResult = Result<(), ConstraintViolation>;
