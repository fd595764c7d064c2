use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Invalid or insufficient input at a session or group-building boundary.
    Configuration,
    /// The operation is not available in the current phase or for the given target.
    InvalidOperation,
    /// Failure surfaced verbatim from the class store.
    Persistence,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration error",
            Self::InvalidOperation => "invalid operation",
            Self::Persistence => "persistence error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct JigsawError {
    pub code: ErrorCode,
    pub message: String,
}

impl JigsawError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidOperation, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Persistence, message)
    }
}

pub type Result<T, E = JigsawError> = std::result::Result<T, E>;
