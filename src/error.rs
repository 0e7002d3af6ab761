//! Crate error type
//!
//! Losing a session is not an error: it is the `GameOver` outcome. Errors here
//! are host contract violations and configuration problems.

use std::fmt;

use crate::sim::Phase;

#[derive(Debug)]
pub enum Error {
    /// `start` is only accepted from `Idle`
    StartNotAllowed(Phase),
    /// `retry` is only accepted from `Victory` or `GameOver`
    RetryNotAllowed(Phase),
    /// Tuning failed validation
    InvalidTuning(String),
    /// Tuning file could not be read
    Io(std::io::Error),
    /// Tuning file is not valid JSON for `Tuning`
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StartNotAllowed(phase) => {
                write!(f, "cannot start a session while {phase:?}; reset first")
            }
            Error::RetryNotAllowed(phase) => {
                write!(f, "retry is only valid after Victory or GameOver (currently {phase:?})")
            }
            Error::InvalidTuning(reason) => write!(f, "invalid tuning: {reason}"),
            Error::Io(e) => write!(f, "failed to read tuning: {e}"),
            Error::Json(e) => write!(f, "failed to parse tuning: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
