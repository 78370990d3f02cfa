//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{error, warn};

// Control-plane errors.
#[derive(Debug)]
pub enum Error {
    Policy(rtgen_policy::error::Error),
    Io(IoError),
    ReloadFailed(String),
    ReloadTimeout(u32),
}

// I/O errors.
#[derive(Debug)]
pub enum IoError {
    PolicyWrite(std::io::Error),
    PolicyRestore(std::io::Error),
    DaemonExec(std::io::Error),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::Policy(error) => {
                error.log();
            }
            Error::Io(error) => {
                error.log();
            }
            Error::ReloadFailed(output) => {
                error!(%output, "{}", self);
            }
            Error::ReloadTimeout(attempts) => {
                warn!(%attempts, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Policy(error) => std::fmt::Display::fmt(error, f),
            Error::Io(error) => std::fmt::Display::fmt(error, f),
            Error::ReloadFailed(..) => {
                write!(f, "routing daemon rejected the new configuration")
            }
            Error::ReloadTimeout(..) => {
                write!(f, "routing daemon didn't come up after reload")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Policy(error) => Some(error),
            Error::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<rtgen_policy::error::Error> for Error {
    fn from(error: rtgen_policy::error::Error) -> Error {
        Error::Policy(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::Io(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub(crate) fn log(&self) {
        match self {
            IoError::PolicyWrite(error)
            | IoError::PolicyRestore(error)
            | IoError::DaemonExec(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::PolicyWrite(..) => {
                write!(f, "failed to write policy file")
            }
            IoError::PolicyRestore(..) => {
                write!(f, "failed to restore previous policy file")
            }
            IoError::DaemonExec(..) => {
                write!(f, "failed to run routing daemon control command")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::PolicyWrite(error)
            | IoError::PolicyRestore(error)
            | IoError::DaemonExec(error) => Some(error),
        }
    }
}

// ===== global functions =====

pub(crate) fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
