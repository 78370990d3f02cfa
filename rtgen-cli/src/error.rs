//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::error;

// Command errors.
#[derive(Debug)]
pub enum Error {
    ConfigParse(toml::de::Error),
    Policy(rtgen_policy::error::Error),
    Control(rtgen_control::error::Error),
    Input(std::io::Error),
    Json(serde_json::Error),
    Database(pickledb::error::Error),
}

// ===== impl Error =====

impl Error {
    pub(crate) fn log(&self) {
        match self {
            Error::Policy(error) => error.log(),
            Error::Control(error) => error.log(),
            Error::ConfigParse(error) => {
                error!(%error, "{}", self);
            }
            Error::Input(error) => {
                error!(%error, "{}", self);
            }
            Error::Json(error) => {
                error!(%error, "{}", self);
            }
            Error::Database(error) => {
                error!(%error, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ConfigParse(..) => {
                write!(f, "failed to parse configuration file")
            }
            Error::Policy(error) => std::fmt::Display::fmt(error, f),
            Error::Control(error) => std::fmt::Display::fmt(error, f),
            Error::Input(..) => write!(f, "failed to read route input"),
            Error::Json(..) => write!(f, "invalid route input"),
            Error::Database(..) => {
                write!(f, "non-volatile storage error")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConfigParse(error) => Some(error),
            Error::Policy(error) => Some(error),
            Error::Control(error) => Some(error),
            Error::Input(error) => Some(error),
            Error::Json(error) => Some(error),
            Error::Database(error) => Some(error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Error {
        Error::ConfigParse(error)
    }
}

impl From<rtgen_policy::error::Error> for Error {
    fn from(error: rtgen_policy::error::Error) -> Error {
        Error::Policy(error)
    }
}

impl From<rtgen_control::error::Error> for Error {
    fn from(error: rtgen_control::error::Error) -> Error {
        Error::Control(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Error {
        Error::Json(error)
    }
}

impl From<pickledb::error::Error> for Error {
    fn from(error: pickledb::error::Error) -> Error {
        Error::Database(error)
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
