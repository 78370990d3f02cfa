//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![allow(clippy::derivable_impls)]

use std::time::Duration;

use rtgen_control::daemon::RetryCfg;
use rtgen_policy::config::PolicyCfg;
use rtgen_rib::rib::RedistributeCfg;
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database_path: String,
    pub logging: Logging,
    pub bird: Bird,
    pub policy: PolicyCfg,
    pub redistribute: RedistributeCfg,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: LoggingFile,
    pub stderr: LoggingStderr,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFile {
    pub enabled: bool,
    pub dir: String,
    pub name: String,
    pub rotation: LoggingFileRotation,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingStderr {
    pub enabled: bool,
    #[serde(flatten)]
    pub fmt: LoggingFmt,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingFmt {
    pub style: LoggingFmtStyle,
    pub colors: bool,
    pub show_thread_id: bool,
    pub show_source: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFileRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFmtStyle {
    Compact,
    Full,
    Json,
    Pretty,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bird {
    pub birdc: String,
    pub socket: String,
    pub policy_file: String,
    pub reload_attempts: u32,
    pub reload_interval_ms: u64,
}

// ===== impl Config =====

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/rtgen.toml";

    pub(crate) fn load(config_file: Option<&str>) -> Result<Config, Error> {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        match std::fs::read_to_string(config_file) {
            Ok(config_str) => Ok(toml::from_str(&config_str)?),
            Err(err) => {
                eprintln!("Failed to load configuration file: {err}");
                eprintln!("Falling back to default configuration...");
                Ok(Config::default())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            database_path: "/var/opt/rtgen/rtgen.db".to_owned(),
            logging: Default::default(),
            bird: Default::default(),
            policy: Default::default(),
            redistribute: Default::default(),
        }
    }
}

// ===== impl LoggingFile =====

impl Default for LoggingFile {
    fn default() -> LoggingFile {
        LoggingFile {
            enabled: false,
            dir: "/var/log".to_owned(),
            name: "rtgen.log".to_owned(),
            rotation: Default::default(),
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingStderr =====

impl Default for LoggingStderr {
    fn default() -> LoggingStderr {
        LoggingStderr {
            enabled: false,
            fmt: Default::default(),
        }
    }
}

// ===== impl LoggingFmt =====

impl Default for LoggingFmt {
    fn default() -> LoggingFmt {
        LoggingFmt {
            style: LoggingFmtStyle::Full,
            colors: false,
            show_thread_id: false,
            show_source: false,
        }
    }
}

// ===== impl Bird =====

impl Bird {
    pub(crate) fn retry(&self) -> RetryCfg {
        RetryCfg {
            attempts: self.reload_attempts,
            interval: Duration::from_millis(self.reload_interval_ms),
        }
    }
}

impl Default for Bird {
    fn default() -> Bird {
        let retry = RetryCfg::default();
        Bird {
            birdc: "/usr/sbin/birdc".to_owned(),
            socket: "/run/bird/bird.ctl".to_owned(),
            policy_file: "/etc/bird/rtgen.conf".to_owned(),
            reload_attempts: retry.attempts,
            reload_interval_ms: retry.interval.as_millis() as u64,
        }
    }
}
