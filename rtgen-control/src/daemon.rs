//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::debug::Debug;
use crate::error::{Error, IoError};

// Marker printed by `birdc show status` once the daemon is fully up.
const BIRD_STATUS_UP: &str = "Daemon is up and running";
// Prefix of the messages printed by `birdc configure` on success
// ("Reconfigured", "Reconfiguration in progress").
const BIRD_CONFIGURE_OK: &str = "Reconfigur";

// Control interface of the routing daemon.
pub trait DaemonControl {
    // Asks the daemon to reload its configuration.
    fn reload(&self) -> impl Future<Output = Result<(), Error>> + Send;

    // Queries whether the daemon is up.
    fn status(
        &self,
    ) -> impl Future<Output = Result<DaemonStatus, Error>> + Send;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DaemonStatus {
    Up,
    NotReady(String),
}

// Readiness poll parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RetryCfg {
    pub attempts: u32,
    pub interval: Duration,
}

// BIRD control through the `birdc` client.
#[derive(Clone, Debug)]
pub struct Birdc {
    pub binary: PathBuf,
    pub socket: PathBuf,
}

// ===== impl RetryCfg =====

impl Default for RetryCfg {
    fn default() -> RetryCfg {
        RetryCfg {
            attempts: 10,
            interval: Duration::from_secs(1),
        }
    }
}

// ===== impl Birdc =====

impl Birdc {
    pub fn new(
        binary: impl Into<PathBuf>,
        socket: impl Into<PathBuf>,
    ) -> Birdc {
        Birdc {
            binary: binary.into(),
            socket: socket.into(),
        }
    }

    // Runs a birdc command, returning whether it succeeded along with its
    // output.
    async fn run(&self, args: &[&str]) -> Result<(bool, String), Error> {
        let output = Command::new(&self.binary)
            .arg("-s")
            .arg(&self.socket)
            .args(args)
            .output()
            .await
            .map_err(IoError::DaemonExec)?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((output.status.success(), text))
    }
}

impl DaemonControl for Birdc {
    async fn reload(&self) -> Result<(), Error> {
        let (success, output) = self.run(&["configure"]).await?;
        if !success || !output.contains(BIRD_CONFIGURE_OK) {
            return Err(Error::ReloadFailed(output.trim().to_owned()));
        }

        Ok(())
    }

    async fn status(&self) -> Result<DaemonStatus, Error> {
        let (success, output) = self.run(&["show", "status"]).await?;
        if success && output.contains(BIRD_STATUS_UP) {
            return Ok(DaemonStatus::Up);
        }

        let reason = output.lines().next().unwrap_or_default().to_owned();
        Ok(DaemonStatus::NotReady(reason))
    }
}

// ===== global functions =====

// Polls the daemon until it reports being up, for a bounded number of
// attempts.
//
// A daemon that isn't up yet, or that can't be queried, is retried after
// the configured interval.
pub async fn wait_ready<D>(daemon: &D, retry: &RetryCfg) -> Result<(), Error>
where
    D: DaemonControl,
{
    for attempt in 1..=retry.attempts {
        match daemon.status().await {
            Ok(DaemonStatus::Up) => {
                Debug::DaemonUp(attempt).log();
                return Ok(());
            }
            Ok(DaemonStatus::NotReady(reason)) => {
                Debug::DaemonNotReady(attempt, &reason).log();
            }
            Err(error) => {
                error.log();
            }
        }

        if attempt < retry.attempts {
            tokio::time::sleep(retry.interval).await;
        }
    }

    Err(Error::ReloadTimeout(retry.attempts))
}
