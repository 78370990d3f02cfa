//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rtgen_policy::config::PolicyContext;
use rtgen_policy::gshut::{GshutController, PolicySnapshot};
use serde::{Deserialize, Serialize};

use crate::daemon::{self, DaemonControl, RetryCfg};
use crate::debug::Debug;
use crate::error::{Error, IoError};
use crate::render;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum ReconfigureOutcome {
    // The daemon reloaded the new policy and reported being up.
    Applied,
    // The daemon accepted the reload but didn't report being up before the
    // poll ran out of attempts.
    Unconfirmed,
}

// Everything a reconfiguration acts upon.
#[derive(Debug)]
pub struct Reconfigure<'a, D> {
    pub ctx: &'a PolicyContext,
    pub controller: &'a GshutController,
    pub daemon: &'a D,
    pub policy_file: &'a Path,
    pub retry: RetryCfg,
}

// ===== impl Reconfigure =====

impl<D> Reconfigure<'_, D>
where
    D: DaemonControl,
{
    // Applies a staged snapshot.
    //
    // The policy file is rewritten as a whole and the daemon reloaded. If
    // the daemon rejects the reload, the previous file is put back and the
    // active snapshot stays as it was. Once the reload is accepted the
    // snapshot is committed, whether or not the daemon reports being up in
    // time. A snapshot that loses the commit to a concurrent one is
    // rolled back like a rejected reload, and the daemon is reloaded again
    // so it runs the restored file.
    pub async fn apply(
        &self,
        snapshot: PolicySnapshot,
    ) -> Result<(Arc<PolicySnapshot>, ReconfigureOutcome), Error> {
        self.controller.check(&snapshot)?;

        let rendered = render::render(self.ctx, &snapshot);
        let previous = tokio::fs::read(self.policy_file).await.ok();

        write_policy(self.policy_file, rendered.as_bytes()).await?;
        Debug::PolicyWritten(self.policy_file, snapshot.version()).log();

        if let Err(error) = self.daemon.reload().await {
            self.restore(previous).await;
            return Err(error);
        }

        let outcome = match daemon::wait_ready(self.daemon, &self.retry).await {
            Ok(()) => ReconfigureOutcome::Applied,
            Err(error) => {
                error.log();
                ReconfigureOutcome::Unconfirmed
            }
        };

        let snapshot = match self.controller.commit(snapshot) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.restore(previous).await;
                if let Err(error) = self.daemon.reload().await {
                    error.log();
                }
                return Err(error.into());
            }
        };
        Debug::ReconfigureDone(snapshot.version(), outcome).log();

        Ok((snapshot, outcome))
    }

    async fn restore(&self, previous: Option<Vec<u8>>) {
        let result = match previous {
            Some(contents) => write_policy(self.policy_file, &contents).await,
            None => tokio::fs::remove_file(self.policy_file)
                .await
                .map_err(|error| Error::Io(IoError::PolicyRestore(error))),
        };
        match result {
            Ok(()) => Debug::PolicyRestored(self.policy_file).log(),
            Err(error) => error.log(),
        }
    }
}

// ===== global functions =====

// Replaces the policy file atomically: the new contents are written to a
// temporary file in the same directory, which is then renamed over the
// original.
pub async fn write_policy(path: &Path, contents: &[u8]) -> Result<(), Error> {
    let tmp_path = tmp_path(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(IoError::PolicyWrite)?;
    if let Err(error) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(IoError::PolicyWrite(error).into());
    }

    Ok(())
}

// ===== helper functions =====

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp_path = OsString::from(path.as_os_str());
    tmp_path.push(".tmp");
    PathBuf::from(tmp_path)
}
