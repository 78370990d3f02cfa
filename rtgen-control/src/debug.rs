//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use tracing::{debug, debug_span};

use crate::reconfigure::ReconfigureOutcome;

// Control-plane debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    PolicyWritten(&'a Path, u64),
    PolicyRestored(&'a Path),
    DaemonUp(u32),
    DaemonNotReady(u32, &'a str),
    ReconfigureDone(u64, ReconfigureOutcome),
    BatchCompiled(usize, usize),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::PolicyWritten(path, version) => {
                let path = path.display();
                debug!(%path, %version, "{}", self);
            }
            Debug::PolicyRestored(path) => {
                let path = path.display();
                debug!(%path, "{}", self);
            }
            Debug::DaemonUp(attempt) => {
                debug_span!("daemon").in_scope(|| {
                    debug!(%attempt, "{}", self);
                });
            }
            Debug::DaemonNotReady(attempt, reason) => {
                debug_span!("daemon").in_scope(|| {
                    debug!(%attempt, %reason, "{}", self);
                });
            }
            Debug::ReconfigureDone(version, outcome) => {
                debug!(%version, ?outcome, "{}", self);
            }
            Debug::BatchCompiled(routes, peers) => {
                debug!(%routes, %peers, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::PolicyWritten(..) => {
                write!(f, "policy file written")
            }
            Debug::PolicyRestored(..) => {
                write!(f, "previous policy file restored")
            }
            Debug::DaemonUp(..) => {
                write!(f, "routing daemon is up")
            }
            Debug::DaemonNotReady(..) => {
                write!(f, "routing daemon not ready")
            }
            Debug::ReconfigureDone(..) => {
                write!(f, "reconfiguration finished")
            }
            Debug::BatchCompiled(..) => {
                write!(f, "route batch compiled")
            }
        }
    }
}
