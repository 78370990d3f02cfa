//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;
use tracing::{debug, debug_span};

use crate::gshut::PolicySnapshot;
use crate::verdict::PolicyResult;

// Policy debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    RouteImport(&'a str, &'a IpNetwork, &'a PolicyResult),
    RouteExport(&'a str, &'a IpNetwork, &'a PolicyResult),
    SnapshotCommit(&'a PolicySnapshot),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::RouteImport(peer, prefix, result) => {
                debug_span!("peer", name = %peer).in_scope(|| {
                    debug_span!("import").in_scope(|| {
                        log_result(prefix, result, self);
                    })
                });
            }
            Debug::RouteExport(peer, prefix, result) => {
                debug_span!("peer", name = %peer).in_scope(|| {
                    debug_span!("export").in_scope(|| {
                        log_result(prefix, result, self);
                    })
                });
            }
            Debug::SnapshotCommit(snapshot) => {
                let version = snapshot.version();
                let global = snapshot.global();
                let peers = snapshot.peers();
                debug!(%version, %global, ?peers, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::RouteImport(_, _, result)
            | Debug::RouteExport(_, _, result) => match result {
                PolicyResult::Accept(_) => write!(f, "route accepted"),
                PolicyResult::Downgrade(..) => write!(f, "route downgraded"),
                PolicyResult::Reject(_) => write!(f, "route rejected"),
            },
            Debug::SnapshotCommit(..) => {
                write!(f, "graceful shutdown snapshot committed")
            }
        }
    }
}

// ===== helper functions =====

fn log_result(prefix: &IpNetwork, result: &PolicyResult, msg: &Debug<'_>) {
    match result {
        PolicyResult::Accept(route) => {
            let prefix_type = route.prefix_type;
            debug!(%prefix, %prefix_type, "{}", msg);
        }
        PolicyResult::Downgrade(route, reason) => {
            let prefix_type = route.prefix_type;
            debug!(%prefix, %prefix_type, %reason, "{}", msg);
        }
        PolicyResult::Reject(reason) => {
            debug!(%prefix, %reason, "{}", msg);
        }
    }
}
