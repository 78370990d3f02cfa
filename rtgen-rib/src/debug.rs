//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;
use rtgen_utils::route::Route;
use tracing::{debug, debug_span};

use crate::rib::TableName;

// RIB debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    TableMerged(&'a TableName, usize),
    BestPathFound(&'a TableName, &'a IpNetwork, &'a Route),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::TableMerged(table, prefixes) => {
                debug_span!("table", name = %table).in_scope(|| {
                    debug!(%prefixes, "{}", self);
                });
            }
            Debug::BestPathFound(table, prefix, route) => {
                debug_span!("table", name = %table).in_scope(|| {
                    let protocol = &route.protocol;
                    let instance = &route.instance;
                    debug!(%prefix, %protocol, %instance, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::TableMerged(..) => {
                write!(f, "table merged")
            }
            Debug::BestPathFound(..) => {
                write!(f, "best path found")
            }
        }
    }
}
