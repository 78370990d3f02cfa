//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_utils::bgp::PeerRole;

use crate::community::{
    FUNC_BLACKHOLE, FUNC_LOCAL_PREF_ADJUST, FUNC_NO_EXPORT_TO, FUNC_PREPEND,
};

// Local preference assigned to routes learned from internal peers that
// don't carry an ingress-role marker.
pub const DFLT_INTERNAL_LOCAL_PREF: u32 = 100;

// Per-role policy baseline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RoleBaseline {
    pub local_pref: u32,
    pub allowed: AllowedFunctions,
}

// Large-community functions, in the local ASN namespace, that a neighbor is
// allowed to set on the routes it sends us.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AllowedFunctions {
    All,
    Only(&'static [u32]),
}

const CUSTOMER_FUNCTIONS: &[u32] = &[
    FUNC_LOCAL_PREF_ADJUST,
    FUNC_PREPEND,
    FUNC_BLACKHOLE,
    FUNC_NO_EXPORT_TO,
];
const NONCUSTOMER_FUNCTIONS: &[u32] = &[FUNC_LOCAL_PREF_ADJUST];

// ===== impl AllowedFunctions =====

impl AllowedFunctions {
    pub fn permits(&self, function: u32) -> bool {
        match self {
            AllowedFunctions::All => true,
            AllowedFunctions::Only(functions) => functions.contains(&function),
        }
    }
}

// ===== global functions =====

// Returns the policy baseline of the given role.
pub fn role_baseline(role: PeerRole) -> RoleBaseline {
    let (local_pref, allowed) = match role {
        PeerRole::Customer => (750, AllowedFunctions::Only(CUSTOMER_FUNCTIONS)),
        PeerRole::Peer => (470, AllowedFunctions::Only(NONCUSTOMER_FUNCTIONS)),
        PeerRole::Transit => {
            (150, AllowedFunctions::Only(NONCUSTOMER_FUNCTIONS))
        }
        PeerRole::RouteServer => {
            (450, AllowedFunctions::Only(NONCUSTOMER_FUNCTIONS))
        }
        PeerRole::RouteCollector => (100, AllowedFunctions::Only(&[])),
        PeerRole::RrClient
        | PeerRole::RrServer
        | PeerRole::RrServerRrServer => {
            (DFLT_INTERNAL_LOCAL_PREF, AllowedFunctions::All)
        }
    };

    RoleBaseline {
        local_pref,
        allowed,
    }
}
