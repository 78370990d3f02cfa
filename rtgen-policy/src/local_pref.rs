//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_utils::bgp::{Asn, Comm, LargeComms, PeerRole};
use rtgen_utils::route::Route;

use crate::community::{self, RoleCode, Signal};
use crate::role::role_baseline;

// Computes the local preference of a route learned from a neighbor of the
// given role.
//
// Routes arriving over the internal mesh don't trust the local preference
// they carry: it's recomputed from the ingress-role marker appended by the
// border router that learned the route.
pub fn compute_local_pref(
    role: PeerRole,
    baseline: u32,
    large_comm: &LargeComms,
    asn: Asn,
    graceful_shutdown: bool,
) -> u32 {
    if graceful_shutdown {
        return 0;
    }

    match role {
        PeerRole::RouteServer | PeerRole::RouteCollector => baseline,
        PeerRole::Customer | PeerRole::Peer | PeerRole::Transit => {
            if community::contains(large_comm, asn, Signal::LocalPrefMinusOne)
            {
                baseline.saturating_sub(1)
            } else {
                baseline
            }
        }
        PeerRole::RrClient
        | PeerRole::RrServer
        | PeerRole::RrServerRrServer => {
            match community::ingress_role(large_comm, asn) {
                Some(ingress_role) => compute_local_pref(
                    ingress_role,
                    role_baseline(ingress_role).local_pref,
                    large_comm,
                    asn,
                    false,
                ),
                None => baseline,
            }
        }
    }
}

// Marks a route being exported to a peer under graceful shutdown.
//
// This must be the last rewrite of the export pipeline.
pub fn apply_graceful_shutdown(
    route: &mut Route,
    ingress_role: Option<PeerRole>,
    asn: Asn,
) {
    let attrs = &mut route.attrs;
    attrs.local_pref = Some(0);
    attrs.comm.push_unique(Comm::GRACEFUL_SHUTDOWN);
    if let Some(code) = ingress_role.and_then(RoleCode::from_role) {
        community::append(
            &mut attrs.large_comm,
            asn,
            Signal::GshutIngressRole(code),
        );
    }
}
