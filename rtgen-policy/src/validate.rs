//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_utils::bgp::{Asn, Comm, PeerRole, PeerType};
use rtgen_utils::ip::IpAddrExt;
use rtgen_utils::route::{PrefixType, Route};

use crate::community::{self, FUNC_BLACKHOLE, FilterAction, Signal};
use crate::config::{Peer, PolicyContext};
use crate::role::{DFLT_INTERNAL_LOCAL_PREF, role_baseline};
use crate::verdict::{DowngradeReason, PolicyResult, RejectReason};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NexthopCheck {
    Valid,
    // Next hop differs from the peer address; tolerated on edge sessions.
    Mismatch,
    // Next hop can't be used at all.
    Invalid,
}

// ===== global functions =====

// Runs the import validation checks for a route learned from the given
// peer.
//
// Out-of-bound prefixes and AS path or reflection loops are rejected.
// Edge sessions tolerate a next hop different from the peer address, but
// the route is flagged. Internal sessions and route collectors turn
// routes with an unusable next hop into unreachable routes.
pub fn validate(
    route: Route,
    peer: &Peer,
    ctx: &PolicyContext,
) -> PolicyResult {
    if let Err(reason) = check_prefix(&route, peer, ctx) {
        return PolicyResult::Reject(reason);
    }
    if let Err(reason) = check_as_path(&route, peer, ctx) {
        return PolicyResult::Reject(reason);
    }

    match check_nexthop(&route, peer) {
        NexthopCheck::Valid => PolicyResult::Accept(route),
        NexthopCheck::Mismatch => {
            let mut route = route;
            community::append(
                &mut route.attrs.large_comm,
                ctx.asn,
                Signal::FilterAction(FilterAction::NexthopMismatch),
            );
            PolicyResult::Accept(route)
        }
        NexthopCheck::Invalid => PolicyResult::Downgrade(
            unreachable_route(route),
            DowngradeReason::NexthopInvalid,
        ),
    }
}

// Checks the prefix length against the configured bounds.
//
// Only routes learned from external sessions are checked. Blackhole
// requests from neighbors allowed to send them may go down to host
// prefixes.
pub fn check_prefix(
    route: &Route,
    peer: &Peer,
    ctx: &PolicyContext,
) -> Result<(), RejectReason> {
    if peer.role.peer_type() != PeerType::External {
        return Ok(());
    }

    let af = route.address_family();
    let mut bounds = *ctx.prefix_length.get(af);
    if is_blackhole_request(route, peer, ctx.asn) {
        bounds.max = af.max_prefixlen();
    }

    if !bounds.contains(route.prefix.prefix()) {
        return Err(RejectReason::PrefixLength);
    }

    Ok(())
}

// Checks the AS path of routes learned from external sessions, and the
// reflection attributes of routes learned from internal ones.
pub fn check_as_path(
    route: &Route,
    peer: &Peer,
    ctx: &PolicyContext,
) -> Result<(), RejectReason> {
    let attrs = &route.attrs;
    match peer.role.peer_type() {
        PeerType::External => {
            if attrs.as_path.contains(ctx.asn) {
                return Err(RejectReason::AsLoop);
            }

            // Route servers and collectors don't necessarily insert their
            // own AS in the path.
            if matches!(
                peer.role,
                PeerRole::Customer | PeerRole::Peer | PeerRole::Transit
            ) && attrs.as_path.first() != Some(peer.asn)
            {
                return Err(RejectReason::FirstAsMismatch);
            }

            if !peer.allowed_asns.is_empty()
                && !attrs
                    .as_path
                    .origin()
                    .is_some_and(|asn| peer.allowed_asns.contains(&asn))
            {
                return Err(RejectReason::OriginAsNotAllowed);
            }
        }
        PeerType::Internal => {
            let cluster_ids = ctx.cluster_ids();
            if attrs
                .cluster_list
                .iter()
                .any(|cluster_id| cluster_ids.contains(cluster_id))
            {
                return Err(RejectReason::ClusterLoop);
            }
            if attrs.originator_id == Some(ctx.router_id) {
                return Err(RejectReason::OriginatorLoop);
            }
        }
    }

    Ok(())
}

pub fn check_nexthop(route: &Route, peer: &Peer) -> NexthopCheck {
    let nexthop = route.attrs.next_hop;
    match peer.role {
        PeerRole::Customer | PeerRole::Peer | PeerRole::Transit => {
            if nexthop == Some(peer.address) {
                NexthopCheck::Valid
            } else {
                NexthopCheck::Mismatch
            }
        }
        // Route servers don't put themselves in the forwarding path.
        PeerRole::RouteServer => NexthopCheck::Valid,
        PeerRole::RouteCollector => {
            if nexthop == Some(peer.address) {
                NexthopCheck::Valid
            } else {
                NexthopCheck::Invalid
            }
        }
        PeerRole::RrClient
        | PeerRole::RrServer
        | PeerRole::RrServerRrServer => match nexthop {
            Some(addr)
                if addr.is_usable()
                    && addr.address_family() == route.address_family() =>
            {
                NexthopCheck::Valid
            }
            _ => NexthopCheck::Invalid,
        },
    }
}

// Returns true if the route carries a blackhole request, either RFC 7999
// or through the blackhole function, and the peer may send one.
pub(crate) fn is_blackhole_request(
    route: &Route,
    peer: &Peer,
    asn: Asn,
) -> bool {
    let requested = route.attrs.comm.contains(&Comm::BLACKHOLE)
        || community::has_blackhole_request(&route.attrs.large_comm, asn);
    requested && role_baseline(peer.role).allowed.permits(FUNC_BLACKHOLE)
}

// ===== helper functions =====

// Reduces a route to what's needed to propagate the prefix as unreachable.
fn unreachable_route(mut route: Route) -> Route {
    route.prefix_type = PrefixType::Unreachable;
    route.nexthops.clear();
    let attrs = &mut route.attrs;
    attrs.as_path.0.clear();
    attrs.next_hop = None;
    attrs.med = None;
    attrs.local_pref = Some(DFLT_INTERNAL_LOCAL_PREF);
    route
}
