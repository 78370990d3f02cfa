//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_utils::bgp::{Asn, Comm, PeerRole};
use rtgen_utils::route::{PrefixType, Route, RouteNeighbor};

use crate::community::{self, FilterAction, RoleCode, Signal};
use crate::config::{Peer, PolicyContext};
use crate::debug::Debug;
use crate::gshut::PolicySnapshot;
use crate::limits;
use crate::local_pref;
use crate::role::{DFLT_INTERNAL_LOCAL_PREF, role_baseline};
use crate::validate;
use crate::verdict::{DowngradeReason, PolicyResult, RejectReason};

// ===== global functions =====

// Runs a route learned from the given peer through the import pipeline.
//
// Stages run in a fixed order so that the large-community list of an
// accepted route reads: surviving received tags, filter-action records,
// limit records and finally the ingress-role marker.
pub fn import(route: Route, peer: &Peer, ctx: &PolicyContext) -> PolicyResult {
    let prefix = route.prefix;
    let result = import_route(route, peer, ctx);
    Debug::RouteImport(&peer.name, &prefix, &result).log();
    result
}

// Runs a route through the export pipeline of the given peer.
pub fn export(
    route: Route,
    peer: &Peer,
    ctx: &PolicyContext,
    snapshot: &PolicySnapshot,
) -> PolicyResult {
    let prefix = route.prefix;
    let result = export_route(route, peer, ctx, snapshot);
    Debug::RouteExport(&peer.name, &prefix, &result).log();
    result
}

// Returns the role of the edge neighbor that first brought the route into
// the local AS.
//
// Routes learned over the internal mesh carry this information in the
// ingress-role marker.
pub fn ingress_role(route: &Route, asn: Asn) -> Option<PeerRole> {
    match route.neighbor_role() {
        Some(role) if role.is_edge() => Some(role),
        Some(role) if role.is_internal() => {
            community::ingress_role(&route.attrs.large_comm, asn)
        }
        _ => None,
    }
}

// ===== helper functions =====

fn import_route(
    mut route: Route,
    peer: &Peer,
    ctx: &PolicyContext,
) -> PolicyResult {
    let baseline = role_baseline(peer.role);
    route.neighbor = Some(RouteNeighbor::new(
        peer.name.clone(),
        peer.role,
        peer.address,
    ));

    // Tags the neighbor isn't allowed to set are removed before anything
    // else, so the records appended below are never stripped.
    let attrs = &mut route.attrs;
    if community::sanitize(&mut attrs.large_comm, ctx.asn, baseline.allowed) {
        community::append(
            &mut attrs.large_comm,
            ctx.asn,
            Signal::FilterAction(FilterAction::CommunitiesStripped),
        );
    }

    let route = match validate::validate(route, peer, ctx) {
        PolicyResult::Accept(route) => route,
        result => return result,
    };

    // Routes may already arrive unreachable over the internal mesh, only
    // a limit violation turns that into a downgrade.
    let (mut route, exceeded) =
        limits::enforce_limits(route, peer.role, &ctx.limits, ctx.asn);
    let mut downgrade = None;
    if !exceeded.is_empty() && route.prefix_type == PrefixType::Unreachable {
        downgrade = Some(DowngradeReason::AttrLimit(exceeded));
    }

    if let Some(code) = RoleCode::from_role(peer.role) {
        community::append(
            &mut route.attrs.large_comm,
            ctx.asn,
            Signal::IngressRole(code),
        );
    }

    if route.prefix_type == PrefixType::Unicast
        && validate::is_blackhole_request(&route, peer, ctx.asn)
    {
        route.prefix_type = PrefixType::Blackhole;
        route.attrs.comm.push_unique(Comm::BLACKHOLE);
        route.attrs.comm.push_unique(Comm::NO_EXPORT);
        downgrade = Some(DowngradeReason::Blackhole);
    }

    route.attrs.local_pref = Some(local_pref::compute_local_pref(
        peer.role,
        baseline.local_pref,
        &route.attrs.large_comm,
        ctx.asn,
        false,
    ));

    match downgrade {
        Some(reason) => PolicyResult::Downgrade(route, reason),
        None => PolicyResult::Accept(route),
    }
}

fn export_route(
    mut route: Route,
    peer: &Peer,
    ctx: &PolicyContext,
    snapshot: &PolicySnapshot,
) -> PolicyResult {
    if let Err(reason) = check_export(&route, peer, ctx) {
        return PolicyResult::Reject(reason);
    }

    // Must be looked up before the local namespace is stripped.
    let ingress_role = ingress_role(&route, ctx.asn);

    let source_role = route.neighbor_role();
    if peer.role.is_internal() && source_role.is_some_and(|r| r.is_internal())
    {
        route.attrs.cluster_list.push(ctx.cluster_id(peer));
    }

    let attrs = &mut route.attrs;
    match peer.role {
        PeerRole::Customer
        | PeerRole::Peer
        | PeerRole::Transit
        | PeerRole::RouteServer => {
            let count = community::prepend_count(
                &attrs.large_comm,
                ctx.asn,
                &ctx.prepend,
            );
            community::strip_local(&mut attrs.large_comm, ctx.asn);
            attrs.as_path.prepend(ctx.asn, 1 + count);
            attrs.local_pref = None;
            if let Some(local_address) = peer.local_address {
                attrs.next_hop = Some(local_address);
            }
        }
        PeerRole::RouteCollector => {
            attrs.as_path.prepend(ctx.asn, 1);
            attrs.local_pref = Some(DFLT_INTERNAL_LOCAL_PREF);
        }
        PeerRole::RrClient
        | PeerRole::RrServer
        | PeerRole::RrServerRrServer => (),
    }

    if snapshot.applies_to(&peer.name) {
        local_pref::apply_graceful_shutdown(&mut route, ingress_role, ctx.asn);
    }

    PolicyResult::Accept(route)
}

fn check_export(
    route: &Route,
    peer: &Peer,
    ctx: &PolicyContext,
) -> Result<(), RejectReason> {
    let attrs = &route.attrs;
    if attrs.comm.contains(&Comm::NO_ADVERTISE) {
        return Err(RejectReason::NoAdvertise);
    }
    if attrs.comm.contains(&Comm::NO_EXPORT) && !peer.role.is_internal() {
        return Err(RejectReason::NoExport);
    }
    if route
        .neighbor
        .as_ref()
        .is_some_and(|nbr| nbr.name == peer.name)
    {
        return Err(RejectReason::SplitHorizon);
    }
    if !route.is_reachable() && !peer.role.is_internal() {
        return Err(RejectReason::NotReachable);
    }
    if matches!(
        peer.role,
        PeerRole::Peer | PeerRole::Transit | PeerRole::RouteServer
    ) && !is_customer_or_local(route, ctx.asn)
    {
        return Err(RejectReason::ValleyFree);
    }
    if community::no_export_to(&attrs.large_comm, ctx.asn, peer.asn) {
        return Err(RejectReason::NoExportToAsn);
    }
    if peer.role.is_internal()
        && matches!(
            route.neighbor_role(),
            Some(PeerRole::RrServer | PeerRole::RrServerRrServer)
        )
        && !peer.role.is_reflector_client()
    {
        return Err(RejectReason::Reflection);
    }

    Ok(())
}

// Returns true for routes learned from a customer, and for routes
// originated inside the local AS.
fn is_customer_or_local(route: &Route, asn: Asn) -> bool {
    match route.neighbor_role() {
        None => true,
        Some(role) if role.is_internal() => {
            match community::ingress_role(&route.attrs.large_comm, asn) {
                Some(ingress_role) => ingress_role == PeerRole::Customer,
                None => true,
            }
        }
        Some(role) => role == PeerRole::Customer,
    }
}
