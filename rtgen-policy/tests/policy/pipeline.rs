//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use rtgen_policy::gshut::PolicySnapshot;
use rtgen_policy::limits::LimitKinds;
use rtgen_policy::pipeline::{export, import, ingress_role};
use rtgen_policy::verdict::{DowngradeReason, PolicyResult, RejectReason};
use rtgen_utils::bgp::{Comm, LargeComm, PeerRole};
use rtgen_utils::route::{PrefixType, Route};

use super::{ASN, addr, bgp_route, context, large, peer};

fn imported(name: &str, route: Route) -> Route {
    let ctx = context();
    import(route, peer(&ctx, name), &ctx).into_accept().unwrap()
}

fn customer_route() -> Route {
    let ctx = context();
    let route = bgp_route("203.0.113.0/24", peer(&ctx, "customer1"));
    imported("customer1", route)
}

fn peer_route() -> Route {
    let ctx = context();
    let route = bgp_route("198.51.100.0/24", peer(&ctx, "peer1"));
    imported("peer1", route)
}

fn export_to(
    route: Route,
    name: &str,
    snapshot: &PolicySnapshot,
) -> PolicyResult {
    let ctx = context();
    export(route, peer(&ctx, name), &ctx, snapshot)
}

//
// Import.
//

#[test]
fn test_import_customer_stripped_tag() {
    let ctx = context();
    let customer = peer(&ctx, "customer1");
    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.large_comm.push(LargeComm::new(ASN, 1101, 65535));

    let route = import(route, customer, &ctx).into_accept().unwrap();
    assert_eq!(route.attrs.local_pref, Some(750));
    assert_eq!(
        route.attrs.large_comm,
        large(&[(ASN, 1000, 3), (ASN, 3, 2)])
    );
    assert_eq!(route.neighbor_role(), Some(PeerRole::Customer));
}

#[test]
fn test_import_record_order() {
    let ctx = context();
    let customer = peer(&ctx, "customer1");
    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.next_hop = Some(addr("192.0.2.99"));
    route.attrs.comm = (0..51).map(|i| Comm::new(64501, i)).collect();
    route.attrs.large_comm = large(&[(64501, 1, 1), (ASN, 3, 4), (ASN, 8, 1)]);

    let route = import(route, customer, &ctx).into_accept().unwrap();
    assert_eq!(
        route.attrs.large_comm,
        large(&[
            (64501, 1, 1),
            (ASN, 8, 1),
            (ASN, 1000, 3),
            (ASN, 1000, 1),
            (ASN, 1101, 16),
            (ASN, 3, 2),
        ])
    );
    assert_eq!(route.attrs.local_pref, Some(749));
}

#[test]
fn test_import_limit_edge_roles() {
    let ctx = context();
    for name in ["customer1", "peer1", "transit1"] {
        let peer = peer(&ctx, name);
        let mut route = bgp_route("203.0.113.0/24", peer);
        route.attrs.comm = (0..51).map(|i| Comm::new(64501, i)).collect();

        let route = import(route, peer, &ctx).into_accept().unwrap();
        assert_eq!(route.prefix_type, PrefixType::Unicast);
        assert_eq!(route.attrs.comm.len(), 51);
        assert_eq!(
            route.attrs.large_comm.iter().next().copied(),
            Some(LargeComm::new(ASN, 1101, 16))
        );
    }
}

#[test]
fn test_import_limit_internal_roles() {
    let ctx = context();
    for name in ["rrclient1", "rrserver1", "rrmesh1", "collector1"] {
        let peer = peer(&ctx, name);
        let mut route = bgp_route("203.0.113.0/24", peer);
        route.attrs.comm = (0..51).map(|i| Comm::new(64501, i)).collect();

        let (route, reason) =
            import(route, peer, &ctx).into_downgrade().unwrap();
        assert_eq!(reason, DowngradeReason::AttrLimit(LimitKinds::STANDARD));
        assert_eq!(route.prefix_type, PrefixType::Unreachable);
        assert!(route.attrs.comm.is_empty());
        assert_eq!(route.attrs.large_comm, large(&[(ASN, 1101, 16)]));
    }
}

#[test]
fn test_import_internal_nexthop_invalid() {
    let ctx = context();
    let rrclient = peer(&ctx, "rrclient1");
    let mut route = bgp_route("203.0.113.0/24", rrclient);
    route.attrs.as_path = vec![64501u32].into();
    route.attrs.large_comm = large(&[(ASN, 3, 2)]);
    route.attrs.next_hop = Some(addr("0.0.0.0"));

    let (route, reason) =
        import(route, rrclient, &ctx).into_downgrade().unwrap();
    assert_eq!(reason, DowngradeReason::NexthopInvalid);
    assert_eq!(route.prefix_type, PrefixType::Unreachable);
    assert!(route.attrs.as_path.is_empty());
    assert_eq!(route.attrs.local_pref, Some(100));
}

#[test]
fn test_import_internal_local_pref() {
    let ctx = context();
    let rrserver = peer(&ctx, "rrserver1");
    let mut route = bgp_route("203.0.113.0/24", rrserver);
    route.attrs.large_comm = large(&[(ASN, 3, 3)]);
    route.attrs.local_pref = Some(1000);

    let route = import(route, rrserver, &ctx).into_accept().unwrap();
    assert_eq!(route.attrs.local_pref, Some(470));
    assert_eq!(route.attrs.large_comm, large(&[(ASN, 3, 3)]));
    assert_eq!(ingress_role(&route, ASN), Some(PeerRole::Peer));
}

#[test]
fn test_import_blackhole() {
    let ctx = context();
    let customer = peer(&ctx, "customer1");
    let mut route = bgp_route("203.0.113.7/32", customer);
    route.attrs.large_comm = large(&[(ASN, 666, 0)]);

    let (route, reason) =
        import(route, customer, &ctx).into_downgrade().unwrap();
    assert_eq!(reason, DowngradeReason::Blackhole);
    assert_eq!(reason.to_string(), "blackhole requested");
    assert_eq!(route.prefix_type, PrefixType::Blackhole);
    assert_eq!(route.attrs.comm.0, vec![Comm::BLACKHOLE, Comm::NO_EXPORT]);
    assert_eq!(
        route.attrs.large_comm,
        large(&[(ASN, 666, 0), (ASN, 3, 2)])
    );
}

#[test]
fn test_import_internal_unreachable() {
    let ctx = context();
    let rrclient = peer(&ctx, "rrclient1");
    let mut route = bgp_route("203.0.113.0/24", rrclient);
    route.prefix_type = PrefixType::Unreachable;

    let route = import(route, rrclient, &ctx).into_accept().unwrap();
    assert_eq!(route.prefix_type, PrefixType::Unreachable);
}

#[test]
fn test_import_reject() {
    let ctx = context();
    let peer1 = peer(&ctx, "peer1");
    let mut route = bgp_route("198.51.100.0/24", peer1);
    route.attrs.as_path = vec![64502u32, ASN].into();
    assert_eq!(
        import(route, peer1, &ctx),
        PolicyResult::Reject(RejectReason::AsLoop)
    );
}

//
// Export.
//

#[test]
fn test_export_edge_rewrite() {
    let snapshot = PolicySnapshot::default();
    let mut route = customer_route();
    route.attrs.large_comm.push(LargeComm::new(ASN, 71, 997));
    route.attrs.large_comm.push(LargeComm::new(64501, 7, 7));

    let exported = export_to(route.clone(), "peer1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.as_path.0, vec![ASN, ASN, ASN, 64501, 64999]);
    assert_eq!(exported.attrs.large_comm, large(&[(64501, 7, 7)]));
    assert_eq!(exported.attrs.local_pref, None);
    assert_eq!(exported.attrs.next_hop, Some(addr("192.0.2.1")));

    let exported = export_to(route, "transit1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.next_hop, Some(addr("192.0.2.254")));
}

#[test]
fn test_export_valley_free() {
    let snapshot = PolicySnapshot::default();
    for name in ["transit1", "rs1"] {
        assert_eq!(
            export_to(peer_route(), name, &snapshot),
            PolicyResult::Reject(RejectReason::ValleyFree)
        );
    }
    for name in ["customer1", "collector1", "rrclient1", "rrserver1"] {
        assert!(export_to(peer_route(), name, &snapshot).is_accept(), "{name}");
    }

    // Locally originated routes go everywhere.
    let ctx = context();
    let mut local = bgp_route("192.0.2.0/24", peer(&ctx, "rrserver1"));
    local.neighbor = None;
    assert!(export_to(local, "transit1", &snapshot).is_accept());
}

#[test]
fn test_export_reject_reasons() {
    let snapshot = PolicySnapshot::default();

    assert_eq!(
        export_to(customer_route(), "customer1", &snapshot),
        PolicyResult::Reject(RejectReason::SplitHorizon)
    );

    let mut route = customer_route();
    route.attrs.comm.push(Comm::NO_ADVERTISE);
    assert_eq!(
        export_to(route, "rrclient1", &snapshot),
        PolicyResult::Reject(RejectReason::NoAdvertise)
    );

    let mut route = customer_route();
    route.attrs.comm.push(Comm::NO_EXPORT);
    assert_eq!(
        export_to(route.clone(), "peer1", &snapshot),
        PolicyResult::Reject(RejectReason::NoExport)
    );
    assert!(export_to(route, "rrclient1", &snapshot).is_accept());

    let mut route = customer_route();
    route.attrs.large_comm.push(LargeComm::new(ASN, 1200, 64502));
    assert_eq!(
        export_to(route.clone(), "peer1", &snapshot),
        PolicyResult::Reject(RejectReason::NoExportToAsn)
    );
    assert!(export_to(route, "transit1", &snapshot).is_accept());
}

#[test]
fn test_export_unreachable_internal_only() {
    let snapshot = PolicySnapshot::default();
    let mut route = customer_route();
    route.prefix_type = PrefixType::Blackhole;

    assert_eq!(
        export_to(route.clone(), "peer1", &snapshot),
        PolicyResult::Reject(RejectReason::NotReachable)
    );
    assert_eq!(
        export_to(route.clone(), "collector1", &snapshot),
        PolicyResult::Reject(RejectReason::NotReachable)
    );
    let exported = export_to(route.clone(), "rrserver1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported, route);
}

#[test]
fn test_export_reflection() {
    let snapshot = PolicySnapshot::default();
    let ctx = context();
    let mut route = bgp_route("198.51.100.0/24", peer(&ctx, "rrserver1"));
    route.attrs.large_comm = large(&[(ASN, 3, 2)]);
    let route = imported("rrserver1", route);

    assert_eq!(
        export_to(route.clone(), "rrmesh1", &snapshot),
        PolicyResult::Reject(RejectReason::Reflection)
    );
    let exported = export_to(route, "rrclient1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(
        exported.attrs.cluster_list,
        vec![Ipv4Addr::new(10, 0, 0, 100)]
    );

    // Routes from clients are reflected everywhere.
    let route = bgp_route("198.51.100.0/24", peer(&ctx, "rrclient1"));
    let route = imported("rrclient1", route);
    let exported = export_to(route, "rrserver1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.cluster_list, vec![ctx.router_id]);
}

#[test]
fn test_export_collector() {
    let snapshot = PolicySnapshot::default();
    let exported = export_to(customer_route(), "collector1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.as_path.0, vec![ASN, 64501, 64999]);
    assert_eq!(exported.attrs.local_pref, Some(100));
    assert_eq!(exported.attrs.large_comm, large(&[(ASN, 3, 2)]));
}

#[test]
fn test_export_graceful_shutdown() {
    let snapshot = PolicySnapshot::new(1, false, ["customer1".to_owned()]);

    let exported = export_to(peer_route(), "customer1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.local_pref, Some(0));
    assert!(exported.attrs.comm.contains(&Comm::GRACEFUL_SHUTDOWN));
    assert_eq!(exported.attrs.large_comm, large(&[(ASN, 4, 3)]));

    // Other peers aren't affected.
    let exported = export_to(peer_route(), "rrclient1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.local_pref, Some(470));
    assert!(!exported.attrs.comm.contains(&Comm::GRACEFUL_SHUTDOWN));

    // Global graceful shutdown.
    let snapshot = PolicySnapshot::new(1, true, []);
    let exported = export_to(customer_route(), "rrclient1", &snapshot)
        .into_accept()
        .unwrap();
    assert_eq!(exported.attrs.local_pref, Some(0));
    assert_eq!(
        exported.attrs.large_comm,
        large(&[(ASN, 3, 2), (ASN, 4, 2)])
    );
}

#[test]
fn test_export_graceful_shutdown_round_trip() {
    let initial = PolicySnapshot::default();
    let added = initial.with_peer_added("customer1");
    let removed = added.with_peer_removed("customer1");
    assert!(removed.same_policy(&initial));

    let before = export_to(peer_route(), "customer1", &initial);
    let during = export_to(peer_route(), "customer1", &added);
    let after = export_to(peer_route(), "customer1", &removed);
    assert_ne!(before, during);
    assert_eq!(before, after);
}
