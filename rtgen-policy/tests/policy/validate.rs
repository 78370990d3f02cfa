//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use rtgen_policy::validate::{
    NexthopCheck, check_as_path, check_nexthop, check_prefix, validate,
};
use rtgen_policy::verdict::{DowngradeReason, PolicyResult, RejectReason};
use rtgen_utils::bgp::{Comm, LargeComm};
use rtgen_utils::route::PrefixType;

use super::{ASN, addr, bgp_route, context, large, peer};

#[test]
fn test_prefix_bounds() {
    let ctx = context();
    let customer = peer(&ctx, "customer1");

    for (prefix, ok) in [
        ("10.0.0.0/7", false),
        ("10.0.0.0/8", true),
        ("203.0.113.0/24", true),
        ("203.0.113.0/25", false),
        ("2001:db8::/16", true),
        ("2001:db8::/48", true),
        ("2001:db8::/49", false),
    ] {
        let route = bgp_route(prefix, customer);
        let expected = if ok {
            Ok(())
        } else {
            Err(RejectReason::PrefixLength)
        };
        assert_eq!(check_prefix(&route, customer, &ctx), expected, "{prefix}");
    }

    // Internal routes aren't subject to the bounds.
    let rrclient = peer(&ctx, "rrclient1");
    let route = bgp_route("203.0.113.1/32", rrclient);
    assert_eq!(check_prefix(&route, rrclient, &ctx), Ok(()));
}

#[test]
fn test_prefix_bounds_blackhole() {
    let ctx = context();
    let customer = peer(&ctx, "customer1");

    let mut route = bgp_route("203.0.113.1/32", customer);
    route.attrs.large_comm.push(LargeComm::new(ASN, 666, 0));
    assert_eq!(check_prefix(&route, customer, &ctx), Ok(()));

    let mut route = bgp_route("203.0.113.1/32", customer);
    route.attrs.comm.push(Comm::BLACKHOLE);
    assert_eq!(check_prefix(&route, customer, &ctx), Ok(()));

    // Peers can't request blackholing.
    let peer1 = peer(&ctx, "peer1");
    let mut route = bgp_route("203.0.113.1/32", peer1);
    route.attrs.comm.push(Comm::BLACKHOLE);
    assert_eq!(
        check_prefix(&route, peer1, &ctx),
        Err(RejectReason::PrefixLength)
    );
}

#[test]
fn test_as_path_external() {
    let mut ctx = context();
    ctx.peers.get_mut("customer1").unwrap().allowed_asns =
        BTreeSet::from([64999]);
    let customer = peer(&ctx, "customer1");

    let route = bgp_route("203.0.113.0/24", customer);
    assert_eq!(check_as_path(&route, customer, &ctx), Ok(()));

    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.as_path = vec![64501u32, ASN, 64999].into();
    assert_eq!(
        check_as_path(&route, customer, &ctx),
        Err(RejectReason::AsLoop)
    );

    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.as_path = vec![64502u32, 64999].into();
    assert_eq!(
        check_as_path(&route, customer, &ctx),
        Err(RejectReason::FirstAsMismatch)
    );

    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.as_path.0.clear();
    assert_eq!(
        check_as_path(&route, customer, &ctx),
        Err(RejectReason::FirstAsMismatch)
    );

    let mut route = bgp_route("203.0.113.0/24", customer);
    route.attrs.as_path = vec![64501u32, 64998].into();
    assert_eq!(
        check_as_path(&route, customer, &ctx),
        Err(RejectReason::OriginAsNotAllowed)
    );

    // Route servers don't need to be in the path.
    let rs = peer(&ctx, "rs1");
    let mut route = bgp_route("203.0.113.0/24", rs);
    route.attrs.as_path = vec![64999u32].into();
    assert_eq!(check_as_path(&route, rs, &ctx), Ok(()));
}

#[test]
fn test_as_path_internal() {
    let ctx = context();
    let rrserver = peer(&ctx, "rrserver1");

    let mut route = bgp_route("203.0.113.0/24", rrserver);
    route.attrs.cluster_list = vec![Ipv4Addr::new(10, 9, 9, 9)];
    assert_eq!(check_as_path(&route, rrserver, &ctx), Ok(()));

    route.attrs.cluster_list.push(Ipv4Addr::new(10, 0, 0, 100));
    assert_eq!(
        check_as_path(&route, rrserver, &ctx),
        Err(RejectReason::ClusterLoop)
    );

    let mut route = bgp_route("203.0.113.0/24", rrserver);
    route.attrs.originator_id = Some(ctx.router_id);
    assert_eq!(
        check_as_path(&route, rrserver, &ctx),
        Err(RejectReason::OriginatorLoop)
    );
}

#[test]
fn test_nexthop_check() {
    let ctx = context();

    let customer = peer(&ctx, "customer1");
    let mut route = bgp_route("203.0.113.0/24", customer);
    assert_eq!(check_nexthop(&route, customer), NexthopCheck::Valid);
    route.attrs.next_hop = Some(addr("192.0.2.99"));
    assert_eq!(check_nexthop(&route, customer), NexthopCheck::Mismatch);

    let rs = peer(&ctx, "rs1");
    assert_eq!(check_nexthop(&route, rs), NexthopCheck::Valid);

    let collector = peer(&ctx, "collector1");
    assert_eq!(check_nexthop(&route, collector), NexthopCheck::Invalid);

    let rrclient = peer(&ctx, "rrclient1");
    for nexthop in [None, Some(addr("0.0.0.0")), Some(addr("2001:db8::1"))] {
        route.attrs.next_hop = nexthop;
        assert_eq!(check_nexthop(&route, rrclient), NexthopCheck::Invalid);
    }
    route.attrs.next_hop = Some(addr("10.0.0.77"));
    assert_eq!(check_nexthop(&route, rrclient), NexthopCheck::Valid);
}

#[test]
fn test_validate_nexthop_mismatch_flagged() {
    let ctx = context();
    let transit = peer(&ctx, "transit1");
    let mut route = bgp_route("203.0.113.0/24", transit);
    route.attrs.next_hop = Some(addr("192.0.2.99"));

    let route = validate(route, transit, &ctx).into_accept().unwrap();
    assert_eq!(route.attrs.large_comm, large(&[(ASN, 1000, 1)]));
}

#[test]
fn test_validate_internal_nexthop_unreachable() {
    let ctx = context();
    for name in ["rrclient1", "rrserver1", "rrmesh1"] {
        let rr = peer(&ctx, name);
        let mut route = bgp_route("203.0.113.0/24", rr);
        route.attrs.as_path = vec![64501u32, 64999].into();
        route.attrs.next_hop = None;
        route.attrs.local_pref = Some(750);

        let result = validate(route, rr, &ctx);
        let (route, reason) = result.into_downgrade().unwrap();
        assert_eq!(reason, DowngradeReason::NexthopInvalid);
        assert_eq!(route.prefix_type, PrefixType::Unreachable);
        assert!(route.attrs.as_path.is_empty());
        assert_eq!(route.attrs.next_hop, None);
        assert_eq!(route.attrs.local_pref, Some(100));
    }
}

#[test]
fn test_validate_reject() {
    let ctx = context();
    let peer1 = peer(&ctx, "peer1");
    let route = bgp_route("203.0.113.0/30", peer1);
    assert_eq!(
        validate(route, peer1, &ctx),
        PolicyResult::Reject(RejectReason::PrefixLength)
    );
}
