//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_policy::config::CommLimits;
use rtgen_policy::limits::{LimitKinds, enforce_limits, exceeded};
use rtgen_utils::bgp::{Comm, ExtComm, LargeComm, PeerRole};
use rtgen_utils::route::{PrefixType, Route};

use super::{ASN, bgp_route, context, large, peer};

const LIMITS: CommLimits = CommLimits {
    standard: Some(50),
    extended: Some(10),
    large: Some(20),
};

fn route_with(standard: usize, extended: usize, large: usize) -> Route {
    let ctx = context();
    let mut route = bgp_route("203.0.113.0/24", peer(&ctx, "customer1"));
    let attrs = &mut route.attrs;
    attrs.comm = (0..standard as u16).map(|i| Comm::new(64501, i)).collect();
    attrs.ext_comm = (0..extended as u64)
        .map(|i| ExtComm::new(0x00, 0x02, i))
        .collect();
    attrs.large_comm = (0..large as u32)
        .map(|i| LargeComm::new(64501, 1, i))
        .collect();
    route
}

#[test]
fn test_limits_boundary() {
    let route = route_with(50, 10, 20);
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::empty());

    let route = route_with(51, 10, 20);
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::STANDARD);

    let route = route_with(50, 11, 20);
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::EXTENDED);

    let route = route_with(50, 10, 21);
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::LARGE);

    let route = route_with(51, 11, 21);
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::all());
}

#[test]
fn test_limits_unbounded() {
    let route = route_with(500, 500, 500);
    assert!(exceeded(&route, &CommLimits::default(), ASN).is_empty());
}

#[test]
fn test_limits_local_records_not_counted() {
    let mut route = route_with(0, 0, 20);
    route.attrs.large_comm.push(LargeComm::new(ASN, 1000, 3));
    route.attrs.large_comm.push(LargeComm::new(ASN, 1101, 16));
    assert!(exceeded(&route, &LIMITS, ASN).is_empty());

    // Other local-namespace communities do count.
    route.attrs.large_comm.push(LargeComm::new(ASN, 3, 2));
    assert_eq!(exceeded(&route, &LIMITS, ASN), LimitKinds::LARGE);
}

#[test]
fn test_limits_edge_roles() {
    for role in [
        PeerRole::Customer,
        PeerRole::Peer,
        PeerRole::Transit,
        PeerRole::RouteServer,
    ] {
        let (route, kinds) =
            enforce_limits(route_with(51, 0, 0), role, &LIMITS, ASN);
        assert_eq!(kinds, LimitKinds::STANDARD);
        assert_eq!(route.prefix_type, PrefixType::Unicast);
        assert_eq!(route.attrs.comm.len(), 51);
        assert_eq!(route.attrs.large_comm, large(&[(ASN, 1101, 16)]));
    }
}

#[test]
fn test_limits_internal_roles() {
    for role in [
        PeerRole::RouteCollector,
        PeerRole::RrClient,
        PeerRole::RrServer,
        PeerRole::RrServerRrServer,
    ] {
        let (route, kinds) =
            enforce_limits(route_with(51, 2, 0), role, &LIMITS, ASN);
        assert_eq!(kinds, LimitKinds::STANDARD);
        assert_eq!(route.prefix_type, PrefixType::Unreachable);
        assert!(route.attrs.comm.is_empty());
        assert_eq!(route.attrs.ext_comm.len(), 2);
        assert_eq!(route.attrs.large_comm, large(&[(ASN, 1101, 16)]));
    }
}

#[test]
fn test_limits_record_order() {
    let (route, kinds) =
        enforce_limits(route_with(0, 11, 21), PeerRole::Peer, &LIMITS, ASN);
    assert_eq!(kinds, LimitKinds::EXTENDED | LimitKinds::LARGE);
    let tail: Vec<_> =
        route.attrs.large_comm.iter().skip(21).copied().collect();
    assert_eq!(
        tail,
        vec![LargeComm::new(ASN, 1101, 17), LargeComm::new(ASN, 1101, 18)]
    );
}

#[test]
fn test_ext_comm_value_range() {
    let comm: ExtComm =
        serde_json::from_value(serde_json::json!([0, 2, 0xFFFF_FFFF_FFFFu64]))
            .unwrap();
    assert_eq!(comm.value, ExtComm::VALUE_MAX);

    let result = serde_json::from_value::<ExtComm>(serde_json::json!([
        0,
        2,
        0x1_0000_0000_0000u64
    ]));
    assert!(result.is_err());
}
