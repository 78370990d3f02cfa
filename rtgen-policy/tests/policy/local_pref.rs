//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use rtgen_policy::local_pref::{apply_graceful_shutdown, compute_local_pref};
use rtgen_policy::role::role_baseline;
use rtgen_utils::bgp::{Comm, LargeComms, PeerRole};

use super::{ASN, bgp_route, context, large, peer};

fn local_pref(role: PeerRole, comms: &LargeComms) -> u32 {
    compute_local_pref(role, role_baseline(role).local_pref, comms, ASN, false)
}

#[test]
fn test_local_pref_edge_roles() {
    let untagged = LargeComms::default();
    let minus_one = large(&[(ASN, 8, 1)]);

    assert_eq!(local_pref(PeerRole::Customer, &untagged), 750);
    assert_eq!(local_pref(PeerRole::Customer, &minus_one), 749);
    assert_eq!(local_pref(PeerRole::Peer, &minus_one), 469);
    assert_eq!(local_pref(PeerRole::Transit, &minus_one), 149);

    // No adjustments for route servers and collectors.
    assert_eq!(local_pref(PeerRole::RouteServer, &minus_one), 450);
    assert_eq!(local_pref(PeerRole::RouteCollector, &minus_one), 100);

    // Only value 1 means "minus one".
    let other = large(&[(ASN, 8, 2)]);
    assert_eq!(local_pref(PeerRole::Customer, &other), 750);

    // Other namespaces are ignored.
    let foreign = large(&[(64501, 8, 1)]);
    assert_eq!(local_pref(PeerRole::Customer, &foreign), 750);
}

#[test]
fn test_local_pref_internal_roles() {
    for role in [
        PeerRole::RrClient,
        PeerRole::RrServer,
        PeerRole::RrServerRrServer,
    ] {
        assert_eq!(local_pref(role, &LargeComms::default()), 100);
        assert_eq!(local_pref(role, &large(&[(ASN, 3, 2)])), 750);
        assert_eq!(local_pref(role, &large(&[(ASN, 3, 3)])), 470);
        assert_eq!(local_pref(role, &large(&[(ASN, 3, 4)])), 150);
        assert_eq!(local_pref(role, &large(&[(ASN, 3, 5)])), 450);
        assert_eq!(
            local_pref(role, &large(&[(ASN, 8, 1), (ASN, 3, 2)])),
            749
        );
        // Unknown ingress-role code.
        assert_eq!(local_pref(role, &large(&[(ASN, 3, 9)])), 100);
    }
}

#[test]
fn test_local_pref_idempotent() {
    let comms = large(&[(64501, 1, 1)]);
    for role in PeerRole::ALL {
        let first = local_pref(role, &comms);
        assert_eq!(local_pref(role, &comms), first);
    }
}

#[test]
fn test_local_pref_graceful_shutdown() {
    let comms = large(&[(ASN, 3, 2)]);
    for role in PeerRole::ALL {
        let baseline = role_baseline(role).local_pref;
        assert_eq!(compute_local_pref(role, baseline, &comms, ASN, true), 0);
    }
}

#[test]
fn test_apply_graceful_shutdown_monotonic() {
    let ctx = context();
    let mut route = bgp_route("203.0.113.0/24", peer(&ctx, "customer1"));
    route.attrs.local_pref = Some(750);

    apply_graceful_shutdown(&mut route, Some(PeerRole::Customer), ASN);
    let once = route.clone();
    assert_eq!(route.attrs.local_pref, Some(0));
    assert!(route.attrs.comm.contains(&Comm::GRACEFUL_SHUTDOWN));
    assert_eq!(route.attrs.large_comm, large(&[(ASN, 4, 2)]));

    // Applying it again changes nothing.
    apply_graceful_shutdown(&mut route, Some(PeerRole::Customer), ASN);
    assert_eq!(route, once);

    // No role marker for routes without an edge ingress.
    let mut route = bgp_route("203.0.113.0/24", peer(&ctx, "rrserver1"));
    apply_graceful_shutdown(&mut route, None, ASN);
    assert!(route.attrs.large_comm.is_empty());
    assert_eq!(route.attrs.local_pref, Some(0));
}
