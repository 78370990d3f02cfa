//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod limits;
mod local_pref;
mod pipeline;
mod validate;

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use maplit::btreemap;
use rtgen_policy::config::{Peer, PeerCfg, PolicyCfg, PolicyContext};
use rtgen_utils::bgp::{LargeComm, LargeComms};
use rtgen_utils::protocol::Protocol;
use rtgen_utils::route::Route;

pub const ASN: u32 = 65000;

//
// Helper functions.
//

fn peer_cfg(role: &str, asn: u32, address: &str) -> PeerCfg {
    PeerCfg {
        role: role.to_owned(),
        asn,
        address: address.parse().unwrap(),
        local_address: None,
        filter: Default::default(),
        rr_cluster_id: None,
    }
}

fn policy_cfg() -> PolicyCfg {
    let mut rrclient = peer_cfg("rrclient", ASN, "10.0.0.1");
    rrclient.rr_cluster_id = Some(Ipv4Addr::new(10, 0, 0, 100));
    let mut transit = peer_cfg("transit", 64503, "192.0.2.3");
    transit.local_address = Some("192.0.2.254".parse().unwrap());

    PolicyCfg {
        asn: ASN,
        router_id: Ipv4Addr::new(10, 0, 0, 254),
        community_maxlen: Some(50),
        extended_community_maxlen: Some(10),
        large_community_maxlen: Some(20),
        peers: btreemap! {
            "customer1".to_owned() => peer_cfg("customer", 64501, "192.0.2.1"),
            "peer1".to_owned() => peer_cfg("peer", 64502, "192.0.2.2"),
            "transit1".to_owned() => transit,
            "rs1".to_owned() => peer_cfg("route-server", 64504, "192.0.2.4"),
            "collector1".to_owned() => {
                peer_cfg("route-collector", 64505, "192.0.2.5")
            },
            "rrclient1".to_owned() => rrclient,
            "rrserver1".to_owned() => peer_cfg("rrserver", ASN, "10.0.0.2"),
            "rrmesh1".to_owned() => {
                peer_cfg("rrserver-rrserver", ASN, "10.0.0.3")
            },
        },
        ..Default::default()
    }
}

fn context() -> PolicyContext {
    PolicyContext::new(&policy_cfg()).unwrap()
}

fn peer<'a>(ctx: &'a PolicyContext, name: &str) -> &'a Peer {
    ctx.peer(name).unwrap()
}

fn since() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

// Builds a BGP route as announced by the given peer: AS path starting with
// the peer ASN and next hop set to the peer address.
fn bgp_route(prefix: &str, peer: &Peer) -> Route {
    let mut route =
        Route::new(prefix.parse().unwrap(), Protocol::BGP, &peer.name, since());
    if !peer.role.is_internal() {
        route.attrs.as_path = vec![peer.asn, 64999].into();
    }
    route.attrs.next_hop = Some(peer.address);
    route
}

fn large(comms: &[(u32, u32, u32)]) -> LargeComms {
    comms.iter().copied().map(LargeComm::from).collect()
}

fn addr(addr: &str) -> IpAddr {
    addr.parse().unwrap()
}
