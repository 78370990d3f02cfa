//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr};

use chrono::{DateTime, Utc};
use derive_new::new;
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

use crate::bgp::{AsPath, Comms, ExtComms, LargeComms, PeerRole};
use crate::ip::{AddressFamily, IpNetworkExt};
use crate::protocol::Protocol;

// A route as seen by the policy compiler and the RIB merger.
//
// Routes are values: every pipeline stage consumes one and hands back a new
// one.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Route {
    pub prefix: IpNetwork,
    pub protocol: Protocol,
    // Name of the protocol instance that originated the route ("static1",
    // "ospf1", or the BGP peer name).
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbor: Option<RouteNeighbor>,
    #[serde(default)]
    pub prefix_type: PrefixType,
    #[serde(default)]
    pub nexthops: Vec<Nexthop>,
    #[serde(default)]
    pub attrs: RouteAttrs,
    pub since: DateTime<Utc>,
}

// BGP neighbor a route was learned from.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct RouteNeighbor {
    pub name: String,
    pub role: PeerRole,
    pub remote_addr: IpAddr,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixType {
    #[default]
    Unicast,
    Blackhole,
    Unreachable,
}

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct Nexthop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,
    pub interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(default)]
pub struct RouteAttrs {
    pub as_path: AsPath,
    pub next_hop: Option<IpAddr>,
    pub local_pref: Option<u32>,
    pub med: Option<u32>,
    pub comm: Comms,
    pub ext_comm: ExtComms,
    pub large_comm: LargeComms,
    pub cluster_list: Vec<Ipv4Addr>,
    pub originator_id: Option<Ipv4Addr>,
    pub ospf: Option<OspfAttrs>,
    pub kernel: Option<KernelAttrs>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct OspfAttrs {
    pub route_type: OspfRouteType,
    pub metric1: u32,
    #[serde(default)]
    pub metric2: Option<u32>,
    pub router_id: Ipv4Addr,
    #[serde(default)]
    pub tag: Option<u32>,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OspfRouteType {
    Internal,
    External1,
    External2,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct KernelAttrs {
    pub metric: u32,
    pub source: String,
}

// ===== impl Route =====

impl Route {
    pub fn new(
        prefix: IpNetwork,
        protocol: Protocol,
        instance: impl Into<String>,
        since: DateTime<Utc>,
    ) -> Route {
        Route {
            prefix: prefix.apply_mask(),
            protocol,
            instance: instance.into(),
            neighbor: None,
            prefix_type: PrefixType::Unicast,
            nexthops: Vec::new(),
            attrs: RouteAttrs::default(),
            since,
        }
    }

    pub fn address_family(&self) -> AddressFamily {
        self.prefix.address_family()
    }

    // Role of the neighbor this route was directly learned from, if any.
    pub fn neighbor_role(&self) -> Option<PeerRole> {
        self.neighbor.as_ref().map(|nbr| nbr.role)
    }

    pub fn is_reachable(&self) -> bool {
        self.prefix_type == PrefixType::Unicast
    }
}

// ===== impl PrefixType =====

impl std::fmt::Display for PrefixType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixType::Unicast => write!(f, "unicast"),
            PrefixType::Blackhole => write!(f, "blackhole"),
            PrefixType::Unreachable => write!(f, "unreachable"),
        }
    }
}
