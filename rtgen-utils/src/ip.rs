//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

// Address Family identifier.
//
// IANA registry:
// http://www.iana.org/assignments/address-family-numbers
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum AddressFamily {
    Ipv4 = 1,
    Ipv6 = 2,
}

// Container for storing separate values for IPv4 and IPv6.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct AddressFamilies<T> {
    pub ipv4: T,
    pub ipv6: T,
}

// Extension methods for IpAddr.
pub trait IpAddrExt {
    // Returns the address family of this address.
    fn address_family(&self) -> AddressFamily;

    // Returns true if this is an usable address.
    fn is_usable(&self) -> bool;
}

// Extension methods for IpNetwork.
pub trait IpNetworkExt {
    // Returns the address family of this network.
    fn address_family(&self) -> AddressFamily;

    // Apply mask to prefix.
    #[must_use]
    fn apply_mask(&self) -> IpNetwork;
}

// ===== impl AddressFamily =====

impl AddressFamily {
    pub fn max_prefixlen(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }

    // Suffix used in BIRD table names ("master4", "t_bgp6").
    pub fn table_suffix(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "4",
            AddressFamily::Ipv6 => "6",
        }
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

// ===== impl AddressFamilies =====

impl<T> AddressFamilies<T> {
    // Returns a reference to the value corresponding to the given address
    // family.
    pub fn get(&self, af: AddressFamily) -> &T {
        match af {
            AddressFamily::Ipv4 => &self.ipv4,
            AddressFamily::Ipv6 => &self.ipv6,
        }
    }
}

// ===== impl IpAddr =====

impl IpAddrExt for IpAddr {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn is_usable(&self) -> bool {
        match self {
            IpAddr::V4(addr) => is_usable_ipv4(addr),
            IpAddr::V6(addr) => is_usable_ipv6(addr),
        }
    }
}

// ===== impl IpNetwork =====

impl IpNetworkExt for IpNetwork {
    fn address_family(&self) -> AddressFamily {
        match self {
            IpNetwork::V4(_) => AddressFamily::Ipv4,
            IpNetwork::V6(_) => AddressFamily::Ipv6,
        }
    }

    fn apply_mask(&self) -> IpNetwork {
        // The prefix length of a valid network is always valid.
        match self {
            IpNetwork::V4(prefix) => {
                Ipv4Network::new(prefix.network(), prefix.prefix())
                    .map(IpNetwork::V4)
                    .unwrap_or(*self)
            }
            IpNetwork::V6(prefix) => {
                Ipv6Network::new(prefix.network(), prefix.prefix())
                    .map(IpNetwork::V6)
                    .unwrap_or(*self)
            }
        }
    }
}

// ===== helper functions =====

fn is_usable_ipv4(addr: &Ipv4Addr) -> bool {
    !(addr.is_broadcast()
        || addr.is_loopback()
        || addr.is_multicast()
        || addr.is_unspecified())
}

fn is_usable_ipv6(addr: &Ipv6Addr) -> bool {
    !(addr.is_loopback() || addr.is_multicast() || addr.is_unspecified())
}
