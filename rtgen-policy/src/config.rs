//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use rtgen_utils::bgp::{Asn, PeerRole};
use rtgen_utils::ip::{AddressFamilies, AddressFamily};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// Reserved AS numbers that can't be used by a BGP speaker.
const ASN_RESERVED: [Asn; 4] = [0, 23456, 65535, 4294967295];

// Policy configuration, as read from the configuration file.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyCfg {
    pub asn: Asn,
    pub router_id: Ipv4Addr,
    pub community_maxlen: Option<usize>,
    pub extended_community_maxlen: Option<usize>,
    pub large_community_maxlen: Option<usize>,
    pub graceful_shutdown: bool,
    pub prefix_length: AddressFamilies<PrefixBounds>,
    pub prepend: PrependCfg,
    pub peers: BTreeMap<String, PeerCfg>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PeerCfg {
    pub role: String,
    pub asn: Asn,
    pub address: IpAddr,
    #[serde(default)]
    pub local_address: Option<IpAddr>,
    #[serde(default)]
    pub filter: PeerFilterCfg,
    #[serde(default)]
    pub rr_cluster_id: Option<Ipv4Addr>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeerFilterCfg {
    pub asns: BTreeSet<Asn>,
}

// Accepted prefix lengths, both ends inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixBounds {
    pub min: u8,
    pub max: u8,
}

// Encoding of prepend requests: a request with value `base + n` asks for
// `n` extra prepends, for `n` in `1..=max`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrependCfg {
    pub base: u32,
    pub max: u32,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CommLimits {
    pub standard: Option<usize>,
    pub extended: Option<usize>,
    pub large: Option<usize>,
}

// Compiled policy context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyContext {
    pub asn: Asn,
    pub router_id: Ipv4Addr,
    pub limits: CommLimits,
    pub graceful_shutdown: bool,
    pub prefix_length: AddressFamilies<PrefixBounds>,
    pub prepend: PrependCfg,
    pub peers: BTreeMap<String, Peer>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Peer {
    pub name: String,
    pub role: PeerRole,
    pub asn: Asn,
    pub address: IpAddr,
    pub local_address: Option<IpAddr>,
    pub allowed_asns: BTreeSet<Asn>,
    pub cluster_id: Option<Ipv4Addr>,
}

// ===== impl PolicyCfg =====

impl Default for PolicyCfg {
    fn default() -> PolicyCfg {
        PolicyCfg {
            asn: 0,
            router_id: Ipv4Addr::UNSPECIFIED,
            community_maxlen: None,
            extended_community_maxlen: None,
            large_community_maxlen: None,
            graceful_shutdown: false,
            prefix_length: AddressFamilies {
                ipv4: PrefixBounds { min: 8, max: 24 },
                ipv6: PrefixBounds { min: 16, max: 48 },
            },
            prepend: Default::default(),
            peers: Default::default(),
        }
    }
}

// ===== impl PrependCfg =====

impl Default for PrependCfg {
    fn default() -> PrependCfg {
        PrependCfg { base: 995, max: 3 }
    }
}

// ===== impl PrefixBounds =====

impl PrefixBounds {
    pub fn contains(&self, len: u8) -> bool {
        len >= self.min && len <= self.max
    }
}

// ===== impl PolicyContext =====

impl PolicyContext {
    // Validates the configuration and compiles it into a policy context.
    pub fn new(cfg: &PolicyCfg) -> Result<PolicyContext, Error> {
        if !is_valid_asn(cfg.asn) {
            return Err(Error::InvalidLocalAsn(cfg.asn));
        }
        if cfg.router_id.is_unspecified() || cfg.router_id.is_broadcast() {
            return Err(Error::InvalidRouterId(cfg.router_id));
        }
        for af in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
            let bounds = cfg.prefix_length.get(af);
            if bounds.min > bounds.max || bounds.max > af.max_prefixlen() {
                return Err(Error::InvalidPrefixBounds(
                    af, bounds.min, bounds.max,
                ));
            }
        }

        let peers = cfg
            .peers
            .iter()
            .map(|(name, peer_cfg)| {
                let peer = Peer::new(name, peer_cfg, cfg.asn)?;
                Ok((name.clone(), peer))
            })
            .collect::<Result<BTreeMap<_, _>, Error>>()?;

        // Peer names are folded into BIRD symbols, which must stay unique.
        let mut symbols = BTreeMap::new();
        for peer in peers.values() {
            if let Some(other) = symbols.insert(peer.symbol(), &peer.name) {
                return Err(Error::PeerSymbolConflict(
                    other.clone(),
                    peer.name.clone(),
                ));
            }
        }

        Ok(PolicyContext {
            asn: cfg.asn,
            router_id: cfg.router_id,
            limits: CommLimits {
                standard: cfg.community_maxlen,
                extended: cfg.extended_community_maxlen,
                large: cfg.large_community_maxlen,
            },
            graceful_shutdown: cfg.graceful_shutdown,
            prefix_length: cfg.prefix_length.clone(),
            prepend: cfg.prepend,
            peers,
        })
    }

    pub fn peer(&self, name: &str) -> Result<&Peer, Error> {
        self.peers
            .get(name)
            .ok_or_else(|| Error::UnknownPeer(name.to_owned()))
    }

    // Returns the cluster-id used when reflecting routes to the given peer.
    pub fn cluster_id(&self, peer: &Peer) -> Ipv4Addr {
        peer.cluster_id.unwrap_or(self.router_id)
    }

    // Returns all cluster-ids this router may have added to a cluster list.
    pub fn cluster_ids(&self) -> BTreeSet<Ipv4Addr> {
        self.peers
            .values()
            .filter_map(|peer| peer.cluster_id)
            .chain(std::iter::once(self.router_id))
            .collect()
    }
}

// ===== impl Peer =====

impl Peer {
    fn new(name: &str, cfg: &PeerCfg, local_asn: Asn) -> Result<Peer, Error> {
        let role = PeerRole::from_str(&cfg.role).map_err(|_| {
            Error::UnknownRole(name.to_owned(), cfg.role.clone())
        })?;

        // Internal roles share the local AS, external ones can't.
        if !is_valid_asn(cfg.asn)
            || role.is_internal() != (cfg.asn == local_asn)
        {
            return Err(Error::InvalidPeerAsn(name.to_owned(), cfg.asn));
        }

        if let Some(cluster_id) = cfg.rr_cluster_id {
            if !matches!(role, PeerRole::RrClient | PeerRole::RrServerRrServer)
            {
                return Err(Error::UnexpectedClusterId(name.to_owned()));
            }
            if cluster_id.is_unspecified() || cluster_id.is_broadcast() {
                return Err(Error::InvalidClusterId(
                    name.to_owned(),
                    cluster_id,
                ));
            }
        }

        Ok(Peer {
            name: name.to_owned(),
            role,
            asn: cfg.asn,
            address: cfg.address,
            local_address: cfg.local_address,
            allowed_asns: cfg.filter.asns.clone(),
            cluster_id: cfg.rr_cluster_id,
        })
    }

    // Returns the peer name as a BIRD symbol fragment: ASCII alphanumerics
    // upper-cased, anything else replaced by an underscore.
    pub fn symbol(&self) -> String {
        self.name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

// ===== helper functions =====

fn is_valid_asn(asn: Asn) -> bool {
    !ASN_RESERVED.contains(&asn)
}
