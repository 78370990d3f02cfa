//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use rtgen_utils::bgp::Asn;
use rtgen_utils::ip::AddressFamily;
use tracing::{error, error_span};

// Policy errors.
//
// Configuration errors are fatal: the policy is not compiled at all.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    UnknownRole(String, String),
    InvalidLocalAsn(Asn),
    InvalidRouterId(Ipv4Addr),
    InvalidPeerAsn(String, Asn),
    InvalidClusterId(String, Ipv4Addr),
    UnexpectedClusterId(String),
    InvalidPrefixBounds(AddressFamily, u8, u8),
    UnknownPeer(String),
    PeerSymbolConflict(String, String),
    StaleSnapshot(u64, u64),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::UnknownRole(peer, role) => {
                error_span!("peer", name = %peer).in_scope(|| {
                    error!(%role, "{}", self);
                });
            }
            Error::InvalidLocalAsn(asn) => {
                error!(%asn, "{}", self);
            }
            Error::InvalidRouterId(router_id) => {
                error!(%router_id, "{}", self);
            }
            Error::InvalidPeerAsn(peer, asn) => {
                error_span!("peer", name = %peer).in_scope(|| {
                    error!(%asn, "{}", self);
                });
            }
            Error::InvalidClusterId(peer, cluster_id) => {
                error_span!("peer", name = %peer).in_scope(|| {
                    error!(%cluster_id, "{}", self);
                });
            }
            Error::UnexpectedClusterId(peer) => {
                error_span!("peer", name = %peer).in_scope(|| {
                    error!("{}", self);
                });
            }
            Error::InvalidPrefixBounds(af, min, max) => {
                error!(%af, %min, %max, "{}", self);
            }
            Error::UnknownPeer(peer) => {
                error!(name = %peer, "{}", self);
            }
            Error::PeerSymbolConflict(peer, other) => {
                error_span!("peer", name = %peer).in_scope(|| {
                    error!(%other, "{}", self);
                });
            }
            Error::StaleSnapshot(version, current) => {
                error!(%version, %current, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownRole(..) => {
                write!(f, "unknown peer role")
            }
            Error::InvalidLocalAsn(..) => {
                write!(f, "invalid local AS number")
            }
            Error::InvalidRouterId(..) => {
                write!(f, "invalid router-id")
            }
            Error::InvalidPeerAsn(..) => {
                write!(f, "invalid peer AS number")
            }
            Error::InvalidClusterId(..) => {
                write!(f, "invalid route reflector cluster-id")
            }
            Error::UnexpectedClusterId(..) => {
                write!(
                    f,
                    "cluster-id is only valid for route reflector clients and reflector meshes"
                )
            }
            Error::InvalidPrefixBounds(..) => {
                write!(f, "invalid prefix length bounds")
            }
            Error::UnknownPeer(..) => {
                write!(f, "unknown peer")
            }
            Error::PeerSymbolConflict(..) => {
                write!(f, "peer names map to the same daemon symbol")
            }
            Error::StaleSnapshot(..) => {
                write!(f, "policy snapshot is older than the active one")
            }
        }
    }
}

impl std::error::Error for Error {}
