//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Large-community signaling between the routers of the local AS.
//!
//! Every signal is a `(local ASN, function, value)` triple. Signals are only
//! ever appended to a route's large-community list, so that the list reads
//! as a log of what happened to the route: received tags first, then the
//! filter records in the order they fired, then the ingress-role marker.
//! Triples outside the local namespace, or with an unknown function, are
//! carried untouched.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use rtgen_utils::bgp::{Asn, LargeComm, LargeComms, PeerRole};
use serde::{Deserialize, Serialize};

use crate::config::PrependCfg;
use crate::role::AllowedFunctions;

// Large community functions.
pub const FUNC_INGRESS_ROLE: u32 = 3;
pub const FUNC_GSHUT_INGRESS_ROLE: u32 = 4;
pub const FUNC_LOCAL_PREF_ADJUST: u32 = 8;
pub const FUNC_PREPEND: u32 = 71;
pub const FUNC_BLACKHOLE: u32 = 666;
pub const FUNC_FILTER_ACTION: u32 = 1000;
pub const FUNC_LIMIT_EXCEEDED: u32 = 1101;
pub const FUNC_NO_EXPORT_TO: u32 = 1200;

// LARGE_COMMUNITY path attribute (RFC 8092).
pub const ATTR_TYPE_LARGE_COMMUNITY: u8 = 32;
const ATTR_FLAG_OPTIONAL: u8 = 0x80;
const ATTR_FLAG_TRANSITIVE: u8 = 0x40;
const ATTR_FLAG_EXTENDED: u8 = 0x10;

// Ingress-role codes carried by the ingress-role and graceful-shutdown
// markers.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum RoleCode {
    Customer = 2,
    Peer = 3,
    Transit = 4,
    RouteServer = 5,
}

// Actions recorded by the import filters.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum FilterAction {
    NexthopMismatch = 1,
    CommunitiesStripped = 3,
}

// Community list kinds subject to length limits.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum LimitKind {
    Standard = 16,
    Extended = 17,
    Large = 18,
}

// Decoded administrative signal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Signal {
    IngressRole(RoleCode),
    GshutIngressRole(RoleCode),
    LocalPrefMinusOne,
    Prepend(u32),
    Blackhole(u32),
    NoExportTo(Asn),
    FilterAction(FilterAction),
    LimitExceeded(LimitKind),
}

// LARGE_COMMUNITY attribute decoding errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum AttrError {
    Truncated,
    UnexpectedType(u8),
    InvalidLength(usize),
}

// ===== impl RoleCode =====

impl RoleCode {
    // Returns the code of the given role. Only edge roles have one.
    pub fn from_role(role: PeerRole) -> Option<RoleCode> {
        match role {
            PeerRole::Customer => Some(RoleCode::Customer),
            PeerRole::Peer => Some(RoleCode::Peer),
            PeerRole::Transit => Some(RoleCode::Transit),
            PeerRole::RouteServer => Some(RoleCode::RouteServer),
            PeerRole::RouteCollector
            | PeerRole::RrClient
            | PeerRole::RrServer
            | PeerRole::RrServerRrServer => None,
        }
    }

    pub fn role(&self) -> PeerRole {
        match self {
            RoleCode::Customer => PeerRole::Customer,
            RoleCode::Peer => PeerRole::Peer,
            RoleCode::Transit => PeerRole::Transit,
            RoleCode::RouteServer => PeerRole::RouteServer,
        }
    }
}

// ===== impl Signal =====

impl Signal {
    pub fn encode(&self, asn: Asn) -> LargeComm {
        let (function, value) = match self {
            Signal::IngressRole(code) => {
                (FUNC_INGRESS_ROLE, *code as u32)
            }
            Signal::GshutIngressRole(code) => {
                (FUNC_GSHUT_INGRESS_ROLE, *code as u32)
            }
            Signal::LocalPrefMinusOne => (FUNC_LOCAL_PREF_ADJUST, 1),
            Signal::Prepend(value) => (FUNC_PREPEND, *value),
            Signal::Blackhole(value) => (FUNC_BLACKHOLE, *value),
            Signal::NoExportTo(target) => (FUNC_NO_EXPORT_TO, *target),
            Signal::FilterAction(action) => {
                (FUNC_FILTER_ACTION, *action as u32)
            }
            Signal::LimitExceeded(kind) => {
                (FUNC_LIMIT_EXCEEDED, *kind as u32)
            }
        };
        LargeComm::new(asn, function, value)
    }

    // Decodes a large community as a signal in the namespace of the given
    // ASN. Returns `None` for anything that isn't a recognized signal.
    pub fn decode(comm: &LargeComm, asn: Asn) -> Option<Signal> {
        if comm.asn != asn {
            return None;
        }

        match comm.function {
            FUNC_INGRESS_ROLE => {
                RoleCode::from_u32(comm.value).map(Signal::IngressRole)
            }
            FUNC_GSHUT_INGRESS_ROLE => {
                RoleCode::from_u32(comm.value).map(Signal::GshutIngressRole)
            }
            FUNC_LOCAL_PREF_ADJUST if comm.value == 1 => {
                Some(Signal::LocalPrefMinusOne)
            }
            FUNC_PREPEND => Some(Signal::Prepend(comm.value)),
            FUNC_BLACKHOLE => Some(Signal::Blackhole(comm.value)),
            FUNC_NO_EXPORT_TO => Some(Signal::NoExportTo(comm.value)),
            FUNC_FILTER_ACTION => {
                FilterAction::from_u32(comm.value).map(Signal::FilterAction)
            }
            FUNC_LIMIT_EXCEEDED => {
                LimitKind::from_u32(comm.value).map(Signal::LimitExceeded)
            }
            _ => None,
        }
    }
}

// ===== impl AttrError =====

impl std::fmt::Display for AttrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrError::Truncated => {
                write!(f, "truncated LARGE_COMMUNITY attribute")
            }
            AttrError::UnexpectedType(attr_type) => {
                write!(f, "unexpected attribute type {attr_type}")
            }
            AttrError::InvalidLength(len) => {
                write!(f, "invalid LARGE_COMMUNITY length {len}")
            }
        }
    }
}

impl std::error::Error for AttrError {}

// ===== global functions =====

// Encodes a sequence of signals, preserving their order.
pub fn encode(asn: Asn, signals: &[Signal]) -> LargeComms {
    signals.iter().map(|signal| signal.encode(asn)).collect()
}

// Decodes all recognized signals, preserving their order.
pub fn decode(asn: Asn, comms: &LargeComms) -> Vec<Signal> {
    comms
        .iter()
        .filter_map(|comm| Signal::decode(comm, asn))
        .collect()
}

// Appends a signal to the list, unless the very same triple is already
// present.
pub fn append(comms: &mut LargeComms, asn: Asn, signal: Signal) {
    comms.push_unique(signal.encode(asn));
}

// Returns the role encoded by the ingress-role marker, if any.
pub fn ingress_role(comms: &LargeComms, asn: Asn) -> Option<PeerRole> {
    comms.iter().find_map(|comm| match Signal::decode(comm, asn) {
        Some(Signal::IngressRole(code)) => Some(code.role()),
        _ => None,
    })
}

pub fn contains(comms: &LargeComms, asn: Asn, signal: Signal) -> bool {
    comms.contains(&signal.encode(asn))
}

pub fn has_blackhole_request(comms: &LargeComms, asn: Asn) -> bool {
    comms.iter().any(|comm| {
        matches!(Signal::decode(comm, asn), Some(Signal::Blackhole(_)))
    })
}

pub fn no_export_to(comms: &LargeComms, asn: Asn, target: Asn) -> bool {
    contains(comms, asn, Signal::NoExportTo(target))
}

// Returns true for the records appended by the local import filters.
//
// These never count toward the large-community length limit.
pub fn is_local_record(comm: &LargeComm, asn: Asn) -> bool {
    comm.asn == asn
        && matches!(comm.function, FUNC_FILTER_ACTION | FUNC_LIMIT_EXCEEDED)
}

// Removes the local-namespace communities a neighbor isn't allowed to set.
//
// Returns true if anything was removed.
pub fn sanitize(
    comms: &mut LargeComms,
    asn: Asn,
    allowed: AllowedFunctions,
) -> bool {
    let len = comms.len();
    comms.retain(|comm| comm.asn != asn || allowed.permits(comm.function));
    comms.len() != len
}

// Removes every community in the local namespace.
pub fn strip_local(comms: &mut LargeComms, asn: Asn) {
    comms.retain(|comm| comm.asn != asn);
}

// Returns the number of extra prepends requested through the prepend
// function. When several requests are present the largest one wins.
pub fn prepend_count(comms: &LargeComms, asn: Asn, cfg: &PrependCfg) -> u32 {
    comms
        .iter()
        .filter_map(|comm| match Signal::decode(comm, asn) {
            Some(Signal::Prepend(value)) => value.checked_sub(cfg.base),
            _ => None,
        })
        .filter(|count| (1..=cfg.max).contains(count))
        .max()
        .unwrap_or(0)
}

// Encodes the list as a LARGE_COMMUNITY path attribute.
pub fn encode_attr(comms: &LargeComms, buf: &mut BytesMut) {
    let attr_flags =
        ATTR_FLAG_OPTIONAL | ATTR_FLAG_TRANSITIVE | ATTR_FLAG_EXTENDED;
    buf.put_u8(attr_flags);
    buf.put_u8(ATTR_TYPE_LARGE_COMMUNITY);

    // The length field will be initialized later.
    let start_pos = buf.len();
    buf.put_u16(0);

    // Encode attribute data.
    for comm in comms {
        buf.put_slice(&comm.to_bytes());
    }

    // Rewrite attribute length.
    let attr_len = (buf.len() - start_pos - 2) as u16;
    buf[start_pos..start_pos + 2].copy_from_slice(&attr_len.to_be_bytes());
}

// Decodes a LARGE_COMMUNITY path attribute.
pub fn decode_attr(buf: &mut Bytes) -> Result<LargeComms, AttrError> {
    if buf.remaining() < 3 {
        return Err(AttrError::Truncated);
    }

    let attr_flags = buf.get_u8();
    let attr_type = buf.get_u8();
    if attr_type != ATTR_TYPE_LARGE_COMMUNITY {
        return Err(AttrError::UnexpectedType(attr_type));
    }

    let attr_len = if attr_flags & ATTR_FLAG_EXTENDED != 0 {
        if buf.remaining() < 2 {
            return Err(AttrError::Truncated);
        }
        buf.get_u16() as usize
    } else {
        buf.get_u8() as usize
    };
    if attr_len > buf.remaining() {
        return Err(AttrError::Truncated);
    }
    if attr_len == 0 || attr_len % LargeComm::LENGTH != 0 {
        return Err(AttrError::InvalidLength(attr_len));
    }

    let mut data = buf.copy_to_bytes(attr_len);
    let mut comms = LargeComms::default();
    while data.remaining() > 0 {
        let mut value = [0; LargeComm::LENGTH];
        data.copy_to_slice(&mut value);
        comms.push(LargeComm::from_bytes(value));
    }

    Ok(comms)
}
