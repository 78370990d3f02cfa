//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! BGP definitions shared by the policy compiler, the RIB merger and the
//! control plane: peer roles, AS paths and the three community flavors.

use std::str::FromStr;

use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

pub type Asn = u32;

// Relationship with a BGP neighbor.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum PeerRole {
    #[serde(rename = "customer")]
    Customer,
    #[serde(rename = "peer")]
    Peer,
    #[serde(rename = "transit")]
    Transit,
    #[serde(rename = "route-server")]
    RouteServer,
    #[serde(rename = "route-collector")]
    RouteCollector,
    #[serde(rename = "rrclient")]
    RrClient,
    #[serde(rename = "rrserver")]
    RrServer,
    #[serde(rename = "rrserver-rrserver")]
    RrServerRrServer,
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum PeerType {
    Internal,
    External,
}

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(transparent)]
pub struct AsPath(pub Vec<Asn>);

// Ordered community list.
//
// Order is significant: two lists holding the same communities in a
// different order are different lists.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(transparent)]
pub struct CommList<T>(pub Vec<T>);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(from = "(u16, u16)", into = "(u16, u16)")]
pub struct Comm(pub u32);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "(u8, u8, u64)", into = "(u8, u8, u64)")]
pub struct ExtComm {
    pub typ: u8,
    pub subtype: u8,
    pub value: u64,
}

// Extended community value that does not fit in six octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExtCommValueError(pub u64);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(from = "(u32, u32, u32)", into = "(u32, u32, u32)")]
pub struct LargeComm {
    pub asn: Asn,
    pub function: u32,
    pub value: u32,
}

// Useful type definitions.
pub type Comms = CommList<Comm>;
pub type ExtComms = CommList<ExtComm>;
pub type LargeComms = CommList<LargeComm>;

// BGP Well-known Communities.
//
// IANA registry:
// https://www.iana.org/assignments/bgp-well-known-communities/bgp-well-known-communities.xhtml
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
#[repr(u32)]
pub enum WellKnownCommunities {
    GracefulShutdown = 0xFFFF0000,
    Blackhole = 0xFFFF029A,
    NoExport = 0xFFFFFF01,
    NoAdvertise = 0xFFFFFF02,
}

// ===== impl PeerRole =====

impl PeerRole {
    pub const ALL: [PeerRole; 8] = [
        PeerRole::Customer,
        PeerRole::Peer,
        PeerRole::Transit,
        PeerRole::RouteServer,
        PeerRole::RouteCollector,
        PeerRole::RrClient,
        PeerRole::RrServer,
        PeerRole::RrServerRrServer,
    ];

    pub fn peer_type(&self) -> PeerType {
        match self {
            PeerRole::Customer
            | PeerRole::Peer
            | PeerRole::Transit
            | PeerRole::RouteServer
            | PeerRole::RouteCollector => PeerType::External,
            PeerRole::RrClient
            | PeerRole::RrServer
            | PeerRole::RrServerRrServer => PeerType::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.peer_type() == PeerType::Internal
    }

    // Returns true for the external roles that exchange traffic with us
    // (everything external except route collectors).
    pub fn is_edge(&self) -> bool {
        matches!(
            self,
            PeerRole::Customer
                | PeerRole::Peer
                | PeerRole::Transit
                | PeerRole::RouteServer
        )
    }

    // Returns true if we act as route reflector towards this neighbor.
    pub fn is_reflector_client(&self) -> bool {
        matches!(self, PeerRole::RrClient)
    }
}

impl std::fmt::Display for PeerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerRole::Customer => write!(f, "customer"),
            PeerRole::Peer => write!(f, "peer"),
            PeerRole::Transit => write!(f, "transit"),
            PeerRole::RouteServer => write!(f, "route-server"),
            PeerRole::RouteCollector => write!(f, "route-collector"),
            PeerRole::RrClient => write!(f, "rrclient"),
            PeerRole::RrServer => write!(f, "rrserver"),
            PeerRole::RrServerRrServer => write!(f, "rrserver-rrserver"),
        }
    }
}

impl FromStr for PeerRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "customer" => Ok(PeerRole::Customer),
            "peer" => Ok(PeerRole::Peer),
            "transit" => Ok(PeerRole::Transit),
            "route-server" | "routeserver" => Ok(PeerRole::RouteServer),
            "route-collector" | "routecollector" => {
                Ok(PeerRole::RouteCollector)
            }
            "rrclient" => Ok(PeerRole::RrClient),
            "rrserver" => Ok(PeerRole::RrServer),
            "rrserver-rrserver" => Ok(PeerRole::RrServerRrServer),
            _ => Err(()),
        }
    }
}

// ===== impl AsPath =====

impl AsPath {
    // Returns the neighboring AS (leftmost ASN).
    pub fn first(&self) -> Option<Asn> {
        self.0.first().copied()
    }

    // Returns the originating AS (rightmost ASN).
    pub fn origin(&self) -> Option<Asn> {
        self.0.last().copied()
    }

    pub fn contains(&self, asn: Asn) -> bool {
        self.0.contains(&asn)
    }

    pub fn path_length(&self) -> u32 {
        self.0.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn prepend(&mut self, asn: Asn, count: u32) {
        for _ in 0..count {
            self.0.insert(0, asn);
        }
    }
}

impl<T> From<Vec<T>> for AsPath
where
    T: Into<Asn>,
{
    fn from(path: Vec<T>) -> AsPath {
        AsPath(path.into_iter().map(Into::into).collect())
    }
}

// ===== impl CommList =====

impl<T> CommList<T>
where
    T: Copy + Eq,
{
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, comm: &T) -> bool {
        self.0.contains(comm)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    // Appends a community at the end of the list.
    pub fn push(&mut self, comm: T) {
        self.0.push(comm);
    }

    // Appends a community unless it's already present.
    pub fn push_unique(&mut self, comm: T) {
        if !self.contains(&comm) {
            self.0.push(comm);
        }
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.0.retain(f);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T> Default for CommList<T> {
    fn default() -> CommList<T> {
        CommList(Vec::new())
    }
}

impl<T> FromIterator<T> for CommList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> CommList<T> {
        CommList(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a CommList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ===== impl Comm =====

impl Comm {
    pub const GRACEFUL_SHUTDOWN: Comm =
        Comm(WellKnownCommunities::GracefulShutdown as u32);
    pub const BLACKHOLE: Comm = Comm(WellKnownCommunities::Blackhole as u32);
    pub const NO_EXPORT: Comm = Comm(WellKnownCommunities::NoExport as u32);
    pub const NO_ADVERTISE: Comm =
        Comm(WellKnownCommunities::NoAdvertise as u32);

    pub const fn new(asn: u16, value: u16) -> Comm {
        Comm(((asn as u32) << 16) | value as u32)
    }

    pub fn asn(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn value(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl std::fmt::Display for Comm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.asn(), self.value())
    }
}

impl From<(u16, u16)> for Comm {
    fn from((asn, value): (u16, u16)) -> Comm {
        Comm::new(asn, value)
    }
}

impl From<Comm> for (u16, u16) {
    fn from(comm: Comm) -> (u16, u16) {
        (comm.asn(), comm.value())
    }
}

// ===== impl ExtComm =====

impl ExtComm {
    // The value field is six octets long.
    pub const VALUE_MAX: u64 = 0xFFFF_FFFF_FFFF;

    // Builds an extended community. Bits of `value` above the six-octet
    // value field are discarded.
    pub const fn new(typ: u8, subtype: u8, value: u64) -> ExtComm {
        ExtComm {
            typ,
            subtype,
            value: value & ExtComm::VALUE_MAX,
        }
    }
}

impl std::fmt::Display for ExtComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.typ, self.subtype, self.value)
    }
}

impl TryFrom<(u8, u8, u64)> for ExtComm {
    type Error = ExtCommValueError;

    fn try_from(
        (typ, subtype, value): (u8, u8, u64),
    ) -> Result<ExtComm, ExtCommValueError> {
        if value > ExtComm::VALUE_MAX {
            return Err(ExtCommValueError(value));
        }
        Ok(ExtComm::new(typ, subtype, value))
    }
}

impl From<ExtComm> for (u8, u8, u64) {
    fn from(comm: ExtComm) -> (u8, u8, u64) {
        (comm.typ, comm.subtype, comm.value)
    }
}

// ===== impl ExtCommValueError =====

impl std::fmt::Display for ExtCommValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "extended community value {} exceeds six octets", self.0)
    }
}

impl std::error::Error for ExtCommValueError {}

// ===== impl LargeComm =====

impl LargeComm {
    pub const LENGTH: usize = 12;

    pub const fn new(asn: Asn, function: u32, value: u32) -> LargeComm {
        LargeComm {
            asn,
            function,
            value,
        }
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0; 12];
        bytes[0..4].copy_from_slice(&self.asn.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.function.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.value.to_be_bytes());
        bytes
    }

    pub fn from_bytes(bytes: [u8; 12]) -> LargeComm {
        let word = |i: usize| {
            u32::from_be_bytes([
                bytes[i],
                bytes[i + 1],
                bytes[i + 2],
                bytes[i + 3],
            ])
        };
        LargeComm::new(word(0), word(4), word(8))
    }
}

impl std::fmt::Display for LargeComm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.asn, self.function, self.value)
    }
}

impl From<(u32, u32, u32)> for LargeComm {
    fn from((asn, function, value): (u32, u32, u32)) -> LargeComm {
        LargeComm::new(asn, function, value)
    }
}

impl From<LargeComm> for (u32, u32, u32) {
    fn from(comm: LargeComm) -> (u32, u32, u32) {
        (comm.asn, comm.function, comm.value)
    }
}
