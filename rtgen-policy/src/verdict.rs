//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use enum_as_inner::EnumAsInner;
use rtgen_utils::route::Route;
use serde::{Deserialize, Serialize};

use crate::limits::LimitKinds;

// Outcome of running a route through an import or export pipeline.
//
// No route is ever silently dropped: rejected routes are reported with the
// reason, and routes converted to blackhole/unreachable are reported as
// downgrades.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(EnumAsInner)]
#[derive(Deserialize, Serialize)]
pub enum PolicyResult {
    Accept(Route),
    Downgrade(Route, DowngradeReason),
    Reject(RejectReason),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DowngradeReason {
    NexthopInvalid,
    AttrLimit(LimitKinds),
    Blackhole,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum RejectReason {
    // Import.
    PrefixLength,
    AsLoop,
    FirstAsMismatch,
    OriginAsNotAllowed,
    ClusterLoop,
    OriginatorLoop,
    // Export.
    NoAdvertise,
    NoExport,
    SplitHorizon,
    ValleyFree,
    NoExportToAsn,
    NotReachable,
    Reflection,
}

// ===== impl PolicyResult =====

impl PolicyResult {
    // Returns the resulting route, if the route survived the pipeline.
    pub fn route(&self) -> Option<&Route> {
        match self {
            PolicyResult::Accept(route) | PolicyResult::Downgrade(route, _) => {
                Some(route)
            }
            PolicyResult::Reject(_) => None,
        }
    }

    pub fn into_route(self) -> Option<Route> {
        match self {
            PolicyResult::Accept(route) | PolicyResult::Downgrade(route, _) => {
                Some(route)
            }
            PolicyResult::Reject(_) => None,
        }
    }
}

// ===== impl DowngradeReason =====

impl std::fmt::Display for DowngradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DowngradeReason::NexthopInvalid => {
                write!(f, "invalid next hop")
            }
            DowngradeReason::AttrLimit(kinds) => {
                write!(f, "community limit exceeded ({:?})", kinds)
            }
            DowngradeReason::Blackhole => {
                write!(f, "blackhole requested")
            }
        }
    }
}

// ===== impl RejectReason =====

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::PrefixLength => {
                write!(f, "prefix length out of bounds")
            }
            RejectReason::AsLoop => {
                write!(f, "AS path contains the local AS")
            }
            RejectReason::FirstAsMismatch => {
                write!(f, "first AS differs from the peer AS")
            }
            RejectReason::OriginAsNotAllowed => {
                write!(f, "origin AS not allowed by filter")
            }
            RejectReason::ClusterLoop => {
                write!(f, "cluster list contains the local cluster-id")
            }
            RejectReason::OriginatorLoop => {
                write!(f, "originator is the local router")
            }
            RejectReason::NoAdvertise => {
                write!(f, "NO_ADVERTISE community")
            }
            RejectReason::NoExport => {
                write!(f, "NO_EXPORT community")
            }
            RejectReason::SplitHorizon => {
                write!(f, "route learned from the same peer")
            }
            RejectReason::ValleyFree => {
                write!(f, "route not learned from a customer")
            }
            RejectReason::NoExportToAsn => {
                write!(f, "no-export request for the peer AS")
            }
            RejectReason::NotReachable => {
                write!(f, "unreachable or blackhole route")
            }
            RejectReason::Reflection => {
                write!(f, "route reflection rules")
            }
        }
    }
}
