//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use rtgen_utils::bgp::{Asn, PeerRole};
use rtgen_utils::route::{PrefixType, Route};
use serde::{Deserialize, Serialize};

use crate::community::{self, LimitKind, Signal};
use crate::config::CommLimits;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LimitKinds: u8 {
        const STANDARD = 0x01;
        const EXTENDED = 0x02;
        const LARGE = 0x04;
    }
}

// ===== impl LimitKinds =====

impl LimitKinds {
    fn kind(&self) -> LimitKind {
        if *self == LimitKinds::STANDARD {
            LimitKind::Standard
        } else if *self == LimitKinds::EXTENDED {
            LimitKind::Extended
        } else {
            LimitKind::Large
        }
    }
}

// ===== global functions =====

// Returns the community kinds whose length exceeds the configured limit.
//
// The records appended by the local import filters don't count toward the
// large-community length, otherwise recording a violation could cause
// another one.
pub fn exceeded(route: &Route, limits: &CommLimits, asn: Asn) -> LimitKinds {
    let attrs = &route.attrs;
    let large_len = attrs
        .large_comm
        .iter()
        .filter(|comm| !community::is_local_record(comm, asn))
        .count();

    let mut kinds = LimitKinds::empty();
    for (kind, len, limit) in [
        (LimitKinds::STANDARD, attrs.comm.len(), limits.standard),
        (LimitKinds::EXTENDED, attrs.ext_comm.len(), limits.extended),
        (LimitKinds::LARGE, large_len, limits.large),
    ] {
        if let Some(limit) = limit
            && len > limit
        {
            kinds.insert(kind);
        }
    }
    kinds
}

// Enforces the community length limits.
//
// Lists are never truncated. Edge roles keep the route as is, internal
// roles and route collectors get an unreachable route with the offending
// lists emptied. Either way, one record per violated limit is appended to
// the large communities.
pub fn enforce_limits(
    mut route: Route,
    role: PeerRole,
    limits: &CommLimits,
    asn: Asn,
) -> (Route, LimitKinds) {
    let kinds = exceeded(&route, limits, asn);
    if kinds.is_empty() {
        return (route, kinds);
    }

    if !role.is_edge() {
        route.prefix_type = PrefixType::Unreachable;
        let attrs = &mut route.attrs;
        if kinds.contains(LimitKinds::STANDARD) {
            attrs.comm.clear();
        }
        if kinds.contains(LimitKinds::EXTENDED) {
            attrs.ext_comm.clear();
        }
        if kinds.contains(LimitKinds::LARGE) {
            attrs.large_comm.clear();
        }
    }

    for kind in kinds.iter() {
        community::append(
            &mut route.attrs.large_comm,
            asn,
            Signal::LimitExceeded(kind.kind()),
        );
    }

    (route, kinds)
}
