//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Rendering of the compiled policy as a BIRD include file.
//!
//! The file only holds `define` statements consumed by the static part of
//! the BIRD configuration. The snapshot version isn't rendered: two
//! snapshots holding the same policy render to the same bytes.

use std::fmt::Write;

use rtgen_policy::community::RoleCode;
use rtgen_policy::config::{Peer, PolicyContext};
use rtgen_policy::gshut::PolicySnapshot;
use rtgen_policy::role::role_baseline;
use rtgen_utils::bgp::PeerRole;

const HEADER: &str = "# Generated by rtgen. Do not edit.\n";

// ===== global functions =====

pub fn render(ctx: &PolicyContext, snapshot: &PolicySnapshot) -> String {
    let mut out = String::from(HEADER);

    out.push('\n');
    define(&mut out, "LOCAL_ASN", ctx.asn);
    define(&mut out, "ROUTER_ID", ctx.router_id);
    if let Some(maxlen) = ctx.limits.standard {
        define(&mut out, "COMMUNITY_MAXLEN", maxlen);
    }
    if let Some(maxlen) = ctx.limits.extended {
        define(&mut out, "EXTENDED_COMMUNITY_MAXLEN", maxlen);
    }
    if let Some(maxlen) = ctx.limits.large {
        define(&mut out, "LARGE_COMMUNITY_MAXLEN", maxlen);
    }
    define(&mut out, "PREFIX_MIN4", ctx.prefix_length.ipv4.min);
    define(&mut out, "PREFIX_MAX4", ctx.prefix_length.ipv4.max);
    define(&mut out, "PREFIX_MIN6", ctx.prefix_length.ipv6.min);
    define(&mut out, "PREFIX_MAX6", ctx.prefix_length.ipv6.max);
    define(&mut out, "PREPEND_BASE", ctx.prepend.base);
    define(&mut out, "PREPEND_MAX", ctx.prepend.max);
    define(&mut out, "GRACEFUL_SHUTDOWN", snapshot.global());

    for peer in ctx.peers.values() {
        out.push('\n');
        render_peer(&mut out, peer, snapshot);
    }

    out
}

// ===== helper functions =====

fn render_peer(out: &mut String, peer: &Peer, snapshot: &PolicySnapshot) {
    let prefix = format!("PEER_{}", peer.symbol());
    let baseline = role_baseline(peer.role);

    let _ = writeln!(out, "# {} ({})", peer.name, peer.role);
    define(out, &format!("{prefix}_ASN"), peer.asn);
    define(out, &format!("{prefix}_ROLE"), format!("\"{}\"", peer.role));
    define(out, &format!("{prefix}_ROLE_CODE"), role_code(peer.role));
    define(out, &format!("{prefix}_LOCAL_PREF"), baseline.local_pref);
    define(
        out,
        &format!("{prefix}_GRACEFUL_SHUTDOWN"),
        snapshot.applies_to(&peer.name),
    );
}

fn define(out: &mut String, name: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "define {name} = {value};");
}

// Ingress-role code, zero for roles that don't have one.
fn role_code(role: PeerRole) -> u32 {
    RoleCode::from_role(role)
        .map(|code| code as u32)
        .unwrap_or_default()
}
