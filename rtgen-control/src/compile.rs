//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use ipnetwork::IpNetwork;
use rtgen_policy::config::PolicyContext;
use rtgen_policy::gshut::PolicySnapshot;
use rtgen_policy::pipeline;
use rtgen_policy::verdict::PolicyResult;
use rtgen_rib::dump::{self, Dump};
use rtgen_rib::rib::{self, RedistributeCfg, TableKind, Tables};
use rtgen_utils::ip::{AddressFamily, IpNetworkExt};
use rtgen_utils::route::Route;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::error::Error;

// A route handed to the compiler.
//
// Routes carrying a peer name were learned over BGP from that peer and go
// through its import pipeline. Routes without one were originated by a
// local protocol and are taken as they are.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouteInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    pub route: Route,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct ImportVerdict {
    pub peer: String,
    pub prefix: IpNetwork,
    pub result: PolicyResult,
}

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct CompileOutput {
    pub imports: Vec<ImportVerdict>,
    pub tables: Dump,
    // Export verdicts, keyed by peer name and then by prefix.
    pub exports: BTreeMap<String, BTreeMap<String, PolicyResult>>,
}

// ===== global functions =====

// Compiles a batch of routes against one policy snapshot.
//
// Every peer name is resolved before any route is processed: a route
// referencing an unknown peer fails the whole batch. Prefixes are masked
// first, so host bits never split one prefix into several table entries.
pub fn compile(
    ctx: &PolicyContext,
    snapshot: &PolicySnapshot,
    inputs: Vec<RouteInput>,
    redistribute: &RedistributeCfg,
) -> Result<CompileOutput, Error> {
    for input in &inputs {
        if let Some(peer) = &input.peer {
            ctx.peer(peer)?;
        }
    }

    let input_count = inputs.len();
    let mut imports = vec![];
    let mut routes = vec![];
    for mut input in inputs {
        input.route.prefix = input.route.prefix.apply_mask();
        let Some(name) = input.peer else {
            routes.push(input.route);
            continue;
        };

        let peer = ctx.peer(&name)?;
        let prefix = input.route.prefix;
        let result = pipeline::import(input.route, peer, ctx);
        if let Some(route) = result.route() {
            routes.push(route.clone());
        }
        imports.push(ImportVerdict {
            peer: name,
            prefix,
            result,
        });
    }

    let tables = rib::merge(&routes, redistribute);
    let exports = export_all(ctx, snapshot, &tables);
    Debug::BatchCompiled(input_count, exports.len()).log();

    Ok(CompileOutput {
        imports,
        tables: dump::dump(&tables),
        exports,
    })
}

// ===== helper functions =====

// Runs the best paths of the BGP tables through the export pipeline of every
// configured peer.
fn export_all(
    ctx: &PolicyContext,
    snapshot: &PolicySnapshot,
    tables: &Tables,
) -> BTreeMap<String, BTreeMap<String, PolicyResult>> {
    let best_paths = [AddressFamily::Ipv4, AddressFamily::Ipv6]
        .into_iter()
        .filter_map(|af| tables.get(TableKind::Bgp, af))
        .flat_map(|table| table.prefixes.values())
        .filter_map(|candidates| {
            candidates.iter().find(|candidate| candidate.bestpath)
        })
        .map(|candidate| &candidate.route)
        .collect::<Vec<_>>();

    ctx.peers
        .values()
        .map(|peer| {
            let results = best_paths
                .iter()
                .map(|route| {
                    let result =
                        pipeline::export((*route).clone(), peer, ctx, snapshot);
                    (route.prefix.to_string(), result)
                })
                .collect();
            (peer.name.clone(), results)
        })
        .collect()
}
