//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use derive_new::new;
use ipnetwork::IpNetwork;
use itertools::Itertools;
use rtgen_utils::ip::AddressFamily;
use rtgen_utils::protocol::Protocol;
use rtgen_utils::route::Route;
use serde::{Deserialize, Serialize};

use crate::debug::Debug;

// Local preference assumed for routes that don't carry one.
const DFLT_LOCAL_PREF: u32 = 100;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum TableKind {
    Master,
    Static,
    Ospf,
    Bgp,
    Kernel,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(new)]
#[derive(Deserialize, Serialize)]
pub struct TableName {
    pub kind: TableKind,
    pub af: AddressFamily,
}

// Protocols redistributed into each per-protocol table. The master tables
// always hold every route.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedistributeCfg {
    pub t_static: BTreeSet<Protocol>,
    pub t_ospf: BTreeSet<Protocol>,
    pub t_bgp: BTreeSet<Protocol>,
    pub t_kernel: BTreeSet<Protocol>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Candidate {
    pub route: Route,
    pub preference: u32,
    pub bestpath: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Table {
    pub prefixes: BTreeMap<IpNetwork, Vec<Candidate>>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tables(pub BTreeMap<TableName, Table>);

// ===== impl TableKind =====

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        TableKind::Master,
        TableKind::Static,
        TableKind::Ospf,
        TableKind::Bgp,
        TableKind::Kernel,
    ];
}

// ===== impl TableName =====

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.kind {
            TableKind::Master => "master",
            TableKind::Static => "t_static",
            TableKind::Ospf => "t_ospf",
            TableKind::Bgp => "t_bgp",
            TableKind::Kernel => "t_kernel",
        };
        write!(f, "{}{}", name, self.af.table_suffix())
    }
}

// ===== impl RedistributeCfg =====

impl RedistributeCfg {
    // Returns whether routes of the given protocol belong to the given
    // table.
    pub fn accepts(&self, kind: TableKind, protocol: Protocol) -> bool {
        match kind {
            TableKind::Master => true,
            TableKind::Static => self.t_static.contains(&protocol),
            TableKind::Ospf => self.t_ospf.contains(&protocol),
            TableKind::Bgp => self.t_bgp.contains(&protocol),
            TableKind::Kernel => self.t_kernel.contains(&protocol),
        }
    }
}

impl Default for RedistributeCfg {
    fn default() -> RedistributeCfg {
        RedistributeCfg {
            t_static: [Protocol::STATIC].into(),
            t_ospf: [Protocol::OSPF, Protocol::STATIC, Protocol::DIRECT].into(),
            t_bgp: [Protocol::BGP, Protocol::STATIC].into(),
            t_kernel: [
                Protocol::KERNEL,
                Protocol::STATIC,
                Protocol::OSPF,
                Protocol::BGP,
            ]
            .into(),
        }
    }
}

// ===== impl Candidate =====

impl Candidate {
    fn new(route: Route) -> Candidate {
        Candidate {
            preference: route.protocol.preference(),
            route,
            bestpath: false,
        }
    }

    // Compares two candidates for the same prefix. `Ordering::Less` means
    // `self` is preferred.
    fn compare(&self, other: &Candidate) -> Ordering {
        let a = &self.route;
        let b = &other.route;

        // Higher preference wins.
        other
            .preference
            .cmp(&self.preference)
            // Higher local preference wins.
            .then_with(|| {
                let a = a.attrs.local_pref.unwrap_or(DFLT_LOCAL_PREF);
                let b = b.attrs.local_pref.unwrap_or(DFLT_LOCAL_PREF);
                b.cmp(&a)
            })
            // Shorter AS path wins.
            .then_with(|| {
                let a = a.attrs.as_path.path_length();
                let b = b.attrs.as_path.path_length();
                a.cmp(&b)
            })
            // Lower MED wins.
            .then_with(|| {
                a.attrs.med.unwrap_or(0).cmp(&b.attrs.med.unwrap_or(0))
            })
            // Lower OSPF metrics win.
            .then_with(|| ospf_metrics(a).cmp(&ospf_metrics(b)))
            // Lower kernel metric wins.
            .then_with(|| kernel_metric(a).cmp(&kernel_metric(b)))
            // Deterministic tie-breakers.
            .then_with(|| a.instance.cmp(&b.instance))
            .then_with(|| a.nexthops.cmp(&b.nexthops))
    }
}

// ===== impl Tables =====

impl Tables {
    pub fn get(&self, kind: TableKind, af: AddressFamily) -> Option<&Table> {
        self.0.get(&TableName::new(kind, af))
    }

    // Returns the best path of the given prefix in the given table.
    pub fn best(&self, name: &TableName, prefix: &IpNetwork) -> Option<&Route> {
        self.0
            .get(name)?
            .prefixes
            .get(prefix)?
            .iter()
            .find(|candidate| candidate.bestpath)
            .map(|candidate| &candidate.route)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TableName, &Table)> {
        self.0.iter()
    }
}

// ===== global functions =====

// Merges the routes of all sources into the master and per-protocol
// tables, electing one best path per prefix and table.
//
// Every table exists in the output, even when empty.
pub fn merge(routes: &[Route], cfg: &RedistributeCfg) -> Tables {
    let mut tables = BTreeMap::new();
    for af in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
        for kind in TableKind::ALL {
            let name = TableName::new(kind, af);
            let table = build_table(&name, routes, cfg);
            Debug::TableMerged(&name, table.prefixes.len()).log();
            tables.insert(name, table);
        }
    }

    Tables(tables)
}

// ===== helper functions =====

fn build_table(
    name: &TableName,
    routes: &[Route],
    cfg: &RedistributeCfg,
) -> Table {
    let prefixes = routes
        .iter()
        .filter(|route| route.address_family() == name.af)
        .filter(|route| cfg.accepts(name.kind, route.protocol))
        .map(|route| (route.prefix, Candidate::new(route.clone())))
        .into_group_map()
        .into_iter()
        .map(|(prefix, mut candidates)| {
            candidates.sort_by(|a, b| a.compare(b));
            if let Some(best) = candidates.first_mut() {
                best.bestpath = true;
                Debug::BestPathFound(name, &prefix, &best.route).log();
            }
            (prefix, candidates)
        })
        .collect();

    Table { prefixes }
}

fn ospf_metrics(route: &Route) -> (u32, u32) {
    route
        .attrs
        .ospf
        .as_ref()
        .map(|ospf| (ospf.metric1, ospf.metric2.unwrap_or(0)))
        .unwrap_or_default()
}

fn kernel_metric(route: &Route) -> u32 {
    route
        .attrs
        .kernel
        .as_ref()
        .map(|kernel| kernel.metric)
        .unwrap_or_default()
}
