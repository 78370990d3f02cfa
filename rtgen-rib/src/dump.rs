//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rtgen_utils::protocol::Protocol;
use rtgen_utils::route::{Nexthop, OspfRouteType, PrefixType, Route};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::rib::{Candidate, Tables};

// Table dump, keyed by table name and then by prefix.
pub type Dump = BTreeMap<String, BTreeMap<String, Vec<DumpEntry>>>;

#[derive(Clone, Debug, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct DumpEntry {
    pub protocol: String,
    pub prefix_type: PrefixType,
    pub pref: u32,
    pub nexthops: Vec<Nexthop>,
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bestpath: bool,
    pub since: DateTime<Utc>,
    #[serde(rename = "type")]
    pub route_type: Vec<String>,
}

// ===== impl DumpEntry =====

impl From<&Candidate> for DumpEntry {
    fn from(candidate: &Candidate) -> DumpEntry {
        let route = &candidate.route;
        DumpEntry {
            protocol: route.instance.clone(),
            prefix_type: route.prefix_type,
            pref: candidate.preference,
            nexthops: route.nexthops.clone(),
            attributes: attributes(route),
            bestpath: candidate.bestpath,
            since: route.since,
            route_type: vec![source_type(route).to_owned(), "univ".to_owned()],
        }
    }
}

// ===== global functions =====

pub fn dump(tables: &Tables) -> Dump {
    tables
        .iter()
        .map(|(name, table)| {
            let prefixes = table
                .prefixes
                .iter()
                .map(|(prefix, candidates)| {
                    let entries =
                        candidates.iter().map(DumpEntry::from).collect();
                    (prefix.to_string(), entries)
                })
                .collect();
            (name.to_string(), prefixes)
        })
        .collect()
}

// ===== helper functions =====

fn source_type(route: &Route) -> &'static str {
    match route.protocol {
        Protocol::BGP => "BGP",
        Protocol::STATIC => "static",
        Protocol::DIRECT => "device",
        Protocol::KERNEL => "inherit",
        Protocol::OSPF => {
            match route.attrs.ospf.as_ref().map(|ospf| ospf.route_type) {
                Some(OspfRouteType::External1) => "OSPF-E1",
                Some(OspfRouteType::External2) => "OSPF-E2",
                _ => "OSPF",
            }
        }
    }
}

fn attributes(route: &Route) -> BTreeMap<String, Value> {
    let attrs = &route.attrs;
    let mut map = BTreeMap::new();
    let mut insert = |key: &str, value: Value| {
        map.insert(key.to_owned(), value);
    };

    if route.protocol == Protocol::BGP {
        insert("BGP.as_path", json!(attrs.as_path));
        insert("BGP.community", json!(attrs.comm));
        insert("BGP.ext_community", json!(attrs.ext_comm));
        insert("BGP.large_community", json!(attrs.large_comm));
        if let Some(next_hop) = attrs.next_hop {
            insert("BGP.next_hop", json!(next_hop));
        }
        if let Some(local_pref) = attrs.local_pref {
            insert("BGP.local_pref", json!(local_pref));
        }
        if let Some(med) = attrs.med {
            insert("BGP.med", json!(med));
        }
        if !attrs.cluster_list.is_empty() {
            insert("BGP.cluster_list", json!(attrs.cluster_list));
        }
        if let Some(originator_id) = attrs.originator_id {
            insert("BGP.originator_id", json!(originator_id));
        }
    }
    if let Some(ospf) = &attrs.ospf {
        insert("OSPF.metric1", json!(ospf.metric1));
        if let Some(metric2) = ospf.metric2 {
            insert("OSPF.metric2", json!(metric2));
        }
        insert("OSPF.router_id", json!(ospf.router_id));
        if let Some(tag) = ospf.tag {
            insert("OSPF.tag", json!(tag));
        }
    }
    if let Some(kernel) = &attrs.kernel {
        insert("Kernel.metric", json!(kernel.metric));
        insert("Kernel.source", json!(kernel.source));
    }

    map
}
