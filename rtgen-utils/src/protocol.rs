//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// Route sources known to the generator.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    DIRECT,
    STATIC,
    OSPF,
    BGP,
    KERNEL,
}

// ===== impl Protocol =====

impl Protocol {
    // Route preference used by BIRD when several protocols offer the same
    // prefix. Higher wins.
    pub fn preference(&self) -> u32 {
        match self {
            Protocol::DIRECT => 240,
            Protocol::STATIC => 200,
            Protocol::OSPF => 150,
            Protocol::BGP => 100,
            Protocol::KERNEL => 10,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::DIRECT => write!(f, "direct"),
            Protocol::STATIC => write!(f, "static"),
            Protocol::OSPF => write!(f, "ospf"),
            Protocol::BGP => write!(f, "bgp"),
            Protocol::KERNEL => write!(f, "kernel"),
        }
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "direct" => Ok(Protocol::DIRECT),
            "static" => Ok(Protocol::STATIC),
            "ospf" => Ok(Protocol::OSPF),
            "bgp" => Ok(Protocol::BGP),
            "kernel" => Ok(Protocol::KERNEL),
            _ => Err(()),
        }
    }
}
