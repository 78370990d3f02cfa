//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Control plane of the policy compiler.
//!
//! Ties the policy pipelines and the RIB merger together, renders the
//! compiled policy for BIRD and drives daemon reconfiguration.

pub mod compile;
pub mod daemon;
pub mod debug;
pub mod error;
pub mod reconfigure;
pub mod render;
