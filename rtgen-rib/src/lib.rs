//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Redistribution merger: builds the routing tables a BIRD instance would
//! hold from the routes of every source, and dumps them as JSON.

pub mod debug;
pub mod dump;
pub mod rib;
