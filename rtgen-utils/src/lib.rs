//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod bgp;
pub mod ip;
pub mod protocol;
pub mod route;
