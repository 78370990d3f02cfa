//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod community;
pub mod config;
pub mod debug;
pub mod error;
pub mod gshut;
pub mod limits;
pub mod local_pref;
pub mod pipeline;
pub mod role;
pub mod validate;
pub mod verdict;
