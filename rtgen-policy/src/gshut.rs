//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::config::PolicyContext;
use crate::debug::Debug;
use crate::error::Error;

// Versioned graceful-shutdown state.
//
// Snapshots are immutable. Every mutation yields a new snapshot with a
// higher version, which only becomes active once committed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PolicySnapshot {
    version: u64,
    global: bool,
    peers: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum PeerShutdownState {
    Normal,
    ShuttingDown,
}

// Holds the active snapshot.
//
// Readers always get a consistent snapshot, and a commit replaces it
// atomically.
#[derive(Debug)]
pub struct GshutController {
    active: ArcSwap<PolicySnapshot>,
}

// ===== impl PolicySnapshot =====

impl PolicySnapshot {
    pub fn new(
        version: u64,
        global: bool,
        peers: impl IntoIterator<Item = String>,
    ) -> PolicySnapshot {
        PolicySnapshot {
            version,
            global,
            peers: peers.into_iter().collect(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn global(&self) -> bool {
        self.global
    }

    pub fn peers(&self) -> &BTreeSet<String> {
        &self.peers
    }

    pub fn state(&self, peer: &str) -> PeerShutdownState {
        if self.applies_to(peer) {
            PeerShutdownState::ShuttingDown
        } else {
            PeerShutdownState::Normal
        }
    }

    // Returns whether graceful shutdown applies to the routes exported to
    // the given peer.
    pub fn applies_to(&self, peer: &str) -> bool {
        self.global || self.peers.contains(peer)
    }

    pub fn with_peer_added(&self, peer: &str) -> PolicySnapshot {
        let mut peers = self.peers.clone();
        peers.insert(peer.to_owned());
        self.successor(self.global, peers)
    }

    pub fn with_peer_removed(&self, peer: &str) -> PolicySnapshot {
        let mut peers = self.peers.clone();
        peers.remove(peer);
        self.successor(self.global, peers)
    }

    pub fn with_global(&self, global: bool) -> PolicySnapshot {
        self.successor(global, self.peers.clone())
    }

    // Compares two snapshots ignoring their versions.
    pub fn same_policy(&self, other: &PolicySnapshot) -> bool {
        self.global == other.global && self.peers == other.peers
    }

    fn successor(
        &self,
        global: bool,
        peers: BTreeSet<String>,
    ) -> PolicySnapshot {
        PolicySnapshot {
            version: self.version + 1,
            global,
            peers,
        }
    }
}

// ===== impl GshutController =====

impl GshutController {
    pub fn new(snapshot: PolicySnapshot) -> GshutController {
        GshutController {
            active: ArcSwap::from_pointee(snapshot),
        }
    }

    // Returns the active snapshot.
    pub fn load(&self) -> Arc<PolicySnapshot> {
        self.active.load_full()
    }

    pub fn list(&self) -> Vec<String> {
        self.active.load().peers.iter().cloned().collect()
    }

    // Stages the addition of a peer. The returned snapshot must be
    // committed to take effect.
    pub fn add(
        &self,
        ctx: &PolicyContext,
        peer: &str,
    ) -> Result<PolicySnapshot, Error> {
        ctx.peer(peer)?;
        Ok(self.active.load().with_peer_added(peer))
    }

    // Stages the removal of a peer.
    pub fn remove(
        &self,
        ctx: &PolicyContext,
        peer: &str,
    ) -> Result<PolicySnapshot, Error> {
        ctx.peer(peer)?;
        Ok(self.active.load().with_peer_removed(peer))
    }

    pub fn set_global(&self, global: bool) -> PolicySnapshot {
        self.active.load().with_global(global)
    }

    // Checks that a staged snapshot is newer than the active one.
    pub fn check(&self, snapshot: &PolicySnapshot) -> Result<(), Error> {
        let current = self.active.load();
        if snapshot.version <= current.version {
            return Err(Error::StaleSnapshot(snapshot.version, current.version));
        }

        Ok(())
    }

    // Activates a staged snapshot.
    //
    // Fails if the snapshot isn't newer than the active one, or if another
    // commit won the race.
    pub fn commit(
        &self,
        snapshot: PolicySnapshot,
    ) -> Result<Arc<PolicySnapshot>, Error> {
        let current = self.active.load_full();
        if snapshot.version <= current.version {
            return Err(Error::StaleSnapshot(snapshot.version, current.version));
        }

        let version = snapshot.version;
        let snapshot = Arc::new(snapshot);
        let prev = self.active.compare_and_swap(&current, snapshot.clone());
        if !Arc::ptr_eq(&*prev, &current) {
            return Err(Error::StaleSnapshot(version, prev.version));
        }

        Debug::SnapshotCommit(&snapshot).log();
        Ok(snapshot)
    }
}
