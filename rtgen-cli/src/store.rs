//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::path::Path;

use pickledb::{PickleDb, PickleDbDumpPolicy, SerializationMethod};
use rtgen_policy::gshut::PolicySnapshot;

use crate::error::Error;

const GSHUT_PEERS_KEY: &str = "graceful-shutdown-peers";

// Persistent state shared by successive invocations.
pub struct Store {
    db: PickleDb,
}

// ===== impl Store =====

impl Store {
    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Store, Error> {
        let dump_policy = PickleDbDumpPolicy::AutoDump;
        let serialization_method = SerializationMethod::Bin;
        let db = match path.as_ref().exists() {
            true => PickleDb::load(path, dump_policy, serialization_method)?,
            false => PickleDb::new(path, dump_policy, serialization_method),
        };

        Ok(Store { db })
    }

    // Returns the peers under graceful shutdown as of the last committed
    // reconfiguration.
    pub(crate) fn gshut_peers(&self) -> BTreeSet<String> {
        self.db.get(GSHUT_PEERS_KEY).unwrap_or_default()
    }

    // Records the peer list of a committed snapshot.
    pub(crate) fn save_gshut_peers(
        &mut self,
        snapshot: &PolicySnapshot,
    ) -> Result<(), Error> {
        self.db.set(GSHUT_PEERS_KEY, snapshot.peers())?;
        Ok(())
    }
}
