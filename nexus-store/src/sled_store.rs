use std::path::Path;

use anyhow::Context;
use nexus_social::{UserRecord, UserStore};
use sled::{Db, Tree};

/// Records in the `users` tree. Keys are big-endian sequence numbers so the
/// tree iterates in registration order.
#[derive(Clone)]
pub struct SledStore {
    db: Db,
    tree: Tree,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).with_context(|| format!("opening sled at {}", path.display()))?;
        Self::new(db)
    }

    pub fn new(db: Db) -> anyhow::Result<Self> {
        let tree = db.open_tree("users").context("opening users tree")?;
        Ok(Self { db, tree })
    }
}

impl UserStore for SledStore {
    type Error = anyhow::Error;

    fn load_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        self.tree
            .iter()
            .values()
            .map(|value| Ok(serde_json::from_slice(&value?).context("decoding user record")?))
            .collect()
    }

    fn save_all(&self, records: &[UserRecord]) -> anyhow::Result<()> {
        let mut batch = sled::Batch::default();
        for key in self.tree.iter().keys() {
            batch.remove(key?);
        }
        for (sequence, record) in records.iter().enumerate() {
            batch.insert((sequence as u64).to_be_bytes().to_vec(), serde_json::to_vec(record)?);
        }
        self.tree.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }
}
