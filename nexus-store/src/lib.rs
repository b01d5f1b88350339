//! [`UserStore`] backends for the session app.

pub mod flat_file;
pub mod memory;
pub mod sled_store;

use std::path::Path;

use nexus_social::{UserRecord, UserStore};
use serde::{Deserialize, Serialize};

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;
pub use sled_store::SledStore;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Flat,
    Sled,
}

/// A store picked at runtime from configuration.
pub enum AnyStore {
    Flat(FlatFileStore),
    Sled(SledStore),
}

impl AnyStore {
    pub fn open(backend: Backend, path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Ok(match backend {
            Backend::Flat => Self::Flat(FlatFileStore::new(path.as_ref())),
            Backend::Sled => Self::Sled(SledStore::open(path)?),
        })
    }
}

impl UserStore for AnyStore {
    type Error = anyhow::Error;

    fn load_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        match self {
            Self::Flat(store) => store.load_all(),
            Self::Sled(store) => store.load_all(),
        }
    }

    fn save_all(&self, records: &[UserRecord]) -> anyhow::Result<()> {
        match self {
            Self::Flat(store) => store.save_all(records),
            Self::Sled(store) => store.save_all(records),
        }
    }
}
