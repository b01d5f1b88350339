use std::sync::{Arc, Mutex};

use nexus_social::{UserRecord, UserStore};

/// Keeps records in memory. Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<UserRecord>>>,
}

impl MemoryStore {
    pub fn new(records: Vec<UserRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl UserStore for MemoryStore {
    type Error = anyhow::Error;

    fn load_all(&self) -> anyhow::Result<Vec<UserRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(records.clone())
    }

    fn save_all(&self, records: &[UserRecord]) -> anyhow::Result<()> {
        let mut stored = self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        *stored = records.to_vec();
        Ok(())
    }
}
