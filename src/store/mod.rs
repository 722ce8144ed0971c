pub mod disk;
pub mod history;
pub mod memory;

use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub use history::HistoryStore;
pub use memory::MemoryCollection;

/// Persistent keyspace holding named collections.
pub struct KeyValueStore {
    keyspace: Keyspace,
}

impl KeyValueStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open cache keyspace: {}", path.display()))?;
        debug!("Opened cache keyspace at {}", path.display());
        Ok(Self { keyspace })
    }

    pub fn collection(&self, name: &str) -> Result<Arc<dyn KeyValueCollection>> {
        let partition = self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open cache collection: {name}"))?;
        Ok(Arc::new(DiskCollection::new(self.keyspace.clone(), partition)))
    }
}
