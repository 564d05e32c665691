use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::sync::Arc;

use super::loader::{self, LoadError, RecordSet};

/// Content hash identifying a loaded source
pub fn source_key(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Bounded memo of parsed sources keyed by content hash.
///
/// Entries are kept most-recently-used first; inserting into a full cache
/// drops the least recently used one. Failed loads are never stored.
pub struct LoadCache {
    capacity: usize,
    entries: VecDeque<(String, Arc<RecordSet>)>,
}

impl LoadCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Parse `bytes` unless the same content is already cached.
    /// Returns the content key with the shared record set.
    pub fn get_or_load(&mut self, bytes: &[u8]) -> Result<(String, Arc<RecordSet>), LoadError> {
        let key = source_key(bytes);

        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            if let Some(entry) = self.entries.remove(pos) {
                tracing::debug!("Sales cache hit: {}", key);
                let records = entry.1.clone();
                self.entries.push_front(entry);
                return Ok((key, records));
            }
        }

        tracing::debug!("Sales cache miss: {}", key);
        let records = Arc::new(loader::load_bytes(bytes)?);

        if self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.pop_back() {
                tracing::info!("Sales cache full, evicting {}", evicted);
            }
        }
        self.entries.push_front((key.clone(), records.clone()));

        Ok((key, records))
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        let removed = self.entries.len() != before;
        if removed {
            tracing::info!("Sales cache entry invalidated: {}", key);
        }
        removed
    }

    #[cfg(test)]
    fn clear(&mut self) {
        self.entries.clear();
    }
}
