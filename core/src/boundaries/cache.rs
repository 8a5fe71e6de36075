use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::boundaries::bounds::AmplitudeBounds;

/// Main-panel and measure-window bounds are cached separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundaryKey {
    pub channel_id: String,
    pub is_measure_window: bool,
}

impl BoundaryKey {
    pub fn new(channel_id: &str, is_measure_window: bool) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            is_measure_window,
        }
    }
}

/// Last resolved bounds per key. Writes are last-write-wins within one
/// generation; `invalidate` starts a new generation.
#[derive(Default)]
pub struct BoundaryCache {
    entries: RwLock<HashMap<BoundaryKey, AmplitudeBounds>>,
    generation: AtomicU64,
}

impl BoundaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &BoundaryKey) -> Option<AmplitudeBounds> {
        self.entries.read().await.get(key).cloned()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Inserts only if no invalidation happened since `generation` was read.
    pub async fn insert(&self, key: BoundaryKey, bounds: AmplitudeBounds, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        entries.insert(key, bounds);
        true
    }

    pub async fn invalidate(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
