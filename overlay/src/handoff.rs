use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::batch::OverlayRenderData;

/// Thread-safe slot passing built render data to a render thread.
///
/// The mutation thread calls [`publish`](Self::publish) after each rebuild;
/// the render thread picks up the newest snapshot with
/// [`latest`](Self::latest) or [`take`](Self::take). Snapshots are
/// immutable, so the lock is only held long enough to swap an `Arc`.
///
/// The generation starts at 0 (nothing published) and increases by one per
/// publish, letting the reader skip re-uploading data it has already seen.
pub struct RenderDataHandoff {
    generation: AtomicU64,
    slot: Mutex<Option<Arc<OverlayRenderData>>>,
}

impl RenderDataHandoff {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: Mutex::new(None),
        }
    }

    /// Replace the pending snapshot. Returns the new generation.
    pub fn publish(&self, data: Arc<OverlayRenderData>) -> u64 {
        let mut slot = self.slot.lock();
        *slot = Some(data);
        // Bumped under the lock so a reader never sees a generation ahead of its data.
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently published snapshot, left in place.
    pub fn latest(&self) -> Option<Arc<OverlayRenderData>> {
        self.slot.lock().clone()
    }

    /// Take the most recently published snapshot, leaving the slot empty.
    pub fn take(&self) -> Option<Arc<OverlayRenderData>> {
        self.slot.lock().take()
    }

    /// Number of snapshots published so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for RenderDataHandoff {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderDataHandoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderDataHandoff")
            .field("generation", &self.generation())
            .field("pending", &self.slot.lock().is_some())
            .finish()
    }
}
