use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::types::FrameId;

/// Tracks the frames that are unpinned and therefore evictable, ordered by
/// how long ago they were unpinned. The victim is always the least recently
/// unpinned frame.
pub struct LruReplacer {
    inner: Mutex<LruInner>,
}

struct LruInner {
    /// unpin order; the smallest stamp is the least recently unpinned frame
    queue: BTreeMap<u64, FrameId>,
    stamps: HashMap<FrameId, u64>,
    next_stamp: u64,
}

impl LruReplacer {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LruInner {
                queue: BTreeMap::new(),
                stamps: HashMap::new(),
                next_stamp: 0,
            }),
        }
    }

    /// Remove and return the least recently unpinned frame, if any.
    pub fn victim(&self) -> Option<FrameId> {
        let mut inner = self.inner.lock().unwrap();
        let (_, frame_id) = inner.queue.pop_first()?;
        inner.stamps.remove(&frame_id);
        Some(frame_id)
    }

    /// Stop tracking a frame. Pinning a frame that is not tracked is a no-op.
    pub fn pin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(stamp) = inner.stamps.remove(&frame_id) {
            inner.queue.remove(&stamp);
        }
    }

    /// Start tracking a frame. Unpinning a frame already tracked is a no-op,
    /// which keeps the frame at its first-unpin position.
    pub fn unpin(&self, frame_id: FrameId) {
        let mut inner = self.inner.lock().unwrap();
        if inner.stamps.contains_key(&frame_id) {
            return;
        }
        let stamp = inner.next_stamp;
        inner.next_stamp += 1;
        inner.queue.insert(stamp, frame_id);
        inner.stamps.insert(frame_id, stamp);
    }

    pub fn size(&self) -> usize {
        self.inner.lock().unwrap().stamps.len()
    }
}

impl Default for LruReplacer {
    fn default() -> Self {
        Self::new()
    }
}
