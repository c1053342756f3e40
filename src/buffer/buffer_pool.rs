use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::Mutex;

use log::debug;

use super::{LruReplacer, Page};
use crate::storage::DiskManager;
use crate::types::{FrameId, PageData, PageId, INVALID_PAGE_ID};
use crate::utils::HandyRwLock;

struct FrameMeta {
    page_id: PageId,
    pin_count: u32,
    is_dirty: bool,

    /// Hash of the frame content as it exists on disk; `None` means the
    /// on-disk image is unknown and the next flush must write.
    disk_hash: Option<u64>,
}

impl FrameMeta {
    fn new() -> Self {
        Self {
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
            disk_hash: None,
        }
    }
}

struct PoolInner {
    frames: Vec<FrameMeta>,
    page_table: HashMap<PageId, FrameId>,
    free_list: Vec<FrameId>,
}

/// A fixed set of frames over the disk manager. All bookkeeping (frame
/// metadata, page table, free list) sits behind one mutex; page *content* is
/// guarded by each frame's own latch, which callers hold while a page is
/// pinned.
pub struct BufferPoolManager {
    pool_size: usize,
    pages: Box<[Page]>,
    inner: Mutex<PoolInner>,
    replacer: LruReplacer,
    disk: DiskManager,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, disk: DiskManager) -> Self {
        assert!(pool_size > 0);

        let pages: Box<[Page]> = (0..pool_size).map(|_| Page::new()).collect();
        let frames = (0..pool_size).map(|_| FrameMeta::new()).collect();
        let free_list = (0..pool_size).collect();

        Self {
            pool_size,
            pages,
            inner: Mutex::new(PoolInner {
                frames,
                page_table: HashMap::new(),
                free_list,
            }),
            replacer: LruReplacer::new(),
            disk,
        }
    }

    /// Bring a page into the pool (if it is not already resident), pin it,
    /// and return its frame. `None` means every frame is pinned.
    pub fn fetch_page(&self, page_id: PageId) -> Option<&Page> {
        assert!(page_id >= 0, "fetch of invalid page id {}", page_id);
        let mut inner = self.inner.lock().unwrap();

        if let Some(&frame_id) = inner.page_table.get(&page_id) {
            if inner.frames[frame_id].page_id == page_id {
                inner.frames[frame_id].pin_count += 1;
                self.replacer.pin(frame_id);
                return Some(&self.pages[frame_id]);
            }
            // stale entry
            inner.page_table.remove(&page_id);
        }

        let frame_id = self.grab_frame(&mut inner)?;
        self.evict_frame(&mut inner, frame_id);

        // pin count is 0 here, so nothing can hold this frame's latch
        {
            let mut data = self.pages[frame_id].latch().wl();
            self.disk.read_page(page_id, &mut data);
            inner.frames[frame_id].disk_hash = Some(content_hash(&data));
        }

        let meta = &mut inner.frames[frame_id];
        meta.page_id = page_id;
        meta.is_dirty = false;
        meta.pin_count = 1;

        inner.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        Some(&self.pages[frame_id])
    }

    /// Drop one pin. Returns false only when the page is resident with a
    /// pin count of 0 already.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let mut inner = self.inner.lock().unwrap();

        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return true;
        };
        if inner.frames[frame_id].page_id != page_id {
            inner.page_table.remove(&page_id);
            return true;
        }

        // dirty is sticky until a flush clears it
        inner.frames[frame_id].is_dirty |= is_dirty;

        if inner.frames[frame_id].pin_count == 0 {
            return false;
        }
        inner.frames[frame_id].pin_count -= 1;
        if inner.frames[frame_id].pin_count == 0 {
            if inner.frames[frame_id].is_dirty {
                self.write_frame(frame_id, &mut inner.frames[frame_id]);
            }
            self.replacer.unpin(frame_id);
        }
        true
    }

    /// Write a resident page to disk regardless of its pin count.
    pub fn flush_page(&self, page_id: PageId) -> bool {
        let mut inner = self.inner.lock().unwrap();

        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return false;
        };
        if inner.frames[frame_id].page_id != page_id {
            return false;
        }

        self.write_frame(frame_id, &mut inner.frames[frame_id]);
        inner.frames[frame_id].is_dirty = false;
        true
    }

    pub fn flush_all_pages(&self) {
        let mut inner = self.inner.lock().unwrap();
        for frame_id in 0..self.pool_size {
            if inner.frames[frame_id].page_id != INVALID_PAGE_ID {
                self.write_frame(frame_id, &mut inner.frames[frame_id]);
            }
        }
    }

    /// Allocate a fresh page id, place it in a frame, pin it, and return
    /// both. The frame content is zeroed; callers still initialize it.
    pub fn new_page(&self) -> Option<(PageId, &Page)> {
        let mut inner = self.inner.lock().unwrap();

        let frame_id = self.grab_frame(&mut inner)?;
        self.evict_frame(&mut inner, frame_id);

        let page_id = self.disk.allocate_page();
        {
            let mut data = self.pages[frame_id].latch().wl();
            data.fill(0);
        }

        let meta = &mut inner.frames[frame_id];
        meta.page_id = page_id;
        meta.pin_count = 1;
        meta.is_dirty = false;
        // the on-disk image of a fresh id is stale; force the first write
        meta.disk_hash = None;

        inner.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        debug!("new page {} in frame {}", page_id, frame_id);
        Some((page_id, &self.pages[frame_id]))
    }

    /// Return a page to the disk manager. Fails (false) only when the page
    /// is resident and still pinned.
    pub fn delete_page(&self, page_id: PageId) -> bool {
        let mut inner = self.inner.lock().unwrap();

        self.disk.deallocate_page(page_id);

        let Some(&frame_id) = inner.page_table.get(&page_id) else {
            return true;
        };
        if inner.frames[frame_id].page_id != page_id {
            return true;
        }
        if inner.frames[frame_id].pin_count != 0 {
            return false;
        }

        let meta = &mut inner.frames[frame_id];
        meta.page_id = INVALID_PAGE_ID;
        meta.is_dirty = false;
        meta.disk_hash = None;

        inner.page_table.remove(&page_id);
        self.replacer.pin(frame_id);
        inner.free_list.push(frame_id);
        debug!("deleted page {}, frame {} back to free list", page_id, frame_id);
        true
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let inner = self.inner.lock().unwrap();
        let &frame_id = inner.page_table.get(&page_id)?;
        if inner.frames[frame_id].page_id != page_id {
            return None;
        }
        Some(inner.frames[frame_id].pin_count)
    }

    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.pin_count(page_id).is_some()
    }

    pub fn free_frames(&self) -> usize {
        self.inner.lock().unwrap().free_list.len()
    }

    pub fn pinned_frames(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.frames.iter().filter(|f| f.pin_count > 0).count()
    }

    pub fn replacer_size(&self) -> usize {
        self.replacer.size()
    }

    fn grab_frame(&self, inner: &mut PoolInner) -> Option<FrameId> {
        if let Some(frame_id) = inner.free_list.pop() {
            return Some(frame_id);
        }
        self.replacer.victim()
    }

    /// Detach whatever page currently occupies the frame, writing it out
    /// first if it is dirty.
    fn evict_frame(&self, inner: &mut PoolInner, frame_id: FrameId) {
        let old_page_id = inner.frames[frame_id].page_id;
        if old_page_id == INVALID_PAGE_ID {
            return;
        }
        inner.page_table.remove(&old_page_id);
        if inner.frames[frame_id].is_dirty {
            debug!("evicting dirty page {} from frame {}", old_page_id, frame_id);
            self.write_frame(frame_id, &mut inner.frames[frame_id]);
        }
    }

    /// Write the frame to disk unless its content already matches the
    /// on-disk image.
    fn write_frame(&self, frame_id: FrameId, meta: &mut FrameMeta) {
        let data = self.pages[frame_id].latch().rl();
        let hash = content_hash(&data);
        if meta.disk_hash == Some(hash) {
            return;
        }
        self.disk.write_page(meta.page_id, &data);
        meta.disk_hash = Some(hash);
    }
}

fn content_hash(data: &PageData) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(data);
    hasher.finish()
}
