use crate::error::CrabError;

/// Stable on-disk identifier of a page. Negative ids are invalid; the id
/// doubles as the page's offset in the data file (`id * PAGE_SIZE`).
pub type PageId = i32;

/// Index of a slot in the buffer pool's frame array.
pub type FrameId = usize;

pub const INVALID_PAGE_ID: PageId = -1;

/// The header page keeps the name -> root-page-id registry and always lives
/// at the front of the data file.
pub const HEADER_PAGE_ID: PageId = 0;

pub const PAGE_SIZE: usize = 4096;

/// The raw in-memory image of one page.
pub type PageData = [u8; PAGE_SIZE];

pub type CrabResult<T> = Result<T, CrabError>;
