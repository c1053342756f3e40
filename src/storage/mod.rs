pub mod codec;
pub mod disk_manager;
pub mod key;

pub use disk_manager::DiskManager;
pub use key::{GenericKey, IntegerComparator, KeyComparator, Rid};
