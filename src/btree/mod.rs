pub mod context;
pub mod iterator;
pub mod page;
pub mod tree;

pub use iterator::TreeIterator;
pub use tree::BPlusTree;
