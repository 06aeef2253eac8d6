pub mod lru;

pub use lru::LruHostCache;
