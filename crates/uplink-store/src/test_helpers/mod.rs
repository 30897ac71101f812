//! In-memory store for testing without a Redis instance.

pub mod memory;

pub use memory::MemoryStore;
