//! Login store implementations

mod memory;

pub use memory::MemoryLoginStore;
