//! Identity persistence adapters.

mod filesystem;
mod in_memory;

pub use filesystem::FsIdentityStore;
pub use in_memory::InMemoryIdentityStore;
