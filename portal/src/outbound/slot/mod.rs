//! Durable session slot adapters.
//!
//! A headless application has no slot at all; interactive ones pick either
//! the in-process [`MemorySlot`] or the directory-backed [`FileSlot`].

mod file;
mod memory;

pub use file::FileSlot;
pub use memory::MemorySlot;
