//! Driven port for the durable client-side session slot.
//!
//! The slot is a key-value mirror of the session. It is never authoritative
//! and only the session store writes to it; each write atomically replaces
//! the value held under a key.

use super::define_port_error;

define_port_error! {
    /// Errors raised by durable slot adapters.
    pub enum SlotError {
        /// The stored value could not be read.
        Read { message: String } => "session slot read failed: {message}",
        /// The value could not be written or removed.
        Write { message: String } => "session slot write failed: {message}",
    }
}

/// Key-value storage scoped to one browsing context.
#[cfg_attr(test, mockall::automock)]
pub trait DurableSlot: Send + Sync {
    /// Return the raw value under `key`, or `None` when absent.
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the value under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), SlotError>;

    /// Erase `key`; removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), SlotError>;
}
