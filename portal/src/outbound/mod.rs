//! Outbound adapters implementing domain ports.
//!
//! - `slot`: durable session slot backends (in-memory and file).
//! - `fixtures`: in-process stand-ins for the auth, profile, and
//!   competitions APIs with simulated latency.

pub mod fixtures;
pub mod slot;
