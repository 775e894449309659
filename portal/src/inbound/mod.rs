//! Inbound adapters driving the domain.
//!
//! - `navigation`: path resolution and admission for each navigation attempt.

pub mod navigation;

pub use navigation::{header_links, NavigationOutcome, Navigator, MAX_REDIRECTS};
