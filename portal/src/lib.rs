//! Session, route admission, and participation core for the NADO
//! competition portal.
//!
//! The crate is organised as a small hexagon: `domain` owns entities,
//! services, and ports; `outbound` provides fixture and storage adapters;
//! `inbound` drives the domain from navigation requests.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

pub use settings::PortalSettings;
