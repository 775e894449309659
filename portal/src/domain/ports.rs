//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters:
//! the credential exchange, the durable session slot, the profile and
//! competitions APIs, and the latency source used by fixture services. Each
//! trait exposes strongly typed errors so adapters map their failures into
//! predictable variants instead of returning stringly typed errors.

mod macros;

mod competition_repository;
mod credential_exchange;
mod durable_slot;
mod profile_service;
mod sleeper;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use competition_repository::MockCompetitionRepository;
pub use competition_repository::{CompetitionRepository, CompetitionRepositoryError};
#[cfg(test)]
pub use credential_exchange::MockCredentialExchange;
pub use credential_exchange::{AccessToken, AuthGrant, CredentialExchange, CredentialExchangeError};
#[cfg(test)]
pub use durable_slot::MockDurableSlot;
pub use durable_slot::{DurableSlot, SlotError};
#[cfg(test)]
pub use profile_service::MockProfileService;
pub use profile_service::{
    ActivityKind, ProfileService, ProfileServiceError, UserActivity, UserStats,
    DEFAULT_ACTIVITY_LIMIT,
};
pub use sleeper::{ImmediateSleeper, Sleeper, TokioSleeper};
