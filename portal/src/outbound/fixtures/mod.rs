//! In-process collaborators with seeded data and simulated latency.
//!
//! These stand in for the remote authentication, profile, and competitions
//! APIs. Every call sleeps through the injected [`Sleeper`] first so callers
//! exercise the same suspension points a network client would have.
//!
//! [`Sleeper`]: crate::domain::ports::Sleeper

mod competitions;
mod credentials;
mod profiles;

use std::time::Duration;

pub use competitions::FixtureCompetitionRepository;
pub use credentials::FixtureCredentialExchange;
pub use profiles::FixtureProfileService;

/// Simulated round-trip time per fixture operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureLatency {
    /// Credential check.
    pub login: Duration,
    /// Account creation.
    pub register: Duration,
    /// Competition listing.
    pub list: Duration,
    /// Competition details.
    pub details: Duration,
    /// Answer evaluation.
    pub submit: Duration,
    /// Profile statistics.
    pub stats: Duration,
    /// Activity feed.
    pub activity: Duration,
    /// Profile update.
    pub profile_update: Duration,
}

impl FixtureLatency {
    /// Same delay for every operation.
    pub const fn uniform(delay: Duration) -> Self {
        Self {
            login: delay,
            register: delay,
            list: delay,
            details: delay,
            submit: delay,
            stats: delay,
            activity: delay,
            profile_update: delay,
        }
    }
}

impl Default for FixtureLatency {
    fn default() -> Self {
        Self {
            login: Duration::from_millis(400),
            register: Duration::from_millis(500),
            list: Duration::from_millis(300),
            details: Duration::from_millis(200),
            submit: Duration::from_millis(1500),
            stats: Duration::from_millis(200),
            activity: Duration::from_millis(150),
            profile_update: Duration::from_millis(300),
        }
    }
}
