//! Driven port for the profile API.
//!
//! Statistics and activity feed the profile page; `update_profile` persists
//! a patch remotely before the session store mirrors it locally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ProfileUpdate, UserId};

use super::define_port_error;

/// Number of activity entries returned when the caller does not ask.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 5;

define_port_error! {
    /// Errors raised by profile service adapters.
    pub enum ProfileServiceError {
        /// The profile API could not be reached.
        Unavailable { message: String } => "profile service unavailable: {message}",
        /// The API refused the update.
        Rejected { message: String } => "profile update rejected: {message}",
    }
}

/// Aggregate participation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Competitions entered.
    pub competitions_count: u32,
    /// Answers submitted.
    pub submissions_count: u32,
    /// Best evaluated score, if any.
    pub best_score: Option<u32>,
    /// Leaderboard position, if ranked.
    pub rank: Option<u32>,
}

/// Kind of an activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// An answer was submitted.
    Submission,
    /// The user registered for a competition.
    Registration,
    /// An achievement was unlocked.
    Achievement,
}

/// One entry in the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    /// Entry identifier.
    pub id: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Headline.
    pub title: String,
    /// Supporting text.
    pub description: String,
    /// When it happened.
    pub created_at: DateTime<Utc>,
}

/// Port for reading and updating profile data.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Participation statistics for `user_id`.
    async fn stats(&self, user_id: &UserId) -> Result<UserStats, ProfileServiceError>;

    /// Most recent activity first, at most `limit` entries.
    async fn recent_activity(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<UserActivity>, ProfileServiceError>;

    /// Persist `patch` for `user_id`.
    async fn update_profile(
        &self,
        user_id: &UserId,
        patch: &ProfileUpdate,
    ) -> Result<(), ProfileServiceError>;
}
