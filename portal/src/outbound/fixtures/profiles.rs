//! Seeded profile statistics and activity feed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    ActivityKind, ProfileService, ProfileServiceError, Sleeper, UserActivity, UserStats,
};
use crate::domain::{ProfileUpdate, UserId};

use super::FixtureLatency;

const STATS: UserStats = UserStats {
    competitions_count: 3,
    submissions_count: 12,
    best_score: Some(87),
    rank: Some(42),
};

/// Profile service returning the same statistics for every user and an
/// activity feed timestamped relative to the injected clock.
pub struct FixtureProfileService {
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    latency: FixtureLatency,
}

impl FixtureProfileService {
    /// Service reading time from `clock` and sleeping through `sleeper`.
    pub fn new(clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            clock,
            sleeper,
            latency: FixtureLatency::default(),
        }
    }

    /// Override the simulated latency.
    pub fn with_latency(mut self, latency: FixtureLatency) -> Self {
        self.latency = latency;
        self
    }

    fn activity_feed(&self) -> Vec<UserActivity> {
        let now = self.clock.utc();
        [
            (
                ActivityKind::Submission,
                "Answer submitted",
                "DANO 2025 - Task 1: Classification",
                2,
            ),
            (ActivityKind::Achievement, "Achievement unlocked", "First 10 submissions", 24),
            (
                ActivityKind::Registration,
                "Registered for a competition",
                "Data Challenge: Sales forecast",
                48,
            ),
        ]
        .into_iter()
        .enumerate()
        .map(|(index, (kind, title, description, hours_ago))| UserActivity {
            id: (index + 1).to_string(),
            kind,
            title: title.to_owned(),
            description: description.to_owned(),
            created_at: now - Duration::hours(hours_ago),
        })
        .collect()
    }
}

#[async_trait]
impl ProfileService for FixtureProfileService {
    async fn stats(&self, _user_id: &UserId) -> Result<UserStats, ProfileServiceError> {
        self.sleeper.sleep(self.latency.stats).await;
        Ok(STATS)
    }

    async fn recent_activity(
        &self,
        _user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<UserActivity>, ProfileServiceError> {
        self.sleeper.sleep(self.latency.activity).await;
        let mut feed = self.activity_feed();
        feed.truncate(limit);
        Ok(feed)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        patch: &ProfileUpdate,
    ) -> Result<(), ProfileServiceError> {
        self.sleeper.sleep(self.latency.profile_update).await;
        debug!(
            %user_id,
            name = patch.name.is_some(),
            avatar_url = patch.avatar_url.is_some(),
            bio = patch.bio.is_some(),
            "fixture profile update accepted"
        );
        Ok(())
    }
}
