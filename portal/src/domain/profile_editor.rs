//! Profile page operations for the current identity.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{ProfileService, ProfileServiceError, UserActivity, UserStats};
use super::{DomainResult, Error, ProfileUpdate, SessionStore, User};

/// Reads profile data and saves edits through a [`ProfileService`].
pub struct ProfileEditor<P> {
    profiles: Arc<P>,
    session: Arc<SessionStore>,
}

impl<P: ProfileService> ProfileEditor<P> {
    /// Create an editor for the identity held by `session`.
    pub fn new(profiles: Arc<P>, session: Arc<SessionStore>) -> Self {
        Self { profiles, session }
    }

    /// Persist `patch` remotely, then merge it into the session.
    ///
    /// Fails with `NoActiveSession` when nobody is logged in, `Busy` while
    /// another session mutation is pending, and `Cancelled` when `cancel`
    /// fires before the merge or a different identity has been installed
    /// meanwhile. The session is only touched on success.
    pub async fn save(
        &self,
        patch: &ProfileUpdate,
        cancel: &CancellationToken,
    ) -> DomainResult<User> {
        let user = self.require_user()?;
        let _pending = self.session.try_begin().ok_or_else(|| Error::busy(""))?;
        if cancel.is_cancelled() {
            return Err(Error::cancelled(""));
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::cancelled("")),
            result = self.profiles.update_profile(user.id(), patch) => {
                result.map_err(map_profile_error)?;
            }
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled(""));
        }

        let Some(updated) = self.session.update_profile_for(user.id(), patch) else {
            return Err(if self.session.is_authenticated() {
                Error::cancelled("session changed while saving")
            } else {
                Error::no_active_session("")
            });
        };
        info!(user_id = %updated.id(), "profile saved");
        Ok(updated)
    }

    /// Participation statistics for the current identity.
    pub async fn stats(&self) -> DomainResult<UserStats> {
        let user = self.require_user()?;
        self.profiles
            .stats(user.id())
            .await
            .map_err(map_profile_error)
    }

    /// Latest activity for the current identity, newest first.
    pub async fn recent_activity(&self, limit: usize) -> DomainResult<Vec<UserActivity>> {
        let user = self.require_user()?;
        let mut activity = self
            .profiles
            .recent_activity(user.id(), limit)
            .await
            .map_err(map_profile_error)?;
        activity.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        activity.truncate(limit);
        Ok(activity)
    }

    fn require_user(&self) -> DomainResult<User> {
        self.session.current().ok_or_else(|| {
            debug!("profile operation without a session");
            Error::no_active_session("")
        })
    }
}

fn map_profile_error(error: ProfileServiceError) -> Error {
    match &error {
        ProfileServiceError::Unavailable { .. } => {
            warn!(%error, "profile service unavailable");
            Error::unavailable(error.to_string())
        }
        ProfileServiceError::Rejected { .. } => Error::validation_failed(error.to_string()),
    }
}
