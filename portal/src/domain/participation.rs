//! Competition browsing and answer submission.
//!
//! Browsing is open to everyone. Submitting requires a current identity, an
//! active competition, a known task, and a remaining attempt. Only evaluated
//! submissions consume an attempt; a submission abandoned through its
//! cancellation token is discarded without being counted.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{CompetitionRepository, CompetitionRepositoryError};
use super::session::PendingMutation;
use super::{
    Answer, CompetitionDetails, CompetitionId, CompetitionStatus, CompetitionSummary,
    DomainResult, Error, SessionStore, Submission, TaskId, UserId,
};

type AttemptKey = (UserId, TaskId);

/// Competition catalogue and submission workflow.
pub struct ParticipationService<R> {
    repository: Arc<R>,
    session: Arc<SessionStore>,
    attempts: Mutex<HashMap<AttemptKey, u32>>,
    submitting: AtomicBool,
}

impl<R: CompetitionRepository> ParticipationService<R> {
    /// Create a service reading from `repository` on behalf of `session`.
    pub fn new(repository: Arc<R>, session: Arc<SessionStore>) -> Self {
        Self {
            repository,
            session,
            attempts: Mutex::new(HashMap::new()),
            submitting: AtomicBool::new(false),
        }
    }

    /// Every competition in catalogue order.
    pub async fn list(&self) -> DomainResult<Vec<CompetitionSummary>> {
        self.repository.list().await.map_err(map_repository_error)
    }

    /// Competitions currently accepting submissions.
    pub async fn active(&self) -> DomainResult<Vec<CompetitionSummary>> {
        let mut competitions = self.list().await?;
        competitions.retain(|competition| competition.status == CompetitionStatus::Active);
        Ok(competitions)
    }

    /// Full description of one competition.
    pub async fn details(&self, id: &CompetitionId) -> DomainResult<CompetitionDetails> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("competition {id} not found")))
    }

    /// Attempts the current identity has left on `task_id`.
    pub async fn attempts_remaining(
        &self,
        competition_id: &CompetitionId,
        task_id: &TaskId,
    ) -> DomainResult<u32> {
        let user_id = self.require_user()?;
        let details = self.details(competition_id).await?;
        let task = details
            .task(task_id)
            .ok_or_else(|| task_not_found(competition_id, task_id))?;
        let used = self.used_attempts(&user_id, task_id);
        Ok(task.max_attempts.saturating_sub(used))
    }

    /// Submit `answer` to a task and return the evaluated submission.
    pub async fn submit(
        &self,
        competition_id: &CompetitionId,
        task_id: &TaskId,
        answer: &str,
        cancel: &CancellationToken,
    ) -> DomainResult<Submission> {
        let user_id = self.require_user()?;
        let answer = Answer::new(answer).map_err(|err| Error::validation_failed(err.to_string()))?;

        let details = self.details(competition_id).await?;
        if !details.accepts_submissions() {
            debug!(competition = %competition_id, status = ?details.summary.status, "submission refused");
            return Err(Error::competition_closed(format!(
                "{} is {}",
                details.summary.title,
                details.summary.status.label().to_lowercase()
            )));
        }
        let task = details
            .task(task_id)
            .ok_or_else(|| task_not_found(competition_id, task_id))?;

        // Limit check and increment both happen under the in-flight guard.
        let _pending = PendingMutation::acquire(&self.submitting)
            .ok_or_else(|| Error::busy("a submission is already being evaluated"))?;
        if self.used_attempts(&user_id, task_id) >= task.max_attempts {
            return Err(Error::attempts_exhausted(format!(
                "all {} attempts on {} used",
                task.max_attempts, task.title
            )));
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled(""));
        }
        let submission = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::cancelled("")),
            result = self.repository.submit(task_id, &user_id, &answer) => {
                result.map_err(map_repository_error)?
            }
        };
        if cancel.is_cancelled() {
            debug!(task = %task_id, "discarding submission result after cancellation");
            return Err(Error::cancelled(""));
        }

        if submission.counts_as_attempt() {
            *self
                .lock_attempts()
                .entry((user_id.clone(), task_id.clone()))
                .or_default() += 1;
        }
        info!(
            user_id = %user_id,
            task = %task_id,
            score = ?submission.score,
            status = ?submission.status,
            "submission accepted"
        );
        Ok(submission)
    }

    fn require_user(&self) -> DomainResult<UserId> {
        self.session
            .current()
            .map(|user| user.id().clone())
            .ok_or_else(|| Error::no_active_session(""))
    }

    fn used_attempts(&self, user_id: &UserId, task_id: &TaskId) -> u32 {
        self.lock_attempts()
            .get(&(user_id.clone(), task_id.clone()))
            .copied()
            .unwrap_or(0)
    }

    fn lock_attempts(&self) -> MutexGuard<'_, HashMap<AttemptKey, u32>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn task_not_found(competition_id: &CompetitionId, task_id: &TaskId) -> Error {
    Error::not_found(format!("task {task_id} not found in competition {competition_id}"))
}

fn map_repository_error(error: CompetitionRepositoryError) -> Error {
    match &error {
        CompetitionRepositoryError::Connection { .. } => {
            warn!(%error, "competitions api unavailable");
            Error::unavailable(error.to_string())
        }
        CompetitionRepositoryError::Evaluation { .. } => Error::internal(error.to_string()),
    }
}

#[cfg(test)]
mod tests;
