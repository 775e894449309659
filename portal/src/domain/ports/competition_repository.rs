//! Driven port for the competitions API.

use async_trait::async_trait;

use crate::domain::{
    Answer, CompetitionDetails, CompetitionId, CompetitionSummary, Submission, TaskId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by competition repository adapters.
    pub enum CompetitionRepositoryError {
        /// The competitions API could not be reached.
        Connection { message: String } =>
            "competitions api connection failed: {message}",
        /// The answer could not be evaluated.
        Evaluation { message: String } =>
            "submission evaluation failed: {message}",
    }
}

/// Port for browsing competitions and submitting answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    /// Every competition, in catalogue order.
    async fn list(&self) -> Result<Vec<CompetitionSummary>, CompetitionRepositoryError>;

    /// Full details, or `None` when the id is unknown.
    async fn find_by_id(
        &self,
        id: &CompetitionId,
    ) -> Result<Option<CompetitionDetails>, CompetitionRepositoryError>;

    /// Submit `answer` to `task_id` and return the evaluated submission.
    async fn submit(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        answer: &Answer,
    ) -> Result<Submission, CompetitionRepositoryError>;
}
