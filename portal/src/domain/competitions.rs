//! Competition, task, and submission models.
//!
//! Wire forms use camelCase field names and lowercase enum values so the
//! catalogue can be exchanged with the competitions API unchanged.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Validation errors for competition identifiers and answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompetitionValidationError {
    /// Identifier was empty or padded with whitespace.
    InvalidId { value: String },
    /// Answer was blank once trimmed.
    EmptyAnswer,
}

impl fmt::Display for CompetitionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId { value } => {
                write!(f, "identifier must be non-empty and trimmed (got {value:?})")
            }
            Self::EmptyAnswer => write!(f, "answer must not be empty"),
        }
    }
}

impl std::error::Error for CompetitionValidationError {}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the identifier.
            pub fn new(id: impl Into<String>) -> Result<Self, CompetitionValidationError> {
                let id = id.into();
                if id.is_empty() || id.trim() != id {
                    return Err(CompetitionValidationError::InvalidId { value: id });
                }
                Ok(Self(id))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = CompetitionValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Competition identifier.
    CompetitionId
);
string_id!(
    /// Task identifier, unique across competitions.
    TaskId
);

/// Lifecycle stage of a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    /// Announced but not yet open.
    Upcoming,
    /// Accepting submissions.
    Active,
    /// Closed.
    Finished,
}

impl CompetitionStatus {
    /// Label shown in listings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Active => "Active",
            Self::Finished => "Finished",
        }
    }
}

/// How a task expects its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    /// File contents or a link, typically CSV predictions.
    File,
    /// Free-form text answer.
    Text,
    /// Source code.
    Code,
}

impl SubmissionType {
    /// Label shown next to the answer input.
    pub const fn label(self) -> &'static str {
        match self {
            Self::File => "File / CSV",
            Self::Text => "Text answer",
            Self::Code => "Code",
        }
    }
}

/// One task inside a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionTask {
    /// Task identifier.
    pub id: TaskId,
    /// Short title.
    pub title: String,
    /// Problem statement.
    pub description: String,
    /// Expected answer form.
    pub submission_type: SubmissionType,
    /// Evaluated submissions allowed per participant.
    pub max_attempts: u32,
}

/// Listing projection of a competition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionSummary {
    /// Competition identifier.
    pub id: CompetitionId,
    /// Title.
    pub title: String,
    /// Lifecycle stage.
    pub status: CompetitionStatus,
    /// Opening instant.
    pub start_at: DateTime<Utc>,
    /// Submission deadline.
    pub deadline_at: DateTime<Utc>,
}

/// Full competition description including its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDetails {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: CompetitionSummary,
    /// Long description.
    pub description: String,
    /// Participation rules.
    pub rules: String,
    /// Tasks in display order.
    pub tasks: Vec<CompetitionTask>,
}

impl CompetitionDetails {
    /// Look up a task by id.
    pub fn task(&self, task_id: &TaskId) -> Option<&CompetitionTask> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }

    /// Whether the competition currently accepts submissions.
    pub fn accepts_submissions(&self) -> bool {
        self.summary.status == CompetitionStatus::Active
    }
}

/// Non-blank submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Answer(String);

impl Answer {
    /// Validate an answer; content is kept verbatim.
    pub fn new(answer: impl Into<String>) -> Result<Self, CompetitionValidationError> {
        let answer = answer.into();
        if answer.trim().is_empty() {
            return Err(CompetitionValidationError::EmptyAnswer);
        }
        Ok(Self(answer))
    }
}

impl AsRef<str> for Answer {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Answer> for String {
    fn from(value: Answer) -> Self {
        value.0
    }
}

impl TryFrom<String> for Answer {
    type Error = CompetitionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Evaluation state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Accepted, awaiting evaluation.
    Pending,
    /// Scored.
    Evaluated,
    /// Evaluation failed.
    Error,
}

/// A submitted answer and its evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Submission identifier.
    pub id: Uuid,
    /// Task answered.
    pub task_id: TaskId,
    /// Submitting user.
    pub user_id: UserId,
    /// Answer content.
    pub answer: Answer,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Score in `0..=100`, present once evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Evaluation state.
    pub status: SubmissionStatus,
}

impl Submission {
    /// Whether this submission consumed one of the task's attempts.
    pub fn counts_as_attempt(&self) -> bool {
        self.status == SubmissionStatus::Evaluated
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn details(status: CompetitionStatus) -> CompetitionDetails {
        let at = Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).single().expect("valid instant");
        CompetitionDetails {
            summary: CompetitionSummary {
                id: CompetitionId::new("1").expect("id"),
                title: "DANO".to_owned(),
                status,
                start_at: at,
                deadline_at: at,
            },
            description: String::new(),
            rules: String::new(),
            tasks: vec![CompetitionTask {
                id: TaskId::new("t1").expect("task id"),
                title: "Classification".to_owned(),
                description: String::new(),
                submission_type: SubmissionType::File,
                max_attempts: 5,
            }],
        }
    }

    #[rstest]
    #[case("")]
    #[case(" t1")]
    fn padded_or_empty_ids_are_rejected(#[case] raw: &str) {
        assert!(TaskId::new(raw).is_err());
        assert!(CompetitionId::new(raw).is_err());
    }

    #[rstest]
    #[case("   ")]
    #[case("\n\t")]
    fn blank_answers_are_rejected(#[case] raw: &str) {
        assert_eq!(
            Answer::new(raw).expect_err("blank answer"),
            CompetitionValidationError::EmptyAnswer
        );
    }

    #[rstest]
    #[case(CompetitionStatus::Active, true)]
    #[case(CompetitionStatus::Upcoming, false)]
    #[case(CompetitionStatus::Finished, false)]
    fn only_active_competitions_accept_submissions(
        #[case] status: CompetitionStatus,
        #[case] expected: bool,
    ) {
        assert_eq!(details(status).accepts_submissions(), expected);
    }

    #[rstest]
    fn task_lookup_by_id() {
        let details = details(CompetitionStatus::Active);
        let found = details.task(&TaskId::new("t1").expect("id")).expect("task t1");
        assert_eq!(found.max_attempts, 5);
        assert!(details.task(&TaskId::new("t9").expect("id")).is_none());
    }

    #[rstest]
    fn details_flatten_summary_fields() {
        let value = serde_json::to_value(details(CompetitionStatus::Active)).expect("serialise");
        assert_eq!(value["id"], json!("1"));
        assert_eq!(value["status"], json!("active"));
        assert_eq!(value["tasks"][0]["submissionType"], json!("file"));
        assert_eq!(value["tasks"][0]["maxAttempts"], json!(5));
        assert!(value.get("summary").is_none());
    }
}
