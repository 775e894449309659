//! Seeded competition catalogue with randomly scored submissions.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{CompetitionRepository, CompetitionRepositoryError, Sleeper};
use crate::domain::{
    Answer, CompetitionDetails, CompetitionId, CompetitionStatus, CompetitionSummary,
    CompetitionTask, Submission, SubmissionStatus, SubmissionType, TaskId, UserId,
};

use super::FixtureLatency;

/// Competition repository over a fixed three-entry catalogue.
///
/// Submissions are evaluated immediately with a uniformly random score in
/// `0..=100`; seed the generator with [`Self::with_seed`] for reproducible
/// scores.
pub struct FixtureCompetitionRepository {
    catalogue: Vec<CompetitionDetails>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    latency: FixtureLatency,
    rng: Mutex<SmallRng>,
}

impl FixtureCompetitionRepository {
    /// Repository reading time from `clock` and sleeping through `sleeper`.
    pub fn new(clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            catalogue: catalogue(),
            clock,
            sleeper,
            latency: FixtureLatency::default(),
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// Override the simulated latency.
    pub fn with_latency(mut self, latency: FixtureLatency) -> Self {
        self.latency = latency;
        self
    }

    /// Draw scores from a generator seeded with `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(SmallRng::seed_from_u64(seed));
        self
    }

    fn score(&self) -> u8 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..=100)
    }
}

#[async_trait]
impl CompetitionRepository for FixtureCompetitionRepository {
    async fn list(&self) -> Result<Vec<CompetitionSummary>, CompetitionRepositoryError> {
        self.sleeper.sleep(self.latency.list).await;
        Ok(self
            .catalogue
            .iter()
            .map(|competition| competition.summary.clone())
            .collect())
    }

    async fn find_by_id(
        &self,
        id: &CompetitionId,
    ) -> Result<Option<CompetitionDetails>, CompetitionRepositoryError> {
        self.sleeper.sleep(self.latency.details).await;
        Ok(self
            .catalogue
            .iter()
            .find(|competition| &competition.summary.id == id)
            .cloned())
    }

    async fn submit(
        &self,
        task_id: &TaskId,
        user_id: &UserId,
        answer: &Answer,
    ) -> Result<Submission, CompetitionRepositoryError> {
        self.sleeper.sleep(self.latency.submit).await;
        let score = self.score();
        debug!(task = %task_id, %user_id, score, "fixture submission evaluated");
        Ok(Submission {
            id: Uuid::new_v4(),
            task_id: task_id.clone(),
            user_id: user_id.clone(),
            answer: answer.clone(),
            submitted_at: self.clock.utc(),
            score: Some(score),
            status: SubmissionStatus::Evaluated,
        })
    }
}

fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap_or_default()
}

fn task(
    id: &str,
    title: &str,
    description: &str,
    submission_type: SubmissionType,
    max_attempts: u32,
) -> Option<CompetitionTask> {
    Some(CompetitionTask {
        id: TaskId::new(id).ok()?,
        title: title.to_owned(),
        description: description.to_owned(),
        submission_type,
        max_attempts,
    })
}

struct Seed<'a> {
    id: &'a str,
    title: &'a str,
    status: CompetitionStatus,
    window: (DateTime<Utc>, DateTime<Utc>),
    description: &'a str,
    rules: &'a str,
    tasks: Vec<Option<CompetitionTask>>,
}

impl Seed<'_> {
    fn build(self) -> Option<CompetitionDetails> {
        let (start_at, deadline_at) = self.window;
        Some(CompetitionDetails {
            summary: CompetitionSummary {
                id: CompetitionId::new(self.id).ok()?,
                title: self.title.to_owned(),
                status: self.status,
                start_at,
                deadline_at,
            },
            description: self.description.to_owned(),
            rules: self.rules.to_owned(),
            tasks: self.tasks.into_iter().collect::<Option<Vec<_>>>()?,
        })
    }
}

fn catalogue() -> Vec<CompetitionDetails> {
    vec![
        Seed {
            id: "1",
            title: "DANO 2025 — Qualifying round",
            status: CompetitionStatus::Active,
            window: (instant(2025, 11, 15, 0, 0, 0), instant(2025, 12, 15, 23, 59, 59)),
            description: "First qualifying round of the national data analysis olympiad.",
            rules: "Answers are accepted as .csv files. At most 5 attempts per task.",
            tasks: vec![
                task(
                    "t1",
                    "Task 1: Classification",
                    "Classify the rows of train.csv and upload predictions.csv.",
                    SubmissionType::File,
                    5,
                ),
                task(
                    "t2",
                    "Task 2: Theory question",
                    "Which metric suits a model trained on imbalanced classes? Explain.",
                    SubmissionType::Text,
                    3,
                ),
            ],
        },
        Seed {
            id: "2",
            title: "Data Challenge: Sales forecast",
            status: CompetitionStatus::Upcoming,
            window: (instant(2026, 3, 1, 0, 0, 0), instant(2026, 3, 31, 23, 59, 59)),
            description: "Forecast sales from historical data.",
            rules: "Submit a CSV of predictions. Scored by RMSE.",
            tasks: vec![task(
                "t3",
                "Sales forecast",
                "Predict next month's sales and upload a CSV file.",
                SubmissionType::File,
                10,
            )],
        },
        Seed {
            id: "3",
            title: "Hackathon: Visualisation",
            status: CompetitionStatus::Finished,
            window: (instant(2024, 11, 1, 0, 0, 0), instant(2024, 11, 15, 23, 59, 59)),
            description: "Best visualisation of open data.",
            rules: "Presentation plus source code.",
            tasks: vec![task(
                "t4",
                "Visualisation code",
                "Write Python code that visualises the dataset.",
                SubmissionType::Code,
                1,
            )],
        },
    ]
    .into_iter()
    .filter_map(Seed::build)
    .collect()
}
