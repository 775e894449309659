//! Tests for competition browsing and submission.

use super::*;
use crate::domain::ports::MockCompetitionRepository;
use crate::domain::{
    CompetitionTask, DisplayName, Email, ErrorCode, SubmissionStatus, SubmissionType, User,
    UserRole,
};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use uuid::Uuid;

fn competition_id(id: &str) -> CompetitionId {
    CompetitionId::new(id).expect("valid competition id")
}

fn task_id(id: &str) -> TaskId {
    TaskId::new(id).expect("valid task id")
}

fn summary(id: &str, status: CompetitionStatus) -> CompetitionSummary {
    let at = Utc.with_ymd_and_hms(2025, 11, 15, 0, 0, 0).single().expect("instant");
    CompetitionSummary {
        id: competition_id(id),
        title: format!("Competition {id}"),
        status,
        start_at: at,
        deadline_at: at,
    }
}

fn details(status: CompetitionStatus, max_attempts: u32) -> CompetitionDetails {
    CompetitionDetails {
        summary: summary("1", status),
        description: String::new(),
        rules: String::new(),
        tasks: vec![CompetitionTask {
            id: task_id("t1"),
            title: "Classification".to_owned(),
            description: String::new(),
            submission_type: SubmissionType::File,
            max_attempts,
        }],
    }
}

fn submission(status: SubmissionStatus) -> Submission {
    Submission {
        id: Uuid::new_v4(),
        task_id: task_id("t1"),
        user_id: UserId::new("demo-user-1").expect("valid id"),
        answer: Answer::new("0,1,1").expect("answer"),
        submitted_at: Utc::now(),
        score: (status == SubmissionStatus::Evaluated).then_some(73),
        status,
    }
}

#[fixture]
fn session() -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::headless());
    session.login(User::new(
        UserId::new("demo-user-1").expect("valid id"),
        Email::new("demo@example.com").expect("valid email"),
        DisplayName::new("Demo User").expect("valid name"),
        UserRole::Participant,
    ));
    session
}

fn repository_with(details: CompetitionDetails) -> MockCompetitionRepository {
    let mut repository = MockCompetitionRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(details.clone())));
    repository
}

fn service(
    repository: MockCompetitionRepository,
    session: &Arc<SessionStore>,
) -> ParticipationService<MockCompetitionRepository> {
    ParticipationService::new(Arc::new(repository), session.clone())
}

#[rstest]
#[tokio::test]
async fn active_filters_the_catalogue(session: Arc<SessionStore>) {
    let mut repository = MockCompetitionRepository::new();
    repository.expect_list().returning(|| {
        Ok(vec![
            summary("1", CompetitionStatus::Active),
            summary("2", CompetitionStatus::Upcoming),
            summary("3", CompetitionStatus::Finished),
        ])
    });
    let service = service(repository, &session);

    assert_eq!(service.list().await.expect("list").len(), 3);
    let active = service.active().await.expect("active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, competition_id("1"));
}

#[rstest]
#[tokio::test]
async fn unknown_competition_is_not_found(session: Arc<SessionStore>) {
    let mut repository = MockCompetitionRepository::new();
    repository.expect_find_by_id().returning(|_| Ok(None));

    let err = service(repository, &session)
        .details(&competition_id("99"))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn submit_requires_a_session() {
    let session = Arc::new(SessionStore::headless());
    let mut repository = MockCompetitionRepository::new();
    repository.expect_submit().times(0);

    let err = service(repository, &session)
        .submit(&competition_id("1"), &task_id("t1"), "answer", &CancellationToken::new())
        .await
        .expect_err("anonymous");
    assert_eq!(err.code(), ErrorCode::NoActiveSession);
}

#[rstest]
#[case(CompetitionStatus::Upcoming)]
#[case(CompetitionStatus::Finished)]
#[tokio::test]
async fn closed_competitions_refuse_submissions(
    session: Arc<SessionStore>,
    #[case] status: CompetitionStatus,
) {
    let mut repository = repository_with(details(status, 5));
    repository.expect_submit().times(0);

    let err = service(repository, &session)
        .submit(&competition_id("1"), &task_id("t1"), "answer", &CancellationToken::new())
        .await
        .expect_err("closed");
    assert_eq!(err.code(), ErrorCode::CompetitionClosed);
}

#[rstest]
#[case("t9", "answer", ErrorCode::NotFound)]
#[case("t1", "   ", ErrorCode::ValidationFailed)]
#[tokio::test]
async fn bad_task_or_answer_is_rejected(
    session: Arc<SessionStore>,
    #[case] task: &str,
    #[case] answer: &str,
    #[case] expected: ErrorCode,
) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 5));
    repository.expect_submit().times(0);

    let err = service(repository, &session)
        .submit(&competition_id("1"), &task_id(task), answer, &CancellationToken::new())
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn evaluated_submissions_consume_attempts(session: Arc<SessionStore>) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 2));
    repository
        .expect_submit()
        .times(2)
        .returning(|_, _, _| Ok(submission(SubmissionStatus::Evaluated)));
    let service = service(repository, &session);
    let (competition, task) = (competition_id("1"), task_id("t1"));

    assert_eq!(service.attempts_remaining(&competition, &task).await.expect("remaining"), 2);
    for _ in 0..2 {
        let result = service
            .submit(&competition, &task, "0,1,1", &CancellationToken::new())
            .await
            .expect("submission accepted");
        assert_eq!(result.score, Some(73));
    }
    assert_eq!(service.attempts_remaining(&competition, &task).await.expect("remaining"), 0);

    let err = service
        .submit(&competition, &task, "0,1,1", &CancellationToken::new())
        .await
        .expect_err("exhausted");
    assert_eq!(err.code(), ErrorCode::AttemptsExhausted);
}

#[rstest]
#[tokio::test]
async fn failed_evaluations_do_not_count(session: Arc<SessionStore>) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 1));
    repository
        .expect_submit()
        .returning(|_, _, _| Ok(submission(SubmissionStatus::Error)));
    let service = service(repository, &session);
    let (competition, task) = (competition_id("1"), task_id("t1"));

    service
        .submit(&competition, &task, "broken", &CancellationToken::new())
        .await
        .expect("submission recorded");
    assert_eq!(service.attempts_remaining(&competition, &task).await.expect("remaining"), 1);
}

#[rstest]
#[tokio::test]
async fn cancelled_submission_is_not_counted(session: Arc<SessionStore>) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 1));
    repository.expect_submit().times(0);
    let service = service(repository, &session);
    let (competition, task) = (competition_id("1"), task_id("t1"));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service
        .submit(&competition, &task, "0,1", &cancel)
        .await
        .expect_err("cancelled");
    assert_eq!(err.code(), ErrorCode::Cancelled);
    assert_eq!(service.attempts_remaining(&competition, &task).await.expect("remaining"), 1);
}

#[rstest]
#[tokio::test]
async fn concurrent_submission_is_busy(session: Arc<SessionStore>) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 3));
    repository.expect_submit().times(0);
    let service = service(repository, &session);

    let _in_flight = PendingMutation::acquire(&service.submitting).expect("first submission");
    let err = service
        .submit(&competition_id("1"), &task_id("t1"), "0,1", &CancellationToken::new())
        .await
        .expect_err("busy");
    assert_eq!(err.code(), ErrorCode::Busy);
}

#[rstest]
#[tokio::test]
async fn attempt_limit_is_checked_under_the_in_flight_guard(session: Arc<SessionStore>) {
    let mut repository = repository_with(details(CompetitionStatus::Active, 1));
    repository
        .expect_submit()
        .times(1)
        .returning(|_, _, _| Ok(submission(SubmissionStatus::Evaluated)));
    let service = service(repository, &session);
    let (competition, task) = (competition_id("1"), task_id("t1"));
    service
        .submit(&competition, &task, "0,1", &CancellationToken::new())
        .await
        .expect("last attempt accepted");

    let in_flight = PendingMutation::acquire(&service.submitting).expect("guard free");
    let err = service
        .submit(&competition, &task, "0,1", &CancellationToken::new())
        .await
        .expect_err("guard held");
    assert_eq!(err.code(), ErrorCode::Busy);

    drop(in_flight);
    let err = service
        .submit(&competition, &task, "0,1", &CancellationToken::new())
        .await
        .expect_err("exhausted");
    assert_eq!(err.code(), ErrorCode::AttemptsExhausted);
}

#[rstest]
#[tokio::test]
async fn repository_outage_maps_to_unavailable(session: Arc<SessionStore>) {
    let mut repository = MockCompetitionRepository::new();
    repository
        .expect_list()
        .returning(|| Err(CompetitionRepositoryError::connection("refused")));

    let err = service(repository, &session).list().await.expect_err("offline");
    assert_eq!(err.code(), ErrorCode::Unavailable);
}
