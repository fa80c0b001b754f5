use std::sync::Arc;

use cc_delta::{GameStatus, JobCursor, JobState, PositionState, Verdict};
use cc_dto::rpc::{bye, hello, job, update};
use cc_dto::ApiError;
use cc_keeper::RoomKeeper;
use cc_persistence::{ContestData, ContestInfo, ContestKind, InMemoryRepository, Player};
use cc_scheduler::{ContestScheduler, NullBook, Scheduler};

fn sample_contest() -> ContestInfo {
    ContestInfo {
        id: "contest-1".into(),
        name: "a-vs-b".into(),
        kind: ContestKind::Match,
        players: [Player { name: "engine-a".into() }, Player { name: "engine-b".into() }],
        time_control: Some("40/5400".into()),
        opening_book: None,
        score_threshold: 800,
        deadline_margin_ms: 50,
        match_games: 1,
        draw_adjudication: None,
        max_moves: None,
    }
}

async fn sample_keeper() -> RoomKeeper {
    let repo = Arc::new(InMemoryRepository::new());
    let scheduler = Arc::new(Scheduler::new(repo.clone()));
    scheduler
        .register(ContestScheduler::new(sample_contest(), ContestData::fresh(), Vec::new()))
        .await;
    RoomKeeper::new(scheduler, repo)
}

#[tokio::test]
async fn full_lifecycle_hello_job_update_bye() {
    let keeper = sample_keeper().await;

    let hello = keeper
        .hello(hello::Request { supported_proto_versions: vec![1] })
        .await
        .unwrap();
    assert_eq!(hello.proto_version, 1);

    let job_resp = keeper
        .job(
            job::Request {
                room_id: hello.room_id.clone(),
                timeout: 1_000_000_000,
            },
            &NullBook,
        )
        .await
        .unwrap();

    let mut state = JobState::new(cc_core::Ulid::generate());
    state.position = PositionState {
        version: 2,
        board: "checkmate-position".into(),
        status: GameStatus::Checkmate,
        verdict: Some(Verdict::WhiteWins),
    };
    let delta = state.delta(&JobCursor::ZERO).unwrap();

    keeper
        .update(update::Request {
            room_id: hello.room_id.clone(),
            job_id: Some(job_resp.job.id.clone()),
            from: JobCursor::ZERO,
            delta,
            timestamp: cc_core::Timestamp::now(),
            done: true,
            error: None,
        })
        .await
        .unwrap();

    keeper
        .bye(bye::Request { room_id: hello.room_id.clone() })
        .await
        .unwrap();

    let err = keeper
        .bye(bye::Request { room_id: hello.room_id })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NoSuchRoom);
}

#[tokio::test]
async fn incompatible_proto_version_is_rejected() {
    let keeper = sample_keeper().await;
    let err = keeper
        .hello(hello::Request { supported_proto_versions: vec![2] })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::IncompatibleProto);
}

#[tokio::test]
async fn update_for_unknown_room_is_rejected() {
    let keeper = sample_keeper().await;
    let err = keeper
        .update(update::Request {
            room_id: "ghost-room".into(),
            job_id: None,
            from: JobCursor::ZERO,
            delta: JobState::new(cc_core::Ulid::generate()),
            timestamp: cc_core::Timestamp::now(),
            done: false,
            error: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::NoSuchRoom);
}
