//! Room keeper process: recovers persisted state, optionally seeds a new
//! contest, then serves the four-verb RPC surface until interrupted.

use std::sync::Arc;

use cc_auth::{AllowAll, StaticTokenSet, TokenValidator};
use cc_keeper::RoomKeeper;
use cc_dto::DrawAdjudication;
use cc_persistence::{ContestData, ContestInfo, ContestKind, InMemoryRepository, Player, Repository};
use cc_scheduler::{NullBook, OpeningBook, Scheduler};
use cc_server::ServerConfig;
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(about = "Distributed chess contest room keeper")]
struct Args {
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind_addr: String,
    #[arg(long, default_value = "")]
    route_prefix: String,
    #[arg(long, default_value_t = 6)]
    workers: usize,
    /// Comma-separated bearer tokens accepted by the server. Omit to
    /// accept any token (local development only).
    #[arg(long, value_delimiter = ',')]
    bearer_token: Vec<String>,

    /// Seed a new contest on startup. Requires --white and --black.
    #[arg(long)]
    contest_id: Option<String>,
    #[arg(long)]
    contest_name: Option<String>,
    #[arg(long)]
    white: Option<String>,
    #[arg(long)]
    black: Option<String>,
    #[arg(long, default_value_t = 10)]
    match_games: u32,
    #[arg(long)]
    time_control: Option<String>,
    #[arg(long)]
    opening_book: Option<String>,
    #[arg(long, default_value_t = 0)]
    score_threshold: i32,
    #[arg(long, default_value_t = 0)]
    deadline_margin_ms: i64,
    /// Centipawn band around zero counted towards draw adjudication.
    /// Requires --draw-adjudication-count.
    #[arg(long)]
    draw_adjudication_threshold: Option<i32>,
    /// Consecutive plies within the threshold before adjudicating a draw.
    #[arg(long)]
    draw_adjudication_count: Option<u32>,
    /// Ply count after which the battle driver adjudicates a draw.
    #[arg(long)]
    max_moves: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cc_core::init_logging();
    let args = Args::parse();

    let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());

    if let (Some(white), Some(black)) = (&args.white, &args.black) {
        let id = args.contest_id.clone().unwrap_or_else(|| cc_core::Ulid::generate().to_string());
        let info = ContestInfo {
            id: id.clone(),
            name: args.contest_name.clone().unwrap_or_else(|| id.clone()),
            kind: ContestKind::Match,
            players: [Player { name: white.clone() }, Player { name: black.clone() }],
            time_control: args.time_control.clone(),
            opening_book: args.opening_book.clone(),
            score_threshold: args.score_threshold,
            deadline_margin_ms: args.deadline_margin_ms,
            match_games: args.match_games,
            draw_adjudication: args.draw_adjudication_threshold.zip(args.draw_adjudication_count).map(
                |(threshold, count)| DrawAdjudication { threshold, count },
            ),
            max_moves: args.max_moves,
        };
        let data = ContestData::fresh();
        repo.create_contest(&info, &data).await?;
        log::info!("seeded contest {id}: {white} vs {black}, {} games", args.match_games);
    }

    let scheduler = Arc::new(Scheduler::recover(repo.clone()).await?);
    let keeper = Arc::new(RoomKeeper::recover(scheduler.clone(), repo.clone()).await?);

    let validator: Arc<dyn TokenValidator> = if args.bearer_token.is_empty() {
        log::warn!("no --bearer-token configured, accepting any bearer token");
        Arc::new(AllowAll)
    } else {
        Arc::new(StaticTokenSet::new(args.bearer_token.clone()))
    };
    let book: Arc<dyn OpeningBook> = Arc::new(NullBook);

    let cancel = CancellationToken::new();
    cc_core::install_shutdown_signal(cancel.clone());
    tokio::spawn(
        keeper
            .clone()
            .run_gc_loop(cc_core::gc_interval(cc_core::ROOM_LIVENESS_TIMEOUT), cancel.clone()),
    );

    cc_server::run(
        keeper,
        book,
        validator,
        ServerConfig {
            bind_addr: args.bind_addr,
            route_prefix: args.route_prefix,
            workers: args.workers,
        },
    )
    .await?;
    Ok(())
}
