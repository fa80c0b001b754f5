//! Room client process: connects to a keeper, polls for jobs, and drives
//! each one through locally launched UCI engine processes.

mod process_engine;
mod registry;

use std::sync::Arc;

use cc_room::{RoomClient, RoomClientConfig};
use clap::Parser;
use process_engine::EngineSpec;
use registry::StaticEngineRegistry;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(about = "Distributed chess contest room client")]
struct Args {
    #[arg(long)]
    keeper_url: String,

    /// `name=program` pairs, e.g. `--engine stockfish=/usr/bin/stockfish`.
    /// Repeatable, one per named engine the keeper may assign this room.
    #[arg(long = "engine", value_parser = parse_engine)]
    engines: Vec<(String, EngineSpec)>,
}

fn parse_engine(raw: &str) -> Result<(String, EngineSpec), String> {
    let (name, program) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=program, got {raw}"))?;
    Ok((
        name.to_string(),
        EngineSpec {
            program: program.to_string(),
            args: Vec::new(),
        },
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cc_core::init_logging();
    let args = Args::parse();

    if args.engines.is_empty() {
        log::warn!("no --engine flags given; this room can never be assigned a job");
    }
    let registry = Arc::new(StaticEngineRegistry::new(args.engines));

    let client = RoomClient::new(args.keeper_url, registry, RoomClientConfig::default());

    let cancel = CancellationToken::new();
    cc_core::install_shutdown_signal(cancel.clone());

    client.run(cancel).await;
    Ok(())
}
