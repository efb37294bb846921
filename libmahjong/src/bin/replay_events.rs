//! Replays a JSON-lines event log through a client session.
//!
//! Usage:
//!   replay_events --log /path/to/events.jsonl --player 1 [options]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use mahjong::config::ClientConfig;
use mahjong::hand::HandView;
use mahjong::present::LogPresenter;
use mahjong::score::ServerScorer;
use mahjong::session::Handled;
use mahjong::ClientSession;

#[derive(Parser, Debug)]
#[command(
    name = "replay_events",
    about = "Replay server events for one seat and print the resulting table"
)]
struct Args {
    /// JSON-lines file of inbound events.
    #[arg(long)]
    log: PathBuf,

    /// Player index of the local seat, 0-3.
    #[arg(long, default_value = "0")]
    player: u8,

    /// Client config in JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the config's pacing between presentation steps.
    #[arg(long)]
    step_delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_path(path)?,
        None => ClientConfig::default(),
    };
    if let Some(ms) = args.step_delay_ms {
        config.step_delay_ms = ms;
    }

    eprintln!("=== Event Replay ===");
    eprintln!("Log:     {}", args.log.display());
    eprintln!("Player:  {}", args.player);
    eprintln!("Config:  {config:?}");
    eprintln!();

    let mut session = ClientSession::new(
        args.player,
        config,
        Arc::new(LogPresenter),
        Arc::new(ServerScorer),
    )?;

    let file = File::open(&args.log)
        .with_context(|| format!("failed to open {}", args.log.display()))?;
    let start = Instant::now();
    let mut handled = 0_usize;
    let mut dropped = 0_usize;
    let mut last: Option<Handled> = None;

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match session
            .handle_json(line)
            .with_context(|| format!("at line {}", idx + 1))?
        {
            Some(h) => {
                handled += 1;
                last = Some(h);
            }
            None => dropped += 1,
        }
    }

    let state = session.state()?;
    eprintln!(
        "Handled {handled} events, dropped {dropped} in {:.2?}",
        start.elapsed(),
    );
    eprintln!();
    println!("{}", state.brief_info());
    println!(
        "hand: {}",
        serde_json::to_string(&HandView::from(state.hand()))?,
    );
    if let Some(h) = last {
        println!("turn: {} (can interact: {})", h.at_turn, h.can_interact);
        if let Some(next) = h.expect {
            println!("expecting: {next}");
        }
        if let Some(legal) = h.legal {
            let actions: Vec<_> = legal.actions.iter().map(ToString::to_string).collect();
            println!("legal: {}", actions.join(", "));
        }
    }
    Ok(())
}
