//! ws-player CLI - scripted players that chat with (or command) a shed server.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use ws_player::script::{DEFAULT_ITERATIONS, DEFAULT_URL};
use ws_player::{run_all, Chatter, MessageKind, PlayerScript};

#[derive(Parser)]
#[command(name = "ws-player")]
#[command(about = "Scripted websocket players for a shed game server")]
struct Args {
    /// Server websocket endpoint
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// Game every player joins; omit to chat in the default room
    #[arg(long)]
    game_id: Option<String>,

    /// Player ids, one task each
    #[arg(long, value_delimiter = ',', default_value = "playerA,playerB")]
    players: Vec<String>,

    /// Send/receive rounds per player
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Pause after each round, in milliseconds
    #[arg(long, default_value_t = 5000)]
    interval_ms: u64,

    /// What each round sends
    #[arg(long, value_enum, default_value = "text")]
    mode: MessageKind,

    /// Fail a player whose server stays silent this long
    #[arg(long)]
    recv_timeout_secs: Option<u64>,

    /// PEM public key sent as X-Public-Key by every player
    #[arg(long)]
    public_key_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Silent by default, only show warnings/errors
    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let public_key_pem = match &args.public_key_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(pem) => Some(pem),
            Err(err) => {
                error!(path = %path.display(), error = %err, "cannot read public key");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let scripts: Vec<PlayerScript> = args
        .players
        .iter()
        .enumerate()
        .map(|(index, player_id)| {
            let mut script = PlayerScript::new(player_id.trim());
            script.game_id = args.game_id.clone();
            script.kind = args.mode;
            if index == 0 {
                script.chatter = Chatter::Clock;
            }
            script.iterations = args.iterations;
            script.interval = Duration::from_millis(args.interval_ms);
            script.recv_timeout = args.recv_timeout_secs.map(Duration::from_secs);
            script.public_key_pem = public_key_pem.clone();
            script
        })
        .collect();

    info!(players = scripts.len(), url = %args.url, "starting players");
    let outcomes = run_all(&args.url, scripts, std::io::stdout).await;

    let mut failed = false;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => info!(
                player_id = %outcome.player_id,
                sent = report.sent,
                received = report.received,
                "player finished"
            ),
            Err(err) => {
                failed = true;
                error!(player_id = %outcome.player_id, error = %err, "player failed");
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
