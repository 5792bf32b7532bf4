//! 5-pin lane binary.
//!
//! Reads lane messages as JSON lines on stdin and writes lane events and
//! outbound messages as JSON lines on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Lane 3 with defaults, games logged to a file
//! fivepin-lane --lane 3 --game-log lane3.jsonl
//!
//! # Settings file, verbose logs
//! fivepin-lane --config lane.json --log-level debug
//! ```
//!
//! Pinsetter I/O is simulated in memory; supply readings with
//! `{"type":"throw","pins":"10100"}`.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use fivepin_core::Environment;
use fivepin_lane::{
    FileGameLog, GameLog, Inbound, Lane, LaneBridge, LaneConfig, LaneEvent, LaneHandle, MemoryGameLog, SystemEnv,
    spawn,
};
use fivepin_machine::MemoryHardware;
use fivepin_proto::{LaneMessage, LineDecoder, encode_line};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    sync::{broadcast, mpsc},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 5-pin bowling lane
#[derive(Parser, Debug)]
#[command(name = "fivepin-lane")]
#[command(about = "Pin detection and scoring for one 5-pin lane")]
#[command(version)]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lane number, overriding the settings file
    #[arg(short, long)]
    lane: Option<u16>,

    /// JSON-lines game log, overriding the settings file
    #[arg(long)]
    game_log: Option<PathBuf>,

    /// Seconds between heartbeats (0 disables)
    #[arg(long, default_value = "30")]
    heartbeat_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

    let mut config = match &args.config {
        Some(path) => LaneConfig::load(path)?,
        None => LaneConfig::default(),
    };
    if let Some(lane) = args.lane {
        config.lane_id = lane;
    }
    if let Some(path) = args.game_log.clone() {
        config.game_log = Some(path);
    }
    config.validate()?;

    tracing::info!(lane = config.lane_id, "5-pin lane starting");
    tracing::warn!("pinsetter I/O is simulated in memory");

    match config.game_log.clone() {
        Some(path) => run(config, FileGameLog::new(path), args.heartbeat_secs).await,
        None => run(config, MemoryGameLog::new(), args.heartbeat_secs).await,
    }
}

async fn run<S: GameLog>(config: LaneConfig, log: S, heartbeat_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    match log.load_all() {
        Ok(records) => tracing::info!(games = records.len(), "game log opened"),
        Err(e) => tracing::warn!(error = %e, "game log unreadable; new games are still appended"),
    }

    let env = SystemEnv::new();
    let lane = Lane::new(&config, MemoryHardware::new(), env, log);
    let (handle, task) = spawn(lane, config.runtime_config());
    let bridge = LaneBridge::new(config.lane_id);

    let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(config.runtime.event_capacity);
    let writer = tokio::spawn(write_lines(out_rx));
    tokio::spawn(forward_events(handle.subscribe(), bridge, out_tx.clone()));
    let beat = (heartbeat_secs > 0)
        .then(|| tokio::spawn(heartbeat(bridge, env, Duration::from_secs(heartbeat_secs), out_tx.clone())));

    send_message(&out_tx, &bridge.ready()).await;
    read_stdin(&handle, bridge, &out_tx).await?;

    tracing::info!("stdin closed, shutting down");
    handle.shutdown().await;
    task.await?;
    if let Some(beat) = beat {
        beat.abort();
    }

    // The writer drains once every sender is gone.
    drop(handle);
    drop(out_tx);
    writer.await?;
    Ok(())
}

async fn read_stdin(
    handle: &LaneHandle,
    bridge: LaneBridge,
    out: &mpsc::Sender<Vec<u8>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdin = tokio::io::stdin();
    let mut decoder = LineDecoder::new();
    let mut buf = vec![0u8; 4096];

    loop {
        let n = stdin.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        for decoded in decoder.push(&buf[..n]) {
            let message = match decoded {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed line");
                    continue;
                },
            };

            match bridge.inbound(message) {
                Inbound::Request(request) => {
                    // Outcomes reach stdout through the event stream.
                    let _ = handle.request(request).await;
                },
                Inbound::MachineStatus => {
                    let summary = handle.machine_status().await?;
                    send_message(out, &bridge.machine_status(summary)).await;
                },
                Inbound::Ping => send_message(out, &LaneMessage::Pong).await,
                Inbound::Ignored => {},
            }
        }
    }
}

async fn forward_events(mut events: broadcast::Receiver<LaneEvent>, bridge: LaneBridge, out: mpsc::Sender<Vec<u8>>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "event output lagging");
                continue;
            },
            Err(broadcast::error::RecvError::Closed) => return,
        };

        match serde_json::to_vec(&event) {
            Ok(mut line) => {
                line.push(b'\n');
                if out.send(line).await.is_err() {
                    return;
                }
            },
            Err(e) => tracing::error!(error = %e, "event not serializable"),
        }
        if let Some(message) = bridge.outbound(&event) {
            send_message(&out, &message).await;
        }
    }
}

async fn heartbeat(bridge: LaneBridge, env: SystemEnv, period: Duration, out: mpsc::Sender<Vec<u8>>) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        send_message(&out, &bridge.heartbeat(env.wall_clock_secs())).await;
    }
}

async fn send_message(out: &mpsc::Sender<Vec<u8>>, message: &LaneMessage) {
    match encode_line(message) {
        Ok(line) => {
            if out.send(line).await.is_err() {
                tracing::debug!(message = message.name(), "output closed");
            }
        },
        Err(e) => tracing::error!(error = %e, message = message.name(), "message not encodable"),
    }
}

async fn write_lines(mut lines: mpsc::Receiver<Vec<u8>>) {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.recv().await {
        if let Err(e) = stdout.write_all(&line).await {
            tracing::error!(error = %e, "stdout write failed");
            return;
        }
        if let Err(e) = stdout.flush().await {
            tracing::error!(error = %e, "stdout flush failed");
            return;
        }
    }
}
