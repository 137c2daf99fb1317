use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cavebot::config::{AgentConfig, DecisionMode};
use cavebot::input::{open_session, Journal, KeyTiming, Keyboard, MemoryTransport, ThreadClock, Transport};
use cavebot::kernel::event::ControlCommand;
use cavebot::perception::PerceptionPipeline;
use cavebot::rl::ThresholdPolicy;
use cavebot::{Agent, Decision, Reactor, ReactorConfig};

#[derive(Debug, Parser)]
#[command(name = "cavebot", about = "Real-time control loop for a game agent")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, env = "CAVEBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `[control].mode`.
    #[arg(long, value_enum)]
    mode: Option<DecisionMode>,

    /// Record key commands in memory instead of opening the device.
    #[arg(long)]
    dry_run: bool,
}

fn build_keyboard(config: &AgentConfig, dry_run: bool, timing: KeyTiming) -> Keyboard {
    let transport: Option<Box<dyn Transport>> = if dry_run {
        tracing::info!("Dry run, key commands stay in memory");
        Some(Box::new(MemoryTransport::new(Journal::new())))
    } else {
        let (port, source) = config.actuator.resolve_port();
        tracing::info!(port = %port, ?source, "Opening actuator session");
        open_session(&port)
    };
    Keyboard::new(transport, Box::new(ThreadClock), timing)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AgentConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.control.mode = mode;
    }
    let dry_run = cli.dry_run || config.actuator.dry_run;

    let keyboard = build_keyboard(&config, dry_run, config.actuator.timing());
    let agent = Agent::from_config(&config, PerceptionPipeline::new(), keyboard);
    let decision = match config.control.mode {
        DecisionMode::Scripted => Decision::scripted(),
        DecisionMode::Learning => Decision::learning(ThresholdPolicy::default()),
    };

    let (tx, rx) = mpsc::channel(32);
    let mut reactor = Reactor::new(agent, decision, ReactorConfig::from(&config.control)).with_commands(rx);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Commands: pause, resume, cave, quit");
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ControlCommand>() {
                Ok(command) => {
                    if tx.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("{}", e),
            }
        }
    });

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            on_signal.cancel();
        }
    });

    reactor.run(cancel).await;

    let summary = serde_json::to_string(&reactor.telemetry.snapshot()).context("serializing telemetry")?;
    tracing::info!(summary = %summary, "Session telemetry");
    Ok(())
}
