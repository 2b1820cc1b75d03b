use anyhow::{Context, Result};
use beacon::model::IceServerConfig;
use beacon::signaling::{
    CallHandle, CallState, MemoryStore, RoleDispatcher, SignalingConfig, TransportConfig,
    WebRtcPeer,
};
use clap::{Parser, Subcommand};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Room-based WebRTC signaling over a shared document store")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect two in-process peers through an in-memory room.
    Loopback {
        #[arg(long)]
        config: Option<PathBuf>,

        /// STUN server URL; repeat to add more. Replaces the configured servers.
        #[arg(long = "stun")]
        stun: Vec<String>,

        /// Use host candidates only.
        #[arg(long, conflicts_with = "stun")]
        no_stun: bool,

        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,
    },

    /// Print the effective configuration as JSON.
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct BeaconConfig {
    signaling: SignalingConfig,
    transport: TransportConfig,
}

fn load_config(path: Option<&Path>) -> Result<BeaconConfig> {
    let Some(path) = path else {
        return Ok(BeaconConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Loopback {
            config,
            stun,
            no_stun,
            timeout_secs,
        } => {
            let mut config = load_config(config.as_deref())?;
            if no_stun {
                config.transport.ice_servers.clear();
            } else if !stun.is_empty() {
                config.transport.ice_servers = vec![IceServerConfig::stun(stun)];
            }
            debug!("Effective config: {:?}", config);
            run_loopback(config, Duration::from_secs(timeout_secs)).await
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_loopback(config: BeaconConfig, timeout: Duration) -> Result<()> {
    println!("{}", "Starting loopback call...".green().bold());

    let store = Arc::new(MemoryStore::new());
    let dispatcher = RoleDispatcher::new(store, config.signaling);

    let (caller_peer, caller) = WebRtcPeer::open(&config.transport).await?;
    caller_peer.create_data_channel("beacon").await?;

    let caller_handle = dispatcher
        .create_call(caller)
        .await
        .context("Failed to create room")?;
    println!(
        "{} {}",
        "Room created:".cyan(),
        caller_handle.room_id().to_string().bold()
    );
    report_states("caller", &caller_handle);

    let (_callee_peer, callee) = WebRtcPeer::open(&config.transport).await?;
    let callee_handle = dispatcher
        .join_call(caller_handle.room_id(), callee)
        .await
        .context("Failed to join room")?;
    report_states("callee", &callee_handle);

    let connected = tokio::time::timeout(timeout, async {
        tokio::try_join!(
            caller_handle.wait_for_connected(),
            callee_handle.wait_for_connected()
        )
    })
    .await;

    let outcome = match connected {
        Ok(Ok(_)) => {
            println!("{}", "Both peers connected!".green().bold());
            Ok(())
        }
        Ok(Err(e)) => Err(anyhow::Error::new(e).context("Call failed")),
        Err(_) => Err(anyhow::anyhow!(
            "Timed out after {:?} waiting for the peers to connect",
            timeout
        )),
    };

    dispatcher.close_call(&caller_handle).await;
    dispatcher.close_call(&callee_handle).await;
    println!("{}", "Call closed.".cyan());

    outcome
}

/// Prints every state transition of `handle` until the call ends.
fn report_states(label: &'static str, handle: &CallHandle) {
    let mut states = handle.watch_state();

    tokio::spawn(async move {
        loop {
            let state = states.borrow_and_update().clone();
            let line = format!("[{}] {:?}", label, state);
            match state {
                CallState::Connected => println!("{}", line.green()),
                CallState::Failed(_) => println!("{}", line.red()),
                _ => println!("{}", line.dimmed()),
            }
            if state.is_terminal() || states.changed().await.is_err() {
                break;
            }
        }
    });
}
