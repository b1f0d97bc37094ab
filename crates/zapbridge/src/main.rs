mod error;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use openwebif_core::{DeviceSession, JsonFileStore, StateUpdate};

use crate::error::BridgeError;

/// Bridge OpenWebif set-top boxes to a smart-home accessory host.
#[derive(Debug, Parser)]
#[command(name = "zapbridge", version, about)]
struct Cli {
    /// Path to the config file (default: platform config directory).
    #[arg(short, long, env = "ZAPBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for per-device state (channel cache, rename maps).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), BridgeError> {
    let config = openwebif_config::load_config(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(openwebif_config::data_path);

    // Each device stands alone: a bad descriptor skips that device,
    // never the whole daemon.
    let mut sessions: Vec<DeviceSession> = Vec::new();
    for profile in &config.devices {
        let device = match profile.to_device_config() {
            Ok(device) => device,
            Err(e) => {
                warn!(device = %profile.name, error = %e, "skipping device with invalid configuration");
                continue;
            }
        };

        let store = match JsonFileStore::for_device(&data_dir, &device.endpoint.host) {
            Ok(store) => store,
            Err(e) => {
                warn!(device = %device.name, error = %e, "skipping device, cannot open state store");
                continue;
            }
        };

        let session = match DeviceSession::new(device, Box::new(store)) {
            Ok(session) => session,
            Err(e) => {
                warn!(device = %profile.name, error = %e, "skipping device");
                continue;
            }
        };

        info!(
            device = %session.name(),
            capabilities = ?session.capabilities(),
            volume_display = ?session.volume_display(),
            channels = session.channels().len(),
            "registered device"
        );

        session.start().await;
        tokio::spawn(forward_updates(session.clone()));
        sessions.push(session);
    }

    if sessions.is_empty() {
        return Err(BridgeError::NoDevices);
    }

    info!(devices = sessions.len(), data_dir = %data_dir.display(), "bridge running");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    for session in &sessions {
        session.shutdown().await;
    }

    Ok(())
}

/// Publish state-change notifications for one device.
///
/// This is the seam where an accessory-host adapter plugs in; the
/// standalone daemon surfaces the notifications through the log.
async fn forward_updates(session: DeviceSession) {
    let mut updates = session.updates();
    let mut sync = session.sync_state();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(StateUpdate::Power(on)) => {
                    info!(device = %session.name(), on, "power changed");
                }
                Ok(StateUpdate::ActiveChannel(identifier)) => {
                    info!(device = %session.name(), identifier, "channel changed");
                }
                Ok(StateUpdate::Mute(muted)) => {
                    info!(device = %session.name(), muted, "mute changed");
                }
                Ok(StateUpdate::Volume(volume)) => {
                    info!(device = %session.name(), volume, "volume changed");
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(device = %session.name(), missed, "update stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            changed = sync.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *sync.borrow_and_update();
                info!(device = %session.name(), ?state, "sync state changed");
            }
        }
    }
}
