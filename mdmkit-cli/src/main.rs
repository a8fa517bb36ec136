//! `mdmkit` replays a simulated device through the MDM inference engine and
//! prints what the host application would receive.

mod fixture;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use mdmkit_core::platform::memory::{MemoryEventSink, MemoryPlatform};
use mdmkit_core::{default_mdm_settings, MdmSettings, MobileDeviceManager};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::fixture::DeviceFixture;

#[derive(Parser)]
#[command(name = "mdmkit", version, about = "Inspect MDM detection against a device fixture")]
struct Cli {
    /// JSON file describing the simulated device. Defaults to an unmanaged
    /// Play Store install.
    #[arg(long, global = true, env = "MDMKIT_FIXTURE")]
    fixture: Option<PathBuf>,

    /// JSON file overriding the detection settings.
    #[arg(long, global = true, env = "MDMKIT_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full device info snapshot
    DeviceInfo,
    /// Organization fields derived from the managed configuration
    Organization,
    /// Every detection step and the configuration probe
    Diagnostics,
    /// Enrollment verdict with its contributing signals
    Enrollment,
    /// Which platform capabilities are reachable
    Capabilities,
    /// Force a configuration refresh
    Sync,
    /// Whether the app may be locked and whether it is
    LockStatus,
    /// Enter lock-task mode
    Lock,
    /// Leave lock-task mode
    Unlock,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LockStatus {
    allowed: bool,
    locked: bool,
}

fn load_settings(path: Option<&PathBuf>) -> eyre::Result<MdmSettings> {
    let Some(path) = path else {
        return Ok(default_mdm_settings());
    };
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading settings {}", path.display()))?;
    Ok(MdmSettings::from_json(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let fixture = match &cli.fixture {
        Some(path) => DeviceFixture::load(path)?,
        None => DeviceFixture::default(),
    };
    let settings = load_settings(cli.settings.as_ref())?;
    tracing::debug!(?settings, "detection settings");

    let platform: Arc<MemoryPlatform> = Arc::new(fixture.into_platform());
    let events = Arc::new(MemoryEventSink::new());
    let manager = MobileDeviceManager::with_settings(platform, events.clone(), settings);
    manager.initialize();

    match cli.command {
        Command::DeviceInfo => print_json(&manager.get_device_info().await?)?,
        Command::Organization => {
            let ordered: BTreeMap<_, _> = manager.get_organization_info().await.into_iter().collect();
            print_json(&ordered)?;
        }
        Command::Diagnostics => print_json(&manager.get_detailed_diagnostics().await)?,
        Command::Enrollment => print_json(&manager.get_enrollment_status().await)?,
        Command::Capabilities => print_json(&manager.check_capabilities().await)?,
        Command::Sync => print_json(&manager.force_sync().await)?,
        Command::LockStatus => print_json(&LockStatus {
            allowed: manager.is_app_locking_allowed().await,
            locked: manager.is_app_locked().await?,
        })?,
        Command::Lock => print_json(&manager.lock_app().await?)?,
        Command::Unlock => print_json(&manager.unlock_app().await?)?,
    }

    for (channel, event) in events.events() {
        tracing::info!(%channel, ?event, "event emitted");
    }

    manager.on_host_destroy();
    Ok(())
}
