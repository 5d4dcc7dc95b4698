//! BookMaster CLI - manage book vaults from a terminal.
//!
//! Operates on the same settings documents the note-taking plugin reads, so a
//! vault added here shows up in the plugin and vice versa.

mod commands;

use anyhow::{Context, Result};
use bookmaster_core::{platform, BookVaultRegistry, FileDeviceIdentity, JsonSettingsStore};
use clap::Parser;
use commands::Command;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "bookmaster")]
#[command(about = "Manage BookMaster book vaults on this device")]
struct Args {
    /// Settings root holding the shared document and per-device documents
    #[arg(long, env = "BOOKMASTER_SETTINGS_DIR")]
    settings_dir: Option<PathBuf>,

    /// Local file holding this device's identity (must not be synced)
    #[arg(long, env = "BOOKMASTER_DEVICE_FILE")]
    device_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries command output.
    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let settings_dir = match args.settings_dir {
        Some(dir) => dir,
        None => platform::default_settings_root()?,
    };
    debug!("Settings root: {}", settings_dir.display());

    let identity = match args.device_file {
        Some(file) => FileDeviceIdentity::load_or_create(&file)
            .with_context(|| format!("Failed to load device identity {}", file.display()))?,
        None => FileDeviceIdentity::load_default().context("Failed to load device identity")?,
    };
    let store = Arc::new(JsonSettingsStore::new(&settings_dir));
    let mut registry = BookVaultRegistry::open(store, &identity)
        .await
        .with_context(|| format!("Failed to open settings in {}", settings_dir.display()))?;

    let output = commands::execute(&mut registry, args.command).await?;
    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
