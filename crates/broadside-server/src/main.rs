//! Broadside server entry point.
//!
//! Parses flags, loads the configuration file, starts logging, and runs
//! the server until SIGINT/SIGTERM.

mod cli;
mod config;
mod logging;
mod signals;

use anyhow::{Context, Result};
use broadside::BroadsideServer;
use clap::Parser;
use tracing::info;

use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::setup_logging(&args.log_level, args.json_logs)?;

    let config = config::load_from_file(&args.config).await?;
    let config = config::apply_args(config, &args);
    info!(
        bind = %config.bind_addr,
        idle_timeout_secs = config.idle_timeout_secs,
        handshake_timeout_secs = config.handshake_timeout_secs,
        max_name_len = config.lobby.max_name_len,
        "starting Broadside"
    );

    let bind = config.bind_addr.clone();
    let server = BroadsideServer::builder()
        .config(config)
        .build()
        .await
        .with_context(|| format!("binding {bind}"))?;

    let closed = server.run_until(signals::shutdown_signal()).await?;
    info!(closed, "shutdown complete");
    Ok(())
}
