//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Broadside matchmaking server.
///
/// Flags override the matching settings from the configuration file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML configuration file. A missing file means defaults.
    #[arg(short, long, default_value = "broadside.toml")]
    pub config: PathBuf,

    /// Listen address, e.g. "0.0.0.0:8080".
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from("broadside.toml"),
            bind: None,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
