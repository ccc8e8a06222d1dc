//! CLI definitions for the `signbridge` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Bridge between Adobe Sign and OpenText Content Server workflows.
#[derive(Parser)]
#[command(name = "signbridge", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, env = "SIGNBRIDGE_CONFIG", default_value = "signbridge.toml")]
    pub config: PathBuf,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Bind address (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides `server.port` and `PORT`).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print a signature/timestamp pair for the current time.
    Sign,

    /// Print the provider consent URL an administrator must visit.
    AuthorizeUrl,
}
