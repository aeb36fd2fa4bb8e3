//! CLI argument definitions for the wikilog binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reading tracker API server
#[derive(Parser, Debug)]
#[command(name = "wikilog")]
#[command(about = "wikilog: reading tracker API server and storage diagnostics")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server
    Serve(ServeArgs),
    /// Check health of a running wikilog server
    Health(HealthArgs),
    /// Show which storage variables are set and which backend would be used
    Status(StatusArgs),
    /// List registered usernames
    Users(UsersArgs),
}

/// Storage options shared by commands that open the backend.
///
/// The backend itself is chosen from the environment (`REDIS_URL`,
/// `KV_REST_API_*`, `UPSTASH_REDIS_REST_*`, ...); only the file backend
/// directory can be set here.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StorageArgs {
    /// Data directory for the file backend (default: ./data)
    #[arg(short = 'D', long, env = "WIKILOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "WIKILOG_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "WIKILOG_HOST")]
    pub host: String,

    #[command(flatten)]
    pub storage: StorageArgs,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "WIKILOG_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the status command
#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub storage: StorageArgs,
}

/// Arguments for the users command
#[derive(clap::Args, Debug)]
pub struct UsersArgs {
    #[command(flatten)]
    pub storage: StorageArgs,
}
