//! # CLI Argument Definitions
//!
//! Global flags override the matching settings from the config file and `SFETCH__*`
//! environment variables. The shared secret is never accepted on the command line.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sfetch")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Send sealed requests through a secure-fetch endpoint")]
pub(crate) struct Cli {
    /// Settings file (TOML, YAML or JSON); defaults to `sfetch.*` in the working directory
    #[arg(short, long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Secure endpoint URL, e.g. `http://localhost:3000/secure`
    #[arg(short, long, global = true)]
    pub(crate) endpoint: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, global = true)]
    pub(crate) timeout: Option<u64>,

    /// Verbose protocol diagnostics (never includes secrets or payloads)
    #[arg(short, long, global = true)]
    pub(crate) debug: bool,

    #[command(subcommand)]
    pub(crate) command: AppCommands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum AppCommands {
    /// Ask the backend to greet someone
    Greet {
        /// Name to greet
        #[arg(short, long)]
        name: String,
    },
    /// Send an arbitrary request
    Send {
        /// HTTP method of the inner request
        method: String,
        /// Origin-relative path (`/api/echo`) or absolute backend URL
        path: String,
        /// Request body; sent as JSON unless a content-type header says otherwise
        #[arg(long)]
        data: Option<String>,
        /// Extra header as `name: value` (only content-type, accept and accept-language travel)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}
