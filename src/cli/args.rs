//! CLI argument definitions using clap
//!
//! Commands:
//! - skatepark serve [--host <host>] [--port <port>] [--in-memory]
//! - skatepark migrate

use clap::{Parser, Subcommand};

/// Skatepark - participant registration with administrator approval
#[derive(Parser, Debug)]
#[command(name = "skatepark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Keep participants in memory instead of PostgreSQL
        #[arg(long, default_value_t = false)]
        in_memory: bool,
    },

    /// Create the participants table and the administrator row
    Migrate,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
