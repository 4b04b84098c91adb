use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reelhouse")]
#[command(author, version, about = "Self-hosted movie library with range streaming")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite catalog path (overrides config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate (defaults to --config)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
