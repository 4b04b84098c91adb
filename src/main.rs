mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rh_core::config::Config;
use std::path::{Path, PathBuf};

fn start_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    db: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    // CLI flags win over the config file.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(db) = db {
        config.server.db_path = db;
    }

    tracing::info!("Starting reelhouse server");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(rh_server::start(config))?;
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        println!("No config file specified, using defaults");
        let config = Config::default();
        println!("  Server: {}:{}", config.server.host, config.server.port);
        return Ok(());
    };

    println!("Validating config: {:?}", path);
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = Config::from_json(&contents)?;

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    match config.server.static_dir {
        Some(ref dir) => println!("  Static dir: {}", dir.display()),
        None => println!("  Static dir: (none)"),
    }
    if config.cors.allowed_origins.is_empty() {
        println!("  CORS: any origin");
    } else {
        println!("  CORS: {}", config.cors.allowed_origins.join(", "));
    }

    for warning in config.validate() {
        println!("  ⚠ {warning}");
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelhouse=trace,rh_server=trace,rh_db=debug,tower_http=debug".to_string()
        } else {
            "reelhouse=debug,rh_server=debug,rh_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port, db } => {
            start_server(cli.config.as_deref(), host, port, db)
        }
        Commands::Validate { file } => {
            let path = file.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("reelhouse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
