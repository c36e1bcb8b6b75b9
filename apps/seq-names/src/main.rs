use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use orbkit::NamingTree;
use orbkit_bootstrap::{AppConfig, CliArgs, init_logging, shutdown_token};
use orbkit_transport_grpc::serve_naming;
use tokio::net::TcpListener;

/// Naming service for integer sequence servers and clients
#[derive(Parser)]
#[command(name = "seq-names")]
#[command(about = "Naming service for integer sequence servers and clients")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:2809")]
    listen: String,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let args = CliArgs {
        config: cli.config,
        verbose: cli.verbose,
        ..CliArgs::default()
    };
    let config = AppConfig::load(&args)?;
    let _log_guard = init_logging(&config.logging, args.verbose)?;
    tracing::info!(listen = %cli.listen, "seq-names starting");

    let listener = TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("cannot listen on {}", cli.listen))?;
    println!("Naming service listening on {}", listener.local_addr()?);

    serve_naming(listener, Arc::new(NamingTree::new()), shutdown_token()).await?;
    tracing::info!("seq-names stopped");
    Ok(())
}
