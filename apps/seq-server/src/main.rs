use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use integer_seq::{
    DELIMITER, IntegerSeqConfig, ListingEntry, MODULE_NAME, SequenceImplementation,
    ServiceDescription, ServiceDirectory, ServiceRegistrar, StaleFilter,
};
use integer_seq_sequences::catalog;
use orbkit::Broker;
use orbkit_bootstrap::{
    AppConfig, CliArgs, init_logging, module_config_or_default, wait_for_shutdown,
};
use orbkit_transport_grpc::GrpcBroker;

/// Hosts integer sequence implementations and registers them in the
/// naming service
#[derive(Parser)]
#[command(name = "seq-server")]
#[command(about = "Hosts integer sequence implementations")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Naming service URI (overrides config)
    #[arg(long)]
    naming_uri: Option<String>,

    /// Address the object server binds to (overrides config)
    #[arg(long)]
    listen_addr: Option<String>,

    /// List implementations hosted by this server and exit
    #[arg(long)]
    list: bool,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

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
            eprintln!("Error: {e}");
            if let Some(cause) = e.chain().nth(1) {
                eprintln!("Cause: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let args = CliArgs {
        config: cli.config,
        naming_uri: cli.naming_uri,
        listen_addr: cli.listen_addr,
        verbose: cli.verbose,
    };
    let config = AppConfig::load(&args)?;
    let seq_config: IntegerSeqConfig = module_config_or_default(&config, MODULE_NAME)?;
    let implementations = catalog(&seq_config.kind_suffix);

    if cli.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }
    if cli.list {
        print_implementations(&implementations);
        return Ok(());
    }

    let _log_guard = init_logging(&config.logging, args.verbose)?;
    tracing::info!(naming_uri = %config.broker.naming_uri, "seq-server starting");

    let broker = Arc::new(GrpcBroker::new(config.broker.clone()));
    let result = serve(
        Arc::clone(&broker) as Arc<dyn Broker>,
        &seq_config,
        &implementations,
    )
    .await;
    broker.shutdown().await;
    result
}

async fn serve(
    broker: Arc<dyn Broker>,
    config: &IntegerSeqConfig,
    implementations: &[Arc<dyn SequenceImplementation>],
) -> Result<()> {
    let directory = ServiceDirectory::new(broker, &config.directory_name)?;
    let publication = ServiceRegistrar::new(&directory, config.list_limit)
        .publish(implementations, &StaleFilter::kind_suffix(config.kind_suffix.as_str()))
        .await?;

    for name in &publication.unbound {
        println!("Unbinding name {name}");
    }
    for name in &publication.bound {
        println!("Binding implementation to name {name}");
    }
    println!("Ready for incoming requests...");

    wait_for_shutdown().await?;
    tracing::info!("seq-server stopping");
    Ok(())
}

fn print_implementations(implementations: &[Arc<dyn SequenceImplementation>]) {
    println!("List of implementations hosted by this server:");
    for implementation in implementations {
        let entry = ListingEntry {
            name: implementation.directory_name(),
            details: Ok(ServiceDescription::of(implementation.as_ref())),
        };
        println!("{DELIMITER}");
        println!("{entry}");
    }
}
