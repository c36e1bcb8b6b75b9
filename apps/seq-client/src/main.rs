use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use integer_seq::{
    DELIMITER, DirectoryClient, IntegerSeqConfig, Invocation, InvocationProxy, MODULE_NAME,
    ServiceDirectory,
};
use integer_seq_sdk::{IntegerSequence, MAX_QUERY_SIZE};
use orbkit::Broker;
use orbkit_bootstrap::{AppConfig, CliArgs, init_logging, module_config_or_default};
use orbkit_transport_grpc::GrpcBroker;

const EXAMPLES: &str = "\
Sequence ID is the identifier of an integer sequence, e.g. 'fib' (Fibonacci numbers).
Service ID is the identifier of a particular implementation of a sequence,
which consists of a sequence ID, dot '.', and a kind, e.g. 'pow3.naive-rs'.

Indices are non-negative integers. Indexing starts with zero; e.g.,
fib(0) = 0 and fib(1) = 1.

Examples:
    seq-client fib 5 6 7
    seq-client --seq --short primes.rs 10000 20000";

/// Retrieves members of integer sequences from remote services
#[derive(Parser)]
#[command(name = "seq-client")]
#[command(about = "Retrieves members of integer sequences from remote services")]
#[command(version, after_help = EXAMPLES, allow_negative_numbers = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Naming service URI (overrides config)
    #[arg(long)]
    naming_uri: Option<String>,

    /// Perform a separate request for each index
    #[arg(long, overrides_with = "batch")]
    seq: bool,

    /// Perform one batch request for all indices (default)
    #[arg(long, overrides_with = "seq")]
    batch: bool,

    /// Print only the first and last 20 digits of long numbers
    #[arg(long)]
    short: bool,

    /// Print the list of registered implementations and exit
    #[arg(long)]
    list: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Sequence ID (e.g. `fib`) or service ID (e.g. `pow3.naive-rs`)
    sequence: Option<String>,

    /// Indices of the requested members
    indices: Vec<String>,
}

/// Bad command line; reported with exit code 2.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct ArgumentError(String);

/// What the client was asked to do.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Query {
        pattern: String,
        indices: Vec<i32>,
        batch: bool,
        shorten: bool,
    },
}

impl Cli {
    fn command(&self) -> Result<Command, ArgumentError> {
        if self.list {
            return Ok(Command::List);
        }
        let Some(pattern) = self.sequence.clone() else {
            let message = if self.seq || self.batch || self.short {
                "Sequence name not specified"
            } else {
                "No arguments specified."
            };
            return Err(ArgumentError(message.to_owned()));
        };
        if self.indices.len() > MAX_QUERY_SIZE {
            return Err(ArgumentError(format!(
                "Too many indices specified. Specify no more than {MAX_QUERY_SIZE}"
            )));
        }
        let indices = self
            .indices
            .iter()
            .map(|s| {
                s.parse::<i32>()
                    .map_err(|_| ArgumentError(format!("Invalid sequence index: {s}.")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Command::Query {
            pattern,
            indices,
            batch: !self.seq,
            shorten: self.short,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = match cli.command() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\nInvoke with `--help` option to get help.");
            return ExitCode::from(2);
        }
    };
    match run(cli, command).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(e: &anyhow::Error) {
    eprintln!("Error: {e}");
    if let Some(cause) = e.chain().nth(1) {
        eprintln!("Cause: {cause}");
    }
}

/// Returns `false` if any request failed.
async fn run(cli: Cli, command: Command) -> Result<bool> {
    let args = CliArgs {
        config: cli.config,
        naming_uri: cli.naming_uri,
        verbose: cli.verbose,
        ..CliArgs::default()
    };
    let config = AppConfig::load(&args)?;
    let seq_config: IntegerSeqConfig = module_config_or_default(&config, MODULE_NAME)?;
    let _log_guard = init_logging(&config.logging, args.verbose)?;
    tracing::debug!(naming_uri = %config.broker.naming_uri, ?command, "seq-client starting");

    let broker = Arc::new(GrpcBroker::new(config.broker.clone()));
    let directory = ServiceDirectory::new(
        Arc::clone(&broker) as Arc<dyn Broker>,
        &seq_config.directory_name,
    )?;
    let client = DirectoryClient::new(directory, seq_config.list_limit);

    let result = match command {
        Command::List => list(&client).await.map(|()| true),
        Command::Query {
            pattern,
            indices,
            batch,
            shorten,
        } => query(&client, &pattern, &indices, batch, shorten).await,
    };
    broker.shutdown().await;
    result
}

async fn list(client: &DirectoryClient) -> Result<()> {
    let entries = client.list_services().await?;
    println!("Registered sequence implementations:");
    for entry in entries {
        println!("{DELIMITER}");
        println!("{entry}");
    }
    Ok(())
}

async fn query(
    client: &DirectoryClient,
    pattern: &str,
    indices: &[i32],
    batch: bool,
    shorten: bool,
) -> Result<bool> {
    println!("Getting service by sequence name '{pattern}'...");
    let proxy = client.select(pattern, shorten).await?;
    let remote_name = proxy.sequence().name().await?;
    println!("Connected to service '{remote_name}' (directory name: {})", proxy.name());

    let id = proxy.name().id();
    if batch {
        let list = indices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("Performing batch request {id}([{list}])");
        return Ok(print_outcome(&proxy, proxy.values_at(indices).await));
    }

    let mut all_ok = true;
    for &index in indices {
        println!("Performing request {id}({index})");
        all_ok &= print_outcome(&proxy, proxy.value_at(index).await);
    }
    Ok(all_ok)
}

fn print_outcome(
    proxy: &InvocationProxy,
    outcome: Result<Invocation, integer_seq::InvocationError>,
) -> bool {
    match outcome {
        Ok(invocation) => {
            tracing::debug!(elapsed = ?invocation.elapsed, "request completed");
            println!("Request completed in {} ms", invocation.elapsed.as_millis());
            for (index, response) in &invocation.results {
                println!("{}", proxy.render(*index, response));
            }
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "request failed");
            report(&e.into());
            false
        }
    }
}
