//! Command-line interface for HDS2000-series instruments.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hdsctl_link::{CachedExecutor, SimulatedScope};
use hdsctl_runner::{ApiServer, HdsctlConfig, Instrument, PushServer, RunnerError, RunnerResult};
use hdsctl_scpi::hds_catalog;
use tracing::error;

/// Control an HDS2000-series oscilloscope over SCPI.
#[derive(Parser, Debug)]
#[command(name = "hdsctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Run SCPI commands, e.g. `hdsctl exec ":CH1:DISP ON; :CH1:DISP?"`.
    Exec {
        /// Commands, joined with spaces.
        #[arg(required = true)]
        script: Vec<String>,
    },
    /// Read a field by id, e.g. `ch1Disp`.
    Get {
        /// Field id.
        field: String,
    },
    /// Write a field by id.
    Set {
        /// Field id.
        field: String,
        /// New value.
        value: String,
    },
    /// List every parameter the instrument exposes.
    List,
    /// Start the live-view stream server.
    Serve {
        /// Address to listen on.
        #[arg(long)]
        addr: Option<String>,
        /// Also serve `GET /api/<fieldId>` on this address.
        #[arg(long)]
        api_addr: Option<String>,
    },
    /// Print the version.
    Version,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Open the instrument.
///
/// No USB transport ships with this binary; commands run against the
/// simulated instrument.
fn open_instrument(config: &HdsctlConfig) -> RunnerResult<Instrument> {
    let catalog = hds_catalog()?;
    let executor = CachedExecutor::connect(SimulatedScope::new(), config.executor.clone())?;
    Ok(Instrument::new(catalog, executor))
}

async fn run(args: Args) -> RunnerResult<()> {
    let config = match &args.config {
        Some(path) => HdsctlConfig::load(path)?,
        None => HdsctlConfig::default(),
    };

    if let Command::Version = args.command {
        println!("hdsctl version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    hdsctl_metrics::describe_metrics();
    let instrument = open_instrument(&config)?;

    match args.command {
        Command::Exec { script } => {
            let script = script.join(" ");
            instrument.execute_script(&script, &mut io::stdout().lock())
        }
        Command::Get { field } => {
            println!("{}", instrument.get_field_by_id(&field)?);
            Ok(())
        }
        Command::Set { field, value } => instrument.set_field_by_id(&field, &value),
        Command::List => {
            print!("{}", instrument.describe_catalog());
            Ok(())
        }
        Command::Serve { addr, api_addr } => {
            let mut stream_config = config.stream;
            if let Some(addr) = addr {
                stream_config = stream_config.with_listen_addr(addr);
            }
            if let Some(addr) = api_addr {
                stream_config = stream_config.with_api_addr(addr);
            }
            if let Some(addr) = &stream_config.api_addr {
                let api = ApiServer::bind(instrument.clone(), addr).await?;
                tokio::spawn(async move {
                    if let Err(e) = api.run().await {
                        error!(error = %e, "Field API stopped");
                    }
                });
            }
            let server = PushServer::bind(instrument, stream_config).await?;
            server.run().await.map_err(RunnerError::from)
        }
        Command::Version => Ok(()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
