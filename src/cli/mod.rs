// SPDX-License-Identifier: MIT

//! Command line front end: run single actions against an asset, or replay
//! a platform style action file.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{ArgAction, ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use tracing::{error, info};

use crate::actions::{Action, Connector, QueryParams, Status};
use crate::config::{AssetConfig, Config};
use crate::host::standalone::ActionFile;
use crate::host::StandaloneHost;
use crate::ingest::{IngestParserRegistry, PollParams};

#[derive(Parser, Debug)]
#[command(
    name = "es-connector",
    about = "Elasticsearch connector for security orchestration platforms"
)]
pub struct Args {
    /// Increase verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub asset: AssetOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, clap::Args, Default)]
pub struct AssetOptions {
    /// Asset configuration file (YAML)
    #[arg(short, long, global = true, value_name = "FILE", env = "ES_CONNECTOR_CONFIG")]
    pub config: Option<String>,

    /// Elasticsearch URL
    #[arg(short = 'e', long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Elasticsearch username
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Elasticsearch password
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Disable TLS certificate validation
    #[arg(id = "no-check-certificate", short = 'k', long = "no-check-certificate", global = true)]
    pub no_check_certificate: bool,

    /// Request timeout, in seconds or as a duration such as "90s"
    #[arg(long, global = true)]
    pub timeout: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the cluster is reachable
    TestConnectivity,

    /// Run a search query
    RunQuery {
        /// Comma separated list of indices
        #[arg(short, long)]
        index: String,

        /// Query as JSON
        #[arg(short, long)]
        query: String,

        /// Document type
        #[arg(long = "type")]
        doc_type: Option<String>,

        /// Routing value
        #[arg(long)]
        routing: Option<String>,
    },

    /// List the indices of the cluster
    GetConfig,

    /// Run one poll cycle and write the resulting containers
    Poll {
        /// Treat as a manually triggered poll
        #[arg(long)]
        poll_now: bool,

        /// Maximum number of containers for a manual poll
        #[arg(long)]
        container_count: Option<usize>,

        /// Directory to write containers into, stdout if not set
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Index to ingest from
        #[arg(id = "ingest_index", long = "ingest-index")]
        ingest_index: Option<String>,

        /// Query to ingest with
        #[arg(id = "ingest_query", long = "ingest-query")]
        ingest_query: Option<String>,

        /// Ingest parser name
        #[arg(id = "ingest_parser", long = "ingest-parser")]
        ingest_parser: Option<String>,
    },

    /// Run the actions in a platform style action file
    Run {
        /// Action file (JSON)
        input: String,

        /// Directory to write containers into, stdout if not set
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// List the available ingest parsers
    Parsers,

    /// Display version
    Version,
}

pub fn command() -> clap::Command {
    Args::command()
}

/// Run the command line, returning the process exit code.
pub async fn main(matches: &ArgMatches) -> Result<i32> {
    let args = Args::from_arg_matches(matches)?;
    let submatches = match matches.subcommand() {
        Some((_, submatches)) => submatches,
        None => bail!("no command provided"),
    };
    let connector = Connector::new(IngestParserRegistry::default());

    let status = match args.command {
        Commands::Version => {
            crate::version::print_version();
            return Ok(0);
        }
        Commands::Parsers => {
            for name in connector.parsers().names() {
                println!("{name}");
            }
            return Ok(0);
        }
        Commands::Run { input, output } => return run_action_file(&connector, &input, output).await,
        Commands::TestConnectivity => {
            let mut host = StandaloneHost::new(load_asset(&args.asset, submatches)?);
            connector
                .handle_action(&mut host, Action::TestConnectivity)
                .await
        }
        Commands::RunQuery {
            index,
            query,
            doc_type,
            routing,
        } => {
            let mut host = StandaloneHost::new(load_asset(&args.asset, submatches)?);
            let params = QueryParams {
                index,
                query,
                doc_type,
                routing,
            };
            connector
                .handle_action(&mut host, Action::RunQuery(params))
                .await
        }
        Commands::GetConfig => {
            let mut host = StandaloneHost::new(load_asset(&args.asset, submatches)?);
            connector.handle_action(&mut host, Action::GetConfig).await
        }
        Commands::Poll {
            poll_now,
            container_count,
            output,
            ..
        } => {
            let mut host =
                StandaloneHost::new(load_asset(&args.asset, submatches)?).with_poll_now(poll_now);
            if let Some(output) = output {
                std::fs::create_dir_all(&output)?;
                host = host.with_output(output);
            }
            connector
                .handle_action(&mut host, Action::OnPoll(PollParams { container_count }))
                .await
        }
    };

    Ok(exit_code(status))
}

fn load_asset(options: &AssetOptions, matches: &ArgMatches) -> Result<AssetConfig> {
    let loader = Config::new(matches, options.config.as_deref())?;
    Ok(AssetConfig::from_loader(&loader)?)
}

async fn run_action_file(
    connector: &Connector,
    filename: &str,
    output: Option<PathBuf>,
) -> Result<i32> {
    let file = ActionFile::load(filename)?;
    let actions = file.actions()?;
    let mut host = StandaloneHost::new(file.asset_config()?).with_poll_now(file.poll_now);
    if let Some(output) = output {
        std::fs::create_dir_all(&output)?;
        host = host.with_output(output);
    }

    info!(
        "Running {} {} action(s) from {}",
        actions.len(),
        file.identifier,
        filename
    );
    let mut failed = 0;
    for action in actions {
        if connector.handle_action(&mut host, action).await == Status::Failed {
            failed += 1;
        }
    }
    if failed > 0 {
        error!("{} of {} action(s) failed", failed, host.results().len());
        return Ok(1);
    }
    Ok(0)
}

fn exit_code(status: Status) -> i32 {
    match status {
        Status::Success => 0,
        Status::Failed => 1,
    }
}
