//! CLI entry point: load config, read the bets file, run one session.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lottery_client::cancel::CancelToken;
use lottery_client::config::ClientConfig;
use lottery_client::records::BetRecordSource;
use lottery_client::session::{Session, SessionOutcome};

#[derive(Parser)]
#[clap(name = "lottery-client")]
#[clap(about = "Uploads bet batches to the lottery service and polls for winners")]
struct Cli {
    /// CSV file with one bet per line:
    /// first_name,last_name,document,birth_date,number
    #[clap(short, long)]
    bets_file: PathBuf,

    /// Optional TOML config file; CLI flags override it
    #[clap(long)]
    config: Option<PathBuf>,

    /// Server address (host:port)
    #[clap(short, long)]
    server: Option<String>,

    /// Agency id included in every outgoing message
    #[clap(short, long)]
    agency_id: Option<String>,

    /// Maximum bets per batch
    #[clap(long)]
    batch_size: Option<usize>,

    /// Interval between winners polls, in milliseconds
    #[clap(long)]
    poll_interval_ms: Option<u64>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

impl Cli {
    fn build_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(server) = &self.server {
            config.server_addr = server.clone();
        }
        if let Some(agency_id) = &self.agency_id {
            config.agency_id = agency_id.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(poll_interval_ms) = self.poll_interval_ms {
            config.poll_interval_ms = poll_interval_ms;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.build_config()?;

    let file = File::open(&cli.bets_file)
        .with_context(|| format!("opening bets file {}", cli.bets_file.display()))?;
    let records = BetRecordSource::new(BufReader::new(file), config.agency_id.clone());

    // SIGINT requests a graceful stop: the session finishes its
    // in-flight request and closes the connection.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!(action = "shutdown", result = "in_progress");
                cancel.cancel();
            }
        });
    }

    let mut session = Session::new(config);
    let result = session.run(records, &cancel).await;

    if let Err(err) = &result {
        error!(action = "client_run", result = "fail", error = %err);
    }

    match result?.outcome {
        SessionOutcome::Completed { winners } => {
            info!(
                action = "winners_received",
                result = "success",
                winners = winners.len(),
            );
        }
        SessionOutcome::Cancelled => {
            info!(action = "client_run", result = "cancelled");
        }
    }

    Ok(())
}
