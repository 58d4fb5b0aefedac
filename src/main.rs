//! bulk-console - run a sample bulk insert and print per-record outcomes

#![allow(missing_docs)]

use anyhow::Context;
use bulkforce::config::LogFormat;
use bulkforce::utils::error::error_chain;
use bulkforce::utils::logging::init_logging;
use bulkforce::{connect, BulkConfig, BulkOrchestrator, JobSpec, OperationKind, Record};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "bulk-console", version, about = "Submit sample records through the bulk API")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "BULK_CONFIG")]
    config: Option<PathBuf>,

    /// Authenticate against the sandbox login endpoint
    #[arg(long)]
    sandbox: bool,

    /// Entity type to insert into
    #[arg(long, default_value = "Account")]
    entity: String,

    /// Exit without waiting for enter
    #[arg(long)]
    no_wait: bool,

    /// Log level or filter directive, overrides the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

/// Three collections of 4, 3 and 4 records; two records name a field the
/// entity does not have and come back as failures
fn sample_collections() -> Vec<Vec<Record>> {
    let named = |name: &str| Record::new().with("Name", name);
    let bogus = || Record::new().with("MADEUPFIELD", "MADEUPVALUE");

    vec![
        vec![
            named("TestDtAccount1"),
            named("TestDtAccount2"),
            bogus(),
            named("TestDtAccount3"),
        ],
        vec![
            named("TestDtAccount4"),
            named("TestDtAccount5"),
            named("TestDtAccount6"),
        ],
        vec![
            bogus(),
            named("TestDtAccount7"),
            named("TestDtAccount8"),
            named("TestDtAccount9"),
        ],
    ]
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config =
        BulkConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.sandbox {
        config.auth.is_sandbox = true;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.format = LogFormat::Json;
    }
    init_logging(&config.logging);

    println!("Authenticating with {}", config.auth.login_url());
    let client = connect(&config)
        .await
        .context("Failed to connect to the bulk service")?;
    println!("Connected to {}", client.base_url());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling bulk run");
            ctrl_c.cancel();
        }
    });

    let orchestrator = BulkOrchestrator::new(Arc::new(client), config.polling.clone())
        .context("Invalid polling configuration")?;
    let report = orchestrator
        .run(
            JobSpec::new(cli.entity.clone(), OperationKind::Insert),
            sample_collections(),
            &cancel,
        )
        .await
        .context("Bulk run failed")?;

    println!(
        "All batches complete for job {}, {} results (each batch lists one result per record):",
        report.job.id(),
        report.outcomes.len()
    );
    print!("{}", report.render());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let code = match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for message in error_chain(&*e) {
                println!("{}", message);
            }
            ExitCode::FAILURE
        }
    };

    if !cli.no_wait {
        println!("\nPress enter to close...");
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
    }

    code
}
