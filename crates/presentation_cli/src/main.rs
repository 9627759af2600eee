//! Weather agent CLI
//!
//! Answers a single query given on the command line, or starts an
//! interactive prompt.

#![allow(clippy::print_stdout)]

use std::process::ExitCode;

use clap::Parser;
use infrastructure::{AppConfig, BuildError, ConfigError, build_agent};
use presentation_cli::{Cli, banner, log_filter_from_verbosity, run_repl};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(cli.verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(cli));
    // a blocked stdin read must not hold up exit
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => return Ok(config_failure(&e)),
    };
    if let Some(model) = &cli.model {
        config.inference.default_model.clone_from(model);
    }

    let agent = match build_agent(&config) {
        Ok(agent) => agent,
        Err(BuildError::Config(e)) => return Ok(config_failure(&e)),
        Err(e) => return Err(e.into()),
    };
    info!(model = %agent.model(), tools = agent.registry().len(), "Agent ready");

    if let Some(query) = cli.query() {
        return Ok(match agent.run(&query).await {
            Ok(answer) => {
                println!("{answer}");
                ExitCode::SUCCESS
            },
            Err(e) => {
                println!("Error: {e}");
                ExitCode::FAILURE
            },
        });
    }

    print!("{}", banner(agent.model()));

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    run_repl(
        &agent,
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
        interrupt,
    )
    .await?;

    Ok(ExitCode::SUCCESS)
}

fn config_failure(error: &ConfigError) -> ExitCode {
    println!("Configuration Error: {error}");
    println!("Please make sure DEEPSEEK_API_KEY is set in your .env file.");
    ExitCode::FAILURE
}
