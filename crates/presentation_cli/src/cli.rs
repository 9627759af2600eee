//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

/// Conversational weather assistant
#[derive(Debug, Parser)]
#[command(name = "weather-agent")]
#[command(author, version, about = "Ask about the weather in plain language", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (default: ./config.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Chat model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Answer this query and exit instead of starting the prompt
    #[arg(value_name = "QUERY", trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl Cli {
    /// One-shot query, if any words were given
    #[must_use]
    pub fn query(&self) -> Option<String> {
        let query = self.query.join(" ");
        let query = query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }
}

/// Map the `-v` count to a tracing filter
#[must_use]
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
