//! cosmic CLI
//!
//! Query resources across every stack of a state service and summarize them

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Config, LogFormat};

#[derive(Parser)]
#[command(name = "cosmic", version)]
#[command(about = "Query and summarize resources across infrastructure stacks", long_about = None)]
struct Cli {
    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// State service URL
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Maximum number of stacks fetched at once
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get resources matching a query
    ///
    /// Tokens containing `/` select stacks (`org/project/stack`), tokens
    /// containing `:` select resource types (`provider:module:name`, a
    /// module ending in `/` matches by prefix). Any other token names an
    /// output property to print as an extra column.
    #[command(name = "get")]
    Get {
        /// Query strings and property names
        tokens: Vec<String>,

        /// Summarize resource counts
        #[arg(long)]
        summarize: bool,
    },

    /// Print shell completion suggestions for `get`
    #[command(name = "complete", hide = true)]
    Complete {
        /// Word being completed
        #[arg(long, default_value = "")]
        current: String,

        /// Words already on the command line
        args: Vec<String>,
    },
}

impl Cli {
    /// Apply command-line overrides on top of file and environment
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.backend_url {
            config.backend.url.clone_from(url);
        }
        if self.max_concurrency.is_some() {
            config.collector.max_concurrency = self.max_concurrency;
        }
    }
}

/// Log level filter: `RUST_LOG`, then `-v` count, then config
fn log_filter(verbose: u8, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_logging(config: &Config, verbose: u8) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, &config.log_level))
        .with_writer(std::io::stderr);

    // stdout is reserved for the report
    let _ = match config.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    let env = |key: &str| std::env::var(key).ok();
    let mut config = Config::resolve(cli.config.as_deref(), env)?;
    config.apply_env(env);
    cli.apply(&mut config);

    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Get { tokens, summarize } => commands::get(&config, &tokens, summarize).await,
        Commands::Complete { current, args } => commands::complete(&config, &args, &current).await,
    }
}
