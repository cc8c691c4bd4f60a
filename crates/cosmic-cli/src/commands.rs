//! Subcommand implementations

use std::sync::Arc;

use color_eyre::Result;
use futures::StreamExt;
use tracing::{debug, info};

use cosmic_client::{HttpClient, SchemaClient};
use cosmic_inventory::{
    Aggregator, Collector, Query, completion, parse_args, render_summary, render_table,
};

use crate::config::Config;

/// Query every stack and print the matching resources
///
/// # Errors
/// Returns an error if the configured service URL is invalid. A failed
/// stack listing is printed instead.
pub async fn get(config: &Config, tokens: &[String], summarize: bool) -> Result<()> {
    let (query, props) = match parse_args(tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("{e}");
            (Query::new(), Vec::new())
        }
    };
    info!(query = %query, props = props.len(), "running query");

    let client = HttpClient::new(&config.backend.url)?
        .with_access_token(config.backend.access_token.clone());
    let collector = Collector::new(Arc::new(client))
        .with_max_concurrency(config.collector.max_concurrency);

    let mut stream = match collector.collect(&query, &props).await {
        Ok(stream) => stream,
        Err(e) if e.is_fatal() => {
            println!("{e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut aggregator = Aggregator::new();
    let mut rows = Vec::new();
    while let Some(row) = stream.next().await {
        aggregator.record(&row);
        rows.push(row);
    }
    debug!(rows = rows.len(), "row stream closed");

    print!("{}", render_table(&props, &rows));
    if summarize {
        println!();
        print!("{}", render_summary(aggregator.summary()));
    }

    Ok(())
}

/// Print completion suggestions, one per line
///
/// # Errors
/// Returns an error if the configured schema URL is invalid.
pub async fn complete(config: &Config, args: &[String], current: &str) -> Result<()> {
    let source = SchemaClient::new(&config.backend.schema_url)?;

    for suggestion in completion::complete(&source, args, current).await {
        println!("{suggestion}");
    }

    Ok(())
}
