//! Hierarchical resource counters
//!
//! Every row increments one counter per level of its stack name and of its
//! resource type:
//!
//! ```text
//! acme/web/prod         -> acme/  acme/web/  acme/web/prod
//! aws:s3/bucket:Bucket  -> aws:  aws:s3:  aws:s3/bucket:  aws:s3/bucket:Bucket
//! ```
//!
//! Increments are independent of each other, so the result does not depend
//! on the order rows arrive in.

use std::collections::HashMap;

use crate::matcher::split_resource_type;
use crate::types::ReportRow;

/// Mapping from hierarchical key to count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    counts: HashMap<String, u64>,
}

impl Counter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count for a key
    pub fn increment(&mut self, key: impl Into<String>) {
        *self.counts.entry(key.into()).or_insert(0) += 1;
    }

    /// Count for a key, zero if never seen
    #[must_use]
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over keys and counts in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Iterate over keys in arbitrary order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }
}

/// Result of aggregating a row stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of rows seen
    pub total: u64,
    /// Counts keyed by stack name levels
    pub stacks: Counter,
    /// Counts keyed by resource type levels
    pub resource_types: Counter,
}

/// Incremental builder of a [`Summary`]
///
/// Meant to be fed by the single loop draining the row stream.
#[derive(Debug, Default)]
pub struct Aggregator {
    summary: Summary,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one row
    pub fn record(&mut self, row: &ReportRow) {
        for key in stack_keys(row.stack()) {
            self.summary.stacks.increment(key);
        }
        for key in resource_type_keys(row.resource_type()) {
            self.summary.resource_types.increment(key);
        }
        self.summary.total += 1;
    }

    /// Current counters
    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    #[must_use]
    pub fn finish(self) -> Summary {
        self.summary
    }
}

/// Aggregate a batch of rows
pub fn aggregate<'a>(rows: impl IntoIterator<Item = &'a ReportRow>) -> Summary {
    let mut aggregator = Aggregator::new();
    for row in rows {
        aggregator.record(row);
    }
    aggregator.finish()
}

/// Counter keys for every level of a stack name
///
/// Intermediate levels keep their trailing `/`.
#[must_use]
pub fn stack_keys(stack: &str) -> Vec<String> {
    let parts: Vec<&str> = stack.split('/').collect();
    let mut keys = Vec::with_capacity(parts.len());

    for depth in 1..parts.len() {
        keys.push(format!("{}/", parts[..depth].join("/")));
    }
    keys.push(stack.to_string());
    keys
}

/// Counter keys for every level of a resource type
///
/// The provider and each module path prefix end with `:`; the full type
/// has no trailing delimiter. Tokens without three parts only count at the
/// full-type level.
#[must_use]
pub fn resource_type_keys(resource_type: &str) -> Vec<String> {
    let Some((provider, module, name)) = split_resource_type(resource_type) else {
        return vec![resource_type.to_string()];
    };

    let segments: Vec<&str> = module.split('/').collect();
    let mut keys = Vec::with_capacity(segments.len() + 2);

    keys.push(format!("{provider}:"));
    for depth in 1..=segments.len() {
        keys.push(format!("{provider}:{}:", segments[..depth].join("/")));
    }
    keys.push(format!("{provider}:{module}:{name}"));
    keys
}
