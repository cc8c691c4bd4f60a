//! Concurrent collection of matching resources across all stacks

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::InventoryError;
use crate::matcher::matches_stack;
use crate::query::{Prop, Query};
use crate::traits::InventoryService;
use crate::types::{ReportRow, ResourceRecord, Snapshot, StackIdentity, StackSummary};

/// Capacity of the merged row channel
pub const ROW_CHANNEL_CAPACITY: usize = 100;

/// Resource collector
///
/// Lists every stack the inventory knows about and queries them in
/// parallel, one task per stack. There is no per-stack timeout: a fetch that
/// never returns keeps the row stream open.
pub struct Collector {
    inventory: Arc<dyn InventoryService>,
    max_concurrency: Option<usize>,
}

impl Collector {
    /// Create a new collector with unbounded fan-out
    pub fn new(inventory: Arc<dyn InventoryService>) -> Self {
        Self {
            inventory,
            max_concurrency: None,
        }
    }

    /// Limit how many stacks are fetched at once
    ///
    /// `None` keeps one concurrently running task per stack.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.map(|n| n.max(1));
        self
    }

    /// Start collecting rows for a query
    ///
    /// The returned stream ends once every per-stack task has finished.
    /// Row order is not deterministic.
    ///
    /// # Errors
    /// Returns an error only if the stack listing fails. Failures scoped to
    /// one stack are logged and that stack contributes no rows.
    #[instrument(skip(self, query, props), fields(query = %query))]
    pub async fn collect(
        &self,
        query: &Query,
        props: &[Prop],
    ) -> Result<RowStream, InventoryError> {
        let stacks = self.inventory.list_stacks(&query.list_filter()).await?;
        info!(stacks = stacks.len(), "listed stacks");

        let (tx, rx) = mpsc::channel(ROW_CHANNEL_CAPACITY);
        let job = Arc::new(StackJob {
            inventory: Arc::clone(&self.inventory),
            query: query.clone(),
            props: props.to_vec(),
        });
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

        tokio::spawn(async move {
            let mut tasks = JoinSet::new();

            for summary in stacks {
                let job = Arc::clone(&job);
                let tx = tx.clone();
                let limiter = limiter.clone();

                tasks.spawn(async move {
                    let _permit = match limiter {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    job.run(summary, tx).await
                });
            }

            let mut total = 0;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(emitted) => total += emitted,
                    Err(e) => warn!(error = %e, "stack task did not complete"),
                }
            }

            // Close the stream only after every task has been joined
            drop(tx);
            debug!(rows = total, "collection completed");
        });

        Ok(RowStream { receiver: rx })
    }

    /// Collect every row into memory
    ///
    /// # Errors
    /// Returns an error if the stack listing fails.
    pub async fn collect_rows(
        &self,
        query: &Query,
        props: &[Prop],
    ) -> Result<Vec<ReportRow>, InventoryError> {
        Ok(self.collect(query, props).await?.collect_all().await)
    }
}

/// Work shared by every per-stack task
struct StackJob {
    inventory: Arc<dyn InventoryService>,
    query: Query,
    props: Vec<Prop>,
}

impl StackJob {
    /// Collect one stack and forward its rows, returning how many were sent
    async fn run(&self, summary: StackSummary, tx: mpsc::Sender<ReportRow>) -> usize {
        debug!(
            stack = %summary.identity,
            resource_count = ?summary.resource_count,
            last_update = ?summary.last_update,
            "collecting stack"
        );

        let rows = match self.rows_for(&summary.identity).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(stack = %summary.identity, error = %e, "skipping stack");
                return 0;
            }
        };

        let mut sent = 0;
        for row in rows {
            if tx.send(row).await.is_err() {
                debug!(stack = %summary.identity, "row receiver dropped");
                break;
            }
            sent += 1;
        }
        sent
    }

    #[instrument(skip(self, name), fields(stack = %name))]
    async fn rows_for(&self, name: &StackIdentity) -> Result<Vec<ReportRow>, InventoryError> {
        let handle = self.inventory.get_stack(name).await?;
        let identity = handle
            .as_identity()
            .ok_or_else(|| InventoryError::MissingCapability(name.to_string()))?
            .identity();

        if !matches_stack(&identity, &self.query.stack_reference) {
            debug!("stack filtered out");
            return Ok(Vec::new());
        }

        let snapshot = handle.snapshot().await?;
        let rows = build_rows(&identity, snapshot, &self.query, &self.props);
        debug!(rows = rows.len(), "stack collected");
        Ok(rows)
    }
}

/// Turn a stack snapshot into report rows
///
/// Missing resources, types that do not match the query, and resources
/// lacking a requested property are skipped.
#[must_use]
pub fn build_rows(
    identity: &StackIdentity,
    snapshot: Snapshot,
    query: &Query,
    props: &[Prop],
) -> Vec<ReportRow> {
    snapshot
        .resources
        .into_iter()
        .flatten()
        .map(|resource| ResourceRecord::new(identity.clone(), resource))
        .filter(|record| record.matches(query))
        .filter_map(|record| record.to_row(props))
        .collect()
}

/// Merged stream of rows from every stack task
#[derive(Debug)]
pub struct RowStream {
    receiver: mpsc::Receiver<ReportRow>,
}

impl RowStream {
    /// Receive the next row
    ///
    /// Returns `None` once all stack tasks have completed.
    pub async fn recv(&mut self) -> Option<ReportRow> {
        self.receiver.recv().await
    }

    /// Drain the stream into a vector
    pub async fn collect_all(mut self) -> Vec<ReportRow> {
        let mut rows = Vec::new();
        while let Some(row) = self.recv().await {
            rows.push(row);
        }
        rows
    }
}

impl Stream for RowStream {
    type Item = ReportRow;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
