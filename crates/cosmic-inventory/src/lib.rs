//! cosmic-inventory: stack resource querying and usage summaries
//!
//! Parses the terse query grammar, fans collection out across every stack
//! the inventory service knows about, and reduces the matching resources
//! into a flat table and hierarchical counters.

pub mod aggregate;
pub mod collector;
pub mod completion;
pub mod error;
pub mod matcher;
pub mod query;
pub mod report;
pub mod traits;
pub mod types;

pub use aggregate::{Aggregator, Counter, Summary, aggregate};
pub use collector::{Collector, RowStream};
pub use error::{InventoryError, QueryError};
pub use query::{Cond, Prop, Query, ResourceTypeFilter, StackReferenceFilter, parse_args};
pub use report::{render_summary, render_table};
pub use traits::{HasIdentity, InventoryService, SchemaSource, StackHandle};
pub use types::{
    ListStacksFilter, ReportRow, ResourceRecord, Snapshot, SnapshotResource, StackIdentity,
    StackSummary,
};
