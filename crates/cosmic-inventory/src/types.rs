//! Inventory type definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::Prop;

// ============================================================================
// Stacks
// ============================================================================

/// Fully qualified name of a stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StackIdentity {
    /// Owning organization
    pub owner: String,
    /// Project name
    pub project: String,
    /// Stack name
    pub stack: String,
}

impl StackIdentity {
    /// Create a new stack identity
    pub fn new(
        owner: impl Into<String>,
        project: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            project: project.into(),
            stack: stack.into(),
        }
    }
}

impl fmt::Display for StackIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.project, self.stack)
    }
}

/// One entry of the stack listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSummary {
    /// Stack name
    pub identity: StackIdentity,
    /// When the stack was last updated, if known
    pub last_update: Option<DateTime<Utc>>,
    /// Resource count reported by the service, if known
    pub resource_count: Option<u64>,
}

impl StackSummary {
    /// Create a summary carrying only the stack name
    #[must_use]
    pub fn new(identity: StackIdentity) -> Self {
        Self {
            identity,
            last_update: None,
            resource_count: None,
        }
    }
}

/// Server-side pre-filter for the stack listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListStacksFilter {
    pub organization: Option<String>,
    pub project: Option<String>,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Resource snapshot of a single stack
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Resources in checkpoint order; missing entries are skipped
    pub resources: Vec<Option<SnapshotResource>>,
}

/// A resource as recorded in a snapshot
#[derive(Debug, Clone)]
pub struct SnapshotResource {
    /// Type token, canonically `provider:module:name`
    pub resource_type: String,
    /// Resource name
    pub name: String,
    /// Output properties
    pub outputs: Map<String, Value>,
}

impl SnapshotResource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            outputs: Map::new(),
        }
    }

    /// Add an output property
    #[must_use]
    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Records & rows
// ============================================================================

/// A snapshot resource flattened together with the stack it belongs to
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    pub stack: StackIdentity,
    pub resource_type: String,
    pub name: String,
    pub outputs: Map<String, Value>,
}

impl ResourceRecord {
    /// Flatten a snapshot resource
    #[must_use]
    pub fn new(stack: StackIdentity, resource: SnapshotResource) -> Self {
        Self {
            stack,
            resource_type: resource.resource_type,
            name: resource.name,
            outputs: resource.outputs,
        }
    }

    /// Build the output row for the requested properties
    ///
    /// Returns `None` when any requested property is missing from the
    /// resource's outputs.
    #[must_use]
    pub fn to_row(&self, props: &[Prop]) -> Option<ReportRow> {
        let mut fields = Vec::with_capacity(3 + props.len());
        fields.push(self.stack.to_string());
        fields.push(self.resource_type.clone());
        fields.push(self.name.clone());

        for prop in props {
            let value = self.outputs.get(&prop.name)?;
            fields.push(display_value(value));
        }

        Some(ReportRow { fields })
    }
}

/// Render an output value for the table
///
/// Strings are shown bare, everything else as compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One line of the flat report: stack, type, name, then property values
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReportRow {
    fields: Vec<String>,
}

impl ReportRow {
    /// Stack identity string (`org/project/stack`)
    #[must_use]
    pub fn stack(&self) -> &str {
        self.field(0)
    }

    /// Resource type string (`provider:module:name`)
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.field(1)
    }

    /// Resource name
    #[must_use]
    pub fn name(&self) -> &str {
        self.field(2)
    }

    /// Requested property values, in request order
    #[must_use]
    pub fn values(&self) -> &[String] {
        self.fields.get(3..).unwrap_or_default()
    }

    /// All fields in column order
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map_or("", String::as_str)
    }
}

impl From<Vec<String>> for ReportRow {
    fn from(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

impl<const N: usize> From<[&str; N]> for ReportRow {
    fn from(fields: [&str; N]) -> Self {
        Self {
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}
