//! Collaborator traits consumed by the collector and completion

use async_trait::async_trait;
use cosmic_api::schema::ProviderSchema;

use crate::error::InventoryError;
use crate::types::{ListStacksFilter, Snapshot, StackIdentity, StackSummary};

/// Remote inventory of stacks
///
/// Shared across every per-stack task, so implementations must tolerate
/// concurrent calls.
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// List stacks, optionally pre-filtered by organization and project
    async fn list_stacks(
        &self,
        filter: &ListStacksFilter,
    ) -> Result<Vec<StackSummary>, InventoryError>;

    /// Open a handle on a single stack
    async fn get_stack(&self, name: &StackIdentity)
    -> Result<Box<dyn StackHandle>, InventoryError>;
}

/// Handle on a stack returned by [`InventoryService::get_stack`]
#[async_trait]
pub trait StackHandle: Send + Sync {
    /// Fetch the stack's current resource snapshot
    async fn snapshot(&self) -> Result<Snapshot, InventoryError>;

    /// Identity capability, if this backend can report one
    fn as_identity(&self) -> Option<&dyn HasIdentity> {
        None
    }
}

/// Capability of reporting the owning organization, project and stack name
pub trait HasIdentity: Send + Sync {
    fn identity(&self) -> StackIdentity;
}

/// Source of provider schemas for shell completion
#[async_trait]
pub trait SchemaSource: Send + Sync {
    async fn provider_schema(&self, provider: &str) -> Result<ProviderSchema, InventoryError>;
}
