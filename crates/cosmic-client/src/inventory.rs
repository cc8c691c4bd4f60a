//! `InventoryService` backed by the state service

use async_trait::async_trait;
use tracing::{debug, instrument};

use cosmic_api::requests::ListStacksParams;
use cosmic_api::responses::{ExportResponse, StackResponse, StackSummaryDto};
use cosmic_inventory::{
    HasIdentity, InventoryError, InventoryService, ListStacksFilter, Snapshot, SnapshotResource,
    StackHandle, StackIdentity, StackSummary,
};

use crate::http::HttpClient;

#[async_trait]
impl InventoryService for HttpClient {
    async fn list_stacks(
        &self,
        filter: &ListStacksFilter,
    ) -> Result<Vec<StackSummary>, InventoryError> {
        let params = ListStacksParams {
            organization: filter.organization.clone(),
            project: filter.project.clone(),
            continuation_token: None,
        };

        let response = self
            .list_stacks_page(&params)
            .await
            .map_err(|e| InventoryError::ListStacks(e.to_string()))?;

        Ok(response.stacks.into_iter().map(stack_summary).collect())
    }

    async fn get_stack(
        &self,
        name: &StackIdentity,
    ) -> Result<Box<dyn StackHandle>, InventoryError> {
        let stack = self
            .stack_metadata(&name.owner, &name.project, &name.stack)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    InventoryError::StackNotFound(name.to_string())
                } else {
                    InventoryError::GetStack {
                        stack: name.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        Ok(Box::new(ServiceStack {
            client: self.clone(),
            identity: stack_identity(&stack),
        }))
    }
}

/// Stack handle resolved through the state service
#[derive(Debug, Clone)]
pub struct ServiceStack {
    client: HttpClient,
    identity: StackIdentity,
}

#[async_trait]
impl StackHandle for ServiceStack {
    #[instrument(skip(self), fields(stack = %self.identity))]
    async fn snapshot(&self) -> Result<Snapshot, InventoryError> {
        let id = &self.identity;
        let export = self
            .client
            .export_stack(&id.owner, &id.project, &id.stack)
            .await
            .map_err(|e| InventoryError::Snapshot {
                stack: id.to_string(),
                message: e.to_string(),
            })?;

        debug!(
            version = export.version,
            resources = export.deployment.resources.len(),
            "exported stack"
        );
        Ok(snapshot(export))
    }

    fn as_identity(&self) -> Option<&dyn HasIdentity> {
        Some(self)
    }
}

impl HasIdentity for ServiceStack {
    fn identity(&self) -> StackIdentity {
        self.identity.clone()
    }
}

fn stack_summary(dto: StackSummaryDto) -> StackSummary {
    StackSummary {
        last_update: dto.last_update_at(),
        resource_count: dto.resource_count,
        identity: StackIdentity::new(dto.org_name, dto.project_name, dto.stack_name),
    }
}

fn stack_identity(stack: &StackResponse) -> StackIdentity {
    StackIdentity::new(&stack.org_name, &stack.project_name, &stack.stack_name)
}

fn snapshot(export: ExportResponse) -> Snapshot {
    let resources = export
        .deployment
        .resources
        .into_iter()
        .map(|state| {
            state.map(|state| SnapshotResource {
                name: state.name().to_string(),
                resource_type: state.resource_type,
                outputs: state.outputs,
            })
        })
        .collect();

    Snapshot { resources }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_summary_conversion() {
        let dto = StackSummaryDto {
            org_name: "acme".into(),
            project_name: "web".into(),
            stack_name: "prod".into(),
            last_update: Some(1_700_000_000),
            resource_count: Some(7),
        };

        let summary = stack_summary(dto);
        assert_eq!(summary.identity.to_string(), "acme/web/prod");
        assert_eq!(summary.resource_count, Some(7));
        assert!(summary.last_update.is_some());
    }

    #[test]
    fn test_snapshot_conversion_keeps_missing_entries() {
        let export: ExportResponse = serde_json::from_str(
            r#"{
                "version": 3,
                "deployment": {"resources": [
                    null,
                    {"urn": "urn:pulumi:prod::web::aws:s3/bucket:Bucket::assets",
                     "type": "aws:s3/bucket:Bucket",
                     "outputs": {"bucket": "assets-1"}}
                ]}
            }"#,
        )
        .unwrap();

        let snapshot = snapshot(export);
        assert_eq!(snapshot.resources.len(), 2);
        assert!(snapshot.resources[0].is_none());

        let bucket = snapshot.resources[1].as_ref().unwrap();
        assert_eq!(bucket.name, "assets");
        assert_eq!(bucket.resource_type, "aws:s3/bucket:Bucket");
        assert_eq!(bucket.outputs["bucket"], "assets-1");
    }

    #[test]
    fn test_service_stack_reports_identity() {
        let handle = ServiceStack {
            client: HttpClient::new("http://localhost:8080").unwrap(),
            identity: StackIdentity::new("acme", "web", "prod"),
        };

        let identity = handle.as_identity().map(|h| h.identity());
        assert_eq!(identity, Some(StackIdentity::new("acme", "web", "prod")));
    }
}
