//! Response types for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of the stack listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStacksResponse {
    #[serde(default)]
    pub stacks: Vec<StackSummaryDto>,
    /// Present when more pages exist; only the first page is consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// One entry of the stack listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackSummaryDto {
    pub org_name: String,
    pub project_name: String,
    pub stack_name: String,
    /// Unix timestamp (seconds) of the last update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u64>,
}

impl StackSummaryDto {
    /// Last update as a timestamp, if the service reported a valid one
    #[must_use]
    pub fn last_update_at(&self) -> Option<DateTime<Utc>> {
        self.last_update
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Body of the single-stack endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackResponse {
    pub org_name: String,
    pub project_name: String,
    pub stack_name: String,
}

/// Body of the stack export endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub version: u32,
    pub deployment: Deployment,
}

/// Checkpointed deployment of a stack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    /// Resource states; the service may emit `null` entries
    #[serde(default)]
    pub resources: Vec<Option<ResourceState>>,
}

/// Recorded state of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub urn: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub outputs: Map<String, Value>,
}

impl ResourceState {
    /// Resource name: the segment after the last `::` of the URN
    #[must_use]
    pub fn name(&self) -> &str {
        self.urn.rsplit("::").next().unwrap_or(&self.urn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_name_from_urn() {
        let state = ResourceState {
            urn: "urn:pulumi:prod::web::aws:s3/bucket:Bucket::site-assets".into(),
            resource_type: "aws:s3/bucket:Bucket".into(),
            outputs: Map::new(),
        };
        assert_eq!(state.name(), "site-assets");
    }

    #[test]
    fn test_deserialize_export_with_null_resources() {
        let body = r#"{
            "version": 3,
            "deployment": {
                "manifest": {"time": "2024-01-01T00:00:00Z"},
                "resources": [
                    null,
                    {
                        "urn": "urn:pulumi:prod::web::pulumi:pulumi:Stack::web-prod",
                        "type": "pulumi:pulumi:Stack",
                        "custom": false
                    },
                    {
                        "urn": "urn:pulumi:prod::web::aws:s3/bucket:Bucket::logs",
                        "type": "aws:s3/bucket:Bucket",
                        "custom": true,
                        "outputs": {"bucket": "logs-123", "forceDestroy": false}
                    }
                ]
            }
        }"#;

        let export: ExportResponse = serde_json::from_str(body).unwrap();
        assert_eq!(export.version, 3);
        assert_eq!(export.deployment.resources.len(), 3);
        assert!(export.deployment.resources[0].is_none());

        let bucket = export.deployment.resources[2].as_ref().unwrap();
        assert_eq!(bucket.resource_type, "aws:s3/bucket:Bucket");
        assert_eq!(bucket.outputs["bucket"], "logs-123");
    }

    #[test]
    fn test_deserialize_stack() {
        let body = r#"{"orgName": "acme", "projectName": "web", "stackName": "prod",
                       "version": 42, "tags": {"env": "prod"}}"#;

        let stack: StackResponse = serde_json::from_str(body).unwrap();
        assert_eq!(stack.org_name, "acme");
        assert_eq!(stack.stack_name, "prod");
    }

    #[test]
    fn test_deserialize_stack_listing() {
        let body = r#"{
            "stacks": [
                {"orgName": "acme", "projectName": "web", "stackName": "prod",
                 "lastUpdate": 1700000000, "resourceCount": 12},
                {"orgName": "acme", "projectName": "web", "stackName": "staging"}
            ],
            "continuationToken": "abc"
        }"#;

        let listing: ListStacksResponse = serde_json::from_str(body).unwrap();
        assert_eq!(listing.stacks.len(), 2);
        assert_eq!(listing.stacks[0].resource_count, Some(12));
        assert!(listing.stacks[0].last_update_at().is_some());
        assert!(listing.stacks[1].last_update_at().is_none());
        assert_eq!(listing.continuation_token.as_deref(), Some("abc"));
    }
}
