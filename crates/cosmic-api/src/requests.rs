//! Request types for the API

use serde::{Deserialize, Serialize};

/// Query parameters accepted by the stack listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStacksParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "continuationToken", skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl ListStacksParams {
    /// Key/value pairs in the order they are appended to the URL
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(org) = &self.organization {
            pairs.push(("organization", org.as_str()));
        }
        if let Some(project) = &self.project {
            pairs.push(("project", project.as_str()));
        }
        if let Some(token) = &self.continuation_token {
            pairs.push(("continuationToken", token.as_str()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_skip_unset_fields() {
        let params = ListStacksParams {
            organization: Some("acme".into()),
            ..ListStacksParams::default()
        };
        assert_eq!(params.pairs(), vec![("organization", "acme")]);
    }

    #[test]
    fn test_serialize_omits_none() {
        let params = ListStacksParams {
            project: Some("web".into()),
            ..ListStacksParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"project":"web"}"#);
    }
}
