//! Provider schema document
//!
//! Only the parts needed to suggest resource types and their properties
//! are modelled; everything else in the schema is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Package schema published by a provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Resource definitions keyed by full type token
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSpec>,
}

/// Definition of one resource type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}
