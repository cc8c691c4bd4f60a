//! Shell completion suggestions backed by provider schemas

use cosmic_api::schema::ProviderSchema;
use tracing::debug;

use crate::traits::SchemaSource;

/// Provider part of a type token, `aws` for `aws:s3/bucket:Bucket`
fn provider_of(token: &str) -> &str {
    token.split(':').next().unwrap_or(token)
}

/// Resource types declared by the schema that start with `prefix`
#[must_use]
pub fn suggest_resource_types(schema: &ProviderSchema, prefix: &str) -> Vec<String> {
    // BTreeMap keys are already sorted
    schema
        .resources
        .keys()
        .filter(|k| k.starts_with(prefix))
        .cloned()
        .collect()
}

/// Property names of `resource_type` that start with `prefix`
#[must_use]
pub fn suggest_resource_properties(
    schema: &ProviderSchema,
    resource_type: &str,
    prefix: &str,
) -> Vec<String> {
    schema
        .resources
        .get(resource_type)
        .map(|spec| {
            spec.properties
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Suggestions for the word being completed
///
/// Before any resource type is on the command line, a word containing `:`
/// completes to resource types. Once a type is present, words complete to
/// that type's properties.
pub async fn complete(
    source: &dyn SchemaSource,
    args: &[String],
    to_complete: &str,
) -> Vec<String> {
    let resource_type = args.iter().find(|arg| arg.contains(':')).map(String::as_str);

    let provider = match resource_type {
        Some(rt) => provider_of(rt),
        None if to_complete.contains(':') => provider_of(to_complete),
        None => return Vec::new(),
    };

    let schema = match source.provider_schema(provider).await {
        Ok(schema) => schema,
        Err(e) => {
            debug!(provider, error = %e, "no completion schema");
            return Vec::new();
        }
    };

    match resource_type {
        Some(rt) => suggest_resource_properties(&schema, rt, to_complete),
        None => suggest_resource_types(&schema, to_complete),
    }
}
