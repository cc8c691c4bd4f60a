//! Query predicates over stacks and resources

use crate::query::{Query, ResourceTypeFilter, StackReferenceFilter};
use crate::types::{ResourceRecord, StackIdentity};

/// Split a type token into `(provider, module, name)`
///
/// Returns `None` unless the token has exactly three `:`-separated parts.
#[must_use]
pub fn split_resource_type(resource_type: &str) -> Option<(&str, &str, &str)> {
    let mut parts = resource_type.split(':');
    let provider = parts.next()?;
    let module = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((provider, module, name))
}

fn field_matches(filter: Option<&String>, value: &str) -> bool {
    filter.is_none_or(|expected| expected == value)
}

/// Check a resource type token against a type filter
#[must_use]
pub fn matches_resource(resource_type: &str, filter: &ResourceTypeFilter) -> bool {
    let Some((provider, module, name)) = split_resource_type(resource_type) else {
        return false;
    };

    field_matches(filter.provider.as_ref(), provider)
        && filter
            .module_prefix
            .as_ref()
            .is_none_or(|prefix| module.starts_with(prefix.as_str()))
        && field_matches(filter.module.as_ref(), module)
        && field_matches(filter.resource.as_ref(), name)
}

/// Check a stack identity against a stack reference filter
#[must_use]
pub fn matches_stack(identity: &StackIdentity, filter: &StackReferenceFilter) -> bool {
    field_matches(filter.org.as_ref(), &identity.owner)
        && field_matches(filter.project.as_ref(), &identity.project)
        && field_matches(filter.stack.as_ref(), &identity.stack)
}

impl ResourceRecord {
    /// Check the record's type against the query's resource type filter
    ///
    /// The stack filter is applied per stack before records are built.
    #[must_use]
    pub fn matches(&self, query: &Query) -> bool {
        matches_resource(&self.resource_type, &query.resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query;
    use crate::types::SnapshotResource;

    const BUCKET: &str = "aws:s3/bucket:Bucket";
    const BUCKET_POLICY: &str = "aws:s3/bucketPolicy:BucketPolicy";
    const INSTANCE: &str = "aws:ec2/instance:Instance";

    fn rt(token: &str) -> ResourceTypeFilter {
        parse_query(token).resource_type
    }

    fn sr(token: &str) -> StackReferenceFilter {
        parse_query(token).stack_reference
    }

    #[test]
    fn test_split_resource_type() {
        assert_eq!(split_resource_type(BUCKET), Some(("aws", "s3/bucket", "Bucket")));
        assert_eq!(split_resource_type("pulumi:providers"), None);
        assert_eq!(split_resource_type("a:b:c:d"), None);
        assert_eq!(split_resource_type("Bucket"), None);
    }

    #[test]
    fn test_empty_filter_matches_canonical_types() {
        let filter = ResourceTypeFilter::default();
        assert!(matches_resource(BUCKET, &filter));
        assert!(matches_resource("pulumi:pulumi:Stack", &filter));
    }

    #[test]
    fn test_two_part_type_never_matches() {
        assert!(!matches_resource("pulumi:providers", &ResourceTypeFilter::default()));
        assert!(!matches_resource("pulumi:providers", &rt("pulumi:")));
    }

    #[test]
    fn test_provider_filter() {
        assert!(matches_resource(BUCKET, &rt("aws:")));
        assert!(!matches_resource(BUCKET, &rt("gcp:")));
    }

    #[test]
    fn test_module_exact_vs_prefix() {
        assert!(matches_resource(BUCKET, &rt("aws:s3/bucket")));
        assert!(!matches_resource(BUCKET_POLICY, &rt("aws:s3/bucket")));
        assert!(!matches_resource(BUCKET, &rt("aws:s3")));

        let prefix = rt("aws:s3/");
        assert!(matches_resource(BUCKET, &prefix));
        assert!(matches_resource(BUCKET_POLICY, &prefix));
        assert!(!matches_resource(INSTANCE, &prefix));
    }

    #[test]
    fn test_resource_name_filter() {
        assert!(matches_resource(BUCKET, &rt("aws:s3/bucket:Bucket")));
        assert!(!matches_resource(BUCKET, &rt("aws:s3/bucket:BucketV2")));
    }

    #[test]
    fn test_stack_filters() {
        let prod = StackIdentity::new("acme", "web", "prod");

        assert!(matches_stack(&prod, &StackReferenceFilter::default()));
        assert!(matches_stack(&prod, &sr("acme/")));
        assert!(matches_stack(&prod, &sr("acme/web")));
        assert!(matches_stack(&prod, &sr("acme/web/prod")));
        assert!(!matches_stack(&prod, &sr("acme/web/staging")));
        assert!(!matches_stack(&prod, &sr("acme/api/")));
        assert!(!matches_stack(&prod, &sr("globex/")));
    }

    #[test]
    fn test_record_matches_ignores_stack_filter() {
        let record = ResourceRecord::new(
            StackIdentity::new("acme", "web", "prod"),
            SnapshotResource::new(BUCKET, "assets"),
        );
        assert!(record.matches(&parse_query("aws:s3/")));
        assert!(record.matches(&parse_query("globex/")));
        assert!(!record.matches(&parse_query("aws:ec2/")));
    }
}
