//! Query grammar for stack references and resource types
//!
//! Tokens are classified purely by counting delimiters:
//!
//! - `provider:`, `provider:path/to/module`, `provider:path/prefix/` and
//!   `provider:path/to/module:name` select resource types;
//! - `org/`, `org/project` and `org/project/stack` select stacks;
//! - everything else names an output property.
//!
//! The heuristic is deliberately loose. `a/b:c/d:d/f` has two colons and
//! is read as a resource type even though it looks mixed.

use std::fmt;

use crate::error::QueryError;
use crate::types::ListStacksFilter;

/// Characters that disqualify a token from being a query string
const QUERY_STRING_BLACKLIST: [char; 2] = [',', '='];

/// Maximum number of query tokens accepted in one invocation
const MAX_QUERY_STRINGS: usize = 2;

/// Filter on the `org/project/stack` name of a stack
///
/// Unset fields do not constrain the match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackReferenceFilter {
    pub org: Option<String>,
    pub project: Option<String>,
    pub stack: Option<String>,
}

impl StackReferenceFilter {
    /// Check if any field is set
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.org.is_some() || self.project.is_some() || self.stack.is_some()
    }
}

/// Filter on the `provider:module:name` type token of a resource
///
/// `module` and `module_prefix` are never both set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypeFilter {
    pub provider: Option<String>,
    /// Exact module path
    pub module: Option<String>,
    /// Module path prefix, always ending in `/`
    pub module_prefix: Option<String>,
    pub resource: Option<String>,
}

impl ResourceTypeFilter {
    /// Check if any field is set
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.provider.is_some()
            || self.module.is_some()
            || self.module_prefix.is_some()
            || self.resource.is_some()
    }
}

/// Parsed query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub stack_reference: StackReferenceFilter,
    pub resource_type: ResourceTypeFilter,
}

impl Query {
    /// Create an empty query that matches everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if neither filter constrains anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.stack_reference.is_active() && !self.resource_type.is_active()
    }

    /// Server-side pre-filter derived from the stack reference
    #[must_use]
    pub fn list_filter(&self) -> ListStacksFilter {
        ListStacksFilter {
            organization: self.stack_reference.org.clone(),
            project: self.stack_reference.project.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sr = &self.stack_reference;
        let rt = &self.resource_type;
        let part = |v: &Option<String>| v.as_deref().unwrap_or("*").to_string();

        write!(
            f,
            "stack={}/{}/{} type={}:{}:{}",
            part(&sr.org),
            part(&sr.project),
            part(&sr.stack),
            part(&rt.provider),
            rt.module_prefix
                .as_ref()
                .map_or_else(|| part(&rt.module), |prefix| format!("{prefix}*")),
            part(&rt.resource),
        )
    }
}

/// Condition attached to a property
///
/// Parsed and carried along but not evaluated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cond {
    pub operator: String,
    pub args: Vec<String>,
}

/// Output property requested as an extra column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prop {
    pub name: String,
    pub cond: Cond,
}

/// Check whether a token is a stack reference or resource type query
#[must_use]
pub fn is_query_string(token: &str) -> bool {
    if token.contains(QUERY_STRING_BLACKLIST) {
        return false;
    }

    let colons = token.matches(':').count();
    if (1..=2).contains(&colons) {
        return true;
    }
    if colons > 0 {
        return false;
    }

    let slashes = token.matches('/').count();
    (1..=2).contains(&slashes)
}

/// Check whether a token selects resource types rather than stacks
fn is_resource_type(token: &str) -> bool {
    token.contains(':')
}

fn non_empty(part: &str) -> Option<String> {
    (!part.is_empty()).then(|| part.to_string())
}

/// Parse a single query token
///
/// Tokens with more parts than the grammar allows yield an empty query.
#[must_use]
pub fn parse_query(token: &str) -> Query {
    let mut query = Query::default();

    if is_resource_type(token) {
        let parts: Vec<&str> = token.split(':').collect();
        let rt = &mut query.resource_type;

        if parts.len() > 3 {
            return query;
        }
        if let Some(resource) = parts.get(2) {
            rt.resource = non_empty(resource);
        }
        if let Some(module) = parts.get(1) {
            if module.ends_with('/') {
                rt.module_prefix = non_empty(module);
            } else {
                rt.module = non_empty(module);
            }
        }
        rt.provider = non_empty(parts[0]);
    } else {
        let parts: Vec<&str> = token.split('/').collect();
        let sr = &mut query.stack_reference;

        if parts.len() > 3 {
            return query;
        }
        if let Some(stack) = parts.get(2) {
            sr.stack = non_empty(stack);
        }
        if let Some(project) = parts.get(1) {
            sr.project = non_empty(project);
        }
        sr.org = non_empty(parts[0]);
    }

    query
}

/// Parse a property token
#[must_use]
pub fn parse_prop(token: &str) -> Prop {
    Prop {
        name: token.to_string(),
        cond: Cond::default(),
    }
}

/// Split command-line tokens into a query and the requested properties
///
/// A later query token of the same kind replaces an earlier one.
///
/// # Errors
/// Returns [`QueryError::TooManyQueryStrings`] if more than two tokens are
/// recognised as queries. Nothing else is returned in that case.
pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<(Query, Vec<Prop>), QueryError> {
    let mut query = Query::default();
    let mut props = Vec::new();
    let mut query_strings = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        if !is_query_string(token) {
            props.push(parse_prop(token));
            continue;
        }

        let current = parse_query(token);
        if current.resource_type.is_active() {
            query.resource_type = current.resource_type;
            query_strings.push(token.to_string());
        }
        if current.stack_reference.is_active() {
            query.stack_reference = current.stack_reference;
            query_strings.push(token.to_string());
        }
    }

    if query_strings.len() > MAX_QUERY_STRINGS {
        return Err(QueryError::TooManyQueryStrings(query_strings));
    }

    Ok((query, props))
}
