//! Text rendering of the flat table and the summary

use std::fmt::Write;

use crate::aggregate::{Counter, Summary};
use crate::query::Prop;
use crate::types::ReportRow;

/// Fixed leading columns of the table
pub const TABLE_HEADER: [&str; 3] = ["stack", "resourceType", "name"];

const INDENT_MARKER: &str = "|";

/// Substitute for `:` while sorting type keys, ordered before `/`
const SORT_COLON: char = '"';

/// Render rows as a column-aligned table with a header line
#[must_use]
pub fn render_table(props: &[Prop], rows: &[ReportRow]) -> String {
    let header: Vec<&str> = TABLE_HEADER
        .iter()
        .copied()
        .chain(props.iter().map(|p| p.name.as_str()))
        .collect();

    let lines: Vec<Vec<&str>> = std::iter::once(header)
        .chain(
            rows.iter()
                .map(|row| row.fields().iter().map(String::as_str).collect()),
        )
        .collect();

    let columns = lines.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for line in &lines {
        for (i, field) in line.iter().enumerate() {
            widths[i] = widths[i].max(field.chars().count());
        }
    }

    let mut out = String::new();
    for line in &lines {
        let mut text = String::new();
        for (field, width) in line.iter().zip(&widths) {
            let _ = write!(text, "{field:<width$} ");
        }
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out
}

/// Render both hierarchical counters
#[must_use]
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();

    out.push_str("Summary\n");
    let _ = writeln!(out, "total - {}", summary.total);

    out.push_str("\nSummary[by-stack]\n");
    out.push_str("group  count stack\n");
    render_counter(
        &mut out,
        "stack",
        &summary.stacks,
        &sorted_stack_keys(&summary.stacks),
        stack_depth,
    );

    out.push_str("\nSummary[by-resource-type]\n");
    out.push_str("group  count resource-type\n");
    render_counter(
        &mut out,
        "type",
        &summary.resource_types,
        &sorted_resource_type_keys(&summary.resource_types),
        resource_type_depth,
    );

    out
}

fn render_counter(
    out: &mut String,
    group: &str,
    counter: &Counter,
    keys: &[&str],
    depth: fn(&str) -> usize,
) {
    let width = counter
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(0);

    for key in keys {
        let count = counter.get(key);
        let indent = INDENT_MARKER.repeat(depth(key));
        let _ = writeln!(out, "{group}: {count:>width$} {indent} {key}");
    }
}

/// Stack keys in plain lexicographic order
#[must_use]
pub fn sorted_stack_keys(counter: &Counter) -> Vec<&str> {
    let mut keys: Vec<&str> = counter.keys().collect();
    keys.sort_unstable();
    keys
}

/// Type keys ordered so that `provider:` precedes `provider:module/...`
///
/// `:` sorts after `/` in ASCII, so it is swapped for a character that
/// sorts before it while comparing.
#[must_use]
pub fn sorted_resource_type_keys(counter: &Counter) -> Vec<&str> {
    let mut keys: Vec<&str> = counter.keys().collect();
    keys.sort_by_cached_key(|k| k.replace(':', &SORT_COLON.to_string()));
    keys
}

/// Indent depth of a stack key: its number of non-empty segments
#[must_use]
pub fn stack_depth(key: &str) -> usize {
    key.split('/').filter(|part| !part.is_empty()).count()
}

/// Indent depth of a resource type key: its colons plus slashes
#[must_use]
pub fn resource_type_depth(key: &str) -> usize {
    key.matches([':', '/']).count()
}
