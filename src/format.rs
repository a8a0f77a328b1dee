//! Bounded-width report of aggregate data
//!
//! Renders the fields a session has collected as a block of lines no wider
//! than `MAXWIDTH`, one line per field, annotated with the field's shape.

use crate::data::{AggregateData, Value};
use crate::diagnostics::Diagnostics;
use crate::params::{Flags, Params};
use crate::query::{MAXWIDTH, RPAD};

const ELLIPSIS: &str = "...";

/// Renders `data` as report lines
///
/// Returns no lines when the session is silent or has no data.
pub fn render(data: &AggregateData, params: &Params, flags: &Flags) -> Vec<String> {
    if flags.silent || data.is_empty() {
        return Vec::new();
    }

    let mut output = Vec::with_capacity(data.len() + 3);
    output.push(match display_title(data, params) {
        Some(title) => format!("{} ({}) data", title, params.lang),
        None => format!("({}) data", params.lang),
    });
    output.push("{".to_string());

    for (name, value) in data {
        if let Some((prefix, shown)) = field(name, value) {
            output.push(format!("  {} {}", prefix, shown));
        }
    }

    output.push("}".to_string());
    output
}

/// Writes report lines to `sink`, cutting any that are too wide
pub fn print(lines: &[String], sink: &mut dyn Diagnostics) {
    for line in lines {
        sink.emit(&clip(line));
    }
}

/// Title shown in the report header, `None` when the lookup has no seed
fn display_title(data: &AggregateData, params: &Params) -> Option<String> {
    data.get("title")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| params.title.clone())
        .or_else(|| params.pageid.map(|id| id.to_string()))
        .filter(|seed| !seed.is_empty())
        .map(|seed| seed.replace('_', " "))
}

/// Prefix and shown value for one field; `None` for null fields
fn field(name: &str, value: &Value) -> Option<(String, String)> {
    let formatted = match value {
        Value::Null => return None,
        Value::Map(map) => (
            format!("{}: <dict({})>", name, map.len()),
            map.keys().cloned().collect::<Vec<_>>().join(", "),
        ),
        Value::List(items) => (
            format!("{}: <list({})>", name, items.len()),
            join_present(items),
        ),
        Value::Tuple(items) => (
            format!("{}: <tuple({})>", name, items.len()),
            join_present(items),
        ),
        Value::Int(_) | Value::Bool(_) | Value::Float(_) => {
            (format!("{}:", name), value.to_string())
        }
        Value::Text(text) => {
            let text = text.trim().replace('\n', "");
            let len = text.chars().count();
            if len > MAXWIDTH.saturating_sub(name.chars().count()) {
                (
                    format!("{}: <str({})>", name, len),
                    truncate(&text, MAXWIDTH - (RPAD + 2)),
                )
            } else {
                (format!("{}:", name), text)
            }
        }
    };
    Some(formatted)
}

/// Comma-joined string forms of the non-empty elements
fn join_present(items: &[Value]) -> String {
    items
        .iter()
        .filter(|item| item.is_truthy())
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cuts lines wider than `MAXWIDTH`
fn clip(line: &str) -> String {
    if line.chars().count() > MAXWIDTH {
        truncate(line, MAXWIDTH - (RPAD + 2))
    } else {
        line.to_string()
    }
}

/// First `extent` characters followed by an ellipsis
fn truncate(text: &str, extent: usize) -> String {
    let mut out: String = text.chars().take(extent).collect();
    out.push_str(ELLIPSIS);
    out
}
