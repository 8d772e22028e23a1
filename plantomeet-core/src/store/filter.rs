//! Row filters in the store's `<op>.<value>` query syntax.

use serde_json::{Map, Value};

/// A predicate on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column=eq.<value>`
    Eq { column: String, value: String },
    /// `column=in.(<v1>,<v2>,...)`
    In { column: String, values: Vec<String> },
}

impl Filter {
    pub fn eq(column: &str, value: &str) -> Self {
        Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn in_list<S: AsRef<str>>(column: &str, values: &[S]) -> Self {
        Filter::In {
            column: column.to_string(),
            values: values.iter().map(|v| v.as_ref().to_string()).collect(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::In { column, .. } => column,
        }
    }

    /// The query-parameter value, e.g. `eq.p1` or `in.(p1,p2)`.
    pub fn to_param(&self) -> String {
        match self {
            Filter::Eq { value, .. } => format!("eq.{value}"),
            Filter::In { values, .. } => {
                let list: Vec<String> = values.iter().map(|v| quote_list_value(v)).collect();
                format!("in.({})", list.join(","))
            }
        }
    }

    /// Evaluate the predicate against a JSON row. Missing or null columns never match.
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        let Some(cell) = row.get(self.column()).and_then(cell_text) else {
            return false;
        };

        match self {
            Filter::Eq { value, .. } => cell == *value,
            Filter::In { values, .. } => values.iter().any(|v| *v == cell),
        }
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Values inside `in.(...)` that contain list syntax must be double-quoted.
fn quote_list_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace());

    if !needs_quotes {
        return value.to_string();
    }

    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
