// =====================================================================
// File: json.rs
//
// Description:
//   A small hand-rolled JSON value and pretty-printer. Nothing in the
//   example pack reaches for `serde_json` for this kind of shape, so
//   `dump()`'s tree rendering and `search()`'s path trace both build
//   their output through this module instead of pulling in a crate.
// =====================================================================

/// A minimal JSON value, just expressive enough for a tree dump and a
/// search path trace: nulls, integers, strings, arrays, and objects
/// with string keys in insertion order.
pub(crate) enum Json {
    Null,
    Int(i64),
    Str(String),
    Array(Vec<Json>),
    Object(Vec<(&'static str, Json)>),
}

/// Escapes the handful of characters `json.dumps` escapes by default:
/// backslash, quote, and the common control characters.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Pretty-prints with two-space indentation, matching the nesting and
/// comma placement of Python's `json.dumps(value, indent=2)`: empty
/// arrays/objects collapse to `[]`/`{}`, everything else spreads one
/// entry per line at `indent + 2`.
pub(crate) fn pretty(value: &Json, indent: usize) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Int(i) => i.to_string(),
        Json::Str(s) => format!("\"{}\"", escape(s)),
        Json::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner = indent + 2;
            let pad = " ".repeat(inner);
            let body: Vec<String> = items.iter().map(|it| format!("{pad}{}", pretty(it, inner))).collect();
            format!("[\n{}\n{}]", body.join(",\n"), " ".repeat(indent))
        }
        Json::Object(fields) => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let inner = indent + 2;
            let pad = " ".repeat(inner);
            let body: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{pad}\"{k}\": {}", pretty(v, inner)))
                .collect();
            format!("{{\n{}\n{}}}", body.join(",\n"), " ".repeat(indent))
        }
    }
}

/// One step of a search path trace: either the child index chosen at
/// an interior level, or the value found at the end of the descent.
pub(crate) enum PathStep {
    Child(usize),
    Value(String),
}

/// Renders a single value with no whitespace, matching the compact
/// form `json.dumps` produces without an `indent` argument — the form
/// `search()`'s path trace uses (e.g. `["b"]`, `[0, 1, "g"]`).
fn compact(value: &Json) -> String {
    match value {
        Json::Null => "null".to_string(),
        Json::Int(i) => i.to_string(),
        Json::Str(s) => format!("\"{}\"", escape(s)),
        Json::Array(items) => {
            let body: Vec<String> = items.iter().map(compact).collect();
            format!("[{}]", body.join(", "))
        }
        Json::Object(fields) => {
            let body: Vec<String> = fields.iter().map(|(k, v)| format!("\"{k}\": {}", compact(v))).collect();
            format!("{{{}}}", body.join(", "))
        }
    }
}

/// Renders a path trace as a flat JSON array, e.g. `["b"]` or
/// `[0, 1, "g"]`.
pub(crate) fn render_path(steps: &[PathStep]) -> String {
    let items: Vec<Json> = steps
        .iter()
        .map(|step| match step {
            PathStep::Child(i) => Json::Int(*i as i64),
            PathStep::Value(v) => Json::Str(v.clone()),
        })
        .collect();
    compact(&Json::Array(items))
}
