//! JSON rendering of Store values.

use crate::value::Value;

/// Render a value as pretty-printed JSON.
///
/// Map keys are sorted so the output is stable. Floats always carry a
/// fraction or exponent so they stay distinguishable from ints; NaN and the
/// infinities, which JSON cannot express, become `null`.
pub fn encode_json(value: &Value) -> String {
    let mut out = String::new();
    write_json(&mut out, value, 0);
    out
}

fn write_json(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::String(s) => write_json_string(out, s),
        Value::Int(n) => out.push_str(&n.to_string()),
        Value::Float(f) if f.is_finite() => out.push_str(&format!("{:?}", f)),
        Value::Float(_) => out.push_str("null"),
        Value::List(items) if items.is_empty() => out.push_str("[]"),
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                open_item(out, i, indent + 1);
                write_json(out, item, indent + 1);
            }
            close(out, indent, ']');
        }
        Value::Map(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Map(entries) => {
            let mut keys: Vec<&String> = entries.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                open_item(out, i, indent + 1);
                write_json_string(out, key);
                out.push_str(": ");
                write_json(out, &entries[key], indent + 1);
            }
            close(out, indent, '}');
        }
    }
}

fn open_item(out: &mut String, i: usize, indent: usize) {
    if i > 0 {
        out.push(',');
    }
    out.push('\n');
    pad(out, indent);
}

fn close(out: &mut String, indent: usize, bracket: char) {
    out.push('\n');
    pad(out, indent);
    out.push(bracket);
}

fn pad(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0c' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
