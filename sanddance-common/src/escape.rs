use regex::Regex;
use serde_json::Value;

pub fn escape_field(col: &str) -> String {
    // Escape single quote, double quote, period, and brackets with a backslash
    col.replace('\'', "\\'")
        .replace('\"', "\\\"")
        .replace('.', "\\.")
        .replace('[', "\\[")
        .replace(']', "\\]")
}

pub fn unescape_field(col: &str) -> String {
    col.replace("\\'", "'")
        .replace("\\\"", "\"")
        .replace("\\.", ".")
        .replace("\\[", "[")
        .replace("\\]", "]")
}

/// Quote a string as a double-quoted expression literal
pub fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Expression accessing a raw (unescaped) column on the current datum
pub fn datum_field(col: &str) -> String {
    format!("datum[{}]", quote(col))
}

/// Reduce a column name to a fragment usable inside data, scale and signal names
pub fn safe_name(col: &str) -> String {
    lazy_static! {
        static ref UNSAFE_RE: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
    }
    UNSAFE_RE.replace_all(col, "_").into_owned()
}
