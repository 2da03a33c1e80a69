//! Literal-formatting helpers for the CSE dialect.
//!
//! Every escaping/quoting decision the generator makes lives here, so the
//! dialect's literal syntax is defined exactly once. All functions are pure
//! and total: same input, byte-identical output.

/// Render a double-quoted, comma-separated list: `"a", "b"`.
/// Empty input renders as an empty string.
pub fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a comma-separated list without quoting, for bare names and
/// numeric literals: `Inlet, Impeller`.
pub fn numeric_list(items: &[String]) -> String {
    items.join(", ")
}

/// Build the argument text for a printf statement: a single format string
/// (the specs joined with `, ` plus an escaped newline) followed by the
/// comma-joined value expressions.
///
/// `format_row(&["$a", "$b"], &["%.5f", "%.5f"])` yields
/// `"%.5f, %.5f\n", $a, $b` (the `\n` stays escaped in the emitted text;
/// the target tool's printf expands it).
pub fn format_row(values: &[String], formats: &[String]) -> String {
    if values.is_empty() {
        return "\"\\n\"".to_string();
    }
    format!("\"{}\\n\", {}", formats.join(", "), values.join(", "))
}

/// Replace backslash path separators with forward slashes. The dialect's
/// string escaping mangles backslashes, so every path is canonicalized
/// before it is embedded in generated text.
pub fn canonicalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
