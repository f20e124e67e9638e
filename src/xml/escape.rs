//! Escaping for hand-written XML output.

/// Escapes `&`, `<`, `>` for element text.
pub fn escape_element(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes attribute text: element escaping plus quotes, with newlines
/// replaced by spaces and double spaces collapsed.
pub fn escape_attribute(value: &str) -> String {
    escape_element(value)
        .replace('\n', " ")
        .replace('\r', " ")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace("  ", " ")
}
