//! JavaScript source helpers shared by step definitions and the renderer.

/// Quote text as a single-quoted JavaScript string literal.
///
/// # Examples
/// ```
/// use bdd_k6_compiler::js::string_literal;
///
/// assert_eq!(string_literal("it's"), r"'it\'s'");
/// ```
#[must_use]
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Make text safe to place inside a `//` line comment.
#[must_use]
pub fn comment_text(text: &str) -> String {
    text.replace(['\r', '\n', '\u{2028}', '\u{2029}'], " ")
}

/// Render a number parsed from step text, defaulting when it does not parse.
#[must_use]
pub fn number_or(text: &str, default: f64) -> String {
    let value = text.trim().replace(',', ".").parse::<f64>().unwrap_or(default);
    format_number(value)
}

/// Format a float without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Indent every non-empty line of `code` by `spaces`.
#[must_use]
pub fn indent(code: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
