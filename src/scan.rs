use crate::error::Span;

/// One top-level statement of a main-method body, with its byte span in the
/// original source so diagnostics can point back at the student's code.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub text: String,
    pub span: Span,
}

/// Tracks whether the scan position is inside a single- or double-quoted
/// literal. Matching quote characters toggle the state; escaped quotes are
/// not distinguished.
#[derive(Debug, Default)]
pub struct LiteralTracker {
    quote: Option<char>,
}

impl LiteralTracker {
    pub fn new() -> Self {
        Self { quote: None }
    }

    /// Feed one character; returns true if the character is inside a literal
    /// (delimiting quotes included).
    pub fn step(&mut self, c: char) -> bool {
        match self.quote {
            Some(q) if c == q => {
                self.quote = None;
                true
            }
            Some(_) => true,
            None if c == '"' || c == '\'' => {
                self.quote = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Split a main-method body into `;`-terminated top-level statements.
///
/// A `;` ends the current statement only at brace depth 0 and outside string
/// or char literals; the `;` is kept as part of the statement text. Comment
/// lines and empty fragments are dropped. `base` is the byte offset of `body`
/// within the full source, so spans land on the student's code.
pub fn split_statements(body: &str, base: usize) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut literals = LiteralTracker::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in body.char_indices() {
        if literals.step(c) {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ';' if depth == 0 => {
                let end = i + c.len_utf8();
                push_fragment(&mut statements, &body[start..end], start, base);
                start = end;
            }
            _ => {}
        }
    }

    // Trailing text without a terminating ';' is still a statement; the
    // executor decides whether it means anything.
    if start < body.len() {
        push_fragment(&mut statements, &body[start..], start, base);
    }

    statements
}

fn push_fragment(statements: &mut Vec<Statement>, fragment: &str, offset: usize, base: usize) {
    // Drop comment lines inside the fragment before deciding emptiness.
    let text = fragment
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if text.is_empty() {
        return;
    }

    let leading = fragment.len() - fragment.trim_start().len();
    let trailing = fragment.len() - fragment.trim_end().len();
    let start = base + offset + leading;
    let end = base + offset + fragment.len() - trailing;
    statements.push(Statement {
        text,
        span: Span::new(start, end.max(start + 1)),
    });
}

/// Split `text` on a delimiter character, honoring string/char literals and
/// parenthesis nesting. Used for `,` in call-argument lists and for the
/// top-level `+` split in additive expressions.
pub fn split_top_level(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut literals = LiteralTracker::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if literals.step(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == delim && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte index of the close character matching the open character at
/// `open_idx`, skipping literal spans. Returns None if unbalanced.
pub fn find_matching(text: &str, open_idx: usize, open: char, close: char) -> Option<usize> {
    let mut literals = LiteralTracker::new();
    let mut depth: i32 = 0;

    for (i, c) in text[open_idx..].char_indices() {
        if literals.step(c) {
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(open_idx + i);
            }
        }
    }
    None
}

/// Byte index of the first top-level `=` that is an assignment operator:
/// outside literals and parens, and not part of `==`, `!=`, `<=`, or `>=`.
pub fn find_assignment_eq(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut literals = LiteralTracker::new();
    let mut depth: i32 = 0;

    for (i, c) in text.char_indices() {
        if literals.step(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '=' if depth == 0 => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if next != b'=' && !matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
