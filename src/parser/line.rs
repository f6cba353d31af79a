//! Physical line decomposition and top-level scanning helpers.
//!
//! A [`Line`] splits one source line into its leading indentation, its code
//! body and an optional trailing comment. The scanning helpers here only look
//! at code outside strings and comments and track bracket nesting so callers
//! can find operators and terminators at the top level of a statement.

use crate::parser::char_filter::CharFilter;

/// One physical source line split into indentation, code and trailing comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Leading whitespace exactly as written
    pub indent: String,
    /// Code body with surrounding whitespace removed (may be empty)
    pub code: String,
    /// Trailing comment including its `//` or `/*` marker
    pub comment: Option<String>,
}

impl Line {
    /// Split a raw line
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let body = raw.trim_start();
        let indent = raw[..raw.len() - body.len()].to_string();
        match find_trailing_comment(body) {
            Some(pos) => {
                let comment = body[pos..].trim_end().to_string();
                Self {
                    indent,
                    code: body[..pos].trim().to_string(),
                    comment: Some(comment),
                }
            }
            None => Self {
                indent,
                code: body.trim_end().to_string(),
                comment: None,
            },
        }
    }

    /// Whitespace only
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.code.is_empty() && self.comment.is_none()
    }

    /// Only a comment, no code
    #[must_use]
    pub fn is_comment_only(&self) -> bool {
        self.code.is_empty() && self.comment.is_some()
    }

    /// Code and comment joined by a single space, without indentation
    #[must_use]
    pub fn content(&self) -> String {
        match &self.comment {
            Some(comment) if self.code.is_empty() => comment.clone(),
            Some(comment) => format!("{} {comment}", self.code),
            None => self.code.clone(),
        }
    }

    /// Render the line behind `width` spaces of indentation
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        let content = self.content();
        if content.is_empty() {
            return String::new();
        }
        format!("{}{content}", " ".repeat(width))
    }
}

/// Blocking (`=`) or non-blocking (`<=`) assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Blocking,
    NonBlocking,
}

impl AssignOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Blocking => "=",
            AssignOp::NonBlocking => "<=",
        }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.as_str().len()
    }
}

/// Byte offset where the trailing comment of `text` starts, if any
///
/// A `/* */` comment only counts as trailing when nothing but whitespace or a
/// line comment follows it; an unterminated `/*` always does.
#[must_use]
pub fn find_trailing_comment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    let mut instring = false;
    let mut escaped = false;
    while i < bytes.len() {
        let c = bytes[i];
        if instring {
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                instring = false;
            }
            i += 1;
            continue;
        }
        match (c, bytes.get(i + 1)) {
            (b'"', _) => instring = true,
            (b'/', Some(b'/')) => return Some(i),
            (b'/', Some(b'*')) => {
                let Some(close) = text[i + 2..].find("*/") else {
                    return Some(i);
                };
                let after = i + 2 + close + 2;
                let rest = text[after..].trim_start();
                if rest.is_empty() || rest.starts_with("//") {
                    return Some(i);
                }
                i = after;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Width of an indentation prefix, counting a tab as `tab_width` columns
#[must_use]
pub fn indent_width(prefix: &str, tab_width: usize) -> usize {
    prefix
        .chars()
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Display width used for column computations
#[must_use]
pub fn text_width(text: &str) -> usize {
    text.chars().count()
}

/// Iterate the code characters of `code` together with their bracket depth
///
/// The depth reported for an opening bracket is the depth outside it.
fn depth_walk(code: &str) -> Vec<(usize, char, i32)> {
    let mut depth = 0i32;
    let mut out = Vec::with_capacity(code.len());
    for (pos, c) in CharFilter::new(code, true, true) {
        match c {
            '(' | '[' | '{' => {
                out.push((pos, c, depth));
                depth += 1;
            }
            ')' | ']' | '}' => {
                depth -= 1;
                out.push((pos, c, depth));
            }
            _ => out.push((pos, c, depth)),
        }
    }
    out
}

/// Net change of bracket depth over a line of code
#[must_use]
pub fn bracket_balance(code: &str) -> i32 {
    let mut depth = 0i32;
    for (_, c) in CharFilter::new(code, true, true) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Position of the first `ch` at bracket depth zero
#[must_use]
pub fn find_top_level(code: &str, ch: char) -> Option<usize> {
    depth_walk(code)
        .into_iter()
        .find(|&(_, c, depth)| c == ch && depth == 0)
        .map(|(pos, _, _)| pos)
}

/// Split `code` at every `sep` found at bracket depth zero
#[must_use]
pub fn split_top_level(code: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (pos, c, depth) in depth_walk(code) {
        if c == sep && depth == 0 {
            parts.push(&code[start..pos]);
            start = pos + c.len_utf8();
        }
    }
    parts.push(&code[start..]);
    parts
}

/// Find the assignment operator of a statement
///
/// Returns the byte offset and kind of the first `=` or `<=` at bracket depth
/// zero that is not part of a comparison (`==`, `!=`, `>=`, `===`) or of a
/// compound operator.
#[must_use]
pub fn find_assignment_op(code: &str) -> Option<(usize, AssignOp)> {
    let walk = depth_walk(code);
    let mut idx = 0;
    while idx < walk.len() {
        let (pos, c, depth) = walk[idx];
        let prev = idx.checked_sub(1).map(|i| walk[i].1);
        let next = walk.get(idx + 1).map(|w| w.1);
        if depth == 0 {
            match c {
                '<' if next == Some('=') => {
                    if prev == Some('<') {
                        return None;
                    }
                    if walk.get(idx + 2).map(|w| w.1) == Some('=') {
                        idx += 3;
                        continue;
                    }
                    return Some((pos, AssignOp::NonBlocking));
                }
                '=' => {
                    if next == Some('=') {
                        // == and === are comparisons
                        while walk.get(idx).map(|w| w.1) == Some('=') {
                            idx += 1;
                        }
                        continue;
                    }
                    match prev {
                        Some('!' | '>' | '=') => {}
                        Some('+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '<') => return None,
                        _ => return Some((pos, AssignOp::Blocking)),
                    }
                }
                _ => {}
            }
        }
        idx += 1;
    }
    None
}

/// Tracks whether a statement spread over several lines has been terminated
#[derive(Debug, Default, Clone, Copy)]
pub struct StatementState {
    depth: i32,
    terminated: bool,
}

impl StatementState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the code of the next physical line
    ///
    /// Returns true once a `;` has been seen at bracket depth zero.
    pub fn feed(&mut self, code: &str) -> bool {
        for (_, c) in CharFilter::new(code, true, true) {
            match c {
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth = (self.depth - 1).max(0),
                ';' if self.depth == 0 => self.terminated = true,
                _ => {}
            }
        }
        self.terminated
    }

    /// Bracket depth after the lines fed so far
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// True when the last code character of `code` is a binary operator or comma
#[must_use]
pub fn ends_with_operator(code: &str) -> bool {
    let stripped = CharFilter::new(code, true, true).filter_all();
    matches!(
        stripped.trim_end().chars().last(),
        Some('=' | '+' | '-' | '*' | '/' | '%' | '&' | '|' | '^' | '?' | ',' | '~' | '<' | '>' | ':')
    )
}

/// True when `code` ends in a way that continues the statement on the next line
///
/// That is an open bracket, or a trailing binary operator or comma.
#[must_use]
pub fn continues_on_next_line(code: &str) -> bool {
    bracket_balance(code) > 0 || ends_with_operator(code)
}

/// True when `code` begins with an operator, i.e. it continues the previous line
#[must_use]
pub fn starts_with_operator(code: &str) -> bool {
    let trimmed = code.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with("->") {
        return false;
    }
    matches!(
        trimmed.chars().next(),
        Some('|' | '&' | '^' | '+' | '-' | '*' | '/' | '%' | '?' | ':' | ')' | ']' | '}' | ',' | '<' | '>' | '=')
    )
}

/// Decide whether a statement remains open after the line `code`
///
/// `state` must already have been fed `code`. A statement stays open until a
/// top-level `;` is seen, but only while there is evidence the next line
/// belongs to it: an open bracket, a trailing operator, or a next line
/// (`next_code`) that begins with an operator.
#[must_use]
pub fn statement_continues(state: &StatementState, code: &str, next_code: Option<&str>) -> bool {
    !state.is_terminated()
        && (state.depth() > 0
            || ends_with_operator(code)
            || next_code.is_some_and(starts_with_operator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line() {
        let line = Line::parse("    assign a = b;");
        assert_eq!(line.indent, "    ");
        assert_eq!(line.code, "assign a = b;");
        assert_eq!(line.comment, None);
    }

    #[test]
    fn test_parse_trailing_comment() {
        let line = Line::parse("  wire x;   // the x");
        assert_eq!(line.code, "wire x;");
        assert_eq!(line.comment.as_deref(), Some("// the x"));
        assert_eq!(line.content(), "wire x; // the x");
    }

    #[test]
    fn test_parse_comment_only_and_blank() {
        assert!(Line::parse("   // hello").is_comment_only());
        assert!(Line::parse("   ").is_blank());
        assert!(!Line::parse("a;").is_blank());
    }

    #[test]
    fn test_inline_block_comment_is_code() {
        let line = Line::parse("a = /* why */ b;");
        assert_eq!(line.code, "a = /* why */ b;");
        assert!(line.comment.is_none());
        let line = Line::parse("a = b; /* trailing */");
        assert_eq!(line.code, "a = b;");
        assert_eq!(line.comment.as_deref(), Some("/* trailing */"));
    }

    #[test]
    fn test_comment_marker_in_string() {
        let line = Line::parse(r#"$display("http://x");"#);
        assert!(line.comment.is_none());
    }

    #[test]
    fn test_find_assignment_op() {
        assert_eq!(find_assignment_op("a = b;"), Some((2, AssignOp::Blocking)));
        assert_eq!(find_assignment_op("q <= d;"), Some((2, AssignOp::NonBlocking)));
        assert_eq!(find_assignment_op("x = a <= b;"), Some((2, AssignOp::Blocking)));
        assert_eq!(find_assignment_op("if (a == b)"), None);
        assert_eq!(find_assignment_op("a == b"), None);
        assert_eq!(find_assignment_op("mem[i] = 0;"), Some((7, AssignOp::Blocking)));
        assert_eq!(find_assignment_op("a += 1;"), None);
        assert_eq!(find_assignment_op("a >= b"), None);
        assert_eq!(find_assignment_op("f(.x(a = b))"), None);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level("a, b[1,2], {c, d}", ','), vec!["a", " b[1,2]", " {c, d}"]);
    }

    #[test]
    fn test_statement_state() {
        let mut state = StatementState::new();
        assert!(!state.feed("assign x = {a,"));
        assert_eq!(state.depth(), 1);
        assert!(state.feed("b};"));
        let mut loop_header = StatementState::new();
        assert!(!loop_header.feed("for (i = 0; i < 4; i = i + 1)"));
    }

    #[test]
    fn test_continues_on_next_line() {
        assert!(continues_on_next_line("assign a = b |"));
        assert!(continues_on_next_line("foo u0 ("));
        assert!(!continues_on_next_line("assign a = b;"));
        assert!(!continues_on_next_line("if (a)"));
        assert!(!continues_on_next_line("x = 1; // trailing ="));
    }

    #[test]
    fn test_statement_continues() {
        let mut state = StatementState::new();
        state.feed("assign a = b");
        assert!(statement_continues(&state, "assign a = b", Some("| c;")));
        assert!(!statement_continues(&state, "assign a = b", Some("assign d = e;")));
        let mut done = StatementState::new();
        done.feed("x = 1;");
        assert!(!statement_continues(&done, "x = 1;", Some("| y")));
    }

    #[test]
    fn test_indent_width() {
        assert_eq!(indent_width("\t  ", 4), 6);
    }
}
