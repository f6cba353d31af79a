/// Column layout shared by the alignment engines
///
/// Every engine follows the same shape: split the group into statements and
/// pass-through lines, parse each statement into cells, compute the width of
/// every column over the group, then render rows and line up trailing
/// comments with [`finish`].
use std::ops::Range;

use crate::parser::classify::{classify, LineKind};
use crate::parser::line::{
    bracket_balance, ends_with_operator, find_assignment_op, find_top_level, indent_width, split_top_level,
    statement_continues, text_width, AssignOp, Line, StatementState,
};
use crate::parser::patterns::{is_one_of, DECL_NAME_RE, FIRST_WORD_RE, QUALIFIERS, TYPE_KEYWORDS};
use crate::parser::CharFilter;

/// How statements in a group are delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// Module body: statements end with `;`
    Statements,
    /// Module header lists: one item per line, `,` or nothing at the end
    HeaderItems,
}

/// Punctuation closing a statement or list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Semicolon,
    Comma,
    None,
}

impl Terminator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Terminator::Semicolon => ";",
            Terminator::Comma => ",",
            Terminator::None => "",
        }
    }

    /// Padding before the terminator only makes sense for `;`
    #[must_use]
    pub fn is_padded(self) -> bool {
        self == Terminator::Semicolon
    }
}

/// Split the terminator off a single-line statement
///
/// Returns `None` when code follows a top-level `;`.
#[must_use]
pub fn split_terminator(code: &str) -> Option<(&str, Terminator)> {
    let trimmed = code.trim_end();
    if let Some(body) = trimmed.strip_suffix(';') {
        if find_top_level(body, ';').is_some() {
            return None;
        }
        return Some((body.trim_end(), Terminator::Semicolon));
    }
    if find_top_level(trimmed, ';').is_some() {
        return None;
    }
    if let Some(body) = trimmed.strip_suffix(',') {
        return Some((body.trim_end(), Terminator::Comma));
    }
    Some((trimmed, Terminator::None))
}

#[must_use]
pub fn spaces(count: usize) -> String {
    " ".repeat(count)
}

/// Left-justify `text` in a cell of `width` columns
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let len = text_width(text);
    if len >= width {
        text.to_string()
    } else {
        format!("{text}{}", spaces(width - len))
    }
}

/// Right-justify `text` in a cell of `width` columns
#[must_use]
pub fn pad_left(text: &str, width: usize) -> String {
    let len = text_width(text);
    if len >= width {
        text.to_string()
    } else {
        format!("{}{text}", spaces(width - len))
    }
}

/// Widest cell of a column
pub fn column_width<'a, I: IntoIterator<Item = &'a str>>(cells: I) -> usize {
    cells.into_iter().map(text_width).max().unwrap_or(0)
}

/// One column of an aligned row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    /// Width of the column over the whole group, 0 drops the column
    pub width: usize,
    /// Right-justify instead of left-justify
    pub right: bool,
}

impl Cell {
    #[must_use]
    pub fn left(text: impl Into<String>, width: usize) -> Self {
        Self {
            text: text.into(),
            width,
            right: false,
        }
    }

    #[must_use]
    pub fn right(text: impl Into<String>, width: usize) -> Self {
        Self {
            text: text.into(),
            width,
            right: true,
        }
    }

    fn padded(&self) -> String {
        if self.right {
            pad_left(&self.text, self.width)
        } else {
            pad(&self.text, self.width)
        }
    }
}

/// Render a row of cells followed by its terminator
///
/// Cells are joined by single spaces and columns of width 0 are skipped. The
/// last cell is only padded when the terminator is `;`, so terminators of the
/// group line up; a row that would then exceed `line_length` gets its
/// terminator right after the content instead.
#[must_use]
pub fn render_cells(
    indent: &str,
    cells: &[Cell],
    terminator: Terminator,
    line_length: usize,
) -> String {
    let used: Vec<&Cell> = cells.iter().filter(|c| c.width > 0).collect();
    let Some((last, leading)) = used.split_last() else {
        return format!("{indent}{}", terminator.as_str());
    };
    let mut head: Vec<String> = leading.iter().map(|c| c.padded()).collect();
    let tail = if terminator.is_padded() {
        last.padded()
    } else {
        last.text.clone()
    };
    head.push(tail);
    let row = format!("{indent}{}{}", head.join(" "), terminator.as_str());
    if text_width(&row) <= line_length || !terminator.is_padded() {
        return row.trim_end().to_string();
    }
    if let Some(cell) = head.last_mut() {
        cell.clone_from(&last.text);
    }
    format!("{indent}{}{}", head.join(" ").trim_end(), terminator.as_str())
}

/// One piece of an alignment group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Blank, comment or directive line outside any statement
    Trivia(usize),
    /// Lines of one statement, continuation lines included
    Statement(Range<usize>),
}

fn next_code(parsed: &[(Line, LineKind)], from: usize) -> Option<&str> {
    parsed[from..]
        .iter()
        .find(|(_, kind)| !kind.is_trivia())
        .map(|(line, _)| line.code.as_str())
}

/// Split a group into statements and pass-through lines
#[must_use]
pub fn split_statements(lines: &[String], style: ListStyle) -> Vec<Piece> {
    let parsed: Vec<(Line, LineKind)> = lines
        .iter()
        .map(|raw| {
            let line = Line::parse(raw);
            let kind = classify(&line);
            (line, kind)
        })
        .collect();

    let mut pieces = Vec::new();
    let mut i = 0;
    while i < parsed.len() {
        if parsed[i].1.is_trivia() {
            pieces.push(Piece::Trivia(i));
            i += 1;
            continue;
        }
        let start = i;
        let mut state = StatementState::new();
        let mut balance = 0;
        loop {
            let code = parsed[i].0.code.as_str();
            state.feed(code);
            balance += bracket_balance(code);
            i += 1;
            let open = match style {
                ListStyle::Statements => statement_continues(&state, code, next_code(&parsed, i)),
                // `) (` between parameter and port lists closes one list and opens the next
                ListStyle::HeaderItems => {
                    balance > 0 || (ends_with_operator(code) && !code.ends_with(','))
                }
            };
            if !open {
                break;
            }
            while i < parsed.len() && parsed[i].1.is_trivia() {
                i += 1;
            }
            if i >= parsed.len() {
                break;
            }
        }
        pieces.push(Piece::Statement(start..i));
    }
    pieces
}

/// Move a block of lines so its first non-blank line starts at `target`
///
/// Relative indentation inside the block is kept.
#[must_use]
pub fn shift_block(lines: &[String], target: usize, tab_width: usize) -> Vec<String> {
    let Some(first) = lines.iter().find(|l| !l.trim().is_empty()) else {
        return lines.iter().map(|_| String::new()).collect();
    };
    let first_body = first.trim_start();
    let first_indent = indent_width(&first[..first.len() - first_body.len()], tab_width);
    #[allow(clippy::cast_possible_wrap)]
    let delta = target as isize - first_indent as isize;
    lines
        .iter()
        .map(|raw| shift_line(raw, delta, tab_width))
        .collect()
}

/// Shift one line's indentation by `delta` columns
#[must_use]
pub fn shift_line(raw: &str, delta: isize, tab_width: usize) -> String {
    let body = raw.trim_start();
    if body.is_empty() {
        return String::new();
    }
    let current = indent_width(&raw[..raw.len() - body.len()], tab_width);
    let new_width = current.saturating_add_signed(delta);
    format!("{}{body}", spaces(new_width))
}

/// A statement rendered by an engine, waiting for comment alignment
#[derive(Debug, Clone)]
pub struct Rendered {
    /// First line including indentation, without comment
    pub code: String,
    pub comment: Option<String>,
    /// Already re-indented continuation lines
    pub continuation: Vec<String>,
    /// Participates in trailing-comment alignment
    pub aligned: bool,
}

impl Rendered {
    #[must_use]
    pub fn single(code: String, comment: Option<String>, aligned: bool) -> Self {
        Self {
            code,
            comment,
            continuation: Vec::new(),
            aligned,
        }
    }
}

/// Output slot of an engine
#[derive(Debug, Clone)]
pub enum Slot {
    /// Line emitted exactly as it came in
    Raw(String),
    Row(Rendered),
}

/// Emit all slots, lining up trailing comments of aligned single-line rows
///
/// The comment column is one past the widest aligned row. A row whose comment
/// would run past `line_length` there keeps a single space instead.
#[must_use]
pub fn finish(slots: Vec<Slot>, line_length: usize) -> Vec<String> {
    let column = slots
        .iter()
        .filter_map(|slot| match slot {
            Slot::Row(row) if row.aligned && row.continuation.is_empty() => {
                Some(text_width(&row.code))
            }
            _ => None,
        })
        .max()
        .unwrap_or(0);

    let mut out = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Raw(line) => out.push(line),
            Slot::Row(row) => {
                let line = match &row.comment {
                    None => row.code,
                    Some(comment) => {
                        let width = text_width(&row.code);
                        let padded = column + 1 + text_width(comment);
                        if row.aligned
                            && row.continuation.is_empty()
                            && width < column
                            && padded <= line_length
                        {
                            format!("{}{comment}", pad(&row.code, column + 1))
                        } else {
                            format!("{} {comment}", row.code)
                        }
                    }
                };
                out.push(line);
                out.extend(row.continuation);
            }
        }
    }
    out
}

/// A declaration-like statement split into its columns
///
/// `keyword [types] [qualifiers] [ranges] names [= init] terminator`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclParts<'a> {
    pub keyword: &'a str,
    pub types: Vec<&'a str>,
    pub qualifiers: Vec<&'a str>,
    pub ranges: Vec<&'a str>,
    /// Declared names with their unpacked dimensions
    pub names: Vec<String>,
    pub init: Option<&'a str>,
    pub terminator: Terminator,
}

impl DeclParts<'_> {
    /// Type words and qualifiers as one cell
    #[must_use]
    pub fn type_cell(&self) -> String {
        self.types
            .iter()
            .chain(self.qualifiers.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn range_cell(&self) -> String {
        self.ranges.concat()
    }

    #[must_use]
    pub fn names_cell(&self) -> String {
        self.names.join(", ")
    }
}

/// Length in bytes of the bracketed group at the start of `text`
fn bracket_group_len(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (pos, c) in CharFilter::new(text, true, true) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Collect consecutive `[...]` groups at the start of `text`
fn take_ranges(mut text: &str) -> Option<(Vec<&str>, &str)> {
    let mut ranges = Vec::new();
    loop {
        text = text.trim_start();
        if !text.starts_with('[') {
            return Some((ranges, text));
        }
        let len = bracket_group_len(text)?;
        ranges.push(&text[..len]);
        text = &text[len..];
    }
}

/// Parse a single-line declaration whose keyword is one of `keywords`
#[must_use]
pub fn parse_decl<'a>(code: &'a str, keywords: &[&str]) -> Option<DeclParts<'a>> {
    let (body, terminator) = split_terminator(code)?;
    let caps = FIRST_WORD_RE.captures(body)?;
    let keyword_match = caps.get(1)?;
    let keyword = keyword_match.as_str();
    if !is_one_of(keyword, keywords) {
        return None;
    }

    let mut rest = &body[keyword_match.end()..];
    let mut types = Vec::new();
    let mut qualifiers = Vec::new();
    loop {
        let trimmed = rest.trim_start();
        let Some(word) = FIRST_WORD_RE.captures(trimmed).and_then(|c| c.get(1)) else {
            rest = trimmed;
            break;
        };
        if is_one_of(word.as_str(), TYPE_KEYWORDS) && qualifiers.is_empty() {
            types.push(word.as_str());
        } else if is_one_of(word.as_str(), QUALIFIERS) {
            qualifiers.push(word.as_str());
        } else {
            rest = trimmed;
            break;
        }
        rest = &trimmed[word.end()..];
    }

    let (ranges, rest) = take_ranges(rest)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    let (names_text, init) = match find_assignment_op(rest) {
        Some((pos, AssignOp::Blocking)) => {
            let init = rest[pos + 1..].trim();
            if init.is_empty() || split_top_level(init, ',').len() > 1 {
                return None;
            }
            (&rest[..pos], Some(init))
        }
        Some((_, AssignOp::NonBlocking)) => return None,
        None => (rest, None),
    };

    let mut names = Vec::new();
    for name in split_top_level(names_text, ',') {
        let caps = DECL_NAME_RE.captures(name.trim())?;
        let (dims, tail) = take_ranges(caps.get(2).map_or("", |m| m.as_str()))?;
        if !tail.trim().is_empty() {
            return None;
        }
        names.push(format!("{}{}", &caps[1], dims.concat()));
    }
    if names.is_empty() || (init.is_some() && names.len() > 1) {
        return None;
    }

    Some(DeclParts {
        keyword,
        types,
        qualifiers,
        ranges,
        names,
        init,
        terminator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::patterns::{DECL_KEYWORDS, PORT_DIRECTIONS};

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_split_terminator() {
        assert_eq!(split_terminator("wire a;"), Some(("wire a", Terminator::Semicolon)));
        assert_eq!(split_terminator("input a,"), Some(("input a", Terminator::Comma)));
        assert_eq!(split_terminator("input a"), Some(("input a", Terminator::None)));
        assert_eq!(split_terminator("wire a; wire b;"), None);
    }

    #[test]
    fn test_pad_helpers() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad_left("[7:0]", 7), "  [7:0]");
        assert_eq!(pad("toolong", 3), "toolong");
        assert_eq!(column_width(["a", "abc", ""]), 3);
    }

    #[test]
    fn test_render_cells() {
        let cells = vec![
            Cell::left("wire", 4),
            Cell::left("", 0),
            Cell::right("[7:0]", 7),
            Cell::left("a", 4),
        ];
        assert_eq!(
            render_cells("  ", &cells, Terminator::Semicolon, 120),
            "  wire   [7:0] a   ;"
        );
        assert_eq!(
            render_cells("  ", &cells, Terminator::Comma, 120),
            "  wire   [7:0] a,"
        );
        assert_eq!(
            render_cells("  ", &cells, Terminator::Semicolon, 18),
            "  wire   [7:0] a;"
        );
    }

    #[test]
    fn test_split_statements() {
        let group = lines(&[
            "assign a = b;",
            "// note",
            "assign c = {d,",
            "            e};",
            "assign f = g",
            "         | h;",
        ]);
        let pieces = split_statements(&group, ListStyle::Statements);
        assert_eq!(
            pieces,
            vec![
                Piece::Statement(0..1),
                Piece::Trivia(1),
                Piece::Statement(2..4),
                Piece::Statement(4..6),
            ]
        );
    }

    #[test]
    fn test_split_header_items() {
        let group = lines(&["input a,", "output b"]);
        let pieces = split_statements(&group, ListStyle::HeaderItems);
        assert_eq!(pieces, vec![Piece::Statement(0..1), Piece::Statement(1..2)]);
    }

    #[test]
    fn test_shift_block() {
        let block = lines(&["  x = {a,", "       b};"]);
        assert_eq!(shift_block(&block, 4, 4), lines(&["    x = {a,", "         b};"]));
    }

    #[test]
    fn test_finish_aligns_comments() {
        let slots = vec![
            Slot::Row(Rendered::single("wire a;".into(), Some("// a".into()), true)),
            Slot::Raw("// free".into()),
            Slot::Row(Rendered::single("wire bbbb;".into(), Some("// b".into()), true)),
        ];
        assert_eq!(
            finish(slots, 120),
            lines(&["wire a;    // a", "// free", "wire bbbb; // b"])
        );
    }

    #[test]
    fn test_parse_decl() {
        let parts = parse_decl("reg signed [7:0] data [0:3];", DECL_KEYWORDS).unwrap();
        assert_eq!(parts.keyword, "reg");
        assert_eq!(parts.qualifiers, vec!["signed"]);
        assert_eq!(parts.range_cell(), "[7:0]");
        assert_eq!(parts.names, vec!["data[0:3]"]);
        assert_eq!(parts.terminator, Terminator::Semicolon);

        let parts = parse_decl("wire a, b,c;", DECL_KEYWORDS).unwrap();
        assert_eq!(parts.names_cell(), "a, b, c");

        let parts = parse_decl("input wire [3:0] [1:0] bus,", PORT_DIRECTIONS).unwrap();
        assert_eq!(parts.types, vec!["wire"]);
        assert_eq!(parts.range_cell(), "[3:0][1:0]");
        assert_eq!(parts.terminator, Terminator::Comma);

        let parts = parse_decl("wire x = a & b;", DECL_KEYWORDS).unwrap();
        assert_eq!(parts.init, Some("a & b"));
    }

    #[test]
    fn test_parse_decl_rejects() {
        assert!(parse_decl("wire #5 a;", DECL_KEYWORDS).is_none());
        assert!(parse_decl("wire a = 1, b = 2;", DECL_KEYWORDS).is_none());
        assert!(parse_decl("input a;", DECL_KEYWORDS).is_none());
        assert!(parse_decl("input b);", PORT_DIRECTIONS).is_none());
    }
}
