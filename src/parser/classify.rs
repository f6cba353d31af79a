//! Line classifier.
//!
//! Turns one [`Line`] into a [`LineKind`] tag using keyword tables and regex
//! recognition only. The classifier never looks at neighbouring lines; the one
//! piece of context it needs, whether a `/* */` comment is still open, is kept
//! by [`BlockComments`] and applied by [`classify_all`].

use crate::parser::char_filter::CharFilter;
use crate::parser::line::{find_assignment_op, AssignOp, Line};
use crate::parser::patterns::{
    is_one_of, ASSIGN_LHS_RE, CASE_KEYWORDS, CASE_MODIFIERS, COMPILER_DIRECTIVES, DECL_KEYWORDS,
    DIRECTIVE_RE, FIRST_WORD_RE, MODULE_RE, PARAM_KEYWORDS, PORT_DIRECTIONS, PROCEDURAL_KEYWORDS,
    RESERVED_WORDS, SCOPE_END_KEYWORDS,
};
use crate::scope::BlockKind;

/// Compiler directive flavours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    IfDef,
    IfNDef,
    ElsIf,
    Else,
    EndIf,
    /// `define, `include, `timescale and friends
    Other,
}

impl DirectiveKind {
    /// `ifdef or `ifndef
    #[must_use]
    pub fn opens(self) -> bool {
        matches!(self, DirectiveKind::IfDef | DirectiveKind::IfNDef)
    }

    /// `elsif, `else or `endif
    #[must_use]
    pub fn continues(self) -> bool {
        matches!(
            self,
            DirectiveKind::ElsIf | DirectiveKind::Else | DirectiveKind::EndIf
        )
    }
}

/// Block header such as `if (x)`, `end else begin` or `always @(posedge clk)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: BlockKind,
    /// Starts with `else` (possibly after `end`)
    pub is_else: bool,
    /// `if` or `else if`: an `else` may follow the body
    pub chainable: bool,
    /// Line starts with the `end` of the previous branch
    pub chained_end: bool,
    /// Ends with `begin` or `fork`
    pub opens_scope: bool,
    /// A statement follows the header on the same line
    pub inline_statement: bool,
    /// Header parentheses are closed on this line
    pub complete: bool,
}

impl Header {
    /// Header line with no body on it, waiting for the next statement
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.complete && !self.opens_scope && !self.inline_statement
    }
}

/// Case item label, `label:` optionally followed by `begin` or a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseItem {
    /// Byte offset of the label colon in the code
    pub colon: usize,
    pub opens_scope: bool,
    pub has_statement: bool,
    /// The inline statement opens a scope of its own (`0: case (b)`,
    /// `1: if (a) begin`)
    pub nested_scope: bool,
}

/// Classification of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Comment only, or a line inside a multi-line block comment
    Comment,
    Directive(DirectiveKind),
    ModuleStart,
    ModuleEnd,
    /// `function` or `task`
    SubprogramStart,
    SubprogramEnd,
    Port,
    Declaration,
    Parameter,
    Assignment { keyword: bool, op: AssignOp },
    BlockHeader(Header),
    /// `begin` or `fork`
    Begin,
    /// `end` or `join*`
    End,
    CaseHeader,
    CaseItem(CaseItem),
    CaseEnd,
    GenerateStart,
    GenerateEnd,
    Other,
}

impl LineKind {
    /// Change in `begin`/`case`/`generate` nesting caused by this line
    #[must_use]
    pub fn scope_delta(&self) -> i32 {
        match self {
            LineKind::BlockHeader(h) => i32::from(h.opens_scope) - i32::from(h.chained_end),
            LineKind::Begin | LineKind::CaseHeader | LineKind::GenerateStart => 1,
            LineKind::CaseItem(item) => i32::from(item.opens_scope || item.nested_scope),
            LineKind::End | LineKind::CaseEnd | LineKind::GenerateEnd => -1,
            _ => 0,
        }
    }

    /// Blank, comment or compiler directive
    #[must_use]
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            LineKind::Blank | LineKind::Comment | LineKind::Directive(_)
        )
    }

    /// Simple statement that can form the body of a header
    #[must_use]
    pub fn is_simple_statement(&self) -> bool {
        matches!(self, LineKind::Assignment { .. } | LineKind::Other)
    }
}

/// Split the leading identifier off `text`
fn split_word(text: &str) -> Option<(&str, &str)> {
    let caps = FIRST_WORD_RE.captures(text)?;
    let word = caps.get(1)?;
    Some((word.as_str(), &text[word.end()..]))
}

/// Consume a parenthesised group at the start of `text`
///
/// Returns the text after the closing parenthesis, or `None` if the group is
/// not closed on this line.
fn skip_parens(text: &str) -> Option<&str> {
    let mut depth = 0i32;
    for (pos, c) in CharFilter::new(text, true, true) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[pos + 1..]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a block header
#[must_use]
pub fn parse_header(code: &str) -> Option<Header> {
    let mut rest = code.trim_start();
    let mut header = Header {
        kind: BlockKind::Conditional,
        is_else: false,
        chainable: false,
        chained_end: false,
        opens_scope: false,
        inline_statement: false,
        complete: true,
    };

    let (mut word, mut after) = split_word(rest)?;
    if word == "end" {
        let (next, tail) = split_word(after)?;
        if next != "else" {
            return None;
        }
        header.chained_end = true;
        word = next;
        after = tail;
    }
    if is_one_of(word, CASE_MODIFIERS) {
        let (next, tail) = split_word(after)?;
        if next != "if" {
            return None;
        }
        word = next;
        after = tail;
    }

    let needs_parens = match word {
        "else" => {
            header.is_else = true;
            match split_word(after) {
                Some(("if", tail)) => {
                    header.chainable = true;
                    rest = tail;
                    true
                }
                _ => {
                    rest = after;
                    false
                }
            }
        }
        "if" => {
            header.chainable = true;
            rest = after;
            true
        }
        "for" | "while" | "repeat" | "foreach" => {
            header.kind = BlockKind::Loop;
            rest = after;
            true
        }
        "forever" => {
            header.kind = BlockKind::Loop;
            rest = after;
            false
        }
        w if is_one_of(w, PROCEDURAL_KEYWORDS) => {
            header.kind = BlockKind::Procedural;
            rest = after.trim_start();
            if let Some(event) = rest.strip_prefix('@') {
                let event = event.trim_start();
                if event.starts_with('(') {
                    match skip_parens(event) {
                        Some(tail) => rest = tail,
                        None => {
                            header.complete = false;
                            return Some(header);
                        }
                    }
                } else if let Some(tail) = event.strip_prefix('*') {
                    rest = tail;
                } else if let Some((_, tail)) = split_word(event) {
                    rest = tail;
                }
            }
            false
        }
        _ => return None,
    };

    if needs_parens {
        let trimmed = rest.trim_start();
        if !trimmed.starts_with('(') {
            return None;
        }
        match skip_parens(trimmed) {
            Some(tail) => rest = tail,
            None => {
                header.complete = false;
                return Some(header);
            }
        }
    }

    let tail = rest.trim();
    if tail.is_empty() {
        return Some(header);
    }
    match split_word(tail) {
        Some(("begin" | "fork", _)) => header.opens_scope = true,
        _ => header.inline_statement = true,
    }
    Some(header)
}

/// Find a case item label colon
///
/// The colon must be at bracket depth zero, must not belong to `::`, and must
/// come before any assignment operator or `?`.
#[must_use]
pub fn parse_case_item(code: &str) -> Option<CaseItem> {
    let mut depth = 0i32;
    let mut colon = None;
    let chars: Vec<(usize, char)> = CharFilter::new(code, true, true).collect();
    for (idx, &(pos, c)) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            '?' if depth == 0 => return None,
            ':' if depth == 0 => {
                let prev = idx.checked_sub(1).map(|i| chars[i].1);
                let next = chars.get(idx + 1).map(|&(_, c)| c);
                if prev == Some(':') || next == Some(':') {
                    return None;
                }
                colon = Some(pos);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    if let Some((op, _)) = find_assignment_op(code) {
        if op < colon {
            return None;
        }
    }
    let label = code[..colon].trim();
    if label.is_empty() {
        return None;
    }
    if let Some((first, _)) = split_word(label) {
        if first != "default" && is_one_of(first, RESERVED_WORDS) {
            return None;
        }
        if is_one_of(first, DECL_KEYWORDS) || is_one_of(first, PORT_DIRECTIONS) {
            return None;
        }
    }
    let rest = code[colon + 1..].trim();
    let opens_scope = matches!(split_word(rest), Some(("begin" | "fork", _)));
    let nested_scope = !opens_scope
        && !rest.is_empty()
        && match classify(&Line::parse(rest)) {
            LineKind::CaseHeader => true,
            LineKind::BlockHeader(h) => h.opens_scope && !h.chained_end,
            _ => false,
        };
    Some(CaseItem {
        colon,
        opens_scope,
        has_statement: !rest.is_empty() && !opens_scope,
        nested_scope,
    })
}

fn classify_directive(name: &str) -> DirectiveKind {
    match name {
        "ifdef" => DirectiveKind::IfDef,
        "ifndef" => DirectiveKind::IfNDef,
        "elsif" => DirectiveKind::ElsIf,
        "else" => DirectiveKind::Else,
        "endif" => DirectiveKind::EndIf,
        _ => DirectiveKind::Other,
    }
}

/// Classify one line without any surrounding context
#[must_use]
pub fn classify(line: &Line) -> LineKind {
    if line.is_blank() {
        return LineKind::Blank;
    }
    if line.is_comment_only() {
        return LineKind::Comment;
    }
    let code = line.code.as_str();

    if let Some(caps) = DIRECTIVE_RE.captures(code) {
        let name = &caps[1];
        if is_one_of(name, COMPILER_DIRECTIVES) {
            return LineKind::Directive(classify_directive(name));
        }
        // Macro use: an ordinary statement
        return LineKind::Other;
    }

    if MODULE_RE.is_match(code) {
        return LineKind::ModuleStart;
    }

    let Some((word, after)) = split_word(code) else {
        // Lines starting with a literal or a concatenation
        if let Some(item) = parse_case_item(code) {
            return LineKind::CaseItem(item);
        }
        return classify_bare_assignment(code);
    };

    match word {
        "endmodule" | "endmacromodule" => return LineKind::ModuleEnd,
        "function" | "task" => return LineKind::SubprogramStart,
        "endfunction" | "endtask" => return LineKind::SubprogramEnd,
        "generate" => return LineKind::GenerateStart,
        "endgenerate" => return LineKind::GenerateEnd,
        "endcase" => return LineKind::CaseEnd,
        "begin" | "fork" => return LineKind::Begin,
        "assign" => {
            return match find_assignment_op(after) {
                Some((_, op)) => LineKind::Assignment { keyword: true, op },
                None => LineKind::Other,
            };
        }
        _ => {}
    }

    if is_one_of(word, SCOPE_END_KEYWORDS) {
        if word == "end" {
            if let Some(header) = parse_header(code) {
                return LineKind::BlockHeader(header);
            }
        }
        return LineKind::End;
    }
    if is_one_of(word, CASE_KEYWORDS)
        || (is_one_of(word, CASE_MODIFIERS)
            && split_word(after).is_some_and(|(w, _)| is_one_of(w, CASE_KEYWORDS)))
    {
        return LineKind::CaseHeader;
    }
    if let Some(header) = parse_header(code) {
        return LineKind::BlockHeader(header);
    }
    if is_one_of(word, PORT_DIRECTIONS) {
        return LineKind::Port;
    }
    if is_one_of(word, DECL_KEYWORDS) {
        return LineKind::Declaration;
    }
    if is_one_of(word, PARAM_KEYWORDS) {
        return LineKind::Parameter;
    }
    if let Some(item) = parse_case_item(code) {
        return LineKind::CaseItem(item);
    }
    if is_one_of(word, RESERVED_WORDS) {
        return LineKind::Other;
    }
    classify_bare_assignment(code)
}

/// Assignment without a keyword, `lhs = rhs` or `lhs <= rhs`
fn classify_bare_assignment(code: &str) -> LineKind {
    match find_assignment_op(code) {
        Some((pos, op)) if ASSIGN_LHS_RE.is_match(code[..pos].trim()) => {
            LineKind::Assignment { keyword: false, op }
        }
        _ => LineKind::Other,
    }
}

/// Tracks `/* */` comments that span several lines
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockComments {
    open: bool,
}

impl BlockComments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance over one raw line
    ///
    /// Returns true when the line starts inside a block comment opened on an
    /// earlier line.
    pub fn step(&mut self, raw: &str) -> bool {
        let was_open = self.open;
        let mut filter = CharFilter::with_comment_state(raw, true, true, was_open);
        filter.by_ref().for_each(drop);
        self.open = filter.in_block_comment();
        was_open
    }

    /// A block comment is still open after the last line
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// A parsed line together with its classification
#[derive(Debug, Clone)]
pub struct Classified {
    pub line: Line,
    pub kind: LineKind,
    /// The line starts inside a `/* */` comment opened earlier
    pub in_comment: bool,
    /// The line leaves a `/* */` comment open
    pub opens_comment: bool,
}

/// Classify a whole stream, treating lines inside block comments as comments
#[must_use]
pub fn classify_all(lines: &[String]) -> Vec<Classified> {
    let mut comments = BlockComments::new();
    lines
        .iter()
        .map(|raw| {
            let inside = comments.step(raw);
            let line = Line::parse(raw);
            let kind = if inside {
                LineKind::Comment
            } else {
                classify(&line)
            };
            Classified {
                line,
                kind,
                in_comment: inside,
                opens_comment: comments.is_open(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(text: &str) -> LineKind {
        classify(&Line::parse(text))
    }

    #[test]
    fn test_blank_and_comment() {
        assert_eq!(kind("   "), LineKind::Blank);
        assert_eq!(kind("  // note"), LineKind::Comment);
        assert_eq!(kind("/* block */"), LineKind::Comment);
    }

    #[test]
    fn test_directives() {
        assert_eq!(kind("`ifdef DEBUG"), LineKind::Directive(DirectiveKind::IfDef));
        assert_eq!(kind("  `endif // DEBUG"), LineKind::Directive(DirectiveKind::EndIf));
        assert_eq!(kind("`timescale 1ns/1ps"), LineKind::Directive(DirectiveKind::Other));
        assert_eq!(kind("`uvm_info(\"id\", \"msg\", UVM_LOW)"), LineKind::Other);
        // marker mid-line is not a directive line
        assert!(matches!(kind("wire a; `endif"), LineKind::Declaration));
    }

    #[test]
    fn test_assignments() {
        assert_eq!(
            kind("assign a = b;"),
            LineKind::Assignment { keyword: true, op: AssignOp::Blocking }
        );
        assert_eq!(
            kind("q <= d;"),
            LineKind::Assignment { keyword: false, op: AssignOp::NonBlocking }
        );
        assert_eq!(
            kind("mem[addr] = data;"),
            LineKind::Assignment { keyword: false, op: AssignOp::Blocking }
        );
        assert_eq!(
            kind("{carry, sum} = a + b;"),
            LineKind::Assignment { keyword: false, op: AssignOp::Blocking }
        );
        assert_eq!(kind("#5 a = b;"), LineKind::Other);
        assert_eq!(kind("force a = b;"), LineKind::Other);
    }

    #[test]
    fn test_declarations_ports_parameters() {
        assert_eq!(kind("wire [7:0] data;"), LineKind::Declaration);
        assert_eq!(kind("reg r = 1'b0;"), LineKind::Declaration);
        assert_eq!(kind("input wire clk;"), LineKind::Port);
        assert_eq!(kind("output reg [3:0] q,"), LineKind::Port);
        assert_eq!(kind("localparam W = 8;"), LineKind::Parameter);
    }

    #[test]
    fn test_headers() {
        let LineKind::BlockHeader(h) = kind("always @(posedge clk)") else {
            panic!("expected header");
        };
        assert_eq!(h.kind, BlockKind::Procedural);
        assert!(h.is_bare());

        let LineKind::BlockHeader(h) = kind("if (a == b) begin") else {
            panic!("expected header");
        };
        assert!(h.opens_scope && h.chainable);

        let LineKind::BlockHeader(h) = kind("end else if (x) begin : named") else {
            panic!("expected header");
        };
        assert!(h.chained_end && h.is_else && h.chainable && h.opens_scope);

        let LineKind::BlockHeader(h) = kind("else") else {
            panic!("expected header");
        };
        assert!(h.is_else && !h.chainable && h.is_bare());

        let LineKind::BlockHeader(h) = kind("if (a) x = 1;") else {
            panic!("expected header");
        };
        assert!(h.inline_statement);

        let LineKind::BlockHeader(h) = kind("if (a &&") else {
            panic!("expected header");
        };
        assert!(!h.complete);

        let LineKind::BlockHeader(h) = kind("always_comb begin") else {
            panic!("expected header");
        };
        assert!(h.opens_scope);

        let LineKind::BlockHeader(h) = kind("for (i = 0; i < 4; i = i + 1)") else {
            panic!("expected header");
        };
        assert_eq!(h.kind, BlockKind::Loop);
    }

    #[test]
    fn test_begin_end() {
        assert_eq!(kind("begin : blk"), LineKind::Begin);
        assert_eq!(kind("fork"), LineKind::Begin);
        assert_eq!(kind("end // done"), LineKind::End);
        assert_eq!(kind("join_none"), LineKind::End);
        assert_eq!(kind("end : blk"), LineKind::End);
    }

    #[test]
    fn test_case_structure() {
        assert_eq!(kind("case (state)"), LineKind::CaseHeader);
        assert_eq!(kind("unique casez (sel)"), LineKind::CaseHeader);
        assert_eq!(kind("endcase"), LineKind::CaseEnd);
        let LineKind::CaseItem(item) = kind("IDLE: begin") else {
            panic!("expected case item");
        };
        assert!(item.opens_scope);
        let LineKind::CaseItem(item) = kind("2'b01, 2'b10: y = a;") else {
            panic!("expected case item");
        };
        assert!(item.has_statement);
        let LineKind::CaseItem(item) = kind("default:") else {
            panic!("expected case item");
        };
        assert!(!item.has_statement && !item.opens_scope);
        let LineKind::CaseItem(item) = kind("0: case (b)") else {
            panic!("expected case item");
        };
        assert!(item.has_statement && item.nested_scope);
        assert_eq!(LineKind::CaseItem(item).scope_delta(), 1);
        let LineKind::CaseItem(item) = kind("1: if (a) begin") else {
            panic!("expected case item");
        };
        assert!(item.nested_scope);
        let LineKind::CaseItem(item) = kind("2: y = 0;") else {
            panic!("expected case item");
        };
        assert!(!item.nested_scope);
        assert!(!matches!(kind("y = s ? a : b;"), LineKind::CaseItem(_)));
        assert!(!matches!(kind("pkg::x = 1;"), LineKind::CaseItem(_)));
    }

    #[test]
    fn test_module_and_subprograms() {
        assert_eq!(kind("module top ("), LineKind::ModuleStart);
        assert_eq!(kind("endmodule"), LineKind::ModuleEnd);
        assert_eq!(kind("function automatic f;"), LineKind::SubprogramStart);
        assert_eq!(kind("endtask"), LineKind::SubprogramEnd);
        assert_eq!(kind("generate"), LineKind::GenerateStart);
        assert_eq!(kind("endgenerate"), LineKind::GenerateEnd);
    }

    #[test]
    fn test_scope_delta() {
        assert_eq!(kind("if (a) begin").scope_delta(), 1);
        assert_eq!(kind("end else begin").scope_delta(), 0);
        assert_eq!(kind("end").scope_delta(), -1);
        assert_eq!(kind("x = 1;").scope_delta(), 0);
    }

    #[test]
    fn test_classify_all_block_comment() {
        let lines: Vec<String> = ["/* start", "assign a = b;", "end */", "wire w;"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let kinds: Vec<LineKind> = classify_all(&lines).into_iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Comment,
                LineKind::Comment,
                LineKind::Comment,
                LineKind::Declaration
            ]
        );
    }
}
