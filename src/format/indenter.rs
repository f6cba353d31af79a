/// `BlockIndenter` - Frame-based indentation of procedural code
///
/// Walks the classified line stream once, keeping a [`FrameStack`] of open
/// blocks. Every line directly inside a frame is placed one unit deeper than
/// the frame header; closers reuse the indentation stored in the frame they
/// pop. Lines outside any frame keep their own indentation, and so does any
/// closer that has nothing to close.
///
/// Comments and `` `ifdef`` lines are placed once the next code line is known,
/// so a comment in front of `end` stays with the body it documents while a
/// comment in front of `else` moves with the `else`.
use tracing::debug;

use crate::config::Config;
use crate::format::columns::shift_line;
use crate::parser::classify::{
    classify, classify_all, CaseItem, Classified, DirectiveKind, Header, LineKind,
};
use crate::parser::line::{
    find_assignment_op, indent_width, statement_continues, Line, StatementState,
};
use crate::scope::{BlockKind, Frame, FrameStack, Indent};

/// Where a line ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Leave the line exactly as it is
    Keep,
    /// Indent with a frame's prefix
    At(Indent),
    /// Move by a number of columns, keeping relative layout
    Shift(isize),
    /// Same indentation as another line
    Like(usize),
    /// Move by the same amount as another line (block comment interiors)
    Follow(usize),
}

/// What to do when a multi-line statement or header ends
#[derive(Debug, Clone, Copy)]
enum AfterContinuation {
    CompleteStatement,
    /// Header whose parentheses spilled over several lines
    HeaderTail {
        kind: BlockKind,
        indent: Indent,
        chainable: bool,
    },
}

#[derive(Debug, Clone, Copy)]
struct Continuation {
    delta: isize,
    state: StatementState,
    after: AfterContinuation,
}

/// What follows the closing parenthesis of a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderTail {
    Bare,
    Scope,
    Inline,
}

fn header_tail(code: &str) -> HeaderTail {
    let after = code.rfind(')').map_or(code, |pos| &code[pos + 1..]).trim();
    if after.is_empty() {
        return HeaderTail::Bare;
    }
    let word = after
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default();
    if matches!(word, "begin" | "fork") {
        HeaderTail::Scope
    } else {
        HeaderTail::Inline
    }
}

/// Whether a line closes a block and so sits at the level of the block header
fn is_closer(kind: &LineKind) -> bool {
    match kind {
        LineKind::End | LineKind::CaseEnd | LineKind::GenerateEnd => true,
        LineKind::BlockHeader(h) => h.chained_end,
        _ => false,
    }
}

/// Join a plain `end` with a following `else` header into `end else ...`
#[must_use]
pub fn merge_end_else(lines: &[String]) -> Vec<String> {
    let classified = classify_all(lines);
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = &classified[i];
        if !line.in_comment && line.line.code == "end" && line.line.comment.is_none() {
            let next = (i + 1..lines.len()).find(|&k| classified[k].kind != LineKind::Blank);
            if let Some(k) = next {
                if let LineKind::BlockHeader(h) = classified[k].kind {
                    if h.is_else && !h.chained_end && !classified[k].in_comment {
                        out.push(format!(
                            "{}end {}",
                            line.line.indent,
                            lines[k].trim_start()
                        ));
                        i = k + 1;
                        continue;
                    }
                }
            }
        }
        out.push(lines[i].clone());
        i += 1;
    }
    out
}

/// Tracks open blocks and decides the indentation of each line
pub struct BlockIndenter<'a> {
    config: &'a Config,
    lines: &'a [String],
    classified: Vec<Classified>,
    /// Index of the next code line after each line
    next_code: Vec<Option<usize>>,
    stack: FrameStack,
    /// Completed `if` branch an `else` may still attach to
    awaiting_else: Option<Frame>,
    continuation: Option<Continuation>,
    /// Line indices of open `` `ifdef``/`` `ifndef`` directives
    directives: Vec<usize>,
    /// Comment and directive lines waiting for the next code line
    pending: Vec<(usize, Option<Indent>)>,
    /// Line that opened the block comment currently being walked
    comment_opener: Option<usize>,
    placements: Vec<Placement>,
    /// Replacement text (without indentation) for normalised lines
    contents: Vec<Option<String>>,
}

impl<'a> BlockIndenter<'a> {
    #[must_use]
    pub fn new(lines: &'a [String], config: &'a Config) -> Self {
        let classified = classify_all(lines);
        let mut next_code = vec![None; lines.len()];
        let mut upcoming = None;
        for idx in (0..lines.len()).rev() {
            next_code[idx] = upcoming;
            if !classified[idx].in_comment && !classified[idx].kind.is_trivia() {
                upcoming = Some(idx);
            }
        }
        Self {
            config,
            lines,
            classified,
            next_code,
            stack: FrameStack::new(),
            awaiting_else: None,
            continuation: None,
            directives: Vec::new(),
            pending: Vec::new(),
            comment_opener: None,
            placements: vec![Placement::Keep; lines.len()],
            contents: vec![None; lines.len()],
        }
    }

    fn unit(&self) -> usize {
        self.config.indent
    }

    fn own_indent(&self, idx: usize) -> Indent {
        Indent::of(&self.classified[idx].line.indent, self.unit())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn delta_to(&self, idx: usize, target: Indent) -> isize {
        let own = indent_width(&self.classified[idx].line.indent, self.unit());
        target.width(self.unit()) as isize - own as isize
    }

    fn next_code_text(&self, idx: usize) -> Option<&str> {
        self.next_code[idx].map(|k| self.classified[k].line.code.as_str())
    }

    /// Pop single-statement frames whose statement just ended
    ///
    /// Stops at a chainable frame, which waits for a possible `else`.
    fn complete_statement(&mut self) {
        while self.stack.top().is_some_and(|f| f.single) {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            if frame.chainable {
                self.awaiting_else = Some(frame);
                return;
            }
        }
    }

    /// The line is not an `else`: finish whatever waited for one
    fn settle_else(&mut self) {
        while self.awaiting_else.take().is_some() {
            self.complete_statement();
        }
    }

    /// Place line `idx` and resolve comments waiting in front of it
    fn place(&mut self, idx: usize, placement: Placement) {
        self.placements[idx] = placement;
        let closer = is_closer(&self.classified[idx].kind);
        for (pending, body) in std::mem::take(&mut self.pending) {
            self.placements[pending] = match body {
                None => Placement::Keep,
                Some(body) if closer => Placement::At(body),
                Some(_) => match placement {
                    Placement::At(n) => Placement::At(n),
                    _ => Placement::Keep,
                },
            };
        }
    }

    fn place_at(&mut self, idx: usize, indent: Option<Indent>) -> isize {
        match indent {
            Some(n) => {
                self.place(idx, Placement::At(n));
                self.delta_to(idx, n)
            }
            None => {
                self.place(idx, Placement::Keep);
                0
            }
        }
    }

    /// Run over all lines
    pub fn run(&mut self) {
        for idx in 0..self.lines.len() {
            self.step(idx);
        }
        // Trivia after the last code line
        for (pending, _) in std::mem::take(&mut self.pending) {
            self.placements[pending] = Placement::Keep;
        }
    }

    fn step(&mut self, idx: usize) {
        let Classified {
            kind,
            in_comment,
            opens_comment,
            ..
        } = self.classified[idx];

        if in_comment {
            self.placements[idx] = self
                .comment_opener
                .map_or(Placement::Keep, Placement::Follow);
            return;
        }
        self.comment_opener = opens_comment.then_some(idx);

        if kind.is_trivia() {
            self.step_trivia(idx, kind);
            return;
        }

        if let Some(mut cont) = self.continuation {
            self.placements[idx] = Placement::Shift(cont.delta);
            let code = self.classified[idx].line.code.clone();
            cont.state.feed(&code);
            if statement_continues(&cont.state, &code, self.next_code_text(idx)) {
                self.continuation = Some(cont);
            } else {
                self.continuation = None;
                self.finish_continuation(cont.after, &code);
            }
            return;
        }

        match kind {
            LineKind::BlockHeader(header) => self.step_header(idx, header),
            LineKind::Begin => self.step_begin(idx),
            LineKind::End => self.step_end(idx),
            LineKind::CaseHeader => {
                self.settle_else();
                let indent = self.stack.body_indent();
                self.place_at(idx, indent);
                let n = indent.unwrap_or_else(|| self.own_indent(idx));
                self.push_case(n);
            }
            LineKind::CaseItem(item) => self.step_case_item(idx, item),
            LineKind::CaseEnd => {
                self.settle_else();
                match self.stack.pop_to(BlockKind::Case) {
                    Some(frame) => {
                        self.place(idx, Placement::At(frame.indent));
                        self.complete_statement();
                    }
                    None => {
                        debug!(line = idx + 1, "endcase without open case");
                        self.place(idx, Placement::Keep);
                    }
                }
            }
            LineKind::GenerateStart => {
                self.settle_else();
                let indent = self.stack.body_indent();
                self.place_at(idx, indent);
                let n = indent.unwrap_or_else(|| self.own_indent(idx));
                self.stack
                    .push(Frame::new(BlockKind::Generate, n, n.deeper(self.unit())));
            }
            LineKind::GenerateEnd => {
                self.settle_else();
                match self.stack.pop_to(BlockKind::Generate) {
                    Some(frame) => self.place(idx, Placement::At(frame.indent)),
                    None => {
                        debug!(line = idx + 1, "endgenerate without open generate");
                        self.place(idx, Placement::Keep);
                    }
                }
            }
            LineKind::ModuleStart
            | LineKind::ModuleEnd
            | LineKind::SubprogramStart
            | LineKind::SubprogramEnd => {
                self.awaiting_else = None;
                if matches!(kind, LineKind::ModuleEnd | LineKind::SubprogramEnd)
                    && !self.stack.is_empty()
                {
                    debug!(
                        line = idx + 1,
                        open = self.stack.depth(),
                        "blocks left open at end of scope"
                    );
                    self.stack.clear();
                }
                self.place(idx, Placement::Keep);
            }
            _ => self.step_statement(idx, kind),
        }
    }

    fn step_trivia(&mut self, idx: usize, kind: LineKind) {
        if let LineKind::Directive(directive) = kind {
            self.track_directive(idx, directive);
        }
        if let Some(cont) = self.continuation {
            self.placements[idx] = Placement::Shift(cont.delta);
            return;
        }
        match kind {
            LineKind::Blank => self.placements[idx] = Placement::Keep,
            LineKind::Directive(d) if d.continues() => {}
            LineKind::Directive(DirectiveKind::Other) => self.placements[idx] = Placement::Keep,
            _ => self.pending.push((idx, self.stack.body_indent())),
        }
    }

    fn track_directive(&mut self, idx: usize, directive: DirectiveKind) {
        match directive {
            d if d.opens() => self.directives.push(idx),
            DirectiveKind::ElsIf | DirectiveKind::Else => {
                self.placements[idx] = self
                    .directives
                    .last()
                    .map_or(Placement::Keep, |&opener| Placement::Like(opener));
            }
            DirectiveKind::EndIf => {
                self.placements[idx] = self
                    .directives
                    .pop()
                    .map_or(Placement::Keep, Placement::Like);
            }
            _ => {}
        }
    }

    fn step_statement(&mut self, idx: usize, kind: LineKind) {
        self.settle_else();
        let indent = self.stack.body_indent();
        let delta = self.place_at(idx, indent);
        if indent.is_some() {
            if let LineKind::Assignment { keyword: false, .. } = kind {
                self.contents[idx] = space_assignment(self.lines[idx].trim_start());
            }
        }
        self.start_statement(idx, delta, AfterContinuation::CompleteStatement);
    }

    /// Follow a statement whose first line is `idx` over continuation lines
    fn start_statement(&mut self, idx: usize, delta: isize, after: AfterContinuation) {
        let code = self.classified[idx].line.code.clone();
        let mut state = StatementState::new();
        state.feed(&code);
        if statement_continues(&state, &code, self.next_code_text(idx)) {
            self.continuation = Some(Continuation {
                delta,
                state,
                after,
            });
        } else {
            self.finish_continuation(after, &code);
        }
    }

    fn finish_continuation(&mut self, after: AfterContinuation, last_code: &str) {
        match after {
            AfterContinuation::CompleteStatement => self.complete_statement(),
            AfterContinuation::HeaderTail {
                kind,
                indent,
                chainable,
            } => {
                let body = indent.deeper(self.unit());
                match header_tail(last_code) {
                    HeaderTail::Scope => self
                        .stack
                        .push(Frame::new(kind, indent, body).with_chain(chainable)),
                    HeaderTail::Bare => self
                        .stack
                        .push(Frame::single(kind, indent, body).with_chain(chainable)),
                    HeaderTail::Inline => {
                        self.stack
                            .push(Frame::single(kind, indent, body).with_chain(chainable));
                        self.complete_statement();
                    }
                }
            }
        }
    }

    fn step_header(&mut self, idx: usize, header: Header) {
        let indent = if header.chained_end {
            self.settle_else();
            self.pop_singles();
            match self.stack.top() {
                Some(frame) if frame.kind.closed_by_end() => {
                    let indent = frame.indent;
                    self.stack.pop();
                    self.place(idx, Placement::At(indent));
                    indent
                }
                _ => {
                    debug!(line = idx + 1, "`end else` without open block");
                    self.place(idx, Placement::Keep);
                    self.own_indent(idx)
                }
            }
        } else if header.is_else {
            match self.awaiting_else.take() {
                Some(frame) => {
                    self.place(idx, Placement::At(frame.indent));
                    frame.indent
                }
                None => self.place_header(idx),
            }
        } else {
            self.settle_else();
            self.place_header(idx)
        };
        self.push_header(idx, header, indent);
    }

    /// Place a header at the body of the innermost block, or leave it
    fn place_header(&mut self, idx: usize) -> Indent {
        let indent = self.stack.body_indent();
        self.place_at(idx, indent);
        indent.unwrap_or_else(|| self.own_indent(idx))
    }

    fn push_header(&mut self, idx: usize, header: Header, indent: Indent) {
        let body = indent.deeper(self.unit());
        let chain = header.chainable;
        let delta = match self.placements[idx] {
            Placement::At(_) => self.delta_to(idx, indent),
            _ => 0,
        };
        if header.opens_scope {
            self.stack
                .push(Frame::new(header.kind, indent, body).with_chain(chain));
        } else if !header.complete {
            self.start_statement(
                idx,
                delta,
                AfterContinuation::HeaderTail {
                    kind: header.kind,
                    indent,
                    chainable: chain,
                },
            );
        } else if header.inline_statement {
            self.stack
                .push(Frame::single(header.kind, indent, body).with_chain(chain));
            self.start_statement(idx, delta, AfterContinuation::CompleteStatement);
        } else {
            self.stack
                .push(Frame::single(header.kind, indent, body).with_chain(chain));
        }
    }

    fn pop_singles(&mut self) {
        while self.stack.top().is_some_and(|f| f.single) {
            self.stack.pop();
        }
    }

    fn step_begin(&mut self, idx: usize) {
        self.settle_else();
        if let Some(frame) = self.stack.top_mut() {
            if frame.single {
                frame.single = false;
                let indent = frame.indent;
                self.place(idx, Placement::At(indent));
                return;
            }
        }
        let indent = self.stack.body_indent();
        self.place_at(idx, indent);
        let n = indent.unwrap_or_else(|| self.own_indent(idx));
        self.stack
            .push(Frame::new(BlockKind::Block, n, n.deeper(self.unit())));
    }

    fn step_end(&mut self, idx: usize) {
        self.settle_else();
        self.pop_singles();
        let Some(top) = self.stack.top().copied() else {
            debug!(line = idx + 1, "closer without open block");
            self.place(idx, Placement::Keep);
            return;
        };

        if top.kind.closed_by_end() {
            self.stack.pop();
            self.place(idx, Placement::At(top.indent));
            if top.chainable {
                self.awaiting_else = Some(top);
            } else {
                self.complete_statement();
            }
            return;
        }

        if top.kind == BlockKind::Case {
            let next_kind = self.next_code[idx].map(|k| self.classified[k].kind);
            if matches!(next_kind, Some(LineKind::CaseItem(_) | LineKind::CaseEnd)) {
                self.place(idx, Placement::At(top.body));
                return;
            }
        }
        debug!(line = idx + 1, open = %top.kind, "closer does not match open block");
        self.place(idx, Placement::Keep);
    }

    fn step_case_item(&mut self, idx: usize, item: CaseItem) {
        self.settle_else();
        if !self.stack.contains(BlockKind::Case) {
            // A labelled statement or named block outside any case
            if item.opens_scope {
                self.step_begin(idx);
            } else {
                self.step_statement(idx, LineKind::Other);
            }
            return;
        }
        while self.stack.top().is_some_and(|f| f.kind != BlockKind::Case) {
            self.stack.pop();
        }
        let Some(case) = self.stack.top().copied() else {
            return;
        };
        let at = case.body;
        self.place(idx, Placement::At(at));
        self.contents[idx] = Some(self.case_item_content(idx, item.colon));

        let body = at.deeper(self.unit());
        if item.opens_scope {
            self.stack.push(Frame::new(BlockKind::CaseItem, at, body));
            return;
        }
        if !item.has_statement {
            self.stack.push(Frame::single(BlockKind::CaseItem, at, body));
            return;
        }
        let rest = Line::parse(&self.classified[idx].line.code[item.colon + 1..]);
        match classify(&rest) {
            LineKind::BlockHeader(header) if !header.is_else => self.push_header(idx, header, at),
            LineKind::CaseHeader => {
                // Nested case: `endcase` closes it at the label's indentation
                // and then completes the item
                self.stack.push(Frame::single(BlockKind::CaseItem, at, body));
                self.push_case(at);
            }
            _ => {
                let delta = self.delta_to(idx, at);
                self.start_statement(idx, delta, AfterContinuation::CompleteStatement);
            }
        }
    }

    /// Open a case statement whose header sits at `indent`
    fn push_case(&mut self, indent: Indent) {
        let items = if self.config.indent_case {
            indent.deeper(self.unit())
        } else {
            indent
        };
        self.stack.push(Frame::new(BlockKind::Case, indent, items));
    }

    /// Columns line `idx` moves by once placed
    fn resolved_delta(&self, idx: usize) -> isize {
        match self.resolve(idx) {
            Placement::At(n) => self.delta_to(idx, n),
            Placement::Shift(delta) => delta,
            _ => 0,
        }
    }

    /// Case item text with the label colon spaced per configuration
    fn case_item_content(&self, idx: usize, colon: usize) -> String {
        let line = &self.classified[idx].line;
        let label = line.code[..colon].trim_end();
        let rest = line.code[colon + 1..].trim_start();
        let sep = if self.config.case_item_space { " :" } else { ":" };
        let mut content = format!("{label}{sep}");
        if !rest.is_empty() {
            content.push(' ');
            content.push_str(rest);
        }
        if let Some(comment) = &line.comment {
            content.push(' ');
            content.push_str(comment);
        }
        content
    }

    fn resolve(&self, idx: usize) -> Placement {
        let mut placement = self.placements[idx];
        let mut hops = 0;
        while let Placement::Like(other) = placement {
            hops += 1;
            if hops > self.lines.len() {
                return Placement::Keep;
            }
            placement = self.placements[other];
        }
        placement
    }

    /// Render the final lines
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        (0..self.lines.len())
            .map(|idx| {
                let raw = &self.lines[idx];
                let body = self.contents[idx]
                    .as_deref()
                    .unwrap_or_else(|| raw.trim_start());
                match self.resolve(idx) {
                    Placement::Keep if self.contents[idx].is_none() => raw.clone(),
                    Placement::Keep => {
                        let indent = &self.classified[idx].line.indent;
                        format!("{indent}{body}")
                    }
                    Placement::At(_) if body.is_empty() => String::new(),
                    Placement::At(n) => format!("{}{body}", n.render()),
                    Placement::Shift(delta) => shift_line(raw, delta, self.config.indent),
                    Placement::Follow(opener) => match self.resolved_delta(opener) {
                        0 => raw.clone(),
                        delta => shift_line(raw, delta, self.config.indent),
                    },
                    Placement::Like(_) => raw.clone(),
                }
            })
            .collect()
    }
}

/// Put a space on both sides of a bare assignment operator where one is missing
fn space_assignment(body: &str) -> Option<String> {
    let (pos, op) = find_assignment_op(body)?;
    let end = pos + op.len();
    let before = body[..pos].ends_with(char::is_whitespace);
    let after = body[end..].starts_with(char::is_whitespace) || body[end..].is_empty();
    if before && after {
        return None;
    }
    let mut spaced = String::with_capacity(body.len() + 2);
    spaced.push_str(&body[..pos]);
    if !before {
        spaced.push(' ');
    }
    spaced.push_str(op.as_str());
    if !after {
        spaced.push(' ');
    }
    spaced.push_str(&body[end..]);
    Some(spaced)
}

/// Re-indent procedural, case and generate blocks
#[must_use]
pub fn indent_blocks(lines: &[String], config: &Config) -> Vec<String> {
    let merged = merge_end_else(lines);
    let mut indenter = BlockIndenter::new(&merged, config);
    indenter.run();
    indenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent(input: &[&str]) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        indent_blocks(&lines, &Config::default())
    }

    #[test]
    fn test_procedural_block_body() {
        assert_eq!(
            indent(&["  always @(posedge clk) begin", "q <= d;", "      r <= q;", "end"]),
            vec![
                "  always @(posedge clk) begin",
                "      q <= d;",
                "      r <= q;",
                "  end",
            ]
        );
    }

    #[test]
    fn test_if_else_chain() {
        assert_eq!(
            indent(&[
                "always @* begin",
                "if (a) begin",
                "y = 1;",
                "end",
                "else if (b)",
                "y = 2;",
                "else",
                "y = 3;",
                "z = 0;",
                "end",
            ]),
            vec![
                "always @* begin",
                "    if (a) begin",
                "        y = 1;",
                "    end else if (b)",
                "        y = 2;",
                "    else",
                "        y = 3;",
                "    z = 0;",
                "end",
            ]
        );
    }

    #[test]
    fn test_case_items() {
        assert_eq!(
            indent(&[
                "always @* begin",
                "case (sel)",
                "2'b00 : y = a;",
                "2'b01: begin",
                "y = b;",
                "end",
                "default:",
                "y = 0;",
                "endcase",
                "end",
            ]),
            vec![
                "always @* begin",
                "    case (sel)",
                "        2'b00: y = a;",
                "        2'b01: begin",
                "            y = b;",
                "        end",
                "        default:",
                "            y = 0;",
                "    endcase",
                "end",
            ]
        );
    }

    #[test]
    fn test_case_item_space_option() {
        let config = Config {
            case_item_space: true,
            ..Config::default()
        };
        let lines: Vec<String> = ["initial begin", "case (s)", "A: x = 1;", "endcase", "end"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(indent_blocks(&lines, &config)[2], "        A : x = 1;");
    }

    #[test]
    fn test_indent_case_off() {
        let config = Config {
            indent_case: false,
            ..Config::default()
        };
        let lines: Vec<String> = ["initial begin", "case (s)", "A: x = 1;", "endcase", "end"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(indent_blocks(&lines, &config)[2], "    A: x = 1;");
    }

    #[test]
    fn test_continuation_keeps_relative_layout() {
        assert_eq!(
            indent(&["initial begin", "x = a |", "    b;", "end"]),
            vec!["initial begin", "    x = a |", "        b;", "end"]
        );
    }

    #[test]
    fn test_comments_follow_next_code() {
        assert_eq!(
            indent(&[
                "initial begin",
                "// body",
                "x = 1;",
                "  // trailing body comment",
                "end",
                "// top level",
            ]),
            vec![
                "initial begin",
                "    // body",
                "    x = 1;",
                "    // trailing body comment",
                "end",
                "// top level",
            ]
        );
    }

    #[test]
    fn test_ifdef_inside_block() {
        assert_eq!(
            indent(&[
                "initial begin",
                "`ifdef SIM",
                "x = 1;",
                "`else // SIM",
                "x = 2;",
                "`endif // SIM",
                "end",
            ]),
            vec![
                "initial begin",
                "    `ifdef SIM",
                "    x = 1;",
                "    `else // SIM",
                "    x = 2;",
                "    `endif // SIM",
                "end",
            ]
        );
    }

    #[test]
    fn test_unbalanced_closer_kept() {
        assert_eq!(indent(&["  end"]), vec!["  end"]);
        assert_eq!(indent(&["endcase"]), vec!["endcase"]);
    }

    #[test]
    fn test_top_level_lines_keep_indent() {
        let input = ["module m;", "  wire a;", "    assign a=b;", "endmodule"];
        assert_eq!(indent(&input), input);
    }

    #[test]
    fn test_assignment_spacing_inserted() {
        assert_eq!(
            indent(&["initial begin", "x=1;", "y  <=  2;", "end"]),
            vec!["initial begin", "    x = 1;", "    y  <=  2;", "end"]
        );
    }

    #[test]
    fn test_begin_on_next_line() {
        assert_eq!(
            indent(&["always @(posedge clk)", "begin", "q <= d;", "end"]),
            vec!["always @(posedge clk)", "begin", "    q <= d;", "end"]
        );
    }

    #[test]
    fn test_generate_region() {
        assert_eq!(
            indent(&[
                "generate",
                "for (i = 0; i < 4; i = i + 1) begin : g",
                "assign y[i] = a[i];",
                "end",
                "endgenerate",
            ]),
            vec![
                "generate",
                "    for (i = 0; i < 4; i = i + 1) begin : g",
                "        assign y[i] = a[i];",
                "    end",
                "endgenerate",
            ]
        );
    }

    #[test]
    fn test_multi_line_header() {
        assert_eq!(
            indent(&["initial begin", "if (a &&", "  b) begin", "x = 1;", "end", "end"]),
            vec![
                "initial begin",
                "    if (a &&",
                "      b) begin",
                "        x = 1;",
                "    end",
                "end",
            ]
        );
    }

    #[test]
    fn test_merge_end_else() {
        let lines: Vec<String> = ["  end", "", "  else begin"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(merge_end_else(&lines), vec!["  end else begin"]);
    }

    #[test]
    fn test_block_comment_interior_moves_with_opener() {
        assert_eq!(
            indent(&["initial begin", "/* a", "   b */", "end"]),
            vec!["initial begin", "    /* a", "       b */", "end"]
        );
        assert_eq!(
            indent(&["initial begin", "x = 1; /* a", " * b", " */", "end"]),
            vec!["initial begin", "    x = 1; /* a", "     * b", "     */", "end"]
        );
    }

    #[test]
    fn test_nested_case_in_item() {
        assert_eq!(
            indent(&[
                "always @* begin",
                "case (a)",
                "0: case (b)",
                "1: y = 1;",
                "endcase",
                "default: y = 0;",
                "endcase",
                "end",
            ]),
            vec![
                "always @* begin",
                "    case (a)",
                "        0: case (b)",
                "            1: y = 1;",
                "        endcase",
                "        default: y = 0;",
                "    endcase",
                "end",
            ]
        );
    }

    #[test]
    fn test_scoped_header_in_item() {
        assert_eq!(
            indent(&[
                "initial begin",
                "case (a)",
                "0: if (e) begin",
                "y = 1;",
                "end",
                "default: y = 0;",
                "endcase",
                "end",
            ]),
            vec![
                "initial begin",
                "    case (a)",
                "        0: if (e) begin",
                "            y = 1;",
                "        end",
                "        default: y = 0;",
                "    endcase",
                "end",
            ]
        );
    }

    #[test]
    fn test_tab_indentation_kept() {
        assert_eq!(
            indent(&["\talways @(posedge clk) begin", "\t\tq <= d;", "\tend"]),
            vec!["\talways @(posedge clk) begin", "\t\tq <= d;", "\tend"]
        );
        assert_eq!(
            indent(&["\tinitial begin", "x = 1;", "  end"]),
            vec!["\tinitial begin", "\t\tx = 1;", "\tend"]
        );
    }

    #[test]
    fn test_space_assignment() {
        assert_eq!(space_assignment("a=b;").as_deref(), Some("a = b;"));
        assert_eq!(space_assignment("a <=b;").as_deref(), Some("a <= b;"));
        assert_eq!(space_assignment("a = b;"), None);
    }

    #[test]
    fn test_header_tail() {
        assert_eq!(header_tail("b)"), HeaderTail::Bare);
        assert_eq!(header_tail("b) begin : blk"), HeaderTail::Scope);
        assert_eq!(header_tail("b) x = 1;"), HeaderTail::Inline);
    }
}
