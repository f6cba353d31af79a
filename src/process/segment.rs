//! Group segmenter
//!
//! One forward pass that cuts the line stream into alignment groups and
//! hands each group to its engine:
//! - runs of assignments, declarations, parameters and ports
//! - module headers, from the `module` line to the `;` closing the port list
//!
//! Conditional directives are annotated in the same pass, and runs of blank
//! lines are compressed to the configured limit.

use crate::config::Config;
use crate::format::{
    align_assignments, align_declarations, align_parameters, align_ports, format_header,
    DirectiveAnnotator, ListStyle,
};
use crate::parser::classify::{classify_all, Classified, LineKind};
use crate::parser::line::{statement_continues, StatementState};

/// Kind of an open alignment group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    /// `assign` statements, or bare assignments
    Assign { keyword: bool },
    Declaration,
    Parameter,
    Port,
}

impl GroupKind {
    fn of(kind: LineKind) -> Option<Self> {
        match kind {
            LineKind::Assignment { keyword, .. } => Some(GroupKind::Assign { keyword }),
            LineKind::Declaration => Some(GroupKind::Declaration),
            LineKind::Parameter => Some(GroupKind::Parameter),
            LineKind::Port => Some(GroupKind::Port),
            _ => None,
        }
    }
}

/// Lines collected for one engine
#[derive(Debug)]
struct Group {
    kind: GroupKind,
    lines: Vec<String>,
    /// Statement still waiting for its terminator
    statement: Option<StatementState>,
    /// Consecutive comment/directive lines at the end of the group
    trivia_run: usize,
    /// Blank lines absorbed so far
    blank_lines: usize,
    /// Flush as soon as the current statement ends
    sealed: bool,
}

impl Group {
    fn new(kind: GroupKind, sealed: bool) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            statement: None,
            trivia_run: 0,
            blank_lines: 0,
            sealed,
        }
    }

    fn is_continuing(&self) -> bool {
        self.statement.is_some()
    }
}

/// Module header being accumulated
#[derive(Debug)]
struct HeaderAccumulator {
    lines: Vec<String>,
    state: StatementState,
}

/// State of one segmentation pass
pub struct Segmenter<'a> {
    config: &'a Config,
    classified: Vec<Classified>,
    next_code: Vec<Option<usize>>,
    annotator: DirectiveAnnotator,
    header: Option<HeaderAccumulator>,
    group: Option<Group>,
    /// Statement outside any group still waiting for its terminator
    passthrough: Option<StatementState>,
    blank_run: usize,
    block_depth: usize,
    function_depth: usize,
    /// The next statement is the single body of a header or case label
    seal_next: bool,
    out: Vec<String>,
}

impl<'a> Segmenter<'a> {
    #[must_use]
    pub fn new(lines: &[String], config: &'a Config) -> Self {
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
            classified,
            next_code,
            annotator: DirectiveAnnotator::new(),
            header: None,
            group: None,
            passthrough: None,
            blank_run: 0,
            block_depth: 0,
            function_depth: 0,
            seal_next: false,
            out: Vec::with_capacity(lines.len()),
        }
    }

    fn next_code_text(&self, idx: usize) -> Option<&str> {
        self.next_code[idx].map(|k| self.classified[k].line.code.as_str())
    }

    /// Feed `code` into `state`; `None` once the statement has ended
    fn advance(&self, mut state: StatementState, idx: usize) -> Option<StatementState> {
        let code = &self.classified[idx].line.code;
        state.feed(code);
        statement_continues(&state, code, self.next_code_text(idx)).then_some(state)
    }

    /// Segment all lines
    #[must_use]
    pub fn run(mut self, lines: &[String]) -> Vec<String> {
        for (idx, raw) in lines.iter().enumerate() {
            let text = if self.config.trim_trailing_whitespace {
                raw.trim_end()
            } else {
                raw.as_str()
            };
            let in_comment = self.classified[idx].in_comment;
            let text = if self.config.annotate_ifdef && !in_comment {
                self.annotator.annotate(text)
            } else {
                text.to_string()
            };
            self.step(idx, text);
        }
        self.flush_header();
        self.flush_group();
        self.out
    }

    fn step(&mut self, idx: usize, text: String) {
        let Classified {
            kind, in_comment, ..
        } = self.classified[idx];

        if let Some(header) = self.header.as_mut() {
            header.lines.push(text);
            if !in_comment {
                header.state.feed(&self.classified[idx].line.code);
            }
            if header.state.is_terminated() {
                self.flush_header();
            }
            return;
        }

        if kind == LineKind::Blank && !in_comment {
            self.step_blank(text);
            return;
        }
        self.blank_run = 0;

        // Inside an unterminated statement every line belongs to it
        if let Some(state) = self.passthrough {
            self.passthrough = if in_comment || kind.is_trivia() {
                Some(state)
            } else {
                self.advance(state, idx)
            };
            self.out.push(text);
            return;
        }
        if let Some(state) = self.group.as_ref().and_then(|g| g.statement) {
            let next = if in_comment || kind.is_trivia() {
                Some(state)
            } else {
                self.advance(state, idx)
            };
            if let Some(group) = self.group.as_mut() {
                group.lines.push(text);
                group.statement = next;
                if next.is_none() && group.sealed {
                    self.flush_group();
                }
            }
            return;
        }

        if in_comment || kind.is_trivia() {
            self.step_trivia(text);
            return;
        }

        match GroupKind::of(kind) {
            Some(GroupKind::Assign { keyword: false }) if !self.groups_bare_assignments() => {
                self.passthrough_line(idx, kind, text);
            }
            Some(group_kind) => self.step_group(idx, group_kind, text),
            None => self.passthrough_line(idx, kind, text),
        }
    }

    /// Bare assignments are statements inside procedural code only
    fn groups_bare_assignments(&self) -> bool {
        self.block_depth > 0 || self.function_depth > 0 || self.seal_next
    }

    fn step_blank(&mut self, text: String) {
        self.blank_run += 1;
        let over_limit = self
            .config
            .blank_line_limit()
            .is_some_and(|limit| self.blank_run > limit);
        if self.passthrough.is_some() {
            if !over_limit {
                self.out.push(text);
            }
            return;
        }
        let absorb_limit = self.config.group_blank_lines;
        if let Some(group) = self.group.as_mut() {
            if group.is_continuing() || group.blank_lines < absorb_limit {
                if !group.is_continuing() {
                    group.blank_lines += 1;
                }
                if !over_limit {
                    group.lines.push(text);
                }
                return;
            }
        }
        self.flush_group();
        if !over_limit {
            self.out.push(text);
        }
    }

    fn step_trivia(&mut self, text: String) {
        let gap = self.config.port_group_gap;
        let past_gap = self
            .group
            .as_ref()
            .is_some_and(|g| g.kind == GroupKind::Port && g.trivia_run >= gap);
        if past_gap {
            self.flush_group();
        }
        match self.group.as_mut() {
            Some(group) => {
                group.trivia_run += 1;
                group.lines.push(text);
            }
            None => self.out.push(text),
        }
    }

    fn step_group(&mut self, idx: usize, kind: GroupKind, text: String) {
        let sealed = std::mem::take(&mut self.seal_next);
        let extends = self
            .group
            .as_ref()
            .is_some_and(|g| g.kind == kind && !g.sealed && !sealed);
        if !extends {
            self.flush_group();
            self.group = Some(Group::new(kind, sealed));
        }
        let statement = self.advance(StatementState::new(), idx);
        if let Some(group) = self.group.as_mut() {
            group.lines.push(text);
            group.trivia_run = 0;
            group.statement = statement;
            if statement.is_none() && group.sealed {
                self.flush_group();
            }
        }
    }

    fn passthrough_line(&mut self, idx: usize, kind: LineKind, text: String) {
        self.flush_group();
        self.seal_next = false;
        match kind {
            LineKind::ModuleStart => {
                self.block_depth = 0;
                self.function_depth = 0;
                let mut state = StatementState::new();
                state.feed(&self.classified[idx].line.code);
                self.header = Some(HeaderAccumulator {
                    lines: vec![text],
                    state,
                });
                if state.is_terminated() {
                    self.flush_header();
                }
                return;
            }
            LineKind::ModuleEnd => {
                self.block_depth = 0;
                self.function_depth = 0;
            }
            LineKind::SubprogramStart => self.function_depth += 1,
            LineKind::SubprogramEnd => self.function_depth = self.function_depth.saturating_sub(1),
            LineKind::BlockHeader(h) => {
                self.seal_next = h.is_bare();
                self.shift_depth(kind.scope_delta());
            }
            LineKind::CaseItem(item) => {
                self.seal_next = !item.opens_scope && !item.has_statement;
                self.shift_depth(kind.scope_delta());
            }
            _ => self.shift_depth(kind.scope_delta()),
        }
        self.passthrough = self.advance(StatementState::new(), idx);
        self.out.push(text);
    }

    fn shift_depth(&mut self, delta: i32) {
        self.block_depth = self.block_depth.saturating_add_signed(delta as isize);
    }

    fn flush_header(&mut self) {
        let Some(header) = self.header.take() else {
            return;
        };
        if self.config.format_module_header && header.state.is_terminated() {
            self.out.extend(format_header(&header.lines, self.config));
        } else {
            self.out.extend(header.lines);
        }
    }

    fn flush_group(&mut self) {
        let Some(group) = self.group.take() else {
            return;
        };
        let config = self.config;
        let lines = match group.kind {
            GroupKind::Assign { .. } if config.align_assign => {
                align_assignments(&group.lines, config)
            }
            GroupKind::Declaration if config.align_declaration => {
                align_declarations(&group.lines, config)
            }
            GroupKind::Parameter if config.align_parameter => {
                align_parameters(&group.lines, config, ListStyle::Statements)
            }
            GroupKind::Port if config.align_port => {
                align_ports(&group.lines, config, ListStyle::Statements)
            }
            _ => group.lines,
        };
        self.out.extend(lines);
    }
}

/// Run the segmenter over a whole line stream
#[must_use]
pub fn segment(lines: &[String], config: &Config) -> Vec<String> {
    Segmenter::new(lines, config).run(lines)
}
