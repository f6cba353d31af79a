//! Inline directive parsing for `// vprettier:` comments
//!
//! Supports in-file configuration overrides via special comments:
//! `// vprettier: --indent 2 --no-align`
//!
//! `// vprettier: off` leaves the whole file untouched.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;

/// Pattern to match vprettier directives
static VPRETTIER_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*//\s*vprettier:\s*(.*?)\s*$").unwrap());

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveOverrides {
    /// `off`: do not format this file at all
    pub disabled: bool,
    pub indent: Option<usize>,
    pub line_length: Option<usize>,
    pub max_blank_lines: Option<isize>,
    pub indent_blocks: Option<bool>,
    pub align: Option<bool>,
    pub insert_begin_end: Option<bool>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.disabled
            && self.indent.is_none()
            && self.line_length.is_none()
            && self.max_blank_lines.is_none()
            && self.indent_blocks.is_none()
            && self.align.is_none()
            && self.insert_begin_end.is_none()
    }

    /// Apply the overrides on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(v) = self.indent {
            config.indent = v;
        }
        if let Some(v) = self.line_length {
            config.line_length = v;
        }
        if let Some(v) = self.max_blank_lines {
            config.max_blank_lines = v;
        }
        if let Some(v) = self.indent_blocks {
            config.indent_blocks = v;
        }
        if let Some(v) = self.insert_begin_end {
            config.insert_begin_end = v;
        }
        if let Some(v) = self.align {
            config.align_assign = v;
            config.align_declaration = v;
            config.align_parameter = v;
            config.align_port = v;
            config.format_instance = v;
        }
    }
}

/// Check if a line contains a vprettier directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    VPRETTIER_DIRECTIVE_RE.is_match(line)
}

/// Parse a vprettier directive line and return option overrides
///
/// # Returns
/// * `Some(DirectiveOverrides)` if the line is a valid directive
/// * `None` if the line is not a directive or sets nothing
#[must_use]
pub fn parse_directive(line: &str) -> Option<DirectiveOverrides> {
    let caps = VPRETTIER_DIRECTIVE_RE.captures(line)?;
    let args_str = caps.get(1)?.as_str();

    parse_directive_args(args_str)
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let tokens: Vec<&str> = args_str.split_whitespace().collect();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        match token {
            "off" | "--off" => overrides.disabled = true,
            "-i" | "--indent" => {
                i += 1;
                if i < tokens.len() {
                    overrides.indent = tokens[i].parse().ok();
                }
            }
            "-l" | "--line-length" => {
                i += 1;
                if i < tokens.len() {
                    overrides.line_length = tokens[i].parse().ok();
                }
            }
            "-b" | "--max-blank-lines" => {
                i += 1;
                if i < tokens.len() {
                    overrides.max_blank_lines = tokens[i].parse().ok();
                }
            }
            "--no-indent" | "--no-indent-blocks" => overrides.indent_blocks = Some(false),
            "--indent-blocks" => overrides.indent_blocks = Some(true),
            "--no-align" => overrides.align = Some(false),
            "--align" => overrides.align = Some(true),
            "--no-begin-end" => overrides.insert_begin_end = Some(false),
            "--begin-end" => overrides.insert_begin_end = Some(true),
            _ => {
                // Unknown option, skip
            }
        }
        i += 1;
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan input for vprettier directives and return the first found
///
/// Only the first directive is used (subsequent ones are ignored).
pub fn find_directive<R: std::io::BufRead>(input: &mut R) -> Option<DirectiveOverrides> {
    let mut buffer = String::new();

    while input.read_line(&mut buffer).ok()? > 0 {
        if is_directive_line(&buffer) {
            return parse_directive(&buffer);
        }
        buffer.clear();
    }

    None
}

/// Find the first directive in already loaded lines
#[must_use]
pub fn find_directive_in_lines(lines: &[String]) -> Option<DirectiveOverrides> {
    lines
        .iter()
        .find(|line| is_directive_line(line))
        .and_then(|line| parse_directive(line))
}
