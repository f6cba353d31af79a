//! Formatting pipeline
//!
//! Runs the passes in order, each a plain line-to-line function:
//! - `begin`/`end` synthesis (bounded fixed point)
//! - Segmentation: annotation, blank-line compression, group alignment, module headers
//! - Block indentation
//! - Instantiation alignment
//! - Trailing-comment column

use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::Config;
use crate::directive::find_directive_in_lines;
use crate::format::{align_comment_column, align_instances, indent_blocks, insert_begin_end};
use crate::process::segment::segment;
use crate::Result;

/// Outcome of formatting a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatResult {
    /// Replacement lines, different from the input
    Changed(Vec<String>),
    /// Output would be identical to the input
    NoChange,
}

impl FormatResult {
    #[must_use]
    pub fn is_changed(&self) -> bool {
        matches!(self, FormatResult::Changed(_))
    }

    /// Formatted lines, falling back to `original` when nothing changed
    #[must_use]
    pub fn into_lines(self, original: &[String]) -> Vec<String> {
        match self {
            FormatResult::Changed(lines) => lines,
            FormatResult::NoChange => original.to_vec(),
        }
    }
}

/// Run every enabled pass over `lines`
///
/// `begin`/`end` synthesis runs first so segmentation already sees every
/// single-statement body inside the block it will end up in.
#[must_use]
pub fn run_passes(lines: &[String], config: &Config) -> Vec<String> {
    let mut current = if config.insert_begin_end {
        segment(&insert_begin_end(lines, config), config)
    } else {
        segment(lines, config)
    };
    if config.indent_blocks {
        current = indent_blocks(&current, config);
    }
    if config.format_instance {
        current = align_instances(&current, config);
    }
    align_comment_column(&current, config)
}

/// Format a whole document given as lines without line terminators
#[must_use]
pub fn format_lines(lines: &[String], config: &Config) -> FormatResult {
    let formatted = run_passes(lines, config);
    if formatted == lines {
        FormatResult::NoChange
    } else {
        FormatResult::Changed(formatted)
    }
}

/// Split text into lines, reporting the line ending and final newline
fn split_text(text: &str) -> (Vec<String>, &'static str, bool) {
    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = text.ends_with('\n');
    let body = text.strip_suffix('\n').unwrap_or(text);
    if body.is_empty() && !trailing {
        return (Vec::new(), eol, false);
    }
    let lines = body
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    (lines, eol, trailing)
}

/// Format a whole document, keeping its line endings
///
/// Returns `None` when the text is already formatted.
#[must_use]
pub fn format_text(text: &str, config: &Config) -> Option<String> {
    let (lines, eol, trailing) = split_text(text);
    match format_lines(&lines, config) {
        FormatResult::NoChange => None,
        FormatResult::Changed(formatted) => {
            let mut out = formatted.join(eol);
            if trailing {
                out.push_str(eol);
            }
            (out != text).then_some(out)
        }
    }
}

/// Format a file read from `input` into `output`
///
/// An in-file `// vprettier:` directive is applied on top of `config`;
/// `// vprettier: off` copies the input unchanged.
pub fn format_file<R: BufRead, W: Write>(
    mut input: R,
    output: &mut W,
    config: &Config,
    filename: &str,
) -> Result<()> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;

    let (lines, _, _) = split_text(&text);
    let mut config = config.clone();
    if let Some(overrides) = find_directive_in_lines(&lines) {
        if overrides.disabled {
            debug!(file = filename, "formatting disabled by directive");
            output.write_all(text.as_bytes())?;
            return Ok(());
        }
        overrides.apply(&mut config);
    }

    match format_text(&text, &config) {
        Some(formatted) => output.write_all(formatted.as_bytes())?,
        None => output.write_all(text.as_bytes())?,
    }
    Ok(())
}
