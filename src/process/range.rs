//! Range formatting
//!
//! An editor selection is formatted without the rest of the document. When
//! the selection holds whole structures (a block, a case statement, a module,
//! an instantiation) it is formatted like a document; otherwise only the
//! passes that do not depend on the enclosing structure run.

use tracing::debug;

use crate::config::Config;
use crate::format::begin_end::body_extent;
use crate::parser::classify::{classify_all, LineKind};
use crate::parser::line::bracket_balance;
use crate::parser::patterns::INSTANCE_HEAD_RE;
use crate::process::pipeline::format_lines;

/// Whether `lines` open and close at least one structure and nothing more
#[must_use]
pub fn is_complete_structure(lines: &[String]) -> bool {
    let classified = classify_all(lines);
    let mut scope = 0i32;
    let mut brackets = 0i32;
    let mut opened = false;

    for (idx, entry) in classified.iter().enumerate() {
        if entry.in_comment || entry.kind.is_trivia() {
            continue;
        }
        let delta = match entry.kind {
            LineKind::ModuleStart => 1,
            LineKind::ModuleEnd => -1,
            kind => kind.scope_delta(),
        };
        scope += delta;
        brackets += bracket_balance(&entry.line.code);
        if scope < 0 || brackets < 0 {
            return false;
        }
        opened |= delta > 0
            || body_extent(&classified, idx).is_some()
            || (entry.kind == LineKind::Other && INSTANCE_HEAD_RE.is_match(&entry.line.code));
    }
    opened && scope == 0 && brackets == 0
}

/// Format a selection of lines
///
/// Always returns the replacement for the selection, which may equal the input.
#[must_use]
pub fn format_line_range(lines: &[String], config: &Config) -> Vec<String> {
    let complete = is_complete_structure(lines);
    debug!(lines = lines.len(), complete, "formatting line range");
    let config = if complete {
        config.clone()
    } else {
        config.for_fragment()
    };
    format_lines(lines, &config).into_lines(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &[&str]) -> Vec<String> {
        input.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_complete_block_detected() {
        assert!(is_complete_structure(&lines(&[
            "always @(posedge clk) begin",
            "q <= d;",
            "end",
        ])));
        assert!(is_complete_structure(&lines(&["if (a)", "  x = 1;"])));
        assert!(is_complete_structure(&lines(&["fifo u0 (", ".a(b)", ");"])));
    }

    #[test]
    fn test_fragments_detected() {
        assert!(!is_complete_structure(&lines(&["q <= d;", "r <= q;"])));
        assert!(!is_complete_structure(&lines(&["q <= d;", "end"])));
        assert!(!is_complete_structure(&lines(&["always @* begin", "q = d;"])));
        assert!(!is_complete_structure(&lines(&[])));
    }

    #[test]
    fn test_complete_range_gets_full_pipeline() {
        assert_eq!(
            format_line_range(&lines(&["always @(posedge clk)", "data <= 1;"]), &Config::default()),
            lines(&["always @(posedge clk) begin", "    data <= 1;", "end"])
        );
    }

    #[test]
    fn test_fragment_only_aligned() {
        assert_eq!(
            format_line_range(&lines(&["    a=b;", "  ccc=d;", "end"]), &Config::default()),
            lines(&["    a=b;", "  ccc=d;", "end"])
        );
        assert_eq!(
            format_line_range(
                &lines(&["  assign a=b;", "  assign data=result;"]),
                &Config::default()
            ),
            lines(&["  assign a    = b;", "  assign data = result;"])
        );
    }
}
