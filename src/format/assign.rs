/// Assignment alignment
///
/// Lines up the `=` / `<=` operators of a group of consecutive assignments:
///
/// ```text
/// assign a    = b;
/// assign data = result;
/// ```
///
/// The `assign` keyword is treated as a fixed-width label so the remainder of
/// a keyword statement lines up like a plain left-hand side. Continuation lines
/// of a multi-line right-hand side start one column past the operator and keep
/// their relative layout.
use crate::config::Config;
use crate::format::columns::{
    column_width, finish, pad, shift_block, split_statements, ListStyle, Piece, Rendered, Slot,
};
use crate::parser::line::{find_assignment_op, find_top_level, indent_width, text_width, AssignOp, Line};
use crate::parser::patterns::FIRST_WORD_RE;

/// One assignment split into its columns
struct AssignRow {
    indent: String,
    label: &'static str,
    lhs: String,
    op: AssignOp,
    rhs: String,
    comment: Option<String>,
    continuation: Vec<String>,
}

/// Split the first line of an assignment statement
fn parse_row(code: &str, multi_line: bool) -> Option<(&'static str, String, AssignOp, String)> {
    let (label, body) = match FIRST_WORD_RE.captures(code).and_then(|c| c.get(1)) {
        Some(word) if word.as_str() == "assign" => ("assign ", &code[word.end()..]),
        _ => ("", code),
    };
    let (pos, op) = find_assignment_op(body)?;
    let lhs = body[..pos].trim();
    let rhs = body[pos + op.len()..].trim();
    if lhs.is_empty() {
        return None;
    }
    // Code after the terminator belongs to another statement
    if let Some(semi) = find_top_level(rhs, ';') {
        if semi + 1 != rhs.len() || multi_line {
            return None;
        }
    }
    Some((label, lhs.to_string(), op, rhs.to_string()))
}

/// Align a group of assignment statements
///
/// Lines that do not parse as an assignment are passed through unchanged.
#[must_use]
pub fn align_assignments(lines: &[String], config: &Config) -> Vec<String> {
    enum Entry {
        Raw(String),
        Row(AssignRow),
        Passthrough(Vec<String>),
    }

    let pieces = split_statements(lines, ListStyle::Statements);
    let mut indent: Option<String> = None;
    let mut entries = Vec::with_capacity(pieces.len());

    for piece in pieces {
        match piece {
            Piece::Trivia(idx) => entries.push(Entry::Raw(lines[idx].clone())),
            Piece::Statement(range) => {
                let first = Line::parse(&lines[range.start]);
                let multi_line = range.len() > 1;
                match parse_row(&first.code, multi_line) {
                    Some((label, lhs, op, rhs)) => {
                        let indent = indent.get_or_insert_with(|| first.indent.clone()).clone();
                        entries.push(Entry::Row(AssignRow {
                            indent,
                            label,
                            lhs,
                            op,
                            rhs,
                            comment: first.comment.clone(),
                            continuation: lines[range.start + 1..range.end].to_vec(),
                        }));
                    }
                    None => entries.push(Entry::Passthrough(lines[range].to_vec())),
                }
            }
        }
    }

    let rows = || {
        entries.iter().filter_map(|e| match e {
            Entry::Row(row) => Some(row),
            _ => None,
        })
    };
    let label_width = column_width(rows().map(|r| r.label));
    let lhs_width = column_width(rows().map(|r| r.lhs.as_str()));
    let op_width = rows().map(|r| r.op.len()).max().unwrap_or(0);

    let mut slots = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Raw(line) => slots.push(Slot::Raw(line)),
            Entry::Passthrough(block) => slots.extend(block.into_iter().map(Slot::Raw)),
            Entry::Row(row) => slots.push(Slot::Row(render_row(
                row,
                label_width,
                lhs_width,
                op_width,
                config,
            ))),
        }
    }
    finish(slots, config.line_length)
}

fn render_row(
    row: AssignRow,
    label_width: usize,
    lhs_width: usize,
    op_width: usize,
    config: &Config,
) -> Rendered {
    let op = row.op.as_str();
    let padded = format!(
        "{}{}{} {} {}",
        row.indent,
        pad(row.label, label_width),
        pad(&row.lhs, lhs_width),
        pad(op, op_width),
        row.rhs
    );
    let single_line = row.continuation.is_empty();
    let code = if single_line && text_width(padded.trim_end()) > config.line_length {
        format!("{}{}{} {op} {}", row.indent, row.label, row.lhs, row.rhs)
    } else {
        padded
    };
    let code = code.trim_end().to_string();

    let continuation = if single_line {
        Vec::new()
    } else {
        let rhs_column = indent_width(&row.indent, config.indent)
            + label_width
            + lhs_width
            + 1
            + op_width
            + 1;
        shift_block(&row.continuation, rhs_column, config.indent)
    };

    Rendered {
        code,
        comment: row.comment,
        continuation,
        aligned: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(input: &[&str]) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        align_assignments(&lines, &Config::default())
    }

    #[test]
    fn test_keyword_assignments() {
        assert_eq!(
            align(&["assign a=b;", "assign data=result;"]),
            vec!["assign a    = b;", "assign data = result;"]
        );
    }

    #[test]
    fn test_mixed_operators_share_column() {
        assert_eq!(
            align(&["  q <= d;", "  count = count + 1;"]),
            vec!["  q     <= d;", "  count =  count + 1;"]
        );
    }

    #[test]
    fn test_comments_aligned_and_kept() {
        assert_eq!(
            align(&[
                "assign a = b; // first",
                "// standalone",
                "assign long_name = c_val; // second"
            ]),
            vec![
                "assign a         = b;     // first",
                "// standalone",
                "assign long_name = c_val; // second",
            ]
        );
    }

    #[test]
    fn test_multi_line_rhs() {
        assert_eq!(
            align(&["assign x = {a,", "  b};", "assign yy = c;"]),
            vec!["assign x  = {a,", "            b};", "assign yy = c;"]
        );
    }

    #[test]
    fn test_long_row_not_padded() {
        let long_rhs = "x".repeat(110);
        let input = [
            "assign a = b;".to_string(),
            format!("assign b = {long_rhs};"),
            "assign really_long_name = c;".to_string(),
        ];
        let out = align_assignments(&input, &Config::default());
        assert_eq!(out[0], "assign a                = b;");
        assert_eq!(out[1], format!("assign b = {long_rhs};"));
    }

    #[test]
    fn test_code_after_terminator_passes_through() {
        assert_eq!(
            align(&["assign a = b; assign c = d;", "assign ee = f;"]),
            vec!["assign a = b; assign c = d;", "assign ee = f;"]
        );
    }

    #[test]
    fn test_idempotent() {
        let once = align(&["assign a=b; // x", "assign data   =  {c,", "    d};"]);
        let refs: Vec<&str> = once.iter().map(String::as_str).collect();
        assert_eq!(align(&refs), once);
    }
}
