/// Parameter alignment
///
/// `parameter`, `localparam` and `specparam` declarations always carry an
/// initializer, so there is a single row shape: keyword, type, range, name,
/// `=` and value. A multi-line value keeps its first line on the declaration
/// and continues directly below the column after `= `.
use crate::config::Config;
use crate::format::columns::{
    column_width, finish, parse_decl, render_cells, shift_block, split_statements, Cell,
    ListStyle, Piece, Rendered, Slot, Terminator,
};
use crate::parser::line::{indent_width, text_width, Line};
use crate::parser::patterns::PARAM_KEYWORDS;

struct ParamRow {
    keyword: String,
    ty: String,
    range: String,
    name: String,
    init: String,
    terminator: Terminator,
    comment: Option<String>,
    continuation: Vec<String>,
}

impl ParamRow {
    fn cells(&self, widths: &[usize; 5]) -> Vec<Cell> {
        vec![
            Cell::left(self.keyword.clone(), widths[0]),
            Cell::left(self.ty.clone(), widths[1]),
            Cell::left(self.range.clone(), widths[2]),
            Cell::left(self.name.clone(), widths[3]),
            Cell::left("=", 1),
            Cell::left(self.init.clone(), widths[4]),
        ]
    }
}

fn parse_row(line: &Line, style: ListStyle, continuation: Vec<String>) -> Option<ParamRow> {
    let parts = parse_decl(&line.code, PARAM_KEYWORDS)?;
    let init = parts.init?;
    if parts.names.len() != 1 {
        return None;
    }
    let multi_line = !continuation.is_empty();
    let terminator_ok = multi_line
        || match style {
            ListStyle::Statements => parts.terminator == Terminator::Semicolon,
            ListStyle::HeaderItems => parts.terminator != Terminator::Semicolon,
        };
    if !terminator_ok {
        return None;
    }
    Some(ParamRow {
        keyword: parts.keyword.to_string(),
        ty: parts.type_cell(),
        range: parts.range_cell(),
        name: parts.names_cell(),
        init: init.to_string(),
        terminator: parts.terminator,
        comment: line.comment.clone(),
        continuation,
    })
}

/// Align a group of parameter declarations
#[must_use]
pub fn align_parameters(lines: &[String], config: &Config, style: ListStyle) -> Vec<String> {
    enum Entry {
        Raw(String),
        Row(ParamRow),
    }

    let mut indent: Option<String> = None;
    let mut entries = Vec::with_capacity(lines.len());
    for piece in split_statements(lines, style) {
        match piece {
            Piece::Trivia(idx) => entries.push(Entry::Raw(lines[idx].clone())),
            Piece::Statement(range) => {
                let line = Line::parse(&lines[range.start]);
                let continuation = lines[range.start + 1..range.end].to_vec();
                match parse_row(&line, style, continuation) {
                    Some(row) => {
                        indent.get_or_insert_with(|| line.indent.clone());
                        entries.push(Entry::Row(row));
                    }
                    None => entries.extend(lines[range].iter().cloned().map(Entry::Raw)),
                }
            }
        }
    }

    let rows: Vec<&ParamRow> = entries
        .iter()
        .filter_map(|e| match e {
            Entry::Row(row) => Some(row),
            Entry::Raw(_) => None,
        })
        .collect();
    let widths = [
        column_width(rows.iter().map(|r| r.keyword.as_str())),
        column_width(rows.iter().map(|r| r.ty.as_str())),
        column_width(rows.iter().map(|r| r.range.as_str())),
        column_width(rows.iter().map(|r| r.name.as_str())),
        column_width(
            rows.iter()
                .filter(|r| r.continuation.is_empty())
                .map(|r| r.init.as_str()),
        ),
    ];
    let indent = indent.unwrap_or_default();

    let slots = entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Raw(line) => Slot::Raw(line),
            Entry::Row(row) => Slot::Row(render_row(row, &indent, &widths, config)),
        })
        .collect();
    finish(slots, config.line_length)
}

fn render_row(row: ParamRow, indent: &str, widths: &[usize; 5], config: &Config) -> Rendered {
    let cells = row.cells(widths);
    if row.continuation.is_empty() {
        let code = render_cells(indent, &cells, row.terminator, config.line_length);
        return Rendered::single(code, row.comment, true);
    }

    // Everything up to and including `=`, then the first line of the value
    let prefix = render_cells(indent, &cells[..5], Terminator::None, config.line_length);
    let value_column =
        indent_width(indent, config.indent) + text_width(&prefix[indent.len()..]) + 1;
    Rendered {
        code: format!("{prefix} {}{}", row.init, row.terminator.as_str()),
        comment: row.comment,
        continuation: shift_block(&row.continuation, value_column, config.indent),
        aligned: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(input: &[&str], style: ListStyle) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        align_parameters(&lines, &Config::default(), style)
    }

    #[test]
    fn test_body_parameters() {
        assert_eq!(
            align(
                &["localparam W = 8;", "localparam int DEPTH = 16;", "parameter [3:0] M = 4'hF;"],
                ListStyle::Statements
            ),
            vec![
                "localparam           W     = 8   ;",
                "localparam int       DEPTH = 16  ;",
                "parameter      [3:0] M     = 4'hF;",
            ]
        );
    }

    #[test]
    fn test_header_parameters() {
        assert_eq!(
            align(
                &["    parameter WIDTH = 8,", "    parameter D = 4"],
                ListStyle::HeaderItems
            ),
            vec!["    parameter WIDTH = 8,", "    parameter D     = 4"]
        );
    }

    #[test]
    fn test_multi_line_value() {
        assert_eq!(
            align(
                &["localparam A = 1;", "localparam TABLE = {", "  8'h01,", "  8'h02};"],
                ListStyle::Statements
            ),
            vec![
                "localparam A     = 1;",
                "localparam TABLE = {",
                "                   8'h01,",
                "                   8'h02};",
            ]
        );
    }

    #[test]
    fn test_without_value_passes_through() {
        assert_eq!(
            align(&["parameter W;", "parameter  X = 1;"], ListStyle::Statements),
            vec!["parameter W;", "parameter X = 1;"]
        );
    }
}
