/// Port declaration alignment
///
/// Columns are direction, type, signedness, packed range and names. The range
/// column is right-justified so closing brackets line up:
///
/// ```text
/// input  wire         [7:0] data,
/// output reg  signed [15:0] acc
/// ```
///
/// The same engine serves body declarations ending in `;` and ANSI header
/// items ending in `,` or nothing.
use crate::config::Config;
use crate::format::columns::{
    column_width, finish, parse_decl, render_cells, split_statements, Cell, ListStyle, Piece,
    Rendered, Slot, Terminator,
};
use crate::parser::line::Line;
use crate::parser::patterns::PORT_DIRECTIONS;

struct PortRow {
    direction: String,
    ty: String,
    sign: String,
    range: String,
    names: String,
    terminator: Terminator,
    comment: Option<String>,
}

fn parse_row(line: &Line, style: ListStyle) -> Option<PortRow> {
    let parts = parse_decl(&line.code, PORT_DIRECTIONS)?;
    if parts.init.is_some() {
        return None;
    }
    let terminator_ok = match style {
        ListStyle::Statements => parts.terminator == Terminator::Semicolon,
        ListStyle::HeaderItems => parts.terminator != Terminator::Semicolon,
    };
    if !terminator_ok {
        return None;
    }
    Some(PortRow {
        direction: parts.keyword.to_string(),
        ty: parts.types.join(" "),
        sign: parts.qualifiers.join(" "),
        range: parts.range_cell(),
        names: parts.names_cell(),
        terminator: parts.terminator,
        comment: line.comment.clone(),
    })
}

/// Align a group of port declarations
#[must_use]
pub fn align_ports(lines: &[String], config: &Config, style: ListStyle) -> Vec<String> {
    enum Entry {
        Raw(String),
        Row(PortRow),
    }

    let mut indent: Option<String> = None;
    let mut entries = Vec::with_capacity(lines.len());
    for piece in split_statements(lines, style) {
        match piece {
            Piece::Trivia(idx) => entries.push(Entry::Raw(lines[idx].clone())),
            Piece::Statement(range) if range.len() == 1 => {
                let line = Line::parse(&lines[range.start]);
                match parse_row(&line, style) {
                    Some(row) => {
                        indent.get_or_insert_with(|| line.indent.clone());
                        entries.push(Entry::Row(row));
                    }
                    None => entries.push(Entry::Raw(lines[range.start].clone())),
                }
            }
            Piece::Statement(range) => {
                entries.extend(lines[range].iter().cloned().map(Entry::Raw));
            }
        }
    }

    let rows: Vec<&PortRow> = entries
        .iter()
        .filter_map(|e| match e {
            Entry::Row(row) => Some(row),
            Entry::Raw(_) => None,
        })
        .collect();
    let direction_width = column_width(rows.iter().map(|r| r.direction.as_str()));
    let ty_width = column_width(rows.iter().map(|r| r.ty.as_str()));
    let sign_width = column_width(rows.iter().map(|r| r.sign.as_str()));
    let range_width = column_width(rows.iter().map(|r| r.range.as_str()));
    let names_width = column_width(rows.iter().map(|r| r.names.as_str()));
    let indent = indent.unwrap_or_default();

    let slots = entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Raw(line) => Slot::Raw(line),
            Entry::Row(row) => {
                let cells = [
                    Cell::left(row.direction, direction_width),
                    Cell::left(row.ty, ty_width),
                    Cell::left(row.sign, sign_width),
                    Cell::right(row.range, range_width),
                    Cell::left(row.names, names_width),
                ];
                let code = render_cells(&indent, &cells, row.terminator, config.line_length);
                Slot::Row(Rendered::single(code, row.comment, true))
            }
        })
        .collect();
    finish(slots, config.line_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn align(input: &[&str], style: ListStyle) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        align_ports(&lines, &Config::default(), style)
    }

    #[test]
    fn test_header_items() {
        assert_eq!(
            align(
                &[
                    "    input wire clk,",
                    "    input [7:0] data,",
                    "    output reg signed [15:0] acc"
                ],
                ListStyle::HeaderItems
            ),
            vec![
                "    input  wire               clk,",
                "    input               [7:0] data,",
                "    output reg  signed [15:0] acc",
            ]
        );
    }

    #[test]
    fn test_body_ports_pad_terminator() {
        assert_eq!(
            align(&["input clk;", "output [3:0] q;"], ListStyle::Statements),
            vec!["input        clk;", "output [3:0] q  ;"]
        );
    }

    #[test]
    fn test_comment_between_items_kept() {
        assert_eq!(
            align(
                &["input a, // clock", "// data bus", "input [1:0] b"],
                ListStyle::HeaderItems
            ),
            vec!["input       a, // clock", "// data bus", "input [1:0] b"]
        );
    }

    #[test]
    fn test_unparsed_item_passes_through() {
        assert_eq!(
            align(&["input a,", "input b);"], ListStyle::HeaderItems),
            vec!["input a,", "input b);"]
        );
    }
}
