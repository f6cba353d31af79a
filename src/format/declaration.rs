/// Net and variable declaration alignment
///
/// Splits each declaration into keyword, type, packed range, name and
/// optional initializer columns. Three shapes are aligned independently of
/// each other because their terminators land in different places: single
/// names, single names with an initializer, and comma-separated name lists.
use crate::config::Config;
use crate::format::columns::{
    column_width, finish, parse_decl, render_cells, split_statements, Cell, DeclParts, ListStyle,
    Piece, Rendered, Slot, Terminator,
};
use crate::parser::line::Line;
use crate::parser::patterns::DECL_KEYWORDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Single,
    Initialized,
    MultiName,
}

struct DeclRow {
    shape: Shape,
    keyword: String,
    ty: String,
    range: String,
    name: String,
    init: String,
    comment: Option<String>,
}

impl DeclRow {
    fn from_parts(parts: &DeclParts<'_>, comment: Option<String>) -> Self {
        let shape = match (parts.init, parts.names.len()) {
            (Some(_), _) => Shape::Initialized,
            (None, 1) => Shape::Single,
            (None, _) => Shape::MultiName,
        };
        Self {
            shape,
            keyword: parts.keyword.to_string(),
            ty: parts.type_cell(),
            range: parts.range_cell(),
            name: parts.names_cell(),
            init: parts.init.unwrap_or_default().to_string(),
            comment,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Widths {
    keyword: usize,
    ty: usize,
    range: usize,
    name: usize,
    init: usize,
}

fn widths_for(rows: &[&DeclRow]) -> Widths {
    Widths {
        keyword: column_width(rows.iter().map(|r| r.keyword.as_str())),
        ty: column_width(rows.iter().map(|r| r.ty.as_str())),
        range: column_width(rows.iter().map(|r| r.range.as_str())),
        name: column_width(rows.iter().map(|r| r.name.as_str())),
        init: column_width(rows.iter().map(|r| r.init.as_str())),
    }
}

/// Align a group of declarations
#[must_use]
pub fn align_declarations(lines: &[String], config: &Config) -> Vec<String> {
    enum Entry {
        Raw(String),
        Row(DeclRow),
    }

    let mut indent: Option<String> = None;
    let mut entries = Vec::with_capacity(lines.len());
    for piece in split_statements(lines, ListStyle::Statements) {
        match piece {
            Piece::Trivia(idx) => entries.push(Entry::Raw(lines[idx].clone())),
            Piece::Statement(range) if range.len() == 1 => {
                let line = Line::parse(&lines[range.start]);
                match parse_decl(&line.code, DECL_KEYWORDS) {
                    Some(parts) if parts.terminator == Terminator::Semicolon => {
                        indent.get_or_insert_with(|| line.indent.clone());
                        entries.push(Entry::Row(DeclRow::from_parts(&parts, line.comment.clone())));
                    }
                    _ => entries.push(Entry::Raw(lines[range.start].clone())),
                }
            }
            Piece::Statement(range) => {
                entries.extend(lines[range].iter().cloned().map(Entry::Raw));
            }
        }
    }

    let widths_of = |shape: Shape| {
        let rows: Vec<&DeclRow> = entries
            .iter()
            .filter_map(|e| match e {
                Entry::Row(row) if row.shape == shape => Some(row),
                _ => None,
            })
            .collect();
        widths_for(&rows)
    };
    let single = widths_of(Shape::Single);
    let initialized = widths_of(Shape::Initialized);
    let multi = widths_of(Shape::MultiName);
    let indent = indent.unwrap_or_default();

    let slots = entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Raw(line) => Slot::Raw(line),
            Entry::Row(row) => {
                let widths = match row.shape {
                    Shape::Single => single,
                    Shape::Initialized => initialized,
                    Shape::MultiName => multi,
                };
                let mut cells = vec![
                    Cell::left(row.keyword, widths.keyword),
                    Cell::left(row.ty, widths.ty),
                    Cell::left(row.range, widths.range),
                    Cell::left(row.name, widths.name),
                ];
                if row.shape == Shape::Initialized {
                    cells.push(Cell::left("=", 1));
                    cells.push(Cell::left(row.init, widths.init));
                }
                let code = render_cells(&indent, &cells, Terminator::Semicolon, config.line_length);
                Slot::Row(Rendered::single(code, row.comment, true))
            }
        })
        .collect();
    finish(slots, config.line_length)
}
