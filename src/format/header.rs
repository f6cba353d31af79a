/// Module header formatting
///
/// A multi-line ANSI header is re-indented so that its parameter and port
/// items sit one unit inside the `module` line and closing `)` lines sit at
/// the header indentation. Runs of parameter items and runs of port items are
/// then column-aligned like their body counterparts.
///
/// ```text
/// module fifo #(
///     parameter WIDTH = 8,
///     parameter DEPTH = 16
/// ) (
///     input  wire             clk,
///     output wire [WIDTH-1:0] dout
/// );
/// ```
use crate::config::Config;
use crate::format::columns::{shift_line, split_statements, ListStyle, Piece};
use crate::format::parameter::align_parameters;
use crate::format::port::align_ports;
use crate::parser::classify::{classify, LineKind};
use crate::parser::line::{indent_width, Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Parameter,
    Port,
    Other,
}

/// Format an accumulated module header, from the `module` line to its `;`
#[must_use]
pub fn format_header(lines: &[String], config: &Config) -> Vec<String> {
    if lines.len() < 2 {
        return lines.to_vec();
    }
    let first = Line::parse(&lines[0]);
    let base = indent_width(&first.indent, config.indent);
    let item = base + config.indent;

    let items = &lines[1..];
    let pieces = split_statements(items, ListStyle::HeaderItems);
    let mut body: Vec<String> = items.to_vec();
    let mut kinds = Vec::with_capacity(pieces.len());

    for piece in &pieces {
        match piece {
            Piece::Trivia(idx) => {
                let line = Line::parse(&items[*idx]);
                body[*idx] = line.render(item);
                kinds.push(None);
            }
            Piece::Statement(range) => {
                let line = Line::parse(&items[range.start]);
                let target = if line.code.starts_with(')') { base } else { item };
                let current = indent_width(&line.indent, config.indent);
                #[allow(clippy::cast_possible_wrap)]
                let delta = target as isize - current as isize;
                for idx in range.clone() {
                    body[idx] = shift_line(&items[idx], delta, config.indent);
                }
                let kind = match classify(&line) {
                    LineKind::Parameter => ItemKind::Parameter,
                    LineKind::Port => ItemKind::Port,
                    _ => ItemKind::Other,
                };
                kinds.push(Some(kind));
            }
        }
    }

    let mut out = vec![lines[0].clone()];
    let mut i = 0;
    while i < pieces.len() {
        let kind = kinds[i];
        let enabled = match kind {
            Some(ItemKind::Parameter) => config.align_parameter,
            Some(ItemKind::Port) => config.align_port,
            _ => false,
        };
        if !enabled {
            out.extend(piece_lines(&pieces[i], &body));
            i += 1;
            continue;
        }
        // Extend the run over trivia as long as another item of the same kind follows
        let mut end = i + 1;
        let mut j = end;
        while j < pieces.len() {
            match kinds[j] {
                None => j += 1,
                k if k == kind => {
                    j += 1;
                    end = j;
                }
                _ => break,
            }
        }
        let mut run = Vec::new();
        for piece in &pieces[i..end] {
            run.extend(piece_lines(piece, &body));
        }
        let aligned = match kind {
            Some(ItemKind::Parameter) => align_parameters(&run, config, ListStyle::HeaderItems),
            _ => align_ports(&run, config, ListStyle::HeaderItems),
        };
        out.extend(aligned);
        i = end;
    }
    out
}

fn piece_lines(piece: &Piece, body: &[String]) -> Vec<String> {
    match piece {
        Piece::Trivia(idx) => vec![body[*idx].clone()],
        Piece::Statement(range) => body[range.clone()].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(input: &[&str]) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        format_header(&lines, &Config::default())
    }

    #[test]
    fn test_single_line_header_untouched() {
        assert_eq!(format(&["module top(input a);"]), vec!["module top(input a);"]);
    }

    #[test]
    fn test_ports_indented_and_aligned() {
        assert_eq!(
            format(&[
                "module top (",
                "input wire clk,",
                "  // data",
                "        output [7:0] q",
                "  );",
            ]),
            vec![
                "module top (",
                "    input  wire       clk,",
                "    // data",
                "    output      [7:0] q",
                ");",
            ]
        );
    }

    #[test]
    fn test_parameters_and_ports() {
        assert_eq!(
            format(&[
                "module fifo #(",
                "parameter WIDTH = 8,",
                "parameter DEPTH = 16",
                ") (",
                "input clk,",
                "output [WIDTH-1:0] dout",
                ");",
            ]),
            vec![
                "module fifo #(",
                "    parameter WIDTH = 8,",
                "    parameter DEPTH = 16",
                ") (",
                "    input              clk,",
                "    output [WIDTH-1:0] dout",
                ");",
            ]
        );
    }

    #[test]
    fn test_alignment_disabled_still_indents() {
        let config = Config {
            align_port: false,
            ..Config::default()
        };
        let lines: Vec<String> = ["module m (", "input a,", "output bb", ");"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            format_header(&lines, &config),
            vec!["module m (", "    input a,", "    output bb", ");"]
        );
    }

    #[test]
    fn test_non_ansi_list_shifted() {
        assert_eq!(
            format(&["module m (", "a,", "  b", ");"]),
            vec!["module m (", "    a,", "    b", ");"]
        );
    }
}
