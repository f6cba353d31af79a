/// `begin`/`end` synthesis around single-statement bodies
///
/// A header without a body on its own line (`always @(posedge clk)`,
/// `if (rst)`, `else`, `for (...)`) is followed by exactly one statement. That
/// statement may itself be a header with a body, an `if`/`else` chain, a
/// `begin ... end` block or a `case`. The wrapper appends `begin` to the
/// header, moves the statement one unit deeper and closes it with `end` at the
/// header indentation:
///
/// ```text
/// always @(posedge clk)        always @(posedge clk) begin
///   data <= 1;          =>         data <= 1;
///                              end
/// ```
///
/// Comments and `` `ifdef`` blocks between the header and its statement are
/// carried along. Whenever the statement cannot be delimited safely the
/// header is left alone.
use tracing::{debug, trace};

use crate::config::Config;
use crate::format::columns::{shift_line, spaces};
use crate::parser::classify::{classify_all, Classified, DirectiveKind, Header, LineKind};
use crate::parser::line::{indent_width, statement_continues, StatementState};

/// Upper bound on begin/end synthesis passes
pub const MAX_BEGIN_END_PASSES: usize = 8;

/// Next line at or after `from` that is neither blank nor a comment
fn next_code(cl: &[Classified], from: usize) -> Option<usize> {
    (from..cl.len()).find(|&k| !matches!(cl[k].kind, LineKind::Blank | LineKind::Comment))
}

/// End of a simple statement starting at `start`, continuation lines included
///
/// Only statements terminated by `;` qualify.
fn simple_extent(cl: &[Classified], start: usize) -> Option<usize> {
    let mut state = StatementState::new();
    let mut k = start;
    loop {
        let code = cl[k].line.code.as_str();
        state.feed(code);
        let next = next_code(cl, k + 1);
        let next_text = next.map(|n| cl[n].line.code.as_str());
        if !statement_continues(&state, code, next_text) {
            return state.is_terminated().then_some(k + 1);
        }
        k = next?;
        if cl[k].kind.is_trivia() {
            return None;
        }
    }
}

/// End of a `begin`/`case`/`generate` scope opened at `start`
///
/// A scope that closes with a bare or inline `end else` keeps going through
/// the else body.
fn scope_extent(cl: &[Classified], start: usize) -> Option<usize> {
    let mut depth = 0;
    for k in start..cl.len() {
        if cl[k].in_comment || cl[k].kind.is_trivia() {
            continue;
        }
        depth += cl[k].kind.scope_delta();
        if depth < 0 {
            return None;
        }
        if depth == 0 {
            if let LineKind::BlockHeader(h) = cl[k].kind {
                if h.chained_end {
                    return header_extent(cl, k, h);
                }
            }
            return Some(k + 1);
        }
    }
    None
}

/// End of a header line and its body, following `else` branches of `if`
fn header_extent(cl: &[Classified], k: usize, header: Header) -> Option<usize> {
    let end = if header.opens_scope {
        scope_extent(cl, k)?
    } else if !header.complete {
        return None;
    } else if header.inline_statement {
        simple_extent(cl, k)?
    } else {
        let body = next_code(cl, k + 1)?;
        if cl[body].kind.is_trivia() {
            return None;
        }
        statement_extent(cl, body)?
    };
    if header.chainable {
        if let Some(next) = next_code(cl, end) {
            if let LineKind::BlockHeader(h) = cl[next].kind {
                if h.is_else && !h.chained_end {
                    return header_extent(cl, next, h);
                }
            }
        }
    }
    Some(end)
}

/// End of the statement starting at `start`
fn statement_extent(cl: &[Classified], start: usize) -> Option<usize> {
    match cl[start].kind {
        LineKind::Assignment { .. } | LineKind::Other => simple_extent(cl, start),
        LineKind::BlockHeader(h) if !h.is_else && !h.chained_end => header_extent(cl, start, h),
        LineKind::Begin | LineKind::CaseHeader => scope_extent(cl, start),
        _ => None,
    }
}

/// Body of the bare header at `header` that would be wrapped
///
/// Returns the first line of the statement and the end of the body (lines
/// between header and statement are comments, blanks or directives).
#[must_use]
pub fn body_extent(cl: &[Classified], header: usize) -> Option<(usize, usize)> {
    let LineKind::BlockHeader(h) = cl.get(header)?.kind else {
        return None;
    };
    if !h.is_bare() || cl[header].in_comment {
        return None;
    }

    let mut ifdef_depth = 0i32;
    let mut k = header + 1;
    while k < cl.len() && cl[k].kind.is_trivia() {
        if let LineKind::Directive(d) = cl[k].kind {
            match d {
                d if d.opens() => ifdef_depth += 1,
                DirectiveKind::EndIf => {
                    ifdef_depth -= 1;
                    if ifdef_depth < 0 {
                        return None;
                    }
                }
                DirectiveKind::Else | DirectiveKind::ElsIf if ifdef_depth == 0 => return None,
                _ => {}
            }
        }
        k += 1;
    }
    if k >= cl.len() || cl[k].in_comment {
        return None;
    }
    if matches!(cl[k].kind, LineKind::Begin) {
        return None;
    }
    let start = k;
    let mut end = statement_extent(cl, start)?;

    // Close every `ifdef opened between the header and its statement
    while ifdef_depth > 0 {
        let line = cl.get(end)?;
        match line.kind {
            LineKind::Directive(d) if d.opens() => {
                ifdef_depth += 1;
                end += 1;
            }
            LineKind::Directive(DirectiveKind::EndIf) => {
                ifdef_depth -= 1;
                end += 1;
            }
            kind if kind.is_trivia() => end += 1,
            kind if kind.is_simple_statement() => end = simple_extent(cl, end)?,
            // Only statements this pass leaves alone; a bare header in a
            // later branch is wrapped first and picked up by the next pass
            LineKind::BlockHeader(h)
                if !h.is_else && !h.chained_end && body_extent(cl, end).is_none() =>
            {
                end = header_extent(cl, end, h)?;
            }
            LineKind::Begin | LineKind::CaseHeader => end = scope_extent(cl, end)?,
            _ => return None,
        }
    }
    Some((start, end))
}

/// Header line with ` begin` appended to its code
fn with_begin(header: &Classified, indent: &str) -> String {
    let line = &header.line;
    match &line.comment {
        Some(comment) => format!("{indent}{} begin {comment}", line.code),
        None => format!("{indent}{} begin", line.code),
    }
}

/// One pass over the stream; `None` when nothing was wrapped
fn wrap_pass(lines: &[String], config: &Config) -> Option<Vec<String>> {
    let cl = classify_all(lines);
    let unit = config.indent;
    let mut out = Vec::with_capacity(lines.len() + 4);
    // (end of body, `end` line, shift of the body)
    let mut open: Vec<(usize, String, isize)> = Vec::new();
    let mut changed = false;

    let mut i = 0;
    loop {
        while open.last().is_some_and(|(end, _, _)| *end == i) {
            if let Some((_, end_line, _)) = open.pop() {
                out.push(end_line);
            }
        }
        if i >= lines.len() {
            break;
        }
        let shift: isize = open.iter().map(|(_, _, d)| d).sum();
        let shifted = |idx: usize| {
            if shift == 0 || cl[idx].in_comment {
                lines[idx].clone()
            } else {
                shift_line(&lines[idx], shift, unit)
            }
        };

        let Some((start, end)) = body_extent(&cl, i) else {
            out.push(shifted(i));
            i += 1;
            continue;
        };

        let header_indent = if shift == 0 {
            cl[i].line.indent.clone()
        } else {
            spaces(indent_width(&cl[i].line.indent, unit).saturating_add_signed(shift))
        };
        let header_width = indent_width(&header_indent, unit);
        trace!(line = i + 1, end, "wrapping single-statement body");
        out.push(with_begin(&cl[i], &header_indent));
        for k in i + 1..start {
            out.push(cl[k].line.render(header_width + unit));
        }
        let body_width = indent_width(&cl[start].line.indent, unit);
        #[allow(clippy::cast_possible_wrap)]
        let delta = (header_width + unit) as isize - body_width as isize - shift;
        open.push((end, format!("{header_indent}end"), delta));
        changed = true;
        i = start;
    }

    changed.then_some(out)
}

/// Run at most `max_passes` wrap passes
fn wrap_bounded(lines: &[String], config: &Config, max_passes: usize) -> Vec<String> {
    let mut current = lines.to_vec();
    for _ in 0..max_passes {
        match wrap_pass(&current, config) {
            Some(next) => current = next,
            None => return current,
        }
    }
    debug!(passes = max_passes, "begin/end synthesis did not settle");
    current
}

/// Wrap single-statement bodies until nothing changes or the pass limit is hit
#[must_use]
pub fn insert_begin_end(lines: &[String], config: &Config) -> Vec<String> {
    wrap_bounded(lines, config, MAX_BEGIN_END_PASSES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(input: &[&str]) -> Vec<String> {
        let lines: Vec<String> = input.iter().map(ToString::to_string).collect();
        insert_begin_end(&lines, &Config::default())
    }

    #[test]
    fn test_always_single_statement() {
        assert_eq!(
            wrap(&["always @(posedge clk)", "data <= 1;"]),
            vec!["always @(posedge clk) begin", "    data <= 1;", "end"]
        );
    }

    #[test]
    fn test_if_else_chain() {
        assert_eq!(
            wrap(&["if (rst)", "  q <= 0;", "else", "  q <= d;"]),
            vec![
                "if (rst) begin",
                "    q <= 0;",
                "end",
                "else begin",
                "    q <= d;",
                "end",
            ]
        );
    }

    #[test]
    fn test_nested_headers_in_one_pass() {
        assert_eq!(
            wrap(&["always @(posedge clk)", "if (en)", "q <= d;"]),
            vec![
                "always @(posedge clk) begin",
                "    if (en) begin",
                "        q <= d;",
                "    end",
                "end",
            ]
        );
    }

    #[test]
    fn test_body_with_chain_kept_together() {
        assert_eq!(
            wrap(&["always @*", "if (a) y = 1;", "else y = 0;", "assign z = 0;"]),
            vec![
                "always @* begin",
                "    if (a) y = 1;",
                "    else y = 0;",
                "end",
                "assign z = 0;",
            ]
        );
    }

    #[test]
    fn test_existing_begin_untouched() {
        let input = ["always @(posedge clk)", "begin", "  q <= d;", "end"];
        assert_eq!(wrap(&input), input);
    }

    #[test]
    fn test_comment_and_ifdef_carried() {
        assert_eq!(
            wrap(&[
                "if (a) // guard",
                "// why",
                "`ifdef SIM",
                "x = 1;",
                "`else",
                "x = 2;",
                "`endif",
                "y = 3;",
            ]),
            vec![
                "if (a) begin // guard",
                "    // why",
                "    `ifdef SIM",
                "    x = 1;",
                "    `else",
                "    x = 2;",
                "    `endif",
                "end",
                "y = 3;",
            ]
        );
    }

    #[test]
    fn test_structural_follower_aborts() {
        let input = ["if (a)", "wire w;"];
        assert_eq!(wrap(&input), input);
        let input = ["if (a)", "endmodule"];
        assert_eq!(wrap(&input), input);
    }

    #[test]
    fn test_unterminated_statement_aborts() {
        let input = ["always", "@(posedge clk)", "begin", "end"];
        assert_eq!(wrap(&input), input);
    }

    #[test]
    fn test_case_body() {
        assert_eq!(
            wrap(&["always @*", "case (s)", "0: y = a;", "endcase"]),
            vec![
                "always @* begin",
                "    case (s)",
                "    0: y = a;",
                "    endcase",
                "end",
            ]
        );
    }

    const GUARDED_ELSE_HEADER: &[&str] = &[
        "always @*",
        "`ifdef X",
        "x = 1;",
        "`else",
        "if (a)",
        "y = 2;",
        "`endif",
    ];

    fn owned(input: &[&str]) -> Vec<String> {
        input.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_second_pass_wraps_revealed_body() {
        let config = Config::default();
        let first = wrap_pass(&owned(GUARDED_ELSE_HEADER), &config).unwrap();
        assert_eq!(
            first,
            vec![
                "always @*",
                "`ifdef X",
                "x = 1;",
                "`else",
                "if (a) begin",
                "    y = 2;",
                "end",
                "`endif",
            ]
        );
        assert!(wrap_pass(&first, &config).is_some());
        assert_eq!(
            wrap(GUARDED_ELSE_HEADER),
            vec![
                "always @* begin",
                "    `ifdef X",
                "    x = 1;",
                "    `else",
                "    if (a) begin",
                "        y = 2;",
                "    end",
                "    `endif",
                "end",
            ]
        );
    }

    #[test]
    fn test_pass_limit_stops_early() {
        let config = Config::default();
        let input = owned(GUARDED_ELSE_HEADER);
        let first = wrap_pass(&input, &config).unwrap();
        assert_eq!(wrap_bounded(&input, &config, 1), first);
        assert_eq!(wrap_bounded(&input, &config, 0), input);
        assert_eq!(
            wrap_bounded(&input, &config, MAX_BEGIN_END_PASSES),
            insert_begin_end(&input, &config)
        );
        let settled = insert_begin_end(&input, &config);
        assert!(wrap_pass(&settled, &config).is_none());
    }

    #[test]
    fn test_guarded_header_with_own_begin() {
        assert_eq!(
            wrap(&[
                "always @*",
                "`ifdef X",
                "x = 1;",
                "for (i = 0; i < 4; i = i + 1)",
                "begin",
                "y = i;",
                "end",
                "`endif",
            ]),
            vec![
                "always @* begin",
                "    `ifdef X",
                "    x = 1;",
                "    for (i = 0; i < 4; i = i + 1)",
                "    begin",
                "    y = i;",
                "    end",
                "    `endif",
                "end",
            ]
        );
    }

    #[test]
    fn test_begin_end_idempotent() {
        let once = wrap(&["always @(posedge clk)", "if (en)", "q <= d;", "else", "q <= 0;"]);
        let again = insert_begin_end(&once, &Config::default());
        assert_eq!(again, once);
    }
}
