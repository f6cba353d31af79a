/// Module instantiation formatting
///
/// Indents runs of named port connections one level inside the instance head
/// and aligns them so the parentheses of every connection share columns:
///
/// ```text
/// fifo u_fifo (
///     .clk  (sys_clk),
///     .din  (data   ),
///     .full (full   )
/// );
/// ```
///
/// A run only starts right after a line ending in `(`, which keeps function
/// calls and other dotted expressions out.
use crate::config::Config;
use crate::format::columns::{column_width, finish, pad, Rendered, Slot};
use crate::parser::classify::{classify_all, Classified, LineKind};
use crate::parser::line::text_width;
use crate::parser::patterns::CONNECTION_RE;
use crate::parser::CharFilter;
use crate::scope::Indent;

struct Connection {
    name: String,
    signal: String,
    comma: bool,
    comment: Option<String>,
}

/// Brackets of `text` never close more than they opened and end balanced
fn balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for (_, c) in CharFilter::new(text, true, true) {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

fn parse_connection(line: &Classified) -> Option<Connection> {
    if line.in_comment {
        return None;
    }
    let caps = CONNECTION_RE.captures(&line.line.code)?;
    let signal = caps[2].trim();
    if !balanced(signal) {
        return None;
    }
    Some(Connection {
        name: caps[1].to_string(),
        signal: signal.to_string(),
        comma: &caps[3] == ",",
        comment: line.line.comment.clone(),
    })
}

/// Align named port connections throughout `lines`
#[must_use]
pub fn align_instances(lines: &[String], config: &Config) -> Vec<String> {
    let classified = classify_all(lines);
    let mut out = Vec::with_capacity(lines.len());
    let mut last_code_opens = false;
    let mut head_indent = String::new();
    let mut i = 0;

    while i < lines.len() {
        let current = &classified[i];
        if current.kind.is_trivia() || current.in_comment {
            out.push(lines[i].clone());
            i += 1;
            continue;
        }
        if !last_code_opens || parse_connection(current).is_none() {
            last_code_opens = current.line.code.ends_with('(');
            head_indent.clone_from(&current.line.indent);
            out.push(lines[i].clone());
            i += 1;
            continue;
        }

        // Collect connections, keeping interleaved comments in place
        let start = i;
        let mut end = i;
        let mut j = i;
        while j < lines.len() {
            let line = &classified[j];
            if matches!(line.kind, LineKind::Blank | LineKind::Comment) {
                j += 1;
            } else if parse_connection(line).is_some() {
                j += 1;
                end = j;
            } else {
                break;
            }
        }
        let indent = Indent::of(&head_indent, config.indent)
            .deeper(config.indent)
            .render();
        out.extend(align_run(
            &lines[start..end],
            &classified[start..end],
            &indent,
            config,
        ));
        last_code_opens = false;
        i = end;
    }
    out
}

fn is_line_comment(raw: &str, line: &Classified) -> bool {
    !line.in_comment && line.line.code.is_empty() && raw.trim_start().starts_with("//")
}

fn align_run(
    lines: &[String],
    classified: &[Classified],
    indent: &str,
    config: &Config,
) -> Vec<String> {
    enum Entry {
        Raw(String),
        Row(Connection),
    }

    let entries: Vec<Entry> = lines
        .iter()
        .zip(classified)
        .map(|(raw, line)| match parse_connection(line) {
            Some(conn) => Entry::Row(conn),
            None if is_line_comment(raw, line) => {
                Entry::Raw(format!("{indent}{}", raw.trim_start()))
            }
            None => Entry::Raw(raw.clone()),
        })
        .collect();

    let rows = || {
        entries.iter().filter_map(|e| match e {
            Entry::Row(row) => Some(row),
            Entry::Raw(_) => None,
        })
    };
    let name_width = column_width(rows().map(|r| r.name.as_str()));
    let signal_width = column_width(rows().map(|r| r.signal.as_str()));

    let slots = entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Raw(line) => Slot::Raw(line),
            Entry::Row(row) => {
                let comma = if row.comma { "," } else { "" };
                let padded = format!(
                    "{indent}.{} ({}){comma}",
                    pad(&row.name, name_width),
                    pad(&row.signal, signal_width)
                );
                let code = if text_width(&padded) > config.line_length {
                    format!("{indent}.{} ({}){comma}", row.name, row.signal)
                } else {
                    padded
                };
                Slot::Row(Rendered::single(code, row.comment, true))
            }
        })
        .collect();
    finish(slots, config.line_length)
}
