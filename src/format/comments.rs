/// Trailing comment column
///
/// With `comment_column` set, every trailing comment whose code ends before
/// that column is moved to start exactly at it (0-based). Lines with longer
/// code keep a single space before the comment.
use crate::config::Config;
use crate::format::columns::pad;
use crate::parser::classify::classify_all;
use crate::parser::line::text_width;

/// Move trailing comments of code lines to the configured column
#[must_use]
pub fn align_comment_column(lines: &[String], config: &Config) -> Vec<String> {
    if config.comment_column == 0 {
        return lines.to_vec();
    }
    classify_all(lines)
        .into_iter()
        .zip(lines)
        .map(|(classified, raw)| {
            let line = classified.line;
            let Some(comment) = line.comment.as_deref() else {
                return raw.clone();
            };
            if classified.in_comment || line.code.is_empty() {
                return raw.clone();
            }
            let code = format!("{}{}", line.indent, line.code);
            if text_width(&code) < config.comment_column {
                format!("{}{comment}", pad(&code, config.comment_column))
            } else {
                format!("{code} {comment}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str], column: usize) -> Vec<String> {
        let lines: Vec<String> = lines.iter().map(ToString::to_string).collect();
        let config = Config {
            comment_column: column,
            ..Config::default()
        };
        align_comment_column(&lines, &config)
    }

    #[test]
    fn test_disabled_by_default() {
        assert_eq!(run(&["a = b;   // x"], 0), vec!["a = b;   // x"]);
    }

    #[test]
    fn test_moves_comment_to_column() {
        assert_eq!(
            run(&["  a = b; // x", "// whole line", "wire w;"], 12),
            vec!["  a = b;    // x", "// whole line", "wire w;"]
        );
    }

    #[test]
    fn test_long_code_keeps_single_space() {
        assert_eq!(
            run(&["assign long = value;    // x"], 10),
            vec!["assign long = value; // x"]
        );
    }

    #[test]
    fn test_block_comment_interior_untouched() {
        assert_eq!(
            run(&["/* start", "  x = 1; // inner", "*/"], 20),
            vec!["/* start", "  x = 1; // inner", "*/"]
        );
    }
}
