/// Conditional-compilation annotation
///
/// `` `else`` and `` `endif`` get a trailing comment naming the macro of the
/// `` `ifdef`` / `` `ifndef`` they belong to:
///
/// ```text
/// `ifdef DEBUG
/// wire x;
/// `endif // DEBUG
/// ```
///
/// Directives are also recognised in the middle of a line. Only the last one
/// on a line is annotated, and only when nothing but a comment follows it.
use crate::parser::char_filter::mask_non_code;
use crate::parser::patterns::COND_DIRECTIVE_RE;

/// Stack of open conditional-compilation blocks
#[derive(Debug, Default, Clone)]
pub struct DirectiveAnnotator {
    stack: Vec<String>,
}

impl DirectiveAnnotator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open `` `ifdef`` / `` `ifndef`` blocks
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Process one line, returning it annotated if it closes or flips a block
    ///
    /// Lines inside a `/* */` comment must not be fed.
    pub fn annotate(&mut self, raw: &str) -> String {
        let masked = mask_non_code(raw);
        let mut target: Option<(usize, String)> = None;

        for caps in COND_DIRECTIVE_RE.captures_iter(&masked) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            target = None;
            if let Some(kind) = caps.get(1) {
                if kind.as_str() != "elsif" {
                    self.stack.push(caps[2].to_string());
                }
                continue;
            }
            let name = match caps.get(3).map(|m| m.as_str()) {
                Some("else") => self.stack.last().cloned(),
                Some("endif") => self.stack.pop(),
                _ => None,
            };
            if let Some(name) = name {
                target = Some((whole.end(), name));
            }
        }

        let Some((end, name)) = target else {
            return raw.to_string();
        };
        let rest = raw[end..].trim_start();
        if !(rest.is_empty() || rest.starts_with("//") || rest.starts_with("/*")) {
            return raw.to_string();
        }
        format!("{} // {name}", &raw[..end])
    }
}
