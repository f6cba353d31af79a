/// Block kinds and frames for Verilog block structure
use std::fmt;

use crate::parser::line::indent_width;

/// Indentation prefix of a line: leading tabs followed by spaces
///
/// A frame keeps the prefix of its header so the closer is rendered with the
/// same characters. A body one level deeper adds a tab to a tab-only prefix
/// and `unit` spaces to anything else.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indent {
    pub tabs: usize,
    pub spaces: usize,
}

impl Indent {
    #[must_use]
    pub fn spaces(spaces: usize) -> Self {
        Self { tabs: 0, spaces }
    }

    /// Prefix of `prefix`; whitespace after the leading tabs counts as spaces
    #[must_use]
    pub fn of(prefix: &str, tab_width: usize) -> Self {
        let rest = prefix.trim_start_matches('\t');
        Self {
            tabs: prefix.len() - rest.len(),
            spaces: indent_width(rest, tab_width),
        }
    }

    #[must_use]
    pub fn width(self, tab_width: usize) -> usize {
        self.tabs * tab_width + self.spaces
    }

    /// One level deeper
    #[must_use]
    pub fn deeper(self, unit: usize) -> Self {
        if self.tabs > 0 && self.spaces == 0 {
            Self {
                tabs: self.tabs + 1,
                spaces: 0,
            }
        } else {
            Self {
                spaces: self.spaces + unit,
                ..self
            }
        }
    }

    #[must_use]
    pub fn render(self) -> String {
        let mut prefix = "\t".repeat(self.tabs);
        prefix.push_str(&" ".repeat(self.spaces));
        prefix
    }
}

/// Kind of a structural block tracked by the indenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `if`, `else if` and `else` branches
    Conditional,
    /// `for`, `while`, `repeat`, `forever`, `foreach`
    Loop,
    /// `case`, `casez`, `casex` up to `endcase`
    Case,
    /// Body of one case item
    CaseItem,
    /// `always*`, `initial`, `final`
    Procedural,
    /// `generate` up to `endgenerate`
    Generate,
    /// Free-standing `begin`/`fork` scope
    Block,
}

impl BlockKind {
    /// Whether an `end`/`join` closes a frame of this kind
    #[must_use]
    pub fn closed_by_end(self) -> bool {
        !matches!(self, BlockKind::Case | BlockKind::Generate)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Conditional => "if",
            BlockKind::Loop => "loop",
            BlockKind::Case => "case",
            BlockKind::CaseItem => "case item",
            BlockKind::Procedural => "procedural",
            BlockKind::Generate => "generate",
            BlockKind::Block => "begin",
        };
        write!(f, "{name}")
    }
}

/// One open block on the indentation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: BlockKind,
    /// Indentation of the header line (and of the closer)
    pub indent: Indent,
    /// Indentation of the lines directly inside the block
    ///
    /// For a case frame this is the indentation of its items.
    pub body: Indent,
    /// Body is a single statement without `begin`/`end`
    pub single: bool,
    /// An `else` may follow once this frame closes
    pub chainable: bool,
}

impl Frame {
    #[must_use]
    pub fn new(kind: BlockKind, indent: Indent, body: Indent) -> Self {
        Self {
            kind,
            indent,
            body,
            single: false,
            chainable: false,
        }
    }

    /// Frame for a header whose body is a single statement
    #[must_use]
    pub fn single(kind: BlockKind, indent: Indent, body: Indent) -> Self {
        Self {
            single: true,
            ..Self::new(kind, indent, body)
        }
    }

    #[must_use]
    pub fn with_chain(mut self, chainable: bool) -> Self {
        self.chainable = chainable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_by_end() {
        assert!(BlockKind::Conditional.closed_by_end());
        assert!(BlockKind::CaseItem.closed_by_end());
        assert!(!BlockKind::Case.closed_by_end());
        assert!(!BlockKind::Generate.closed_by_end());
    }

    #[test]
    fn test_frame_builders() {
        let frame =
            Frame::single(BlockKind::Loop, Indent::spaces(4), Indent::spaces(8)).with_chain(false);
        assert!(frame.single);
        assert_eq!(frame.body, Indent::spaces(8));
        let cond =
            Frame::new(BlockKind::Conditional, Indent::default(), Indent::spaces(4)).with_chain(true);
        assert!(cond.chainable && !cond.single);
    }

    #[test]
    fn test_indent_prefix() {
        let tabbed = Indent::of("\t\t", 4);
        assert_eq!(tabbed, Indent { tabs: 2, spaces: 0 });
        assert_eq!(tabbed.deeper(4).render(), "\t\t\t");
        assert_eq!(tabbed.width(4), 8);

        let spaced = Indent::of("  ", 4);
        assert_eq!(spaced.deeper(4).render(), "      ");

        let mixed = Indent::of("\t  ", 4);
        assert_eq!(mixed, Indent { tabs: 1, spaces: 2 });
        assert_eq!(mixed.deeper(4).render(), "\t      ");
        assert_eq!(Indent::default().deeper(2), Indent::spaces(2));
    }

    #[test]
    fn test_display() {
        assert_eq!(BlockKind::Case.to_string(), "case");
        assert_eq!(format!("{}", BlockKind::Block), "begin");
    }
}
