/// Regex patterns and keyword tables for Verilog syntax
///
/// All patterns are compiled once on first use via `LazyLock`.
/// Verilog is case sensitive, so unlike most formatters' pattern sets
/// none of these use the case-insensitive flag.
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. This is acceptable because all patterns
/// in this module are compile-time constants that are verified by tests.
/// The panic occurs at first access of the `LazyLock` static.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// ===== KEYWORD TABLES =====

/// Net and variable declaration keywords
pub const DECL_KEYWORDS: &[&str] = &[
    "wire", "reg", "logic", "bit", "byte", "shortint", "int", "longint", "integer", "time",
    "real", "realtime", "shortreal", "genvar", "tri", "tri0", "tri1", "triand", "trior",
    "trireg", "wand", "wor", "uwire", "supply0", "supply1", "event",
];

/// Port direction keywords
pub const PORT_DIRECTIONS: &[&str] = &["input", "output", "inout", "ref"];

/// Parameter keywords
pub const PARAM_KEYWORDS: &[&str] = &["parameter", "localparam", "specparam"];

/// Type keywords allowed after a port direction or parameter keyword
pub const TYPE_KEYWORDS: &[&str] = &[
    "wire", "reg", "logic", "bit", "byte", "shortint", "int", "longint", "integer", "time",
    "real", "realtime", "shortreal", "tri", "wand", "wor", "uwire", "var", "string",
];

/// Qualifiers that may follow a type keyword
pub const QUALIFIERS: &[&str] = &["signed", "unsigned", "var", "vectored", "scalared"];

/// Procedural block keywords (open a procedural body)
pub const PROCEDURAL_KEYWORDS: &[&str] = &[
    "always",
    "always_ff",
    "always_comb",
    "always_latch",
    "initial",
    "final",
];

/// Loop keywords
pub const LOOP_KEYWORDS: &[&str] = &["for", "while", "repeat", "forever", "foreach"];

/// Case statement keywords
pub const CASE_KEYWORDS: &[&str] = &["case", "casez", "casex", "randcase"];

/// Case statement modifiers
pub const CASE_MODIFIERS: &[&str] = &["unique", "unique0", "priority"];

/// Keywords that end a procedural or generate scope
pub const SCOPE_END_KEYWORDS: &[&str] = &["end", "join", "join_any", "join_none"];

/// Keywords that can never start an assignment or a case item label
pub const RESERVED_WORDS: &[&str] = &[
    "if", "else", "for", "while", "repeat", "forever", "foreach", "do", "case", "casez",
    "casex", "endcase", "begin", "end", "fork", "join", "join_any", "join_none", "always",
    "always_ff", "always_comb", "always_latch", "initial", "final", "generate", "endgenerate",
    "module", "endmodule", "function", "endfunction", "task", "endtask", "assign", "default",
    "return", "unique", "unique0", "priority", "wait", "disable", "deassign", "force",
    "release",
];

/// Compiler directives that are not statements (everything else after a backtick is a macro use)
pub const COMPILER_DIRECTIVES: &[&str] = &[
    "define", "undef", "undefineall", "include", "timescale", "default_nettype", "resetall",
    "celldefine", "endcelldefine", "pragma", "line", "begin_keywords", "end_keywords",
    "unconnected_drive", "nounconnected_drive", "ifdef", "ifndef", "elsif", "else", "endif",
];

// ===== PATTERNS =====

/// Leading word of a code line
pub static FIRST_WORD_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*([A-Za-z_$][\w$]*)"));

/// Any compiler directive at line start: `` `name``
pub static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*`([A-Za-z_]\w*)"));

/// Conditional-compilation directive anywhere on a line
pub static COND_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"`(ifdef|ifndef|elsif)\s+([A-Za-z_]\w*)|`(else|endif)\b")
});

/// Left-hand side of an assignment: identifier with optional selects, or a concatenation
pub static ASSIGN_LHS_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^(?:[A-Za-z_][\w$]*(?:\s*\[[^\]]*\])*(?:\.[A-Za-z_][\w$]*(?:\s*\[[^\]]*\])*)*|\{.*\})$")
});

/// Declared name with optional unpacked dimensions: `mem [0:15]`
pub static DECL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^([A-Za-z_][\w$]*)\s*((?:\[[^\]]*\]\s*)*)$"));

/// Named port connection in an instantiation: `.port(signal),`
pub static CONNECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\.([A-Za-z_][\w$]*)\s*\((.*)\)\s*(,?)$"));

/// Module header start
pub static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(r"^\s*(?:module|macromodule)\b"));

/// Module instantiation head: `name [#(...)] inst (`
pub static INSTANCE_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(r"^([A-Za-z_][\w$]*)\s*(?:#\s*\(.*\)\s*)?([A-Za-z_][\w$]*)?\s*(?:\[[^\]]*\]\s*)?\(")
});

/// Check whether `word` is contained in a keyword table
#[must_use]
pub fn is_one_of(word: &str, table: &[&str]) -> bool {
    table.contains(&word)
}
