//! Command-line interface for vprettier.
//!
//! Defines CLI arguments using clap builder API

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to format
    pub inputs: Vec<PathBuf>,

    /// Number of spaces per indent level
    pub indent: Option<usize>,

    /// Maximum line length
    pub line_length: Option<usize>,

    /// Maximum consecutive blank lines (-1 keeps all)
    pub max_blank_lines: Option<isize>,

    /// Column for trailing comments (0 disables)
    pub comment_column: Option<usize>,

    /// Comment/directive lines a port group absorbs
    pub port_group_gap: Option<usize>,

    /// Blank lines an alignment group absorbs
    pub group_blank_lines: Option<usize>,

    /// Only format lines START:END (1-based, inclusive)
    pub lines: Option<(usize, usize)>,

    /// Disable every alignment engine
    pub no_align: bool,

    pub no_align_assign: bool,
    pub no_align_declaration: bool,
    pub no_align_parameter: bool,
    pub no_align_port: bool,
    pub no_module_header: bool,
    pub no_instance: bool,

    /// Disable block indentation
    pub no_indent_blocks: bool,

    /// Disable `begin`/`end` insertion
    pub no_begin_end: bool,

    /// Keep case items at the level of `case`
    pub no_indent_case: bool,

    /// Disable `` `else``/`` `endif`` annotation
    pub no_annotate_ifdef: bool,

    /// Keep trailing whitespace
    pub keep_trailing_whitespace: bool,

    /// Put a space before case item colons
    pub case_item_space: bool,

    /// Output to stdout instead of in-place
    pub stdout: bool,

    /// Report files that would change and exit non-zero
    pub check: bool,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Silent mode (no output)
    pub silent: bool,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Custom Verilog file extensions (in addition to defaults)
    pub extensions: Vec<String>,

    /// Enable debug output
    pub debug: bool,
}

/// Parse a `START:END` line range (1-based, inclusive)
#[must_use]
pub fn parse_line_range(text: &str) -> Option<(usize, usize)> {
    let (start, end) = text.split_once(':')?;
    let start: usize = start.trim().parse().ok()?;
    let end: usize = end.trim().parse().ok()?;
    (start >= 1 && start <= end).then_some((start, end))
}

fn switch(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .action(ArgAction::SetTrue)
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("vprettier")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Auto-formatter for Verilog and SystemVerilog code")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("indent")
                .short('i')
                .long("indent")
                .help("Number of spaces per indent level [default: 4]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("line-length")
                .short('l')
                .long("line-length")
                .help("Maximum line length [default: 120]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("max-blank-lines")
                .short('b')
                .long("max-blank-lines")
                .help("Maximum consecutive blank lines, -1 keeps all [default: 1]")
                .value_name("NUM")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(isize)),
        )
        .arg(
            Arg::new("comment-column")
                .long("comment-column")
                .help("Column for trailing comments, 0 disables [default: 0]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("port-group-gap")
                .long("port-group-gap")
                .help("Comment lines a port group absorbs before it is closed [default: 2]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("group-blank-lines")
                .long("group-blank-lines")
                .help("Blank lines an alignment group absorbs [default: 0]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("lines")
                .long("lines")
                .help("Only format lines START:END (1-based, inclusive)")
                .value_name("START:END"),
        )
        .arg(switch("no-align", "Disable all alignment"))
        .arg(switch("no-align-assign", "Do not align assignments"))
        .arg(switch("no-align-declaration", "Do not align declarations"))
        .arg(switch("no-align-parameter", "Do not align parameters"))
        .arg(switch("no-align-port", "Do not align port declarations"))
        .arg(switch("no-module-header", "Do not format module headers"))
        .arg(switch("no-instance", "Do not align instance connections"))
        .arg(
            Arg::new("no-indent-blocks")
                .long("no-indent-blocks")
                .alias("no-indent")
                .help("Do not re-indent blocks")
                .action(ArgAction::SetTrue),
        )
        .arg(switch("no-begin-end", "Do not wrap single statements in begin/end"))
        .arg(switch("no-indent-case", "Keep case items at the case level"))
        .arg(switch("no-annotate-ifdef", "Do not annotate `else/`endif"))
        .arg(switch("keep-trailing-whitespace", "Keep trailing whitespace"))
        .arg(switch("case-item-space", "Put a space before case item colons"))
        .arg(
            Arg::new("stdout")
                .short('s')
                .long("stdout")
                .help("Output to stdout instead of modifying files in-place")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("List files that would change and exit with status 1")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively format directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("extension")
                .short('x')
                .long("extension")
                .help("Additional file extension to format (can be repeated)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config and discovered files)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no output, for editor integration)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        indent: matches.get_one::<usize>("indent").copied(),
        line_length: matches.get_one::<usize>("line-length").copied(),
        max_blank_lines: matches.get_one::<isize>("max-blank-lines").copied(),
        comment_column: matches.get_one::<usize>("comment-column").copied(),
        port_group_gap: matches.get_one::<usize>("port-group-gap").copied(),
        group_blank_lines: matches.get_one::<usize>("group-blank-lines").copied(),
        lines: matches
            .get_one::<String>("lines")
            .and_then(|text| parse_line_range(text)),
        no_align: matches.get_flag("no-align"),
        no_align_assign: matches.get_flag("no-align-assign"),
        no_align_declaration: matches.get_flag("no-align-declaration"),
        no_align_parameter: matches.get_flag("no-align-parameter"),
        no_align_port: matches.get_flag("no-align-port"),
        no_module_header: matches.get_flag("no-module-header"),
        no_instance: matches.get_flag("no-instance"),
        no_indent_blocks: matches.get_flag("no-indent-blocks"),
        no_begin_end: matches.get_flag("no-begin-end"),
        no_indent_case: matches.get_flag("no-indent-case"),
        no_annotate_ifdef: matches.get_flag("no-annotate-ifdef"),
        keep_trailing_whitespace: matches.get_flag("keep-trailing-whitespace"),
        case_item_space: matches.get_flag("case-item-space"),
        stdout: matches.get_flag("stdout"),
        check: matches.get_flag("check"),
        config: matches.get_one::<PathBuf>("config").cloned(),
        recursive: matches.get_flag("recursive"),
        silent: matches.get_flag("silent"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        exclude: strings("exclude"),
        extensions: strings("extension"),
        debug: matches.get_flag("debug"),
    }
}
