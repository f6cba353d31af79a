//! vprettier - Auto-formatter for Verilog and SystemVerilog source code
//!
//! A line-oriented formatter: it aligns declarations, assignments, ports,
//! parameters and instantiations, re-indents procedural blocks, and leaves
//! everything it does not recognise byte-for-byte unchanged.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;
pub mod scope;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, parse_line_range, CliArgs};
pub use config::Config;
pub use directive::{find_directive, find_directive_in_lines, parse_directive, DirectiveOverrides};
pub use error::Result;
pub use format::MAX_BEGIN_END_PASSES;
pub use process::{format_file, format_line_range, format_lines, format_text, FormatResult};
