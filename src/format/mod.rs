//! Verilog source code formatting.
//!
//! This module contains the formatting engines, each working on a slice of
//! physical lines:
//! - [`assign`]: Aligns `=` / `<=` across runs of assignments
//! - [`declaration`]: Aligns net and variable declarations into columns
//! - [`port`]: Aligns port declarations, in bodies and in module headers
//! - [`parameter`]: Aligns `parameter` / `localparam` lists
//! - [`header`]: Lays out multi-line module headers
//! - [`instance`]: Aligns named port connections of instantiations
//! - [`conditional`]: Annotates `` `else`` / `` `endif`` with their macro
//! - [`begin_end`]: Wraps single-statement bodies in `begin`/`end`
//! - [`indenter`]: Re-indents procedural, case and generate blocks
//! - [`comments`]: Moves trailing comments to a fixed column
//! - [`columns`]: Column layout helpers shared by the aligners

pub mod assign;
pub mod begin_end;
pub mod columns;
pub mod comments;
pub mod conditional;
pub mod declaration;
pub mod header;
pub mod indenter;
pub mod instance;
pub mod parameter;
pub mod port;

pub use assign::align_assignments;
pub use begin_end::{insert_begin_end, MAX_BEGIN_END_PASSES};
pub use columns::ListStyle;
pub use comments::align_comment_column;
pub use conditional::DirectiveAnnotator;
pub use declaration::align_declarations;
pub use header::format_header;
pub use indenter::{indent_blocks, BlockIndenter};
pub use instance::align_instances;
pub use parameter::align_parameters;
pub use port::align_ports;
