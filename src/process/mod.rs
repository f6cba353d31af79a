//! Document processing.
//!
//! This module wires the formatting passes together:
//! - [`segment`]: one forward pass grouping lines for the alignment engines
//! - [`pipeline`]: whole-document entry points and the pass order
//! - [`range`]: formatting of an editor selection
//!
//! The pipeline never fails on its input. Malformed or partial code degrades
//! to passing the affected lines through unchanged.

pub mod pipeline;
pub mod range;
pub mod segment;

pub use pipeline::{format_file, format_lines, format_text, run_passes, FormatResult};
pub use range::{format_line_range, is_complete_structure};
pub use segment::segment;
