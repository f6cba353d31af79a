//! Verilog source scanning utilities.
//!
//! This module provides the line-level recognition the formatter works with:
//! - [`CharFilter`]: Iterator adapter that identifies strings, comments, and code regions
//! - [`line`]: Splits a physical line into indentation, code and trailing comment
//! - [`classify`]: Tags each line with a [`LineKind`]
//! - [`patterns`]: Precompiled regex patterns and keyword tables
//!
//! Nothing here builds a syntax tree. Recognition is per line and tolerant of
//! partial or invalid source, so a selection cut out of a larger file can be
//! handled the same way as a whole file.

pub mod char_filter;
pub mod classify;
pub mod line;
pub mod patterns;

pub use char_filter::CharFilter;
pub use classify::{classify, classify_all, BlockComments, Classified, DirectiveKind, Header, LineKind};
pub use line::{AssignOp, Line, StatementState};
