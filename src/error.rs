//! Error types and result aliases for vprettier.
//!
//! The formatting pipeline itself cannot fail; only the shell around it
//! (file I/O, config loading, argument handling) returns errors:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;
