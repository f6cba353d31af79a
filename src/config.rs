//! Configuration management for vprettier.
//!
//! This module provides the [`Config`] struct which controls all formatting behavior.
//! Configuration can be loaded from:
//! - TOML files (`vprettier.toml`)
//! - CLI arguments (which override file settings)
//! - In-file directives (`// vprettier: --indent 2`)
//!
//! Config files are auto-discovered by searching parent directories from the file
//! being formatted up to the filesystem root, plus the user's home directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["vprettier.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    // Try HOME environment variable first (works on Unix and some Windows setups)
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_indent() -> usize {
    4
}
fn default_max_blank_lines() -> isize {
    1
}
fn default_line_length() -> usize {
    120
}
fn default_true() -> bool {
    true
}
fn default_port_group_gap() -> usize {
    2
}

/// Main configuration struct for vprettier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indent level (default: 4)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Maximum number of consecutive blank lines kept (default: 1, -1 keeps all)
    #[serde(default = "default_max_blank_lines")]
    pub max_blank_lines: isize,

    /// Maximum line length; aligned rows that would exceed it are not padded (default: 120)
    #[serde(default = "default_line_length")]
    pub line_length: usize,

    /// Column at which trailing comments are placed (default: 0, disabled)
    #[serde(default)]
    pub comment_column: usize,

    /// Strip trailing whitespace from every line (default: true)
    #[serde(default = "default_true")]
    pub trim_trailing_whitespace: bool,

    /// Align `=`/`<=` of consecutive assignments (default: true)
    #[serde(default = "default_true")]
    pub align_assign: bool,

    /// Align consecutive net and variable declarations (default: true)
    #[serde(default = "default_true")]
    pub align_declaration: bool,

    /// Align consecutive parameter declarations (default: true)
    #[serde(default = "default_true")]
    pub align_parameter: bool,

    /// Align consecutive port declarations (default: true)
    #[serde(default = "default_true")]
    pub align_port: bool,

    /// Re-indent and align multi-line module headers (default: true)
    #[serde(default = "default_true")]
    pub format_module_header: bool,

    /// Align named port connections of module instances (default: true)
    #[serde(default = "default_true")]
    pub format_instance: bool,

    /// Indent the bodies of procedural, conditional, loop and case blocks (default: true)
    #[serde(default = "default_true")]
    pub indent_blocks: bool,

    /// Wrap single-statement bodies in `begin`/`end` (default: true)
    #[serde(default = "default_true")]
    pub insert_begin_end: bool,

    /// Indent case items one level inside `case` (default: true)
    #[serde(default = "default_true")]
    pub indent_case: bool,

    /// Annotate `` `else``/`` `endif`` with the name of their `` `ifdef`` (default: true)
    #[serde(default = "default_true")]
    pub annotate_ifdef: bool,

    /// Put a space before the colon of a case item label (default: false)
    #[serde(default)]
    pub case_item_space: bool,

    /// Consecutive comment or directive lines a port group absorbs before it is flushed (default: 2)
    #[serde(default = "default_port_group_gap")]
    pub port_group_gap: usize,

    /// Consecutive blank lines an open alignment group absorbs (default: 0)
    #[serde(default)]
    pub group_blank_lines: usize,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
struct PartialConfig {
    pub indent: Option<usize>,
    pub max_blank_lines: Option<isize>,
    pub line_length: Option<usize>,
    pub comment_column: Option<usize>,
    pub trim_trailing_whitespace: Option<bool>,
    pub align_assign: Option<bool>,
    pub align_declaration: Option<bool>,
    pub align_parameter: Option<bool>,
    pub align_port: Option<bool>,
    pub format_module_header: Option<bool>,
    pub format_instance: Option<bool>,
    pub indent_blocks: Option<bool>,
    pub insert_begin_end: Option<bool>,
    pub indent_case: Option<bool>,
    pub annotate_ifdef: Option<bool>,
    pub case_item_space: Option<bool>,
    pub port_group_gap: Option<usize>,
    pub group_blank_lines: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: 4,
            max_blank_lines: 1,
            line_length: 120,
            comment_column: 0,
            trim_trailing_whitespace: true,
            align_assign: true,
            align_declaration: true,
            align_parameter: true,
            align_port: true,
            format_module_header: true,
            format_instance: true,
            indent_blocks: true,
            insert_begin_end: true,
            indent_case: true,
            annotate_ifdef: true,
            case_item_space: false,
            port_group_gap: 2,
            group_blank_lines: 0,
        }
    }
}

impl Config {
    /// Minimum reasonable line length (must fit at least some code)
    const MIN_LINE_LENGTH: usize = 40;
    /// Maximum reasonable line length
    const MAX_LINE_LENGTH: usize = 1000;
    /// Maximum reasonable indent size
    const MAX_INDENT: usize = 16;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.indent == 0 {
            return Some("indent must be at least 1".to_string());
        }
        if self.indent > Self::MAX_INDENT {
            return Some(format!(
                "indent {} exceeds maximum of {}",
                self.indent,
                Self::MAX_INDENT
            ));
        }
        if self.line_length < Self::MIN_LINE_LENGTH {
            return Some(format!(
                "line_length {} is below minimum of {}",
                self.line_length,
                Self::MIN_LINE_LENGTH
            ));
        }
        if self.line_length > Self::MAX_LINE_LENGTH {
            return Some(format!(
                "line_length {} exceeds maximum of {}",
                self.line_length,
                Self::MAX_LINE_LENGTH
            ));
        }
        if self.comment_column > self.line_length {
            return Some(format!(
                "comment_column {} exceeds line_length {}",
                self.comment_column, self.line_length
            ));
        }
        if self.max_blank_lines < -1 {
            return Some(format!(
                "max_blank_lines {} is below -1 (use -1 to keep all blank lines)",
                self.max_blank_lines
            ));
        }
        None
    }

    /// Blank-line limit, or `None` when blank lines are never compressed
    #[must_use]
    pub fn blank_line_limit(&self) -> Option<usize> {
        usize::try_from(self.max_blank_lines).ok()
    }

    /// Copy of this config limited to passes that are safe on a fragment
    ///
    /// Block indentation and `begin`/`end` insertion need the enclosing
    /// structure, so both are switched off.
    #[must_use]
    pub fn for_fragment(&self) -> Self {
        Self {
            indent_blocks: false,
            insert_begin_end: false,
            ..self.clone()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let partial: PartialConfig = toml::from_str(&contents)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(v) = partial.$field {
                        self.$field = v;
                    }
                )*
            };
        }
        merge!(
            indent,
            max_blank_lines,
            line_length,
            comment_column,
            trim_trailing_whitespace,
            align_assign,
            align_declaration,
            align_parameter,
            align_port,
            format_module_header,
            format_instance,
            indent_blocks,
            insert_begin_end,
            indent_case,
            annotate_ifdef,
            case_item_space,
            port_group_gap,
            group_blank_lines,
        );
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        // Add home directory config first (lowest priority)
        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            // Path doesn't exist, use current directory
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so more specific files are merged last
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Returns default config if no files found.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let config_files = Self::discover_config_files(start_path);

        let mut config = Self::default();
        for path in &config_files {
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str::<PartialConfig>(&contents) {
                    Ok(partial) => config.apply_partial(&partial),
                    Err(e) => eprintln!("Warning: failed to parse {}: {e}", path.display()),
                },
                Err(e) => eprintln!("Warning: failed to read {}: {e}", path.display()),
            }
        }
        config
    }
}
