//! vprettier - Auto-formatter for Verilog and SystemVerilog source code

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::Pattern;
use rayon::prelude::*;
use vprettier::process::{format_file, format_line_range};
use vprettier::{find_directive, find_directive_in_lines, parse_args, CliArgs, Config, Result};
use walkdir::WalkDir;

/// Verilog file extensions to process
const VERILOG_EXTENSIONS: &[&str] = &["v", "vh", "sv", "svh", "V", "VH", "SV", "SVH"];

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// What happened to one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Unchanged,
    Changed,
}

fn main() -> Result<()> {
    let args = parse_args();

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(());
    }

    if use_stdin {
        let config = build_config(&args, None)?;
        return process_stdin(&config, &args);
    }

    // With an explicit config file one config serves every file, otherwise
    // each file discovers its own
    let base_config = if args.config.is_some() {
        Some(build_config(&args, None)?)
    } else {
        None
    };

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let files = collect_files(&args);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No Verilog files found to format.");
        }
        return Ok(());
    }

    let changed = if args.stdout || args.jobs == Some(1) {
        process_files_sequential(&files, base_config.as_ref(), &args)
    } else {
        process_files_parallel(&files, base_config.as_ref(), &args)
    };

    if args.check && changed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Build configuration from CLI args and optional config file
///
/// If `for_path` is provided and no explicit config file is specified,
/// uses auto-discovery to find config files in parent directories.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if args.debug {
            eprintln!(
                "[DEBUG] Using explicit config file: {}",
                config_path.display()
            );
        }
        Config::from_toml_file(config_path)?
    } else {
        let start = for_path.map_or_else(
            || std::env::current_dir().unwrap_or_default(),
            Path::to_path_buf,
        );
        if args.debug {
            let discovered = Config::discover_config_files(&start);
            if discovered.is_empty() {
                eprintln!("[DEBUG] No config files discovered for: {}", start.display());
            } else {
                eprintln!("[DEBUG] Discovered config files for {}:", start.display());
                for f in &discovered {
                    eprintln!("[DEBUG]   - {}", f.display());
                }
            }
        }
        Config::from_discovered_files(&start)
    };

    apply_cli_overrides(&mut config, args);

    if args.debug {
        print_config_debug(&config);
    }

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Override file settings with command-line flags
fn apply_cli_overrides(config: &mut Config, args: &CliArgs) {
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if let Some(line_length) = args.line_length {
        config.line_length = line_length;
    }
    if let Some(blank) = args.max_blank_lines {
        config.max_blank_lines = blank;
    }
    if let Some(column) = args.comment_column {
        config.comment_column = column;
    }
    if let Some(gap) = args.port_group_gap {
        config.port_group_gap = gap;
    }
    if let Some(blank) = args.group_blank_lines {
        config.group_blank_lines = blank;
    }

    if args.no_align || args.no_align_assign {
        config.align_assign = false;
    }
    if args.no_align || args.no_align_declaration {
        config.align_declaration = false;
    }
    if args.no_align || args.no_align_parameter {
        config.align_parameter = false;
    }
    if args.no_align || args.no_align_port {
        config.align_port = false;
    }
    if args.no_align || args.no_instance {
        config.format_instance = false;
    }
    if args.no_module_header {
        config.format_module_header = false;
    }
    if args.no_indent_blocks {
        config.indent_blocks = false;
    }
    if args.no_begin_end {
        config.insert_begin_end = false;
    }
    if args.no_indent_case {
        config.indent_case = false;
    }
    if args.no_annotate_ifdef {
        config.annotate_ifdef = false;
    }
    if args.keep_trailing_whitespace {
        config.trim_trailing_whitespace = false;
    }
    if args.case_item_space {
        config.case_item_space = true;
    }
}

/// Print configuration values in debug mode
fn print_config_debug(config: &Config) {
    eprintln!("[DEBUG] Configuration:");
    eprintln!("[DEBUG]   indent: {}", config.indent);
    eprintln!("[DEBUG]   max_blank_lines: {}", config.max_blank_lines);
    eprintln!("[DEBUG]   line_length: {}", config.line_length);
    eprintln!("[DEBUG]   comment_column: {}", config.comment_column);
    eprintln!(
        "[DEBUG]   trim_trailing_whitespace: {}",
        config.trim_trailing_whitespace
    );
    eprintln!(
        "[DEBUG]   align: assign={} declaration={} parameter={} port={}",
        config.align_assign, config.align_declaration, config.align_parameter, config.align_port
    );
    eprintln!(
        "[DEBUG]   format_module_header: {}",
        config.format_module_header
    );
    eprintln!("[DEBUG]   format_instance: {}", config.format_instance);
    eprintln!("[DEBUG]   indent_blocks: {}", config.indent_blocks);
    eprintln!("[DEBUG]   insert_begin_end: {}", config.insert_begin_end);
    eprintln!("[DEBUG]   indent_case: {}", config.indent_case);
    eprintln!("[DEBUG]   annotate_ifdef: {}", config.annotate_ifdef);
    eprintln!("[DEBUG]   case_item_space: {}", config.case_item_space);
    eprintln!("[DEBUG]   port_group_gap: {}", config.port_group_gap);
    eprintln!("[DEBUG]   group_blank_lines: {}", config.group_blank_lines);
}

/// Collect all files to process, handling directories and recursive flag
fn collect_files(args: &CliArgs) -> Vec<PathBuf> {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| Pattern::new(p).ok())
        .collect();
    let custom_extensions = &args.extensions;

    let mut files = Vec::new();
    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            if args.recursive {
                // WalkDir reports symlink loops as errors, which are skipped
                for entry in WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(256)
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                {
                    let path = entry.path();
                    if path.is_file()
                        && is_verilog_file(path, custom_extensions)
                        && !is_excluded(path, &exclude_patterns)
                    {
                        files.push(path.to_path_buf());
                    }
                }
            } else if let Ok(entries) = std::fs::read_dir(input) {
                for entry in entries.filter_map(std::result::Result::ok) {
                    let path = entry.path();
                    if path.is_file()
                        && is_verilog_file(&path, custom_extensions)
                        && !is_excluded(&path, &exclude_patterns)
                    {
                        files.push(path);
                    }
                }
            }
        }
    }
    files
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| {
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Check if a file has a Verilog extension (default or custom)
fn is_verilog_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VERILOG_EXTENSIONS.contains(&ext)
                || custom_extensions
                    .iter()
                    .any(|custom| custom.strip_prefix('.').unwrap_or(custom) == ext)
        })
}

/// Process files one after another; returns the number of changed files
fn process_files_sequential(
    files: &[PathBuf],
    base_config: Option<&Config>,
    args: &CliArgs,
) -> usize {
    let mut changed = 0;
    for path in files {
        match process_path(path, base_config, args) {
            Ok(Outcome::Changed) => changed += 1,
            Ok(Outcome::Unchanged) => {}
            Err(e) => eprintln!("Error formatting {}: {}", path.display(), e),
        }
    }
    changed
}

/// Process files in parallel using Rayon; returns the number of changed files
fn process_files_parallel(
    files: &[PathBuf],
    base_config: Option<&Config>,
    args: &CliArgs,
) -> usize {
    let success_count = AtomicUsize::new(0);
    let changed_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    files.par_iter().for_each(|path| match process_path(path, base_config, args) {
        Ok(outcome) => {
            success_count.fetch_add(1, Ordering::Relaxed);
            if outcome == Outcome::Changed {
                changed_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        Err(e) => {
            error_count.fetch_add(1, Ordering::Relaxed);
            eprintln!("Error formatting {}: {}", path.display(), e);
        }
    });

    let success = success_count.load(Ordering::Relaxed);
    let changed = changed_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    if !args.silent {
        let verb = if args.check { "would change" } else { "changed" };
        if errors == 0 {
            eprintln!("Processed {success} files, {changed} {verb}.");
        } else {
            eprintln!("Processed {success} files, {changed} {verb}, {errors} errors.");
        }
    }
    changed
}

fn process_path(path: &Path, base_config: Option<&Config>, args: &CliArgs) -> Result<Outcome> {
    match base_config {
        Some(config) => process_single_file(path, config, args),
        None => process_single_file(path, &build_config(args, Some(path))?, args),
    }
}

/// Report the in-file directive in debug mode
fn debug_directive(contents: &[u8], source_name: &str) {
    if let Some(overrides) = find_directive(&mut BufReader::new(Cursor::new(contents))) {
        eprintln!("[DEBUG] Found file directive in {source_name}: {overrides:?}");
    }
}

/// Format `contents`, honouring `--lines`
fn format_contents(
    contents: &[u8],
    config: &Config,
    args: &CliArgs,
    name: &str,
) -> Result<Vec<u8>> {
    if args.debug {
        debug_directive(contents, name);
    }
    let Some((start, end)) = args.lines else {
        let mut output = Vec::new();
        format_file(BufReader::new(Cursor::new(contents)), &mut output, config, name)?;
        return Ok(output);
    };

    let text = std::str::from_utf8(contents)?;
    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
    let trailing = text.ends_with('\n');
    let lines: Vec<String> = text
        .strip_suffix('\n')
        .unwrap_or(text)
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect();
    if start > lines.len() {
        anyhow::bail!("line range {start}:{end} is past the end of {name}");
    }
    let mut config = config.clone();
    if let Some(overrides) = find_directive_in_lines(&lines) {
        if overrides.disabled {
            return Ok(contents.to_vec());
        }
        overrides.apply(&mut config);
    }
    let end = end.min(lines.len());
    let mut spliced = lines[..start - 1].to_vec();
    spliced.extend(format_line_range(&lines[start - 1..end], &config));
    spliced.extend_from_slice(&lines[end..]);

    let mut out = spliced.join(eol);
    if trailing {
        out.push_str(eol);
    }
    Ok(out.into_bytes())
}

/// Process a single file
fn process_single_file(path: &Path, config: &Config, args: &CliArgs) -> Result<Outcome> {
    let metadata = std::fs::metadata(path)?;
    let file_size = metadata.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        if !args.silent {
            eprintln!(
                "Skipping {} ({} MB exceeds limit of {} MB)",
                path.display(),
                file_size / (1024 * 1024),
                DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
            );
        }
        return Ok(Outcome::Unchanged);
    }

    let mut contents = Vec::new();
    File::open(path)?.read_to_end(&mut contents)?;

    if !args.silent && !args.stdout && !args.check {
        eprintln!("Formatting: {}", path.display());
    }

    let name = path.to_string_lossy();
    let output = format_contents(&contents, config, args, &name)?;
    let outcome = if output == contents {
        Outcome::Unchanged
    } else {
        Outcome::Changed
    };

    if args.check {
        if outcome == Outcome::Changed && !args.silent {
            println!("{}", path.display());
        }
    } else if args.stdout {
        io::stdout().write_all(&output)?;
    } else if outcome == Outcome::Changed {
        std::fs::write(path, &output)?;
    }

    Ok(outcome)
}

/// Process input from stdin, output to stdout
fn process_stdin(config: &Config, args: &CliArgs) -> Result<()> {
    let mut contents = Vec::new();
    io::stdin().read_to_end(&mut contents)?;

    let size = contents.len() as u64;
    if size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let output = format_contents(&contents, config, args, "stdin")?;
    if args.check {
        if output != contents {
            if !args.silent {
                println!("stdin");
            }
            std::process::exit(1);
        }
        return Ok(());
    }
    io::stdout().write_all(&output)?;
    Ok(())
}

fn print_usage() {
    println!(
        "vprettier v{} - Verilog source code formatter",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage:");
    println!("  vprettier [OPTIONS] <FILE>...");
    println!("  vprettier [OPTIONS] -r <DIRECTORY>");
    println!("  vprettier [OPTIONS] -              # Read from stdin");
    println!("  cat top.v | vprettier              # Pipe input");
    println!();
    println!("Examples:");
    println!("  vprettier top.v                    # Format single file in-place");
    println!("  vprettier -r rtl/                  # Recursively format directory");
    println!("  vprettier --check -r rtl/          # List files that would change");
    println!("  vprettier --stdout top.v           # Output to stdout");
    println!("  vprettier --lines 10:40 top.v      # Format a line range");
    println!("  vprettier -i 2 top.v               # Use 2-space indent");
    println!();
    println!("Run `vprettier --help` for all options.");
    println!();
    println!("Supported extensions: .v, .vh, .sv, .svh");
    println!();
    println!("Config file auto-discovery:");
    println!("  Searches for vprettier.toml in parent directories");
    println!("  starting from the file being formatted up to the root directory.");
    println!("  Also checks vprettier.toml in the home directory.");
    println!("  More specific configs (closer to file) override less specific ones.");
}
