//! Compatibility tests against expected output
//!
//! These tests run whole files through `format_file` and compare the
//! result line by line with the expected layout.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{BufReader, Cursor};

use vprettier::process::format_file;
use vprettier::Config;

/// Run vprettier on `input` and return the output text
fn run(input: &str, config: &Config) -> String {
    let reader = BufReader::new(Cursor::new(input.as_bytes()));
    let mut output = Vec::new();

    format_file(reader, &mut output, config, "test.v")
        .unwrap_or_else(|e| panic!("vprettier failed: {e}"));

    String::from_utf8(output).unwrap_or_else(|e| panic!("Invalid UTF-8 in output: {e}"))
}

/// Compare line by line for better error messages
fn assert_formats_to(input: &str, expected: &str, config: &Config) {
    let result = run(input, config);

    let result_lines: Vec<&str> = result.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    let mut differences = Vec::new();
    for (i, (result_line, expected_line)) in
        result_lines.iter().zip(expected_lines.iter()).enumerate()
    {
        if result_line != expected_line {
            differences.push((i + 1, *expected_line, *result_line));
        }
    }

    if !differences.is_empty() {
        eprintln!("Found {} differences:", differences.len());
        for (line_num, expected, got) in differences.iter().take(10) {
            eprintln!("\nLine {line_num}:");
            eprintln!("  expected: {expected:?}");
            eprintln!("  got:      {got:?}");
        }
        panic!("{} differences found", differences.len());
    }
    assert_eq!(
        result_lines.len(),
        expected_lines.len(),
        "Line count mismatch"
    );
    assert_eq!(result, expected);
}

// ============================================================================
// Alignment
// ============================================================================

#[test]
fn test_compat_declarations() {
    assert_formats_to(
        "wire [7:0] data;\nreg valid;\nlogic signed [15:0] acc;\n",
        "wire         [7:0]  data ;\nreg                 valid;\nlogic signed [15:0] acc  ;\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_body_ports() {
    assert_formats_to(
        "input clk;\noutput [3:0] q;\n",
        "input        clk;\noutput [3:0] q  ;\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_body_parameters() {
    assert_formats_to(
        "localparam W = 8;\nlocalparam int DEPTH = 16;\nparameter [3:0] M = 4'hF;\n",
        "localparam           W     = 8   ;\n\
         localparam int       DEPTH = 16  ;\n\
         parameter      [3:0] M     = 4'hF;\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_instance_connections() {
    assert_formats_to(
        "fifo u_fifo (\n    .clk(sys_clk),\n    .din (data),\n    .full(full)\n);\n",
        "fifo u_fifo (\n    .clk  (sys_clk),\n    .din  (data   ),\n    .full (full   )\n);\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_module_header() {
    assert_formats_to(
        "module fifo #(\nparameter WIDTH = 8,\nparameter DEPTH = 16\n) (\ninput clk,\noutput [WIDTH-1:0] dout\n);\nendmodule\n",
        "module fifo #(\n    parameter WIDTH = 8,\n    parameter DEPTH = 16\n) (\n    input              clk,\n    output [WIDTH-1:0] dout\n);\nendmodule\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_alignment_disabled() {
    let config = Config {
        align_declaration: false,
        ..Config::default()
    };
    let input = "wire [7:0] data;\nreg valid;\n";
    assert_eq!(run(input, &config), input);
}

// ============================================================================
// Block structure
// ============================================================================

#[test]
fn test_compat_indent_two() {
    let config = Config {
        indent: 2,
        ..Config::default()
    };
    assert_formats_to(
        "initial begin\nx = 1;\nend\n",
        "initial begin\n  x = 1;\nend\n",
        &config,
    );
}

#[test]
fn test_compat_case_items() {
    assert_formats_to(
        "always @* begin\ncase (sel)\n2'b00 : y = a;\ndefault: y = 0;\nendcase\nend\n",
        "always @* begin\n    case (sel)\n        2'b00: y = a;\n        default: y = 0;\n    endcase\nend\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_nested_wrap() {
    assert_formats_to(
        "always @(posedge clk)\nif (en)\nq <= d;\n",
        "always @(posedge clk) begin\n    if (en) begin\n        q <= d;\n    end\nend\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_indent_disabled() {
    let config = Config {
        indent_blocks: false,
        insert_begin_end: false,
        ..Config::default()
    };
    let input = "initial begin\nx = 1;\nend\n";
    assert_eq!(run(input, &config), input);
}

// ============================================================================
// Directives and comments
// ============================================================================

#[test]
fn test_compat_nested_ifdef() {
    assert_formats_to(
        "`ifdef A\n`ifdef B\n`endif\n`else\n`endif\n",
        "`ifdef A\n`ifdef B\n`endif // B\n`else // A\n`endif // A\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_ifdef_annotation_disabled() {
    let config = Config {
        annotate_ifdef: false,
        ..Config::default()
    };
    let input = "`ifdef A\n`endif\n";
    assert_eq!(run(input, &config), input);
}

#[test]
fn test_compat_comment_column() {
    let config = Config {
        comment_column: 12,
        ..Config::default()
    };
    assert_formats_to(
        "  a = b; // x\n// whole line\nwire w;\n",
        "  a = b;    // x\n// whole line\nwire w;\n",
        &config,
    );
}

#[test]
fn test_compat_file_directive_off() {
    let input = "// vprettier: off\nwire   a ;\n";
    assert_eq!(run(input, &Config::default()), input);
}

#[test]
fn test_compat_file_directive_no_indent() {
    let input = "// vprettier: --no-indent --no-begin-end\ninitial begin\nx = 1;\nend\n";
    assert_eq!(run(input, &Config::default()), input);
}

#[test]
fn test_compat_crlf_preserved() {
    assert_formats_to(
        "assign a=b;\r\nassign data=result;\r\n",
        "assign a    = b;\r\nassign data = result;\r\n",
        &Config::default(),
    );
}

#[test]
fn test_compat_blank_lines_compressed() {
    assert_formats_to(
        "wire a;\n\n\n\nwire b;\n",
        "wire a;\n\nwire b;\n",
        &Config::default(),
    );
}
