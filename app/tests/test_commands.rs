//! FILENAME: tests/test_commands.rs
//! Integration tests for the sheet-cli command loop.

mod common;

use common::TestHarness;

#[test]
fn test_set_and_get() {
    let mut h = TestHarness::new();
    let out = h.run("set A1 =1+2\nset B1 hello\nget A1\nget B1\nget C1\n");

    assert_eq!(out, "3\t=1+2\nhello\thello\n0\t\n");
    assert_eq!(h.failures, 0);
}

#[test]
fn test_values_and_texts_tables() {
    let mut h = TestHarness::new();
    let out = h.run(
        "\
# a small table
set A1 =2
set B1 =A1*10

set A2 'label
set B2 =A1/0
values
texts
size
",
    );

    assert_eq!(
        out,
        "2\t20\nlabel\t#DIV/0!\n=2\t=A1*10\n'label\t=A1/0\n2 2\n"
    );
}

#[test]
fn test_errors_are_reported_and_processing_continues() {
    let mut h = TestHarness::new();
    let out = h.run(
        "\
set A1 =B1
set B1 =A1
set C1 =1+
jump A1
get B1
",
    );

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "error: Circular dependency at B1");
    assert!(lines[1].starts_with("error: Formula syntax error (#REF!)"));
    assert_eq!(lines[2], "error: unknown command: jump");
    assert_eq!(lines[3], "0\t");
    assert_eq!(h.failures, 3);
}

#[test]
fn test_invalid_position_is_reported() {
    let mut h = TestHarness::new();
    let out = h.run("get XFE1\nget XFD16384\n");

    assert_eq!(out, "error: invalid cell reference: XFE1\n0\t\n");
}

#[test]
fn test_cascade_through_the_shell() {
    let mut h = TestHarness::new();
    h.run("set A1 =1\nset B1 =A1+1\nset C1 =B1+1\n");
    assert_eq!(h.run("get C1\n"), "3\t=B1+1\n");

    h.run("set A1 =5\n");
    assert_eq!(h.run("get B1\nget C1\n"), "6\t=A1+1\n7\t=B1+1\n");
}

#[test]
fn test_set_with_empty_text_empties_the_cell() {
    let mut h = TestHarness::new();
    h.run("set A1 hello\nset B2 x\n");
    assert_eq!(h.run("size\n"), "2 2\n");

    h.run("set B2\n");
    assert_eq!(h.run("size\nget B2\n"), "1 1\n0\t\n");
}

#[test]
fn test_clear_removes_the_cell() {
    let mut h = TestHarness::new();
    h.run("set A1 =4\nset A2 =A1*2\nget A2\nclear A1\n");

    assert!(h.sheet().get_cell(engine::Position::new(0, 0)).unwrap().is_none());
    assert_eq!(h.run("get A2\n"), "0\t=A1*2\n");
}

#[test]
fn test_stats_is_json() {
    let mut h = TestHarness::new();
    let out = h.run("set A1 =1\nset B1 =A1+1\nget B1\nstats\n");
    let json_line = out.lines().last().unwrap();

    let stats: serde_json::Value = serde_json::from_str(json_line).unwrap();
    assert_eq!(stats["cells"], 2);
    assert_eq!(stats["formula_cells"], 2);
    assert_eq!(stats["dependency_edges"], 1);
    assert_eq!(stats["evaluations"], 2);
}

#[test]
fn test_legacy_configuration_reaches_the_sheet() {
    let mut h = TestHarness::legacy();
    h.run("set A1 =1\nset B1 =A1+1\nget B1\nset A1 =2\nget B1\nset A1 =5\n");

    assert_eq!(h.run("get B1\n"), "3\t=A1+1\n");
}

#[test]
fn test_deeply_nested_formula_does_not_stop_the_shell() {
    let mut h = TestHarness::new();
    let script = format!("set A1 ={}1\nset A1 =-1\nget A1\n", "(".repeat(20_000));
    let out = h.run(&script);

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("error: Formula syntax error (#REF!)"));
    assert_eq!(lines[1], "-1\t=-1");
    assert_eq!(h.failures, 1);
}
