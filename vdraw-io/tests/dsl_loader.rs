use std::path::PathBuf;

use vdraw_core::document::{Endpoint, LineShape};
use vdraw_core::geometry::{Geometry, Point2};
use vdraw_core::style::{CapStyle, Color, TextAlign};
use vdraw_io::errors::{ErrorKind, StatementError};
use vdraw_io::{DocumentLoader, DocumentSaver, DslFacade, IoError, parse_drawing};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn scalar_chain_matches_reference_values() {
    let report = DslFacade::new()
        .load_report(&fixture("scalars.vd"))
        .expect("读取标量样例失败");
    assert!(report.is_clean(), "unexpected errors: {:?}", report.errors);
    assert!(report.document.is_empty());

    let symbols = report.symbols();
    let expected = [
        ("v1", 23.5),
        ("v2", 10.0),
        ("v3", 15.001),
        ("v4", -2.33),
        ("v5", 45.0),
        ("v6", 9.891),
        ("v7", 44.19203),
    ];
    assert_eq!(symbols.len(), expected.len());
    for (name, value) in expected {
        let actual = symbols
            .get(name)
            .unwrap_or_else(|| panic!("symbol {name} missing"));
        assert_close(actual, value);
    }
}

#[test]
fn floor_plan_builds_expected_document() {
    let doc = DslFacade::new()
        .load(&fixture("floor_plan.vd"))
        .expect("读取平面图样例失败");

    let page = doc.page();
    assert_eq!(page.scale, 50);
    assert_close(page.grid, 2.5);
    assert_eq!(page.units, "mm");
    assert_close(page.width, 420.0);
    assert_close(page.height, 297.0);
    assert_close(page.snap, 1.0);

    assert_eq!(doc.rects().len(), 3);
    assert_eq!(doc.lines().len(), 2);

    let hall = &doc.rects()[0];
    assert_eq!(hall.common.id, "hall");
    assert_eq!(hall.common.layer, 1);
    assert_eq!(hall.common.text, "Hall");
    assert_eq!(hall.common.text_align, TextAlign::TopCenter);
    assert_eq!(hall.common.fill_color, Color::LightGray);
    assert_eq!(hall.common.line_color, Color::DarkGray);
    assert_close(hall.common.line_thickness, 0.5);
    assert_eq!(hall.location(), Point2::new(10.0, 10.0));
    assert_close(hall.width(), 120.0);
    assert_close(hall.height(), 80.0);

    let office = &doc.rects()[1];
    assert_eq!(office.common.text, "Office");
    assert_eq!(office.common.fill_color, Color::White);
    assert_eq!(office.common.text_align, TextAlign::MiddleCenter);
    assert_eq!(office.location(), Point2::new(130.0, 10.0));

    let desk = &doc.rects()[2];
    assert_eq!(desk.common.layer, 2);
    assert_eq!(desk.common.fill_color, Color::Brown);
    assert_eq!(desk.location(), Point2::new(135.0, 15.0));
    assert_close(desk.width(), 20.0);
    assert_close(desk.height(), 10.0);

    let door = &doc.lines()[0];
    assert_eq!(door.start, Point2::new(10.0, 90.0));
    assert_eq!(door.end, Point2::new(25.0, 90.0));
    assert_eq!(door.start_cap, CapStyle::None);
    assert_eq!(door.end_cap, CapStyle::FilledArrow);
    assert_eq!(door.common.line_color, Color::DarkGray);

    let axis = &doc.lines()[1];
    assert_eq!(axis.common.layer, 4);
    assert_eq!(axis.start_cap, CapStyle::HollowCircle);
    assert_eq!(axis.end_cap, CapStyle::None);
    assert_eq!(axis.common.line_color, Color::Red);
    assert_close(axis.common.line_thickness, 0.25);

    let hit = door.nearest_feature_index(Point2::new(24.0, 91.0), 2.0);
    assert_eq!(hit.and_then(LineShape::endpoint), Some(Endpoint::End));
}

#[test]
fn broken_lines_are_isolated_and_row_tagged() {
    let report = DslFacade::new()
        .load_report(&fixture("broken_lines.vd"))
        .expect("读取错误样例失败");

    let ids: Vec<_> = report.document.shapes().map(|shape| shape.id()).collect();
    assert_eq!(ids, vec!["R1", "R5", "R7"]);
    assert_eq!(report.document.page().scale, 2);

    let rows: Vec<_> = report.errors.iter().map(|error| error.row).collect();
    assert_eq!(rows, vec![1, 3, 4, 5, 6, 7, 8, 9, 12, 13]);

    let kinds: Vec<_> = report.errors.iter().map(|error| error.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::MissingField,
            ErrorKind::Validation,
            ErrorKind::Malformed,
            ErrorKind::MissingField,
            ErrorKind::Lookup,
            ErrorKind::Lookup,
            ErrorKind::Lookup,
            ErrorKind::Malformed,
            ErrorKind::MissingField,
            ErrorKind::Validation,
        ]
    );
    assert_eq!(
        report.errors[2].error,
        StatementError::UndefinedSymbol {
            name: "ghost".to_string()
        }
    );
    assert_eq!(
        report.errors[8].error,
        StatementError::MissingField {
            statement: "page",
            field: "gr"
        }
    );
    assert!(report.errors[0].to_string().starts_with("row 1: "));
    assert!(report.errors[8].to_string().starts_with("row 12: "));
    assert_eq!(report.session.defaults.fill_color, Color::Transparent);
}

#[test]
fn zero_width_rect_is_rejected_but_previous_rect_survives() {
    let report = parse_drawing("R1=rect: x=10,y=10,w=5,h=5\nR2=rect: x=10,y=10,w=0,h=5\n");
    assert_eq!(report.document.rects().len(), 1);
    assert_eq!(report.document.rects()[0].common.id, "R1");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);
    assert_eq!(report.errors[0].kind(), ErrorKind::Validation);
}

#[test]
fn comments_never_reach_the_dispatcher() {
    let report = parse_drawing("a=1 // comment\n// b=2\nc=1\n");
    assert!(report.is_clean());
    assert_eq!(report.symbols().get("a"), Some(1.0));
    assert_eq!(report.symbols().get("b"), None);
    assert_eq!(report.symbols().get("c"), Some(1.0));
}

#[test]
fn failed_assignment_leaves_symbol_table_untouched() {
    let report = parse_drawing("a=1\na=missing + 2\nb=a\n");
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.symbols().get("a"), Some(1.0));
    assert_eq!(report.symbols().get("b"), Some(1.0));
}

#[test]
fn reassignment_overwrites_and_later_statements_see_new_value() {
    let report = parse_drawing("w=3\nA=rect: x=0, y=0, w=w, h=w\nw=7\nB=rect: x=0, y=0, w=w, h=w\n");
    assert!(report.is_clean());
    let widths: Vec<_> = report
        .document
        .rects()
        .iter()
        .map(|rect| rect.width())
        .collect();
    assert_eq!(widths, vec![3.0, 7.0]);
}

#[test]
fn independent_sessions_do_not_share_state() {
    let first = parse_drawing("$fc=Red\nx=5\n");
    let second = parse_drawing("A=rect: x=x, y=0, w=2, h=2\nB=rect: x=0, y=0, w=2, h=2\n");
    assert_eq!(first.session.defaults.fill_color, Color::Red);
    assert_eq!(second.errors.len(), 1);
    assert_eq!(second.document.rects()[0].common.fill_color, Color::Transparent);
}

#[test]
fn missing_file_is_a_read_error() {
    let err = DslFacade::new()
        .load(&fixture("does_not_exist.vd"))
        .unwrap_err();
    assert!(matches!(err, IoError::ReadError { .. }));
}

#[test]
fn dsl_writer_is_unsupported() {
    let doc = parse_drawing("A=rect: x=0, y=0, w=2, h=2").document;
    let err = DslFacade::new()
        .save(&doc, &fixture("out.vd"))
        .unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFeature(_)));
}
