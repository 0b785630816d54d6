use serde_json::Value;
use vdraw_core::document::{Document, EllipseShape, ShapeCommon};
use vdraw_core::geometry::Point2;
use vdraw_core::style::Color;
use vdraw_io::{DocumentLoader, DocumentSaver, IoError, JsonFacade, parse_drawing};

const SOURCE: &str = "\
page: sc=20, gr=5, un=cm
$fc=Yellow
A=rect: x=1, y=2, w=3, h=4, lr=2, tx=Label, tp=BR
$es=AO
L=line: sx=0, sy=0, ex=10, ey=5, lc=Blue
";

fn sample_document() -> Document {
    let report = parse_drawing(SOURCE);
    assert!(report.is_clean(), "unexpected errors: {:?}", report.errors);
    let mut document = report.document;
    document.add_ellipse(
        EllipseShape::new(ShapeCommon::new("E"), Point2::new(5.0, 5.0), 4.0, 2.0)
            .expect("valid ellipse"),
    );
    document
}

#[test]
fn json_uses_names_and_coordinate_pairs() {
    let facade = JsonFacade::new();
    let text = facade.to_json(&sample_document()).expect("序列化失败");
    let json: Value = serde_json::from_str(&text).expect("输出应为合法 JSON");

    assert_eq!(json["page"]["scale"], 20);
    assert_eq!(json["page"]["units"], "cm");

    let rect = &json["rects"][0];
    assert_eq!(rect["id"], "A");
    assert_eq!(rect["fill_color"], "Yellow");
    assert_eq!(rect["line_color"], "Black");
    assert_eq!(rect["text_align"], "BottomRight");
    assert_eq!(rect["location"], serde_json::json!([1.0, 2.0]));

    let line = &json["lines"][0];
    assert_eq!(line["line_color"], "Blue");
    assert_eq!(line["end_cap"], "HollowArrow");
    assert_eq!(line["start"], serde_json::json!([0.0, 0.0]));
    assert_eq!(line["end"], serde_json::json!([10.0, 5.0]));

    assert_eq!(json["ellipses"][0]["center"], serde_json::json!([5.0, 5.0]));
}

#[test]
fn document_round_trips_through_json_file() {
    let original = sample_document();
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("drawing.json");

    let facade = JsonFacade::compact();
    facade.save(&original, &path).expect("写入 JSON 失败");
    let restored = facade.load(&path).expect("读取 JSON 失败");

    assert_eq!(restored, original);
    assert_eq!(restored.rects()[0].common.fill_color, Color::Yellow);
}

#[test]
fn ellipses_are_omitted_when_absent() {
    let document = parse_drawing("A=rect: x=0, y=0, w=1, h=1").document;
    let text = JsonFacade::compact().to_json(&document).expect("序列化失败");
    let json: Value = serde_json::from_str(&text).expect("合法 JSON");
    assert!(json.get("ellipses").is_none());
    assert_eq!(json["lines"], serde_json::json!([]));
}

#[test]
fn invalid_rect_extent_is_rejected_on_load() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{
            "page": {"width": 10, "height": 10, "grid": 1, "snap": 1, "scale": 1},
            "rects": [{
                "id": "R", "line_thickness": 1.0, "line_color": "Black",
                "fill_color": "White", "location": [0, 0], "width": -2, "height": 1
            }]
        }"#,
    )
    .expect("写入测试文件失败");

    let err = JsonFacade::new().load(&path).unwrap_err();
    assert!(matches!(err, IoError::Json { .. }));
}

#[test]
fn non_positive_line_thickness_is_rejected_on_load() {
    let line = r#"{"lines": [{
        "id": "L", "line_thickness": -3.0, "line_color": "Black",
        "fill_color": "White", "start": [0, 0], "end": [1, 1]
    }]}"#;
    let err = JsonFacade::new().from_json(line).unwrap_err();
    assert!(err.to_string().contains("line thickness"), "{err}");

    let rect = r#"{"rects": [{
        "id": "R", "line_thickness": 0.0, "line_color": "Black",
        "fill_color": "White", "location": [0, 0], "width": 2, "height": 1
    }]}"#;
    assert!(JsonFacade::new().from_json(rect).is_err());

    let ellipse = r#"{"ellipses": [{
        "id": "E", "line_thickness": 0.0, "line_color": "Black",
        "fill_color": "White", "center": [0, 0], "width": 2, "height": 1
    }]}"#;
    assert!(JsonFacade::new().from_json(ellipse).is_err());

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("thin.json");
    std::fs::write(&path, line).expect("写入测试文件失败");
    assert!(matches!(
        JsonFacade::new().load(&path),
        Err(IoError::Json { .. })
    ));
}

#[test]
fn unknown_color_name_is_rejected_on_load() {
    let text = r#"{"lines": [{
        "id": "L", "line_thickness": 1.0, "line_color": "Plaid",
        "fill_color": "White", "start": [0, 0], "end": [1, 1]
    }]}"#;
    assert!(JsonFacade::new().from_json(text).is_err());
}
