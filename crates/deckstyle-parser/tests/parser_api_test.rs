//! Integration tests for the public parser API.

use deckstyle_core::{
    action::{ActionKind, CopyParams},
    geometry::{Extremes, Point},
    identifier::Id,
    path::path_extremes,
    transform::Transform,
};
use deckstyle_parser::{
    ParseError, elaborate_actions,
    error::{ErrorCode, Severity},
    parse_path, parse_transform,
};

#[test]
fn test_transform_applies_to_path_extremes() {
    let transform = parse_transform("matrix(2,0,0,2,10,10)").unwrap();
    let extremes = path_extremes(parse_path("m1,1 2,0 0,2")).unwrap();

    assert_eq!(extremes, Extremes::new(1.0, 1.0, 3.0, 3.0));
    assert_eq!(transform.apply(extremes.top_left()), Point::new(12.0, 12.0));
}

#[test]
fn test_transform_error_carries_code_and_span() {
    let source = "translate(1,2) rotate(10)";
    let err: ParseError = parse_transform(source).unwrap_err();

    let diagnostic = &err.diagnostics()[0];
    assert_eq!(diagnostic.severity(), Severity::Error);
    assert_eq!(diagnostic.code(), Some(ErrorCode::E101));

    let span = diagnostic.labels()[0].span();
    assert_eq!(&source[span.range()], "rotate(10)");
}

#[test]
fn test_path_error_stops_extremes() {
    let err = path_extremes(parse_path("M0,0 L5,5 S1,1 2,2")).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::E103));
}

#[test]
fn test_scale_single_argument() {
    assert_eq!(
        parse_transform("scale(.5)").unwrap(),
        Transform::Scale { sx: 0.5, sy: 0.5 }
    );
}

#[test]
fn test_action_file_elaborates_in_order() {
    let source = r#"{
        "ace_heart": {
            "pip_top": ["M1", "C2"],
            "corner": ["D"]
        },
        "two_heart": {
            "pip_top": ["M1"]
        },
        "M1": [0, -4.5],
        "C2": [0, 40, -1, -1]
    }"#;
    let value = serde_json::from_str(source).unwrap();
    let plan = elaborate_actions(&value, source).unwrap();

    assert_eq!(plan.action_count(), 4);

    let cards: Vec<String> = plan.cards().map(|(id, _)| id.to_string()).collect();
    assert_eq!(cards, ["ace_heart", "two_heart"]);

    let ace = plan.card(Id::new("ace_heart")).unwrap();
    let top = &ace[&Id::new("pip_top")];
    assert_eq!(*top[0].kind(), ActionKind::Move { dx: 0.0, dy: -4.5 });
    assert_eq!(
        *top[1].kind(),
        ActionKind::Copy(CopyParams::Scaled {
            dx: 0.0,
            dy: 40.0,
            sx: -1.0,
            sy: -1.0
        })
    );
}

#[test]
fn test_action_file_reports_every_problem() {
    let source = r#"{"c": {"a": ["Z1"], "b": ["M9"]}, "M1": [1]}"#;
    let value = serde_json::from_str(source).unwrap();
    let err = elaborate_actions(&value, source).unwrap_err();

    assert_eq!(err.diagnostics().len(), 3);
    assert!(err.to_string().ends_with("(+2 more)"));
}
