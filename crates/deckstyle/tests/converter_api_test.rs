//! Integration tests for the StyleConverter API
//!
//! These tests run complete action files against small card sheets and check
//! the serialized output.

use float_cmp::assert_approx_eq;

use deckstyle::{
    DeckstyleError, StyleConverter,
    config::{AppConfig, EditConfig},
    document::Document,
    geometry::Point,
    identifier::Id,
    resolve::Resolver,
};
use deckstyle::action::MissingTargetPolicy;
use deckstyle_parser::error::ErrorCode;

fn convert(actions: &str, svg: &str) -> Result<String, DeckstyleError> {
    let converter = StyleConverter::default();
    let plan = converter.parse_actions(actions)?;
    converter.convert(&plan, svg)
}

fn position(svg: &str, id: &str) -> Point {
    let doc = Document::parse(svg).expect("Output should be well formed");
    Resolver::new(32)
        .position_of(&doc, Id::new(id))
        .expect("Position should resolve")
}

fn first_code(err: &DeckstyleError) -> Option<ErrorCode> {
    let (parse_error, _) = err.parse_error()?;
    parse_error.diagnostics()[0].code()
}

#[test]
fn test_converter_api_exists() {
    let _converter = StyleConverter::default();
    let _converter = StyleConverter::new(AppConfig::default());
}

#[test]
fn test_move_without_transform() {
    let svg = r#"<svg><g id="card"><path id="card_pip" d="M10,20 h4 v4"/></g></svg>"#;
    let output = convert(r#"{"card": {"card_pip": ["M1"]}, "M1": [5.0, -3.0]}"#, svg).unwrap();

    assert!(
        output.contains(r#"<path id="card_pip" d="M10,20 h4 v4" transform="translate(5.0000,-3.0000)"/>"#),
        "{output}"
    );
    let moved = position(&output, "card_pip");
    assert_approx_eq!(f64, moved.x(), 15.0, epsilon = 1e-9);
    assert_approx_eq!(f64, moved.y(), 17.0, epsilon = 1e-9);
}

#[test]
fn test_move_updates_existing_transforms() {
    let svg = r#"<svg><g id="card">
        <path id="a" d="M0,0" transform="translate(1,1)"/>
        <path id="b" d="M0,0" transform="matrix(2,0,0,2,3,4)"/>
        <path id="c" d="M1,1" transform="scale(2)"/>
    </g></svg>"#;
    let actions = r#"{"card": {"a": ["M1"], "b": ["M1"], "c": ["M1"]}, "M1": [10, -10]}"#;
    let output = convert(actions, svg).unwrap();

    assert!(output.contains(r#"transform="translate(11.0000,-9.0000)""#), "{output}");
    assert!(output.contains(r#"transform="matrix(2,0,0,2,13.0000,-6.0000)""#), "{output}");
    assert!(output.contains(r#"transform="matrix(2,0,0,2,10.0000,-10.0000)""#), "{output}");
    assert_eq!(position(&output, "c"), Point::new(12.0, -8.0));
}

#[test]
fn test_sequential_moves_add_up() {
    let svg = r#"<svg><g id="card"><path id="pip" d="M0,0" transform="translate(1,1)"/></g></svg>"#;
    let actions = r#"{"card": {"pip": ["M1", "M2"]}, "M1": [2, 0], "M2": [0, 3]}"#;
    let output = convert(actions, svg).unwrap();

    assert!(output.contains(r#"transform="translate(3.0000,4.0000)""#), "{output}");
    assert_eq!(position(&output, "pip"), Point::new(3.0, 4.0));
}

#[test]
fn test_move_cancels_drift_of_reference() {
    let svg = r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><g id="card">
        <path id="base" d="M10,10 l5,5"/>
        <use id="ref" xlink:href="#base" transform="scale(2)"/>
    </g></svg>"##;
    // Moving `base` drags `ref` along by (10,0); the second move corrects it.
    let actions = r#"{"card": {"base": ["M1"], "ref": ["M2"]}, "M1": [5, 0], "M2": [1, 1]}"#;
    let output = convert(actions, svg).unwrap();

    assert!(output.contains(r#"transform="matrix(2,0,0,2,-9.0000,1.0000)""#), "{output}");
    assert_eq!(position(&output, "ref"), Point::new(21.0, 21.0));
}

#[test]
fn test_copies() {
    let svg = r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><g id="card"><rect id="box" width="10" height="10"/></g></svg>"#;
    let actions = r#"{"card": {"box": ["C1", "C2"]}, "C1": [3, 4, 2, 2], "C2": [0, 10]}"#;

    let converter = StyleConverter::default();
    let plan = converter.parse_actions(actions).unwrap();
    let (output, report) = converter.convert_with_report(&plan, svg).unwrap();

    assert_eq!(
        output,
        concat!(
            r#"<svg xmlns:xlink="http://www.w3.org/1999/xlink"><g id="card">"#,
            r#"<rect id="box" width="10" height="10"/>"#,
            r##"<use xlink:href="#box" transform="matrix(2.0000,0,0,2.0000,-2.0000,-1.0000)"/>"##,
            r##"<use xlink:href="#box" transform="translate(0.0000,10.0000)"/>"##,
            r#"</g></svg>"#,
        )
    );
    assert_eq!(report.copies(), 2);
    assert_eq!(report.applied(), 2);
}

#[test]
fn test_copy_without_xlink_uses_plain_href() {
    let svg = r#"<svg><g id="card"><rect id="box" width="1" height="1"/></g></svg>"#;
    let output = convert(r#"{"card": {"box": ["C1"]}, "C1": [1, 2]}"#, svg).unwrap();
    assert!(
        output.contains(r##"<use href="#box" transform="translate(1.0000,2.0000)"/>"##),
        "{output}"
    );
}

#[test]
fn test_isolate_flattens_reference() {
    let svg = r##"<svg xmlns:xlink="http://www.w3.org/1999/xlink">
<defs><g id="heart" transform="translate(1,1)"><path id="lobe" d="M0,0 L4,4"/></g></defs>
<g id="ace"><use id="pip" xlink:href="#heart" x="10" y="20" transform="scale(2)" style="fill:red"/></g>
</svg>"##;
    let before = position(svg, "pip");
    assert_eq!(before, Point::new(22.0, 42.0));

    let output = convert(r#"{"ace": {"pip": ["I1"]}, "I1": ["pips"]}"#, svg).unwrap();
    assert!(
        output.contains(concat!(
            r#"<g id="pip" transform="matrix(2,0,0,2,22.0000,42.0000)" style="fill:red" class="pips">"#,
            r#"<path id="pip_lobe" d="M0,0 L4,4" class="pips"/></g>"#,
        )),
        "{output}"
    );
    // The original definition is untouched.
    assert!(output.contains(r#"<g id="heart" transform="translate(1,1)"><path id="lobe" d="M0,0 L4,4"/></g>"#));
    assert_eq!(position(&output, "pip"), before);
}

#[test]
fn test_actions_after_isolate_apply_to_clone() {
    let svg = r##"<svg><path id="dot" d="M1,1"/><g id="card"><use id="pip" href="#dot"/></g></svg>"##;
    let output = convert(r#"{"card": {"pip": ["I1", "M1"]}, "I1": [""], "M1": [1, 0]}"#, svg).unwrap();
    assert!(
        output.contains(r#"<path id="pip" d="M1,1" transform="matrix(1,0,0,1,1.0000,0.0000)"/>"#),
        "{output}"
    );
}

#[test]
fn test_copy_before_isolate_copies_the_clone() {
    let svg = r##"<svg><path id="dot" d="M1,1"/><g id="card"><use id="pip" href="#dot"/></g></svg>"##;
    let copy_first = convert(r#"{"card": {"pip": ["C1", "I1"]}, "C1": [5, 0], "I1": ["red"]}"#, svg).unwrap();
    let isolate_first = convert(r#"{"card": {"pip": ["I1", "C1"]}, "C1": [5, 0], "I1": ["red"]}"#, svg).unwrap();

    assert_eq!(copy_first, isolate_first);
    assert!(
        copy_first.contains(r##"<use href="#pip" transform="translate(5.0000,0.0000)"/>"##),
        "{copy_first}"
    );
}

#[test]
fn test_style_and_attribute_actions() {
    let svg = r#"<svg><g id="card"><path id="pip" d="M0,0" style="fill:#000;stroke-width:0.8px"/></g></svg>"#;
    let actions = r##"{
        "card": {"pip": ["A1", "A2", "T1", "S1", "L1"]},
        "A1": ["fill", "#f00"],
        "A2": ["stroke-width", "*1.5"],
        "T1": ["opacity", 0.5],
        "S1": ["data-suit", "hearts"],
        "L1": ["pip red"]
    }"##;
    let output = convert(actions, svg).unwrap();
    assert_eq!(
        output,
        r##"<svg><g id="card"><path id="pip" d="M0,0" style="fill:#f00;stroke-width:1.2px;opacity:0.5" data-suit="hearts" class="pip red"/></g></svg>"##
    );
}

#[test]
fn test_delete_descends_into_groups() {
    let svg = r#"<svg><g id="card"><g id="corner"><path id="index" d="M0,0"/></g><path id="keep" d="M0,0"/></g></svg>"#;
    let output = convert(r#"{"card": {"index": ["D"]}}"#, svg).unwrap();
    assert_eq!(
        output,
        r#"<svg><g id="card"><g id="corner"></g><path id="keep" d="M0,0"/></g></svg>"#
    );
}

#[test]
fn test_pass_through_without_actions() {
    let svg = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!-- Created by hand -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="210mm" height="297mm" viewBox="0 0 210 297">
  <?processing keep?>
  <defs><path id="pip" d="M0,0 L1,1"/></defs>
  <g id="card" transform="translate(10,10)">
    <use xlink:href="#pip" x="3" y="4"/>
    <text x="1" y="2">10 &amp; J</text>
  </g>
</svg>
"##;
    assert_eq!(convert("{}", svg).unwrap(), svg);
}

#[test]
fn test_missing_target_warns_by_default() {
    let svg = r#"<svg><g id="card"/><path id="outside" d="M0,0"/></svg>"#;
    let converter = StyleConverter::default();
    let plan = converter.parse_actions(r#"{"card": {"outside": ["D"]}}"#).unwrap();

    let (output, report) = converter.convert_with_report(&plan, svg).unwrap();
    assert_eq!(output, svg);
    assert_eq!(report.skipped(), 1);

    let strict = StyleConverter::new(AppConfig::new(EditConfig::new(MissingTargetPolicy::Error, 32)));
    assert!(matches!(
        strict.convert(&plan, svg),
        Err(DeckstyleError::MissingTarget { .. })
    ));
}

#[test]
fn test_chained_transform_error() {
    let svg = r#"<svg><g id="card"><path id="pip" d="M0,0" transform="translate(1,2) scale(2)"/></g></svg>"#;
    let err = convert(r#"{"card": {"pip": ["M1"]}, "M1": [1, 1]}"#, svg).unwrap_err();
    assert!(matches!(err, DeckstyleError::MalformedTransform { .. }), "{err:?}");
    assert_eq!(first_code(&err), Some(ErrorCode::E101));
}

#[test]
fn test_unsupported_path_command_error() {
    let svg = r#"<svg><g id="card"><path id="pip" d="M0,0 Q1,1 2,2"/></g></svg>"#;
    let err = convert(r#"{"card": {"pip": ["M1"]}, "M1": [1, 1]}"#, svg).unwrap_err();
    assert!(matches!(err, DeckstyleError::MalformedPath { .. }), "{err:?}");
    assert_eq!(first_code(&err), Some(ErrorCode::E103));
}

#[test]
fn test_cyclic_reference_error() {
    let svg = r##"<svg><g id="card"><use id="a" href="#b"/><use id="b" href="#a"/></g></svg>"##;
    let err = convert(r#"{"card": {"a": ["M1"]}, "M1": [1, 1]}"#, svg).unwrap_err();
    assert!(matches!(err, DeckstyleError::CyclicReference { .. }), "{err:?}");
}

#[test]
fn test_action_file_errors() {
    let converter = StyleConverter::default();

    let err = converter.parse_actions(r#"{"card": {"pip": ["X1"]}}"#).unwrap_err();
    assert_eq!(first_code(&err), Some(ErrorCode::E200));

    let err = converter
        .parse_actions(r#"{"card": {"pip": ["M1"]}, "M1": [1, 2, 3]}"#)
        .unwrap_err();
    assert_eq!(first_code(&err), Some(ErrorCode::E201));
    assert!(err.to_string().contains("expects 2 parameters, found 3"), "{err}");

    assert!(matches!(
        converter.parse_actions("{ not json"),
        Err(DeckstyleError::Json(_))
    ));
}

#[test]
fn test_malformed_document() {
    let plan = StyleConverter::default().parse_actions("{}").unwrap();
    assert!(matches!(
        StyleConverter::default().convert(&plan, "<svg><g></svg>"),
        Err(DeckstyleError::Xml(_))
    ));
}
