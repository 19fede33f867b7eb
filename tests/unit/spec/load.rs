use super::*;

#[test]
fn malformed_json_is_a_validation_error() {
    let err = VisualizationSpec::from_json_str("{ \"layers\": [").unwrap_err();
    assert!(matches!(err, VizError::Validation(_)));
    assert!(err.to_string().contains("parse visualization spec JSON"));
}

#[test]
fn missing_file_names_the_path() {
    let err = VisualizationSpec::from_path("does/not/exist.json").unwrap_err();
    assert!(err.to_string().contains("does/not/exist.json"));
}

#[test]
fn validate_reports_skipped_content() {
    let spec = VisualizationSpec::from_json_str(
        r#"{
            "duration": 1000,
            "layers": [
                { "type": "star", "props": {} },
                { "type": "circle", "props": { "x": 0, "y": 0, "r": 5, "fill": "red" },
                  "animations": [
                    { "property": "rotation", "from": 0, "to": 1, "start": 0, "end": 10 },
                    { "property": "x", "from": 0, "to": 10, "start": 500, "end": 100 },
                    { "property": "y", "from": 0, "to": 10, "start": 0, "end": 100 }
                  ] }
            ]
        }"#,
    )
    .unwrap();

    let issues = spec.validate();
    assert_eq!(issues.len(), 3);
    assert_eq!(issues[0].layer, 0);
    assert_eq!(issues[0].animation, None);
    assert!(issues[0].message.contains("star"));
    assert_eq!(issues[1].animation, Some(0));
    assert!(issues[1].to_string().starts_with("layers[1].animations[0]"));
    assert_eq!(issues[2].animation, Some(1));
    assert!(issues[2].message.contains("precedes"));
}

#[test]
fn clean_spec_has_no_issues() {
    let spec = VisualizationSpec::from_json_str(
        r##"{ "duration": 1000, "layers": [{ "type": "rect", "props": { "x": 0, "y": 0, "w": 1, "h": 1, "fill": "#000" } }] }"##,
    )
    .unwrap();
    assert!(spec.validate().is_empty());
}

#[test]
fn pretty_json_fills_in_defaults() {
    let spec = VisualizationSpec::from_json_str(
        r#"{ "layers": [{ "type": "circle", "props": { "x": 1 }, "animations": [{ "property": "orbit", "centerX": 0, "centerY": 0, "radius": 5 }] }] }"#,
    )
    .unwrap();
    let out = spec.to_json_string_pretty().unwrap();
    let v: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["duration"], 4000);
    assert_eq!(v["fps"], 30);
    assert_eq!(v["layers"][0]["type"], "circle");
    assert_eq!(v["layers"][0]["animations"][0]["duration"], 3000.0);
    assert_eq!(VisualizationSpec::from_json_str(&out).unwrap(), spec);
}
