use super::*;
use crate::spec::model::VisualizationSpec;

fn spec() -> VisualizationSpec {
    VisualizationSpec::from_json_str(
        r##"{
            "duration": 1000,
            "layers": [
                { "id": "bg", "type": "rect", "props": { "x": 0, "y": 0, "w": 500, "h": 400, "fill": "#000" } },
                { "id": "a", "type": "circle", "props": { "r": 3, "fill": "red" },
                  "animations": [{ "property": "x", "from": 0, "to": 1, "start": 0, "end": 1 }] },
                { "id": "title", "type": "text", "props": { "x": 1, "y": 1, "text": "t" }, "animations": [] },
                { "id": "b", "type": "bogus", "props": {},
                  "animations": [{ "property": "nope" }] },
                { "id": "c", "type": "arrow", "props": { "x": 0, "y": 0, "dx": 1, "dy": 1 },
                  "animations": [{ "property": "orbit", "centerX": 0, "centerY": 0, "radius": 1 }] }
            ]
        }"##,
    )
    .unwrap()
}

fn ids(layers: &[Layer]) -> Vec<&str> {
    layers.iter().filter_map(|l| l.id.as_deref()).collect()
}

#[test]
fn partitions_by_animation_presence_preserving_order() {
    let c = classify_layers(&spec().layers);
    assert_eq!(ids(&c.static_layers), ["bg", "title"]);
    assert_eq!(ids(&c.dynamic_layers), ["a", "b", "c"]);
    assert_eq!(c.len(), 5);
}

#[test]
fn empty_input_yields_empty_sets() {
    let c = classify_layers(&[]);
    assert!(c.is_empty());
    assert_eq!(c, ClassifiedLayers::default());
}

#[test]
fn classification_is_deterministic() {
    let s = spec();
    assert_eq!(classify_layers(&s.layers), classify_layers(&s.layers));
}
