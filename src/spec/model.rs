use crate::spec::props::Props;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Duration used when a spec omits `duration` or gives a non-positive one.
pub const DEFAULT_DURATION_MS: u64 = 4000;
/// Frame rate used when a spec omits `fps` or gives a non-positive one.
pub const DEFAULT_FPS: u32 = 30;
/// Orbit period used when an orbit omits `duration` or gives a non-positive one.
pub const DEFAULT_ORBIT_PERIOD_MS: f64 = 3000.0;

/// A timed shape-animation description, immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SpecDef")]
pub struct VisualizationSpec {
    /// Opaque identifier.
    pub id: String,
    /// Run length in milliseconds (`> 0`).
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    /// Requested redraw rate (`> 0`).
    pub fps: u32,
    /// Layers in paint order.
    pub layers: Vec<Layer>,
}

impl VisualizationSpec {
    /// Minimum spacing between redraws in milliseconds.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.fps.max(1))
    }

    /// Duration as floating-point milliseconds.
    pub fn duration(&self) -> f64 {
        self.duration_ms as f64
    }
}

#[derive(Deserialize)]
struct SpecDef {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    duration: Option<Value>,
    #[serde(default)]
    fps: Option<Value>,
    #[serde(default)]
    layers: Option<Value>,
}

impl From<SpecDef> for VisualizationSpec {
    fn from(def: SpecDef) -> Self {
        let duration_ms = match def.duration.as_ref().and_then(Value::as_f64) {
            Some(d) if d.is_finite() && d >= 1.0 => d.round() as u64,
            _ => DEFAULT_DURATION_MS,
        };
        let fps = match def.fps.as_ref().and_then(Value::as_f64) {
            Some(f) if f.is_finite() && f >= 1.0 => f.round().min(f64::from(u32::MAX)) as u32,
            _ => DEFAULT_FPS,
        };
        Self {
            id: def.id.and_then(id_string).unwrap_or_default(),
            duration_ms,
            fps,
            layers: lenient_list(def.layers, "layers"),
        }
    }
}

/// Identifiers are strings on the wire; numbers are accepted and stringified.
fn id_string(v: Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A JSON list whose entries are converted one by one; anything that is not a list reads as
/// empty.
fn lenient_list<T: From<Value>>(value: Option<Value>, field: &str) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(T::from).collect(),
        Some(other) => {
            tracing::warn!(field, value = %other, "expected a list; ignoring");
            Vec::new()
        }
    }
}

/// Primitive kind of a layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerKind {
    /// Filled disc.
    Circle,
    /// Rounded rectangle.
    Rect,
    /// Line with an arrowhead.
    Arrow,
    /// Literal text.
    Text,
    /// Any other type name; skipped at draw time.
    Unknown(String),
}

impl LayerKind {
    /// Type name as written in JSON.
    pub fn name(&self) -> &str {
        match self {
            Self::Circle => "circle",
            Self::Rect => "rect",
            Self::Arrow => "arrow",
            Self::Text => "text",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for LayerKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "circle" => Self::Circle,
            "rect" => Self::Rect,
            "arrow" => Self::Arrow,
            "text" => Self::Text,
            _ => Self::Unknown(s),
        }
    }
}

impl From<LayerKind> for String {
    fn from(k: LayerKind) -> Self {
        k.name().to_owned()
    }
}

/// One visual element with base properties and zero or more animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LayerDef")]
pub struct Layer {
    /// Optional identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Primitive kind.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Base property values.
    pub props: Props,
    /// Animation tracks, applied in order.
    pub animations: Vec<Animation>,
}

impl Layer {
    /// A layer is dynamic iff it carries at least one animation.
    pub fn is_dynamic(&self) -> bool {
        !self.animations.is_empty()
    }
}

#[derive(Deserialize)]
struct LayerDef {
    #[serde(default)]
    id: Option<Value>,
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    props: Option<Value>,
    #[serde(default)]
    animations: Option<Value>,
}

impl From<LayerDef> for Layer {
    fn from(def: LayerDef) -> Self {
        let kind = match def.kind {
            Some(Value::String(s)) => LayerKind::from(s),
            _ => LayerKind::Unknown(String::new()),
        };
        let props = match def.props {
            None | Some(Value::Null) => Props::new(),
            Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
                tracing::warn!(kind = kind.name(), error = %e, "layer props are not an object");
                Props::new()
            }),
        };
        Self {
            id: def.id.and_then(id_string),
            kind,
            props,
            animations: lenient_list(def.animations, "animations"),
        }
    }
}

impl From<Value> for Layer {
    fn from(value: Value) -> Self {
        serde_json::from_value::<LayerDef>(value)
            .map(Self::from)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "layer is not an object");
                Self {
                    id: None,
                    kind: LayerKind::Unknown(String::new()),
                    props: Props::new(),
                    animations: Vec::new(),
                }
            })
    }
}

/// Property targeted by a linear animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    /// Horizontal anchor.
    X,
    /// Vertical anchor.
    Y,
    /// Arrow horizontal extent.
    Dx,
    /// Arrow vertical extent.
    Dy,
    /// Draw opacity.
    Opacity,
}

impl AnimatedProperty {
    /// Parse a JSON property name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "dx" => Some(Self::Dx),
            "dy" => Some(Self::Dy),
            "opacity" => Some(Self::Opacity),
            _ => None,
        }
    }

    /// Property name as used in layer props.
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Dx => "dx",
            Self::Dy => "dy",
            Self::Opacity => "opacity",
        }
    }
}

/// Interpolates one property from `from` to `to` over `[start, end]` ms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAnimation {
    /// Target property.
    pub property: AnimatedProperty,
    /// Value at `start`.
    pub from: f64,
    /// Value at `end` and afterwards.
    pub to: f64,
    /// Window start in ms from playback start.
    pub start: f64,
    /// Window end in ms from playback start.
    pub end: f64,
}

/// Periodic circular motion of `x`/`y` around a center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitAnimation {
    /// Orbit center x.
    pub center_x: f64,
    /// Orbit center y.
    pub center_y: f64,
    /// Orbit radius.
    pub radius: f64,
    /// Period in ms (`> 0`).
    pub period_ms: f64,
}

/// One animation track of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "AnimationDef")]
pub enum Animation {
    /// Clamped linear interpolation of one property.
    Linear(LinearAnimation),
    /// Circular motion driven by its own period.
    Orbit(OrbitAnimation),
    /// Unknown property, missing or mistyped fields; ignored during evaluation.
    Unsupported {
        /// Property name as written.
        property: String,
        /// Why the track cannot be evaluated.
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnimationDef {
    #[serde(default)]
    property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    from: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    center_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    center_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
}

impl From<AnimationDef> for Animation {
    fn from(def: AnimationDef) -> Self {
        let unsupported = |reason: &str| Self::Unsupported {
            property: def.property.clone(),
            reason: reason.to_owned(),
        };

        if def.property == "orbit" {
            let (Some(center_x), Some(center_y), Some(radius)) =
                (def.center_x, def.center_y, def.radius)
            else {
                return unsupported("orbit requires centerX, centerY and radius");
            };
            let period_ms = match def.duration {
                Some(d) if d.is_finite() && d > 0.0 => d,
                _ => DEFAULT_ORBIT_PERIOD_MS,
            };
            return Self::Orbit(OrbitAnimation {
                center_x,
                center_y,
                radius,
                period_ms,
            });
        }

        let Some(property) = AnimatedProperty::parse(&def.property) else {
            return unsupported("unsupported animation property");
        };
        let (Some(from), Some(to), Some(start), Some(end)) =
            (def.from, def.to, def.start, def.end)
        else {
            return unsupported("linear animation requires from, to, start and end");
        };
        Self::Linear(LinearAnimation {
            property,
            from,
            to,
            start,
            end,
        })
    }
}

impl From<Value> for Animation {
    fn from(value: Value) -> Self {
        let property = value
            .get("property")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        match serde_json::from_value::<AnimationDef>(value) {
            Ok(def) => Self::from(def),
            Err(e) => Self::Unsupported {
                property,
                reason: format!("malformed animation: {e}"),
            },
        }
    }
}

impl From<Animation> for AnimationDef {
    fn from(anim: Animation) -> Self {
        match anim {
            Animation::Linear(l) => Self {
                property: l.property.name().to_owned(),
                from: Some(l.from),
                to: Some(l.to),
                start: Some(l.start),
                end: Some(l.end),
                ..Self::default()
            },
            Animation::Orbit(o) => Self {
                property: "orbit".to_owned(),
                center_x: Some(o.center_x),
                center_y: Some(o.center_y),
                radius: Some(o.radius),
                duration: Some(o.period_ms),
                ..Self::default()
            },
            Animation::Unsupported { property, .. } => Self {
                property,
                ..Self::default()
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spec/model.rs"]
mod tests;
