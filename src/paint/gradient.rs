use crate::foundation::core::Point;
use crate::paint::color::parse_css_color;
use crate::spec::props::PropValue;
use vello_cpu::peniko::{Color, Gradient};

/// Shape of a two-stop gradient descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    /// `radial-gradient(c1, c2)`.
    Radial,
    /// `linear-gradient(c1, c2)`.
    Linear,
}

/// A parsed `kind(color1, color2)` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientDescriptor {
    /// Gradient shape.
    pub kind: GradientKind,
    /// Color at offset 0.
    pub first: String,
    /// Color at offset 1.
    pub second: String,
}

/// Parse `radial-gradient(c1, c2)` or `linear-gradient(c1, c2)`.
///
/// Exactly two comma-separated, non-empty, parenthesis-free color groups are accepted; anything
/// else is not a gradient.
pub fn parse_gradient(s: &str) -> Option<GradientDescriptor> {
    let s = s.trim();
    let (kind, rest) = if let Some(rest) = s.strip_prefix("radial-gradient(") {
        (GradientKind::Radial, rest)
    } else if let Some(rest) = s.strip_prefix("linear-gradient(") {
        (GradientKind::Linear, rest)
    } else {
        return None;
    };
    let inner = rest.strip_suffix(')')?;
    let (first, second) = inner.split_once(',')?;
    let first = first.trim();
    let second = second.trim();
    let valid = |c: &str| !c.is_empty() && !c.contains([',', '(', ')']);
    if !valid(first) || !valid(second) {
        return None;
    }
    Some(GradientDescriptor {
        kind,
        first: first.to_owned(),
        second: second.to_owned(),
    })
}

/// Geometry a gradient is anchored to, in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Circular shape centered at `(cx, cy)`.
    Circle {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius.
        r: f64,
    },
    /// Box with top-left `(x, y)` and size `w×h`.
    Box {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        w: f64,
        /// Height.
        h: f64,
    },
}

impl Anchor {
    fn center(self) -> Point {
        match self {
            Self::Circle { cx, cy, .. } => Point::new(cx, cy),
            Self::Box { x, y, w, h } => Point::new(x + w / 2.0, y + h / 2.0),
        }
    }

    fn outer_radius(self) -> f64 {
        match self {
            Self::Circle { r, .. } => r,
            Self::Box { w, h, .. } => w.max(h) / 2.0,
        }
    }

    /// Top-center and bottom-center points.
    fn vertical_span(self) -> (Point, Point) {
        match self {
            Self::Circle { cx, cy, r } => (Point::new(cx, cy - r), Point::new(cx, cy + r)),
            Self::Box { x, y, h, .. } => (Point::new(x, y), Point::new(x, y + h)),
        }
    }
}

/// Gradient geometry resolved against a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientGeometry {
    /// Radial gradient from radius 0 to `radius` around `center`.
    Radial {
        /// Gradient center.
        center: Point,
        /// Outer radius (offset 1).
        radius: f64,
    },
    /// Linear gradient from `start` (offset 0) to `end` (offset 1).
    Linear {
        /// Offset-0 point.
        start: Point,
        /// Offset-1 point.
        end: Point,
    },
}

/// A fill or stroke value after gradient resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    /// A plain color string, passed through verbatim.
    Color(String),
    /// A two-stop gradient anchored to the shape.
    Gradient {
        /// Resolved geometry.
        geometry: GradientGeometry,
        /// Color strings at offsets 0 and 1.
        stops: [String; 2],
    },
    /// A non-string value, passed through unchanged.
    Other(PropValue),
}

/// Resolve a fill/stroke value against a shape's anchor geometry.
pub fn resolve_fill(value: &PropValue, anchor: Anchor) -> FillStyle {
    let PropValue::Text(s) = value else {
        return FillStyle::Other(value.clone());
    };
    let Some(desc) = parse_gradient(s) else {
        return FillStyle::Color(s.clone());
    };
    let geometry = match desc.kind {
        GradientKind::Radial => GradientGeometry::Radial {
            center: anchor.center(),
            radius: anchor.outer_radius(),
        },
        GradientKind::Linear => {
            let (start, end) = anchor.vertical_span();
            GradientGeometry::Linear { start, end }
        }
    };
    FillStyle::Gradient {
        geometry,
        stops: [desc.first, desc.second],
    }
}

/// Renderer-native paint.
#[derive(Debug, Clone)]
pub(crate) enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl Brush {
    pub(crate) fn apply(&self, ctx: &mut vello_cpu::RenderContext) {
        match self {
            Self::Solid(c) => ctx.set_paint(*c),
            Self::Gradient(g) => ctx.set_paint(g.clone()),
        }
    }

    /// The solid color, if this is not a gradient.
    pub(crate) fn solid(&self) -> Option<Color> {
        match self {
            Self::Solid(c) => Some(*c),
            Self::Gradient(_) => None,
        }
    }
}

impl FillStyle {
    /// Convert into a paint; `None` when nothing paintable remains (bad colors, non-strings).
    pub(crate) fn to_brush(&self) -> Option<Brush> {
        match self {
            Self::Color(s) => parse_css_color(s).map(Brush::Solid),
            Self::Gradient { geometry, stops } => {
                let c0 = parse_css_color(&stops[0])?;
                let c1 = parse_css_color(&stops[1])?;
                let g = match *geometry {
                    GradientGeometry::Radial { center, radius } => {
                        Gradient::new_radial((center.x, center.y), radius.max(0.0) as f32)
                    }
                    GradientGeometry::Linear { start, end } => {
                        Gradient::new_linear((start.x, start.y), (end.x, end.y))
                    }
                };
                Some(Brush::Gradient(g.with_stops([c0, c1])))
            }
            Self::Other(v) => {
                tracing::debug!(value = ?v, "non-string paint value");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/gradient.rs"]
mod tests;
