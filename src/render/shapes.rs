use crate::foundation::core::{Affine, BezPath, Point, Rect};
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::premul_over_in_place;
use crate::paint::color::parse_css_color;
use crate::paint::gradient::{Anchor, Brush, FillStyle, resolve_fill};
use crate::render::shadow::{PixelRegion, Shadow, blur_region_premul};
use crate::render::surface::Surface;
use crate::render::text::{
    DEFAULT_FONT, PreparedText, TextAlign, TextBaseline, TextEngine, fill_text, parse_font,
};
use crate::spec::model::LayerKind;
use crate::spec::props::{PropValue, Props};
use kurbo::Shape;
use std::f64::consts::PI;
use vello_cpu::peniko::Color;

/// Length of each arrowhead stroke in logical units.
pub const ARROW_HEAD_LENGTH: f64 = 14.0;
/// Angle between the shaft and each arrowhead stroke.
pub const ARROW_HEAD_ANGLE: f64 = PI / 7.0;

const DEFAULT_LINE_WIDTH: f64 = 2.0;
const DEFAULT_ARROW_WIDTH: f64 = 4.0;
const DEFAULT_ARROW_COLOR: &str = "#000";
const DEFAULT_TEXT_FILL: &str = "#222";
const PATH_TOLERANCE: f64 = 0.1;

const SOFT_SHADOW: Color = Color::from_rgba8(0, 0, 0, 51);
const RECT_SHADOW: Color = Color::from_rgba8(0, 0, 0, 38);

#[derive(Debug, Clone, Copy, PartialEq)]
enum PaintMode {
    Fill,
    Stroke { width: f64, round: bool },
}

struct PathItem {
    path: BezPath,
    brush: Brush,
    mode: PaintMode,
    casts_shadow: bool,
}

struct TextItem {
    text: PreparedText,
    origin: Point,
    brush: Brush,
}

/// Geometry and paint for one resolved layer, in logical units.
struct LayerDraw {
    paths: Vec<PathItem>,
    text: Option<TextItem>,
    shadow: Option<Shadow>,
    shadow_bounds: Option<Rect>,
    opacity: f32,
}

impl LayerDraw {
    fn new(props: &Props) -> Self {
        Self {
            paths: Vec::new(),
            text: None,
            shadow: None,
            shadow_bounds: None,
            opacity: layer_opacity(props),
        }
    }

    fn push_path(&mut self, path: BezPath, brush: Brush, mode: PaintMode, casts_shadow: bool) {
        if casts_shadow {
            let mut bounds = path.bounding_box();
            if let PaintMode::Stroke { width, .. } = mode {
                bounds = bounds.inflate(width / 2.0, width / 2.0);
            }
            self.grow_shadow_bounds(bounds);
        }
        self.paths.push(PathItem {
            path,
            brush,
            mode,
            casts_shadow,
        });
    }

    fn grow_shadow_bounds(&mut self, r: Rect) {
        self.shadow_bounds = Some(match self.shadow_bounds {
            Some(b) => b.union(r),
            None => r,
        });
    }

    /// Optional `stroke` outline, resolved like a fill. Strokes never cast a shadow.
    fn push_outline(&mut self, props: &Props, path: &BezPath, anchor: Anchor) {
        let Some(value) = props.get("stroke") else {
            return;
        };
        let width = props.number_or("lineWidth", DEFAULT_LINE_WIDTH);
        if width <= 0.0 {
            return;
        }
        if let Some(brush) = resolve_fill(value, anchor).to_brush() {
            let mode = PaintMode::Stroke {
                width,
                round: false,
            };
            self.push_path(path.clone(), brush, mode, false);
        }
    }

    fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.text.is_none()
    }
}

fn layer_opacity(props: &Props) -> f32 {
    props.number_or("opacity", 1.0).clamp(0.0, 1.0) as f32
}

fn missing(kind: &str, required: &str) -> Option<LayerDraw> {
    tracing::debug!(kind, required, "skipping shape with missing properties");
    None
}

/// Rasterizes resolved layers onto a [`Surface`].
///
/// Each layer is drawn into a scratch buffer and composited with its opacity, so a layer's
/// shadow, fill, and outline fade together.
pub struct ShapeRenderer {
    shadows: bool,
    text: TextEngine,
    raster: Option<Raster>,
}

impl Default for ShapeRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for ShapeRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeRenderer")
            .field("shadows", &self.shadows)
            .finish_non_exhaustive()
    }
}

impl ShapeRenderer {
    /// Create a renderer; `shadows` toggles drop shadows for every primitive.
    pub fn new(shadows: bool) -> Self {
        Self {
            shadows,
            text: TextEngine::new(),
            raster: None,
        }
    }

    /// Whether drop shadows are drawn.
    pub fn shadows(&self) -> bool {
        self.shadows
    }

    /// Draw one primitive with fully-resolved properties.
    ///
    /// Unknown kinds, missing required properties, and unpaintable values are skipped; the only
    /// errors are internal buffer failures.
    pub fn draw(&mut self, surface: &mut Surface, kind: &LayerKind, props: &Props) -> VizResult<()> {
        let planned = match kind {
            LayerKind::Circle => plan_circle(props),
            LayerKind::Rect => plan_rect(props),
            LayerKind::Arrow => plan_arrow(props),
            LayerKind::Text => self.plan_text(props),
            LayerKind::Unknown(name) => {
                tracing::debug!(kind = %name, "skipping unknown layer type");
                None
            }
        };
        let Some(draw) = planned else {
            return Ok(());
        };
        if draw.is_empty() || draw.opacity <= 0.0 {
            return Ok(());
        }
        self.rasterize(surface, &draw)
    }

    fn plan_text(&mut self, props: &Props) -> Option<LayerDraw> {
        let (Some(x), Some(y)) = (props.number("x"), props.number("y")) else {
            return missing("text", "x, y, text");
        };
        let content = match props.get("text") {
            Some(PropValue::Text(s)) if !s.is_empty() => s.clone(),
            Some(PropValue::Number(n)) if n.is_finite() => format_number(*n),
            _ => return missing("text", "x, y, text"),
        };
        let fill = props
            .text("fill")
            .and_then(parse_css_color)
            .or_else(|| parse_css_color(DEFAULT_TEXT_FILL))?;
        let font = parse_font(props.text("font").unwrap_or(DEFAULT_FONT));
        let align = props.text("align").map(TextAlign::parse).unwrap_or_default();
        let baseline = props
            .text("baseline")
            .map(TextBaseline::parse)
            .unwrap_or_default();

        let Some(text) = self.text.layout(&content, &font) else {
            tracing::debug!(families = ?font.families, "no font available; skipping text");
            return None;
        };
        let (dx, dy) = text.anchor_offset(align, baseline);
        let origin = Point::new(x + dx, y + dy);

        let mut draw = LayerDraw::new(props);
        draw.grow_shadow_bounds(Rect::from_origin_size(origin, (text.width, text.height)));
        draw.shadow = Some(Shadow::new(SOFT_SHADOW, 2.0).with_offset(0.0, 1.0));
        draw.text = Some(TextItem {
            text,
            origin,
            brush: Brush::Solid(fill),
        });
        Some(draw)
    }

    fn rasterize(&mut self, surface: &mut Surface, draw: &LayerDraw) -> VizResult<()> {
        let (w, h) = (surface.width(), surface.height());
        let (w16, h16) = (
            u16::try_from(w).map_err(|_| VizError::render("surface width exceeds u16"))?,
            u16::try_from(h).map_err(|_| VizError::render("surface height exceeds u16"))?,
        );
        if self
            .raster
            .as_ref()
            .is_some_and(|r| r.width != w16 || r.height != h16)
        {
            self.raster = None;
        }
        let raster = self.raster.get_or_insert_with(|| Raster::new(w16, h16));
        let base = surface.viewport().to_physical();

        if self.shadows {
            if let (Some(shadow), Some(bounds)) = (draw.shadow, draw.shadow_bounds) {
                let transform = base * Affine::translate(shadow.offset);
                raster.paint(transform, draw, Some(shadow.color));
                let sigma = shadow.sigma() * surface.viewport().device_pixel_ratio;
                let physical = transform.transform_rect_bbox(bounds);
                if let Some(region) = PixelRegion::around(physical, (3.0 * sigma).ceil() + 1.0, w, h)
                {
                    blur_region_premul(raster.data_mut(), w, h, region, sigma as f32)?;
                }
                premul_over_in_place(surface.data_mut(), raster.data(), draw.opacity)?;
            }
        }

        raster.paint(base, draw, None);
        premul_over_in_place(surface.data_mut(), raster.data(), draw.opacity)
    }
}

fn plan_circle(props: &Props) -> Option<LayerDraw> {
    let (Some(x), Some(y), Some(r), Some(fill)) = (
        props.number("x"),
        props.number("y"),
        props.number("r"),
        props.get("fill"),
    ) else {
        return missing("circle", "x, y, r, fill");
    };
    if r <= 0.0 {
        return None;
    }
    let anchor = Anchor::Circle { cx: x, cy: y, r };
    let path = kurbo::Circle::new((x.round(), y.round()), r).to_path(PATH_TOLERANCE);

    let mut draw = LayerDraw::new(props);
    let style = resolve_fill(fill, anchor);
    if let Some(brush) = style.to_brush() {
        let shadow_color = match style {
            FillStyle::Color(_) => brush.solid(),
            _ => None,
        };
        draw.shadow = Some(Shadow::new(shadow_color.unwrap_or(SOFT_SHADOW), 15.0));
        draw.push_path(path.clone(), brush, PaintMode::Fill, true);
    }
    draw.push_outline(props, &path, anchor);
    Some(draw)
}

fn plan_rect(props: &Props) -> Option<LayerDraw> {
    let (Some(x), Some(y), Some(w), Some(h), Some(fill)) = (
        props.number("x"),
        props.number("y"),
        props.number("w"),
        props.number("h"),
        props.get("fill"),
    ) else {
        return missing("rect", "x, y, w, h, fill");
    };
    let (x, y, w, h) = (x.round(), y.round(), w.round(), h.round());
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let radius = props
        .number_or("borderRadius", 0.0)
        .max(0.0)
        .min(w / 2.0)
        .min(h / 2.0);
    let anchor = Anchor::Box { x, y, w, h };
    let path = kurbo::RoundedRect::new(x, y, x + w, y + h, radius).to_path(PATH_TOLERANCE);

    let mut draw = LayerDraw::new(props);
    if let Some(brush) = resolve_fill(fill, anchor).to_brush() {
        draw.shadow = Some(Shadow::new(RECT_SHADOW, 20.0).with_offset(0.0, 5.0));
        draw.push_path(path.clone(), brush, PaintMode::Fill, true);
    }
    draw.push_outline(props, &path, anchor);
    Some(draw)
}

/// Shaft plus two arrowhead strokes meeting at the tip.
pub(crate) fn arrow_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    let angle = (y1 - y0).atan2(x1 - x0);
    let head = |a: f64| {
        Point::new(
            x1 - ARROW_HEAD_LENGTH * a.cos(),
            y1 - ARROW_HEAD_LENGTH * a.sin(),
        )
    };
    let tip = Point::new(x1, y1);
    let mut path = BezPath::new();
    path.move_to((x0, y0));
    path.line_to(tip);
    path.move_to(tip);
    path.line_to(head(angle - ARROW_HEAD_ANGLE));
    path.move_to(tip);
    path.line_to(head(angle + ARROW_HEAD_ANGLE));
    path
}

fn plan_arrow(props: &Props) -> Option<LayerDraw> {
    let (Some(x), Some(y), Some(dx), Some(dy)) = (
        props.number("x"),
        props.number("y"),
        props.number("dx"),
        props.number("dy"),
    ) else {
        return missing("arrow", "x, y, dx, dy");
    };
    let color_str = props.text("color").unwrap_or(DEFAULT_ARROW_COLOR);
    let color = parse_css_color(color_str)?;
    let width = props.number_or("lineWidth", DEFAULT_ARROW_WIDTH);
    if width <= 0.0 {
        return None;
    }
    let path = arrow_path(x.round(), y.round(), (x + dx).round(), (y + dy).round());

    let mut draw = LayerDraw::new(props);
    draw.shadow = Some(Shadow::new(color, 10.0));
    let mode = PaintMode::Stroke { width, round: true };
    draw.push_path(path, Brush::Solid(color), mode, true);
    Some(draw)
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Reusable render context and scratch pixmap sized to one surface.
struct Raster {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    scratch: vello_cpu::Pixmap,
}

impl Raster {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            scratch: vello_cpu::Pixmap::new(width, height),
        }
    }

    fn data(&self) -> &[u8] {
        self.scratch.data_as_u8_slice()
    }

    fn data_mut(&mut self) -> &mut [u8] {
        self.scratch.data_as_u8_slice_mut()
    }

    /// Render `draw` into the cleared scratch pixmap.
    ///
    /// With `silhouette`, only shadow-casting items are painted, all in that solid color.
    fn paint(&mut self, transform: Affine, draw: &LayerDraw, silhouette: Option<Color>) {
        let ctx = &mut self.ctx;
        ctx.reset();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        for item in &draw.paths {
            match silhouette {
                Some(_) if !item.casts_shadow => continue,
                Some(c) => ctx.set_paint(c),
                None => item.brush.apply(ctx),
            }
            let path = bezpath_to_cpu(&item.path);
            match item.mode {
                PaintMode::Fill => ctx.fill_path(&path),
                PaintMode::Stroke { width, round } => {
                    let mut stroke = vello_cpu::kurbo::Stroke::new(width);
                    if round {
                        stroke = stroke
                            .with_caps(vello_cpu::kurbo::Cap::Round)
                            .with_join(vello_cpu::kurbo::Join::Round);
                    }
                    ctx.set_stroke(stroke);
                    ctx.stroke_path(&path);
                }
            }
        }

        if let Some(item) = &draw.text {
            let t = transform * Affine::translate(item.origin.to_vec2());
            ctx.set_transform(affine_to_cpu(t));
            match silhouette {
                Some(c) => ctx.set_paint(c),
                None => item.brush.apply(ctx),
            }
            fill_text(ctx, &item.text);
        }

        ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut self.scratch);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/shapes.rs"]
mod tests;
