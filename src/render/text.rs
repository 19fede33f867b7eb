use std::borrow::Cow;
use std::collections::HashMap;
use usvg::fontdb;

/// Font shorthand applied when a text layer has no `font`.
pub const DEFAULT_FONT: &str = "18px system-ui, -apple-system, sans-serif";

/// Parsed subset of the CSS `font` shorthand: `[style] [weight] <size>px <family>[, <family>]*`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family names in preference order; generic names are kept as written.
    pub families: Vec<String>,
    /// Font size in logical pixels.
    pub size_px: f32,
    /// CSS numeric weight.
    pub weight: u16,
    /// Italic or oblique.
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            families: vec!["sans-serif".to_owned()],
            size_px: 18.0,
            weight: 400,
            italic: false,
        }
    }
}

/// Parse a font shorthand, falling back to defaults for anything unreadable.
pub fn parse_font(s: &str) -> FontSpec {
    let mut spec = FontSpec::default();
    let mut rest = s.trim();
    while let Some((word, tail)) = rest.split_once(char::is_whitespace) {
        if let Some(size) = parse_px(word) {
            spec.size_px = size;
            rest = tail.trim();
            break;
        }
        match word {
            "italic" | "oblique" => spec.italic = true,
            "bold" | "bolder" => spec.weight = 700,
            "lighter" => spec.weight = 300,
            "normal" => {}
            w => match w.parse::<u16>() {
                Ok(n) if (1..=1000).contains(&n) => spec.weight = n,
                _ => {
                    tracing::debug!(font = s, "unrecognized font shorthand");
                    return spec;
                }
            },
        }
        rest = tail.trim_start();
    }

    if let Some(size) = parse_px(rest) {
        spec.size_px = size;
        return spec;
    }
    let families: Vec<String> = rest
        .split(',')
        .map(|f| f.trim().trim_matches(['"', '\'']).to_owned())
        .filter(|f| !f.is_empty())
        .collect();
    if !families.is_empty() {
        spec.families = families;
    }
    spec
}

fn parse_px(word: &str) -> Option<f32> {
    let size_part = word.split('/').next()?;
    let v: f32 = size_part.strip_suffix("px")?.parse().ok()?;
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Horizontal anchor of a text layer relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Text starts at `x`.
    #[default]
    Left,
    /// Text is centered on `x`.
    Center,
    /// Text ends at `x`.
    Right,
}

impl TextAlign {
    /// Parse an `align` value; unknown values read as left.
    pub fn parse(s: &str) -> Self {
        match s {
            "center" => Self::Center,
            "right" | "end" => Self::Right,
            _ => Self::Left,
        }
    }
}

/// Vertical anchor of a text layer relative to its `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    /// `y` is the top of the layout box.
    #[default]
    Top,
    /// `y` is the alphabetic baseline of the first line.
    Alphabetic,
    /// `y` is the middle of the layout box.
    Middle,
    /// `y` is the bottom of the layout box.
    Bottom,
}

impl TextBaseline {
    /// Parse a `baseline` value; unknown values read as top.
    pub fn parse(s: &str) -> Self {
        match s {
            "alphabetic" => Self::Alphabetic,
            "middle" => Self::Middle,
            "bottom" | "ideographic" => Self::Bottom,
            _ => Self::Top,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TextBrush;

/// Shaped text plus the font needed to rasterize it.
pub(crate) struct PreparedText {
    pub(crate) layout: parley::Layout<TextBrush>,
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) baseline: f64,
}

impl PreparedText {
    /// Offset from the anchor point to the layout's top-left corner.
    pub(crate) fn anchor_offset(&self, align: TextAlign, baseline: TextBaseline) -> (f64, f64) {
        let dx = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => -self.width / 2.0,
            TextAlign::Right => -self.width,
        };
        let dy = match baseline {
            TextBaseline::Top => 0.0,
            TextBaseline::Middle => -self.height / 2.0,
            TextBaseline::Bottom => -self.height,
            TextBaseline::Alphabetic => -self.baseline,
        };
        (dx, dy)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FaceKey {
    families: Vec<String>,
    weight: u16,
    italic: bool,
}

struct LoadedFace {
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Resolves font shorthands against system fonts and lays out text with Parley.
pub(crate) struct TextEngine {
    db: Option<fontdb::Database>,
    faces: HashMap<FaceKey, Option<LoadedFace>>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    pub(crate) fn new() -> Self {
        Self {
            db: None,
            faces: HashMap::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    fn database(&mut self) -> &fontdb::Database {
        self.db.get_or_insert_with(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            db
        })
    }

    fn face_for(&mut self, font: &FontSpec) -> Option<&LoadedFace> {
        let key = FaceKey {
            families: font.families.clone(),
            weight: font.weight,
            italic: font.italic,
        };
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(font);
            self.faces.insert(key.clone(), loaded);
        }
        self.faces.get(&key).and_then(Option::as_ref)
    }

    fn load_face(&mut self, font: &FontSpec) -> Option<LoadedFace> {
        let db = self.database();
        let families: Vec<fontdb::Family<'_>> = font
            .families
            .iter()
            .map(|f| match f.as_str() {
                "serif" => fontdb::Family::Serif,
                "monospace" => fontdb::Family::Monospace,
                "cursive" => fontdb::Family::Cursive,
                "fantasy" => fontdb::Family::Fantasy,
                "sans-serif" | "system-ui" | "-apple-system" => fontdb::Family::SansSerif,
                name => fontdb::Family::Name(name),
            })
            .collect();
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(font.weight),
            stretch: fontdb::Stretch::Normal,
            style: if font.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let id = db.query(&query).or_else(|| db.faces().next().map(|f| f.id))?;
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = registered.first().map(|(id, _)| *id)?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)?
            .to_string();
        tracing::debug!(family = %family_name, "resolved text face");
        Some(LoadedFace {
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), index),
        })
    }

    /// Shape `text` with `font`; `None` when no usable face exists.
    pub(crate) fn layout(&mut self, text: &str, font: &FontSpec) -> Option<PreparedText> {
        let (family_name, font_data) = {
            let face = self.face_for(font)?;
            (face.family_name.clone(), face.font.clone())
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        let (weight, style) = parley_font_style(font);
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(style));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);

        let baseline = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().baseline))
            .unwrap_or(f64::from(font.size_px));
        Some(PreparedText {
            width: f64::from(layout.width()),
            height: f64::from(layout.height()),
            baseline,
            layout,
            font: font_data,
        })
    }
}

/// Weight and slant handed to Parley, matching the face picked from the system fonts.
fn parley_font_style(font: &FontSpec) -> (parley::style::FontWeight, parley::style::FontStyle) {
    let style = if font.italic {
        parley::style::FontStyle::Italic
    } else {
        parley::style::FontStyle::Normal
    };
    (parley::style::FontWeight::new(f32::from(font.weight)), style)
}

/// Fill every glyph of `text` with the context's current paint.
pub(crate) fn fill_text(ctx: &mut vello_cpu::RenderContext, text: &PreparedText) {
    for line in text.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&text.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
