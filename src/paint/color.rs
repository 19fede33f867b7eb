use vello_cpu::peniko::Color;
use vello_cpu::peniko::color::{Srgb, parse_color};

/// Parse a CSS color string (hex, `rgb()/rgba()`, `hsl()`, named colors).
///
/// Returns `None` for anything the CSS color grammar does not accept, including gradient
/// descriptors.
pub fn parse_css_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match parse_color(s) {
        Ok(c) => Some(c.to_alpha_color::<Srgb>()),
        Err(e) => {
            tracing::debug!(color = s, error = %e, "unparseable color");
            None
        }
    }
}

/// Straight-alpha RGBA8 channels of a color.
pub fn color_to_rgba8(c: Color) -> [u8; 4] {
    let rgba = c.to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a]
}

/// Parse a color and return straight RGBA8, for options that take a background color.
pub fn parse_rgba8(s: &str) -> Option<[u8; 4]> {
    parse_css_color(s).map(color_to_rgba8)
}

#[cfg(test)]
#[path = "../../tests/unit/paint/color.rs"]
mod tests;
