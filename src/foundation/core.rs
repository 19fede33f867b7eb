use crate::foundation::error::{VizError, VizResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Logical canvas width in layout units.
pub const CANVAS_WIDTH: f64 = 500.0;
/// Logical canvas height in layout units.
pub const CANVAS_HEIGHT: f64 = 400.0;

/// Fixed logical canvas, origin top-left, y-down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    /// Width in logical units.
    pub width: f64,
    /// Height in logical units.
    pub height: f64,
}

impl Canvas {
    /// The 500×400 canvas every spec is authored against.
    pub const LOGICAL: Self = Self {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
    };
}

/// Logical canvas scaled by a device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical canvas.
    pub canvas: Canvas,
    /// Device pixel ratio (`> 0`, finite).
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Create a viewport; invalid ratios fall back to `1.0`.
    pub fn new(canvas: Canvas, device_pixel_ratio: f64) -> Self {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            canvas,
            device_pixel_ratio: dpr,
        }
    }

    /// Physical pixel size `(round(w·dpr), round(h·dpr))`.
    ///
    /// Fails when the result does not fit a 16-bit pixmap.
    pub fn physical_size(self) -> VizResult<(u16, u16)> {
        fn to_px(v: f64) -> VizResult<u16> {
            let px = v.round().max(1.0);
            if px > f64::from(u16::MAX) {
                return Err(VizError::render(format!(
                    "physical surface dimension {px} exceeds {}",
                    u16::MAX
                )));
            }
            Ok(px as u16)
        }

        Ok((
            to_px(self.canvas.width * self.device_pixel_ratio)?,
            to_px(self.canvas.height * self.device_pixel_ratio)?,
        ))
    }

    /// Transform from logical units to physical pixels.
    pub fn to_physical(self) -> Affine {
        Affine::scale(self.device_pixel_ratio)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Canvas::LOGICAL, 1.0)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
