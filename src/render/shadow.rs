use crate::foundation::core::{Rect, Vec2};
use crate::foundation::error::{VizError, VizResult};
use vello_cpu::peniko::Color;

/// Drop shadow attached to a shape: color, blur length, and offset in logical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Shadow {
    pub(crate) color: Color,
    pub(crate) blur: f64,
    pub(crate) offset: Vec2,
}

impl Shadow {
    pub(crate) fn new(color: Color, blur: f64) -> Self {
        Self {
            color,
            blur,
            offset: Vec2::ZERO,
        }
    }

    pub(crate) fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Vec2::new(dx, dy);
        self
    }

    /// Gaussian standard deviation for a blur length, the way canvases interpret `shadowBlur`.
    pub(crate) fn sigma(&self) -> f64 {
        (self.blur / 2.0).max(0.0)
    }
}

/// Integer pixel window inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelRegion {
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl PixelRegion {
    /// Grow `rect` (physical units) by `margin` pixels and clip it to `width×height`.
    ///
    /// Returns `None` when nothing of the rect lands inside the buffer.
    pub(crate) fn around(rect: Rect, margin: f64, width: u32, height: u32) -> Option<Self> {
        let r = rect.inflate(margin, margin);
        let x0 = r.x0.floor().max(0.0);
        let y0 = r.y0.floor().max(0.0);
        let x1 = r.x1.ceil().min(f64::from(width));
        let y1 = r.y1.ceil().min(f64::from(height));
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Gaussian-blur a window of a premultiplied RGBA8 buffer in place.
///
/// Samples outside the window clamp to its edge, so the window should carry a transparent margin
/// of at least `3σ` around the content.
pub(crate) fn blur_region_premul(
    data: &mut [u8],
    width: u32,
    height: u32,
    region: PixelRegion,
    sigma: f32,
) -> VizResult<()> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| VizError::render("blur buffer size overflow"))?;
    if data.len() != expected_len {
        return Err(VizError::render(
            "blur_region_premul expects data matching width*height*4",
        ));
    }
    if region.x + region.width > width || region.y + region.height > height {
        return Err(VizError::render("blur region exceeds buffer"));
    }

    let radius = (3.0 * sigma).ceil().max(0.0) as u32;
    if radius == 0 || region.width == 0 || region.height == 0 {
        return Ok(());
    }
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let stride = width as usize * 4;
    let row_len = region.width as usize * 4;
    let mut window = Vec::with_capacity(row_len * region.height as usize);
    for y in region.y..region.y + region.height {
        let start = y as usize * stride + region.x as usize * 4;
        window.extend_from_slice(&data[start..start + row_len]);
    }

    let mut tmp = vec![0u8; window.len()];
    horizontal_pass(&window, &mut tmp, region.width, region.height, &kernel);
    vertical_pass(&tmp, &mut window, region.width, region.height, &kernel);

    for (row, y) in (region.y..region.y + region.height).enumerate() {
        let start = y as usize * stride + region.x as usize * 4;
        data[start..start + row_len].copy_from_slice(&window[row * row_len..(row + 1) * row_len]);
    }
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> VizResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(VizError::render("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(VizError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*a);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for (c, a) in acc.iter().enumerate() {
                dst[out + c] = q16_to_u8(*a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/shadow.rs"]
mod tests;
