use crate::foundation::core::{Rgba8Premul, Viewport};
use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::premul_over_in_place;

/// A rendered frame as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**; the flag makes this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// A physical-pixel drawing surface for the logical canvas.
pub struct Surface {
    viewport: Viewport,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    /// Allocate a transparent surface sized to the viewport's physical pixels.
    pub fn new(viewport: Viewport) -> VizResult<Self> {
        let (w, h) = viewport.physical_size()?;
        Ok(Self {
            viewport,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Viewport this surface was allocated for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Width in physical pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.pixmap.width())
    }

    /// Height in physical pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.pixmap.height())
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Fill every pixel with a straight-alpha color, or transparent when `None`.
    pub fn clear(&mut self, rgba: Option<[u8; 4]>) {
        match rgba {
            None => self.data_mut().fill(0),
            Some([r, g, b, a]) => {
                let px = Rgba8Premul::from_straight_rgba(r, g, b, a).to_array();
                for dst in self.data_mut().chunks_exact_mut(4) {
                    dst.copy_from_slice(&px);
                }
            }
        }
    }

    /// Composite `src` over this surface; both must have identical physical size.
    pub fn blit(&mut self, src: &Surface) -> VizResult<()> {
        if src.width() != self.width() || src.height() != self.height() {
            return Err(VizError::render(format!(
                "blit size mismatch: {}x{} onto {}x{}",
                src.width(),
                src.height(),
                self.width(),
                self.height()
            )));
        }
        premul_over_in_place(self.data_mut(), src.data(), 1.0)
    }

    /// Premultiplied pixel at physical coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let idx = ((y as usize) * (self.width() as usize) + (x as usize)) * 4;
        let d = self.data();
        Some([d[idx], d[idx + 1], d[idx + 2], d[idx + 3]])
    }

    /// Premultiplied pixel under a logical-space point.
    pub fn pixel_at(&self, x: f64, y: f64) -> Option<[u8; 4]> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let dpr = self.viewport.device_pixel_ratio;
        self.pixel((x * dpr).floor() as u32, (y * dpr).floor() as u32)
    }

    /// Copy the current pixels out as a frame.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.width(),
            height: self.height(),
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("viewport", &self.viewport)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
