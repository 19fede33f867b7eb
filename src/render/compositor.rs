use crate::animation::evaluate::evaluate_layer;
use crate::foundation::core::Viewport;
use crate::foundation::error::VizResult;
use crate::render::shapes::ShapeRenderer;
use crate::render::surface::Surface;
use crate::spec::model::Layer;

/// Off-screen buffer holding every static layer of one spec.
///
/// Built once per spec and blitted under the dynamic layers on every drawn frame. A new spec
/// gets a new compositor; the buffer is never edited in place.
#[derive(Debug)]
pub struct StaticCompositor {
    buffer: Surface,
    layer_count: usize,
}

impl StaticCompositor {
    /// A transparent buffer with no layers.
    pub fn empty(viewport: Viewport) -> VizResult<Self> {
        Ok(Self {
            buffer: Surface::new(viewport)?,
            layer_count: 0,
        })
    }

    /// Render `layers` in order at `t = 0` into a fresh transparent buffer.
    ///
    /// A layer that fails to draw is logged and skipped; the rest of the buffer is still built.
    #[tracing::instrument(skip(layers, renderer), fields(layers = layers.len()))]
    pub fn build(
        layers: &[Layer],
        viewport: Viewport,
        renderer: &mut ShapeRenderer,
    ) -> VizResult<Self> {
        let mut buffer = Surface::new(viewport)?;
        for (i, layer) in layers.iter().enumerate() {
            let props = evaluate_layer(layer, 0.0);
            if let Err(e) = renderer.draw(&mut buffer, &layer.kind, &props) {
                tracing::warn!(layer = i, error = %e, "static layer draw failed");
            }
        }
        Ok(Self {
            buffer,
            layer_count: layers.len(),
        })
    }

    /// The pre-rendered buffer.
    pub fn buffer(&self) -> &Surface {
        &self.buffer
    }

    /// Number of layers baked into the buffer.
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Composite the buffer over `dst`.
    pub fn blit_onto(&self, dst: &mut Surface) -> VizResult<()> {
        if self.layer_count == 0 {
            return Ok(());
        }
        dst.blit(&self.buffer)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
