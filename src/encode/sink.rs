use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::unpremultiply_in_place;
use crate::render::surface::FrameRGBA;
use std::path::{Path, PathBuf};

/// Configuration provided to a [`FrameSink`] before the first frame of a playback run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in physical pixels.
    pub width: u32,
    /// Frame height in physical pixels.
    pub height: u32,
    /// Redraw rate requested by the spec.
    pub fps: u32,
}

/// Consumer of drawn frames.
///
/// Ordering contract: within one run `push_frame` is called with non-decreasing `elapsed_ms`.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()>;
    /// Push one drawn frame together with the elapsed time it shows.
    fn push_frame(&mut self, elapsed_ms: f64, frame: &FrameRGBA) -> VizResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> VizResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(f64, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames with their elapsed times.
    pub fn frames(&self) -> &[(f64, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` has been called since the last `begin`.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, elapsed_ms: f64, frame: &FrameRGBA) -> VizResult<()> {
        self.frames.push((elapsed_ms, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> VizResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Writes each frame as a straight-alpha PNG named `frame_<n>_<elapsed>ms.png`.
#[derive(Debug)]
pub struct PngDirSink {
    dir: PathBuf,
    count: u64,
    written: Vec<PathBuf>,
}

impl PngDirSink {
    /// Create a sink writing into `dir` (created on `begin`).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            count: 0,
            written: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// File name used for the `n`-th frame.
    pub fn file_name(n: u64, elapsed_ms: f64) -> String {
        format!("frame_{n:05}_{}ms.png", elapsed_ms.max(0.0).round() as u64)
    }
}

/// Save one premultiplied frame as a straight-alpha PNG.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> VizResult<()> {
    let mut straight = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_in_place(&mut straight);
    }
    image::save_buffer_with_format(
        path,
        &straight,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| VizError::render(format!("write png '{}': {e}", path.display())))
}

impl FrameSink for PngDirSink {
    fn begin(&mut self, cfg: SinkConfig) -> VizResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            VizError::render(format!("create output dir '{}': {e}", self.dir.display()))
        })?;
        self.count = 0;
        self.written.clear();
        tracing::debug!(dir = %self.dir.display(), width = cfg.width, height = cfg.height, "png sink ready");
        Ok(())
    }

    fn push_frame(&mut self, elapsed_ms: f64, frame: &FrameRGBA) -> VizResult<()> {
        let path = self.dir.join(Self::file_name(self.count, elapsed_ms));
        write_png(&path, frame)?;
        self.count += 1;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> VizResult<()> {
        tracing::info!(frames = self.count, dir = %self.dir.display(), "wrote frames");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
