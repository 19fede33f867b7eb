use crate::animation::evaluate::evaluate_layer;
use crate::eval::classify::{ClassifiedLayers, classify_layers};
use crate::foundation::core::{Canvas, Viewport};
use crate::foundation::error::{VizError, VizResult};
use crate::playback::scheduler::{FrameQueue, FrameRequestId, FrameScheduler};
use crate::render::compositor::StaticCompositor;
use crate::render::shapes::ShapeRenderer;
use crate::render::surface::{FrameRGBA, Surface};
use crate::spec::model::{LayerKind, VisualizationSpec};
use crate::spec::props::Props;

/// Background painted under every frame when none is configured.
pub const DEFAULT_BACKGROUND: [u8; 4] = [0xfc, 0xfc, 0xfc, 0xff];

/// Options for the drawing surface a controller owns.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportOpts {
    /// Physical pixels per logical unit.
    pub device_pixel_ratio: f64,
    /// Straight-alpha RGBA8 fill applied before each frame; `None` leaves the surface transparent.
    pub background: Option<[u8; 4]>,
    /// Draw drop shadows under shapes and text.
    pub shadows: bool,
}

impl Default for ViewportOpts {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            background: Some(DEFAULT_BACKGROUND),
            shadows: true,
        }
    }
}

impl ViewportOpts {
    /// Defaults, with `VIZPLAY_DPR` overriding the device pixel ratio when it parses as a
    /// positive number.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(dpr) = std::env::var("VIZPLAY_DPR")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
        {
            opts.device_pixel_ratio = dpr;
        }
        opts
    }

    /// Viewport for the fixed logical canvas at this pixel ratio.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(Canvas::LOGICAL, self.device_pixel_ratio)
    }
}

/// Lifecycle state of a [`PlaybackController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// A spec may be loaded; nothing is scheduled.
    #[default]
    Idle,
    /// Ticks are scheduled and frames are drawn as `elapsed` advances.
    Playing,
    /// Stopped by the host; the last drawn frame stays visible.
    Paused,
    /// Reached `duration`; the final frame shows every track at its end value.
    Finished,
}

/// Counters for the current playback run.
///
/// Reset whenever a spec is loaded and whenever playback (re)starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Live refresh callbacks handled.
    pub ticks: u64,
    /// Ticks that redrew the surface, including the final frame.
    pub frames_drawn: u64,
    /// Ticks skipped by the fps throttle.
    pub ticks_throttled: u64,
    /// Callbacks ignored because they were cancelled or superseded.
    pub stale_callbacks: u64,
}

/// Result of one refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was drawn and another tick is scheduled.
    Drawn,
    /// Too soon since the last draw; another tick is scheduled.
    Throttled,
    /// The final frame was drawn and scheduling stopped.
    Finished,
    /// The callback was not the pending request and was ignored.
    Stale,
}

impl TickOutcome {
    /// Whether the surface changed during this tick.
    pub fn drew(self) -> bool {
        matches!(self, Self::Drawn | Self::Finished)
    }
}

/// One dynamic layer as it was drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLayer {
    /// Layer id, if the spec gave one.
    pub id: Option<String>,
    /// Primitive kind.
    pub kind: LayerKind,
    /// Properties after evaluation.
    pub props: Props,
}

/// Summary of the most recently presented frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawnFrame {
    /// Monotonic counter across every presentation of this controller.
    pub serial: u64,
    /// Elapsed time the dynamic layers were evaluated at.
    pub elapsed_ms: f64,
    /// Dynamic layers in paint order with their resolved properties.
    pub dynamic: Vec<ResolvedLayer>,
}

struct Scene {
    spec: VisualizationSpec,
    layers: ClassifiedLayers,
    statics: StaticCompositor,
}

/// Owns one drawing surface and plays visualization specs onto it.
///
/// The controller is the single mutator of its scene: the classified layers and static buffer
/// belong to the current spec and are replaced wholesale by [`load_spec`](Self::load_spec).
/// Frames are driven by refresh callbacks obtained from a [`FrameScheduler`]; at most one request
/// is outstanding, and anything else delivered to [`on_frame`](Self::on_frame) is ignored.
pub struct PlaybackController<S: FrameScheduler = FrameQueue> {
    opts: ViewportOpts,
    scheduler: S,
    renderer: ShapeRenderer,
    surface: Surface,
    scene: Option<Scene>,

    state: PlaybackState,
    elapsed: f64,
    start_time: Option<f64>,
    last_draw_time: Option<f64>,
    pending: Option<FrameRequestId>,
    playing_input: bool,

    stats: PlaybackStats,
    last_frame: Option<DrawnFrame>,
    serial: u64,
}

impl PlaybackController<FrameQueue> {
    /// Controller with the built-in in-process [`FrameQueue`].
    pub fn with_queue(opts: ViewportOpts) -> VizResult<Self> {
        Self::new(opts, FrameQueue::new())
    }
}

impl<S: FrameScheduler> PlaybackController<S> {
    /// Allocate the surface for `opts` and start Idle with no spec.
    pub fn new(opts: ViewportOpts, scheduler: S) -> VizResult<Self> {
        let mut surface = Surface::new(opts.viewport())?;
        surface.clear(opts.background);
        Ok(Self {
            renderer: ShapeRenderer::new(opts.shadows),
            opts,
            scheduler,
            surface,
            scene: None,
            state: PlaybackState::Idle,
            elapsed: 0.0,
            start_time: None,
            last_draw_time: None,
            pending: None,
            playing_input: false,
            stats: PlaybackStats::default(),
            last_frame: None,
            serial: 0,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Elapsed time of the most recent draw, in milliseconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Counters for the current run.
    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    /// The loaded spec, if any.
    pub fn spec(&self) -> Option<&VisualizationSpec> {
        self.scene.as_ref().map(|s| &s.spec)
    }

    /// Classification of the loaded spec, if any.
    pub fn layers(&self) -> Option<&ClassifiedLayers> {
        self.scene.as_ref().map(|s| &s.layers)
    }

    /// The static buffer of the loaded spec, if any.
    pub fn static_buffer(&self) -> Option<&Surface> {
        self.scene.as_ref().map(|s| s.statics.buffer())
    }

    /// Options this controller was created with.
    pub fn opts(&self) -> &ViewportOpts {
        &self.opts
    }

    /// The drawing surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Snapshot of the drawing surface.
    pub fn frame(&self) -> FrameRGBA {
        self.surface.to_frame()
    }

    /// Summary of the last presented frame.
    pub fn last_frame(&self) -> Option<&DrawnFrame> {
        self.last_frame.as_ref()
    }

    /// The outstanding refresh request, if playback is waiting for one.
    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending
    }

    /// Borrow the scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutably borrow the scheduler (hosts deliver due callbacks from here).
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Replace the scene with `spec` and return to Idle at `elapsed = 0`.
    ///
    /// Any pending tick is cancelled first. The static buffer is rebuilt and a preview frame at
    /// `elapsed = 0` is presented.
    #[tracing::instrument(skip(self, spec), fields(id = %spec.id))]
    pub fn load_spec(&mut self, spec: VisualizationSpec) -> VizResult<()> {
        self.cancel_pending();

        for issue in spec.validate() {
            tracing::debug!(%issue, "spec issue");
        }
        let layers = classify_layers(&spec.layers);
        let statics =
            StaticCompositor::build(&layers.static_layers, self.surface.viewport(), &mut self.renderer)?;
        tracing::info!(
            static_layers = layers.static_layers.len(),
            dynamic_layers = layers.dynamic_layers.len(),
            duration_ms = spec.duration_ms,
            fps = spec.fps,
            "loaded spec"
        );
        self.scene = Some(Scene {
            spec,
            layers,
            statics,
        });
        self.reset_run();
        self.state = PlaybackState::Idle;
        self.present(0.0)
    }

    /// Drop the scene; the surface shows only the background.
    pub fn clear_spec(&mut self) -> VizResult<()> {
        self.cancel_pending();
        self.scene = None;
        self.reset_run();
        self.state = PlaybackState::Idle;
        self.present(0.0)
    }

    /// Start or stop playback.
    ///
    /// Starting always restarts from `elapsed = 0`, including from Paused. Stopping cancels the
    /// pending tick and leaves the last drawn frame visible. Starting without a spec is a no-op.
    pub fn set_playing(&mut self, playing: bool) {
        if playing == self.is_playing() {
            return;
        }
        if !playing {
            self.cancel_pending();
            self.state = PlaybackState::Paused;
            tracing::info!(elapsed_ms = self.elapsed, "playback paused");
            return;
        }
        if self.scene.is_none() {
            tracing::debug!("play requested without a spec");
            return;
        }
        self.cancel_pending();
        self.reset_run();
        self.state = PlaybackState::Playing;
        self.pending = Some(self.scheduler.request_frame());
        tracing::info!("playback started");
    }

    fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Reconcile externally-owned `(spec, playing)` inputs.
    ///
    /// A different spec is loaded (and started when `playing`); otherwise a change of `playing`
    /// starts or stops playback. Repeating the same inputs does nothing, so a finished run is
    /// not restarted just because the host still reports `playing`. Use
    /// [`deliver`](Self::deliver) when the host received the spec anew, even if its content is
    /// unchanged.
    pub fn sync(&mut self, spec: Option<&VisualizationSpec>, playing: bool) -> VizResult<()> {
        let spec_changed = match (spec, &self.scene) {
            (Some(next), Some(scene)) => *next != scene.spec,
            (None, None) => false,
            _ => true,
        };
        if spec_changed {
            return self.deliver(spec, playing);
        }
        let playing_changed = playing != self.playing_input;
        self.playing_input = playing;
        if playing_changed {
            self.set_playing(playing);
        }
        Ok(())
    }

    /// Take a freshly delivered spec: always reload it, and start from 0 when `playing`.
    ///
    /// Unlike [`sync`](Self::sync), identical content is not deduplicated; a spec delivered
    /// again replays from the beginning.
    pub fn deliver(&mut self, spec: Option<&VisualizationSpec>, playing: bool) -> VizResult<()> {
        self.playing_input = playing;
        match spec {
            Some(next) => self.load_spec(next.clone())?,
            None => self.clear_spec()?,
        }
        if playing {
            self.set_playing(true);
        }
        Ok(())
    }

    /// Refresh callback for request `id` at host time `now_ms`.
    ///
    /// Only the pending request is honored; anything else is counted as stale and ignored.
    pub fn on_frame(&mut self, id: FrameRequestId, now_ms: f64) -> VizResult<TickOutcome> {
        if self.pending != Some(id) || !self.is_playing() {
            self.stats.stale_callbacks += 1;
            tracing::debug!(?id, "ignoring stale frame callback");
            return Ok(TickOutcome::Stale);
        }
        if !now_ms.is_finite() {
            return Err(VizError::animation(format!(
                "frame callback time must be finite, got {now_ms}"
            )));
        }
        self.pending = None;
        self.stats.ticks += 1;

        let Some(scene) = &self.scene else {
            self.state = PlaybackState::Idle;
            return Ok(TickOutcome::Stale);
        };
        let duration = scene.spec.duration();
        let interval = scene.spec.frame_interval_ms();

        let start = *self.start_time.get_or_insert(now_ms);
        let elapsed = (now_ms - start).clamp(0.0, duration).max(self.elapsed);

        if elapsed >= duration {
            self.elapsed = duration;
            self.present(duration)?;
            self.stats.frames_drawn += 1;
            self.state = PlaybackState::Finished;
            tracing::info!(
                frames_drawn = self.stats.frames_drawn,
                ticks = self.stats.ticks,
                "playback finished"
            );
            return Ok(TickOutcome::Finished);
        }

        let due = self
            .last_draw_time
            .is_none_or(|last| now_ms - last >= interval);
        let outcome = if due {
            self.elapsed = elapsed;
            self.present(elapsed)?;
            self.stats.frames_drawn += 1;
            self.last_draw_time = Some(now_ms);
            TickOutcome::Drawn
        } else {
            self.stats.ticks_throttled += 1;
            TickOutcome::Throttled
        };
        self.pending = Some(self.scheduler.request_frame());
        Ok(outcome)
    }

    /// Present the frame at `elapsed_ms` (clamped to the spec's duration) without playing.
    ///
    /// Errors while Playing, or when no spec is loaded.
    pub fn preview_at(&mut self, elapsed_ms: f64) -> VizResult<()> {
        if self.is_playing() {
            return Err(VizError::animation("cannot preview while playing"));
        }
        let duration = self
            .spec()
            .map(VisualizationSpec::duration)
            .ok_or_else(|| VizError::validation("no spec loaded"))?;
        let t = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, duration)
        } else {
            0.0
        };
        self.elapsed = t;
        self.present(t)
    }

    /// Cancel scheduling and drop the scene.
    pub fn dispose(&mut self) {
        self.cancel_pending();
        self.scene = None;
        self.state = PlaybackState::Idle;
        self.playing_input = false;
        self.last_frame = None;
        tracing::debug!("controller disposed");
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    fn reset_run(&mut self) {
        self.elapsed = 0.0;
        self.start_time = None;
        self.last_draw_time = None;
        self.stats = PlaybackStats::default();
    }

    /// Background, static buffer, then every dynamic layer evaluated at `t`.
    fn present(&mut self, t: f64) -> VizResult<()> {
        self.surface.clear(self.opts.background);
        let mut dynamic = Vec::new();
        if let Some(scene) = &self.scene {
            scene.statics.blit_onto(&mut self.surface)?;
            dynamic.reserve(scene.layers.dynamic_layers.len());
            for (i, layer) in scene.layers.dynamic_layers.iter().enumerate() {
                let props = evaluate_layer(layer, t);
                if let Err(e) = self.renderer.draw(&mut self.surface, &layer.kind, &props) {
                    tracing::warn!(layer = i, error = %e, "dynamic layer draw failed");
                }
                dynamic.push(ResolvedLayer {
                    id: layer.id.clone(),
                    kind: layer.kind.clone(),
                    props,
                });
            }
        }
        self.serial += 1;
        self.last_frame = Some(DrawnFrame {
            serial: self.serial,
            elapsed_ms: t,
            dynamic,
        });
        Ok(())
    }
}

impl<S: FrameScheduler> std::fmt::Debug for PlaybackController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .field("pending", &self.pending)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
