//! vizplay plays timed shape-animation specs onto a CPU raster surface.
//!
//! A [`VisualizationSpec`] describes layers (circles, rounded rectangles, arrows, text) on a
//! fixed 500×400 logical canvas, some of them animated. The playback pipeline is:
//!
//! - Load a spec into a [`PlaybackController`]; layers are classified into static and dynamic
//!   sets and the static ones are baked once into an off-screen buffer.
//! - Start playback and deliver refresh callbacks (by hand, or with a [`RefreshLoop`]); each
//!   admitted tick blits the static buffer and draws the dynamic layers at the current elapsed
//!   time, throttled to the spec's `fps`.
//! - Read frames from the surface or stream them into a [`FrameSink`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
/// Frame sinks.
pub mod encode;
pub(crate) mod eval;
pub(crate) mod paint;
pub(crate) mod playback;
pub(crate) mod render;
pub(crate) mod spec;

pub use crate::animation::evaluate::{evaluate_layer, evaluate_props, sample_linear, sample_orbit};
pub use crate::eval::classify::{ClassifiedLayers, classify_layers};
pub use crate::foundation::core::{
    Affine, BezPath, CANVAS_HEIGHT, CANVAS_WIDTH, Canvas, Point, Rect, Rgba8Premul, Vec2,
    Viewport,
};
pub use crate::foundation::error::{VizError, VizResult};
pub use crate::foundation::math::lerp;

pub use crate::encode::sink::{FrameSink, InMemorySink, PngDirSink, SinkConfig, write_png};
pub use crate::paint::color::{color_to_rgba8, parse_css_color, parse_rgba8};
pub use crate::paint::gradient::{
    Anchor, FillStyle, GradientDescriptor, GradientGeometry, GradientKind, parse_gradient,
    resolve_fill,
};
pub use crate::playback::controller::{
    DEFAULT_BACKGROUND, DrawnFrame, PlaybackController, PlaybackState, PlaybackStats,
    ResolvedLayer, TickOutcome, ViewportOpts,
};
pub use crate::playback::driver::{Clock, RefreshLoop, RefreshLoopOpts, SimulatedClock, SystemClock};
pub use crate::playback::scheduler::{FrameQueue, FrameRequestId, FrameScheduler};
pub use crate::render::compositor::StaticCompositor;
pub use crate::render::shapes::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, ShapeRenderer};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::render::text::{DEFAULT_FONT, FontSpec, TextAlign, TextBaseline, parse_font};
pub use crate::spec::load::SpecIssue;
pub use crate::spec::model::{
    AnimatedProperty, Animation, DEFAULT_DURATION_MS, DEFAULT_FPS, DEFAULT_ORBIT_PERIOD_MS, Layer,
    LayerKind, LinearAnimation, OrbitAnimation, VisualizationSpec,
};
pub use crate::spec::props::{PropValue, Props};
