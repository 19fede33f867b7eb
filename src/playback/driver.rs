use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{VizError, VizResult};
use crate::playback::controller::{PlaybackController, PlaybackStats};
use crate::playback::scheduler::FrameQueue;
use std::time::{Duration, Instant};

/// Source of refresh timestamps in milliseconds.
pub trait Clock {
    /// Current time in milliseconds from an arbitrary origin.
    fn now_ms(&self) -> f64;
    /// Block (or advance) until `t_ms`.
    fn sleep_until(&mut self, t_ms: f64);
}

/// Wall-clock time, sleeping between refreshes.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Clock whose origin is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn sleep_until(&mut self, t_ms: f64) {
        let wait = t_ms - self.now_ms();
        if wait > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(wait / 1000.0));
        }
    }
}

/// Virtual time that jumps straight to each requested instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulatedClock {
    now: f64,
}

impl SimulatedClock {
    /// Clock starting at `start_ms`.
    pub fn starting_at(start_ms: f64) -> Self {
        Self { now: start_ms }
    }
}

impl Clock for SimulatedClock {
    fn now_ms(&self) -> f64 {
        self.now
    }

    fn sleep_until(&mut self, t_ms: f64) {
        self.now = self.now.max(t_ms);
    }
}

/// Options for [`RefreshLoop`].
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshLoopOpts {
    /// Display refresh rate driving tick frequency.
    pub refresh_hz: f64,
    /// Sleep in real time between ticks instead of simulating time.
    pub realtime: bool,
}

impl Default for RefreshLoopOpts {
    fn default() -> Self {
        Self {
            refresh_hz: 60.0,
            realtime: false,
        }
    }
}

/// Plays a controller to completion by delivering refresh callbacks from its [`FrameQueue`].
pub struct RefreshLoop {
    period_ms: f64,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for RefreshLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshLoop")
            .field("period_ms", &self.period_ms)
            .finish_non_exhaustive()
    }
}

impl RefreshLoop {
    /// Loop on a [`SystemClock`] when `realtime`, otherwise on a [`SimulatedClock`].
    pub fn new(opts: RefreshLoopOpts) -> VizResult<Self> {
        let clock: Box<dyn Clock> = if opts.realtime {
            Box::new(SystemClock::new())
        } else {
            Box::new(SimulatedClock::default())
        };
        Self::with_clock(opts, clock)
    }

    /// Loop on a caller-provided clock.
    pub fn with_clock(opts: RefreshLoopOpts, clock: Box<dyn Clock>) -> VizResult<Self> {
        if !opts.refresh_hz.is_finite() || opts.refresh_hz <= 0.0 {
            return Err(VizError::validation(format!(
                "refresh_hz must be finite and > 0, got {}",
                opts.refresh_hz
            )));
        }
        Ok(Self {
            period_ms: 1000.0 / opts.refresh_hz,
            clock,
        })
    }

    /// Milliseconds between refreshes.
    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Deliver refreshes until nothing is scheduled, pushing every drawn frame into `sink`.
    ///
    /// The controller should already be Playing; otherwise the sink sees `begin` and `end` only.
    #[tracing::instrument(skip_all, fields(period_ms = self.period_ms))]
    pub fn run(
        &mut self,
        controller: &mut PlaybackController<FrameQueue>,
        sink: &mut dyn FrameSink,
    ) -> VizResult<PlaybackStats> {
        let fps = controller.spec().map_or(0, |s| s.fps);
        sink.begin(SinkConfig {
            width: controller.surface().width(),
            height: controller.surface().height(),
            fps,
        })?;

        let mut next_refresh = self.clock.now_ms();
        loop {
            let due = controller.scheduler_mut().take_due();
            if due.is_empty() {
                break;
            }
            next_refresh += self.period_ms;
            self.clock.sleep_until(next_refresh);
            let now = self.clock.now_ms();
            for id in due {
                if controller.on_frame(id, now)?.drew() {
                    sink.push_frame(controller.elapsed(), &controller.frame())?;
                }
            }
        }

        sink.end()?;
        let stats = controller.stats();
        tracing::debug!(?stats, "refresh loop drained");
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;
