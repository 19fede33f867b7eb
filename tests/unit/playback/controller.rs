use super::*;
use serde_json::json;

const BLUE: [u8; 4] = [0x34, 0x98, 0xdb, 0xff];
const BG: [u8; 4] = DEFAULT_BACKGROUND;

fn opts() -> ViewportOpts {
    ViewportOpts {
        shadows: false,
        ..ViewportOpts::default()
    }
}

fn moving_circle() -> VisualizationSpec {
    serde_json::from_value(json!({
        "id": "e2e",
        "duration": 4000,
        "fps": 30,
        "layers": [{
            "type": "circle",
            "props": {"x": 100, "y": 200, "r": 30, "fill": "#3498db"},
            "animations": [{"property": "x", "from": 100, "to": 250, "start": 0, "end": 2000}]
        }]
    }))
    .unwrap()
}

fn with_static_rect() -> VisualizationSpec {
    serde_json::from_value(json!({
        "id": "mixed",
        "duration": 1000,
        "fps": 10,
        "layers": [
            {"type": "rect", "props": {"x": 0, "y": 0, "w": 60, "h": 60, "fill": "#ff0000"}},
            {
                "type": "circle",
                "props": {"x": 300, "y": 300, "r": 20, "fill": "#3498db"},
                "animations": [{"property": "y", "from": 300, "to": 100, "start": 0, "end": 1000}]
            }
        ]
    }))
    .unwrap()
}

fn controller(spec: VisualizationSpec) -> PlaybackController {
    let mut c = PlaybackController::with_queue(opts()).unwrap();
    c.load_spec(spec).unwrap();
    c
}

fn tick(c: &mut PlaybackController, now: f64) -> TickOutcome {
    let due = c.scheduler_mut().take_due();
    assert_eq!(due.len(), 1, "exactly one pending request");
    c.on_frame(due[0], now).unwrap()
}

fn drawn_x(c: &PlaybackController) -> f64 {
    c.last_frame().unwrap().dynamic[0].props.number("x").unwrap()
}

#[test]
fn load_presents_idle_preview_at_zero() {
    let c = controller(moving_circle());
    assert_eq!(c.state(), PlaybackState::Idle);
    assert_eq!(c.elapsed(), 0.0);
    assert_eq!(c.last_frame().unwrap().elapsed_ms, 0.0);
    assert_eq!(drawn_x(&c), 100.0);
    assert_eq!(c.surface().pixel_at(100.0, 200.0), Some(BLUE));
    assert_eq!(c.surface().pixel_at(400.0, 50.0), Some(BG));
    assert!(c.scheduler().is_empty());
}

#[test]
fn circle_reaches_175_then_250() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    assert_eq!(c.state(), PlaybackState::Playing);

    assert_eq!(tick(&mut c, 5000.0), TickOutcome::Drawn);
    assert_eq!(c.elapsed(), 0.0);

    assert_eq!(tick(&mut c, 6000.0), TickOutcome::Drawn);
    assert_eq!(c.elapsed(), 1000.0);
    assert_eq!(drawn_x(&c), 175.0);
    assert_eq!(c.surface().pixel_at(175.0, 200.0), Some(BLUE));
    assert_eq!(c.surface().pixel_at(100.0, 200.0), Some(BG));

    assert_eq!(tick(&mut c, 9000.0), TickOutcome::Finished);
    assert_eq!(c.state(), PlaybackState::Finished);
    assert_eq!(c.elapsed(), 4000.0);
    assert_eq!(drawn_x(&c), 250.0);
    assert_eq!(c.surface().pixel_at(250.0, 200.0), Some(BLUE));
    assert!(c.scheduler().is_empty());
    assert_eq!(c.pending_request(), None);
}

#[test]
fn final_frame_is_exactly_duration_even_when_overshooting() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    assert_eq!(tick(&mut c, 123_456.0), TickOutcome::Finished);
    assert_eq!(c.last_frame().unwrap().elapsed_ms, 4000.0);
}

fn run_at_refresh(hz: f64) -> PlaybackStats {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    let period = 1000.0 / hz;
    let mut now = 100.0;
    let mut last_elapsed = -1.0;
    loop {
        let outcome = tick(&mut c, now);
        if outcome.drew() {
            assert!(c.elapsed() >= last_elapsed, "elapsed went backwards");
            last_elapsed = c.elapsed();
        }
        if outcome == TickOutcome::Finished {
            break;
        }
        now += period;
    }
    assert_eq!(last_elapsed, 4000.0);
    c.stats()
}

#[test]
fn draws_are_throttled_to_fps_regardless_of_refresh_rate() {
    let bound = (4000.0_f64 * 30.0 / 1000.0).ceil() as u64 + 1;
    for hz in [30.0, 60.0, 144.0, 240.0, 1000.0] {
        let stats = run_at_refresh(hz);
        assert!(
            stats.frames_drawn <= bound,
            "{hz} Hz drew {} frames (bound {bound})",
            stats.frames_drawn
        );
        assert_eq!(stats.ticks, stats.frames_drawn + stats.ticks_throttled);
    }
    let fast = run_at_refresh(1000.0);
    assert!(fast.ticks_throttled > 0);
    assert!(fast.frames_drawn >= 100);
}

#[test]
fn pause_cancels_and_keeps_last_frame() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 1000.0);
    let pending = c.pending_request().unwrap();
    let before = c.frame();

    c.set_playing(false);
    assert_eq!(c.state(), PlaybackState::Paused);
    assert!(c.scheduler().is_empty());
    assert_eq!(c.elapsed(), 1000.0);
    assert_eq!(c.frame(), before);

    assert_eq!(c.on_frame(pending, 1500.0).unwrap(), TickOutcome::Stale);
    assert_eq!(c.stats().stale_callbacks, 1);
    assert_eq!(c.frame(), before);
}

#[test]
fn play_after_pause_restarts_from_zero() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 1000.0);
    c.set_playing(false);

    c.set_playing(true);
    assert_eq!(c.elapsed(), 0.0);
    assert_eq!(tick(&mut c, 20_000.0), TickOutcome::Drawn);
    assert_eq!(c.elapsed(), 0.0);
    assert_eq!(drawn_x(&c), 100.0);
}

#[test]
fn play_after_finish_restarts_from_zero() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 5000.0);
    assert_eq!(c.state(), PlaybackState::Finished);

    c.set_playing(true);
    assert_eq!(c.state(), PlaybackState::Playing);
    tick(&mut c, 6000.0);
    assert_eq!(drawn_x(&c), 100.0);
}

#[test]
fn replacing_spec_mid_play_resets_and_ignores_old_callbacks() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 1000.0);
    let stale = c.pending_request().unwrap();

    c.load_spec(with_static_rect()).unwrap();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert_eq!(c.elapsed(), 0.0);
    assert!(c.scheduler().is_empty());
    assert_eq!(c.stats(), PlaybackStats::default());

    let serial = c.last_frame().unwrap().serial;
    assert_eq!(c.on_frame(stale, 1100.0).unwrap(), TickOutcome::Stale);
    assert_eq!(c.last_frame().unwrap().serial, serial);
    assert_eq!(c.stats().stale_callbacks, 1);

    let frame = c.last_frame().unwrap();
    assert_eq!(frame.dynamic.len(), 1);
    assert_eq!(frame.dynamic[0].props.number("y"), Some(300.0));
    assert_eq!(c.surface().pixel_at(175.0, 200.0), Some(BG));
}

#[test]
fn static_buffer_does_not_change_with_elapsed() {
    let mut c = controller(with_static_rect());
    let statics = c.static_buffer().unwrap().data().to_vec();
    assert_eq!(c.static_buffer().unwrap().pixel_at(300.0, 300.0), Some([0, 0, 0, 0]));

    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 500.0);
    assert_eq!(c.static_buffer().unwrap().data(), statics.as_slice());
    assert_eq!(c.surface().pixel_at(30.0, 30.0), Some([255, 0, 0, 255]));
    assert_eq!(c.surface().pixel_at(300.0, 200.0), Some(BLUE));
    tick(&mut c, 1000.0);
    assert_eq!(c.static_buffer().unwrap().data(), statics.as_slice());
    assert_eq!(c.surface().pixel_at(300.0, 100.0), Some(BLUE));
}

#[test]
fn backwards_clock_never_draws_earlier_elapsed() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    assert_eq!(tick(&mut c, 100.0), TickOutcome::Drawn);
    assert_eq!(tick(&mut c, 50.0), TickOutcome::Throttled);
    assert_eq!(c.elapsed(), 100.0);
    assert_eq!(tick(&mut c, 200.0), TickOutcome::Drawn);
    assert_eq!(c.elapsed(), 200.0);
}

#[test]
fn sync_follows_external_inputs() {
    let spec = moving_circle();
    let mut c = PlaybackController::with_queue(opts()).unwrap();

    c.sync(Some(&spec), false).unwrap();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.spec().is_some());

    c.sync(Some(&spec), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    tick(&mut c, 0.0);
    tick(&mut c, 4000.0);
    assert_eq!(c.state(), PlaybackState::Finished);

    c.sync(Some(&spec), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Finished);

    let mut other = spec.clone();
    other.id = "other".to_owned();
    c.sync(Some(&other), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.spec().map(|s| s.id.as_str()), Some("other"));

    c.sync(None, true).unwrap();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.spec().is_none());
    assert!(c.scheduler().is_empty());
    assert_eq!(c.surface().pixel_at(100.0, 200.0), Some(BG));
}

#[test]
fn redelivered_identical_spec_replays_from_start() {
    let spec = moving_circle();
    let mut c = PlaybackController::with_queue(opts()).unwrap();

    c.deliver(Some(&spec), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    tick(&mut c, 0.0);
    assert_eq!(tick(&mut c, 4500.0), TickOutcome::Finished);
    assert!(c.pending_request().is_none());
    assert_eq!(drawn_x(&c), 250.0);

    c.deliver(Some(&spec.clone()), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.elapsed(), 0.0);
    assert_eq!(c.stats(), PlaybackStats::default());
    assert!(c.pending_request().is_some());

    assert_eq!(tick(&mut c, 9000.0), TickOutcome::Drawn);
    assert_eq!(drawn_x(&c), 100.0);
    assert_eq!(tick(&mut c, 10_000.0), TickOutcome::Drawn);
    assert_eq!(drawn_x(&c), 175.0);

    // A later sync with the same inputs leaves the replay running.
    c.sync(Some(&spec), true).unwrap();
    assert_eq!(c.state(), PlaybackState::Playing);
    assert_eq!(c.elapsed(), 1000.0);
}

#[test]
fn delivering_paused_spec_shows_first_frame() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    tick(&mut c, 0.0);
    tick(&mut c, 1000.0);

    c.deliver(Some(&moving_circle()), false).unwrap();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.scheduler().is_empty());
    assert_eq!(drawn_x(&c), 100.0);
    assert_eq!(c.surface().pixel_at(100.0, 200.0), Some(BLUE));
}

#[test]
fn play_without_spec_does_nothing() {
    let mut c = PlaybackController::with_queue(opts()).unwrap();
    c.set_playing(true);
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.scheduler().is_empty());
}

#[test]
fn empty_spec_draws_only_background() {
    let spec: VisualizationSpec = serde_json::from_value(json!({"id": "empty", "layers": []})).unwrap();
    let mut c = controller(spec);
    assert!(c.surface().data().chunks_exact(4).all(|px| px == BG));
    c.set_playing(true);
    tick(&mut c, 0.0);
    assert!(c.surface().data().chunks_exact(4).all(|px| px == BG));
}

#[test]
fn dispose_cancels_everything() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    c.dispose();
    assert_eq!(c.state(), PlaybackState::Idle);
    assert!(c.scheduler().is_empty());
    assert!(c.spec().is_none());
    assert!(c.last_frame().is_none());
}

#[test]
fn preview_clamps_to_duration() {
    let mut c = controller(moving_circle());
    c.preview_at(99_999.0).unwrap();
    assert_eq!(c.last_frame().unwrap().elapsed_ms, 4000.0);
    assert_eq!(drawn_x(&c), 250.0);
    c.set_playing(true);
    assert!(c.preview_at(0.0).is_err());

    let mut empty = PlaybackController::with_queue(opts()).unwrap();
    assert!(empty.preview_at(0.0).is_err());
}

#[test]
fn non_finite_callback_time_is_rejected() {
    let mut c = controller(moving_circle());
    c.set_playing(true);
    let id = c.pending_request().unwrap();
    assert!(c.on_frame(id, f64::NAN).is_err());
    assert_eq!(c.pending_request(), Some(id));
}

#[test]
fn viewport_opts_defaults() {
    let o = ViewportOpts::default();
    assert_eq!(o.device_pixel_ratio, 1.0);
    assert_eq!(o.background, Some(DEFAULT_BACKGROUND));
    assert!(o.shadows);
    let vp = ViewportOpts {
        device_pixel_ratio: 2.0,
        ..o
    }
    .viewport();
    assert_eq!(vp.physical_size().unwrap(), (1000, 800));
}
