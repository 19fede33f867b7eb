use super::*;
use crate::encode::sink::InMemorySink;
use crate::playback::controller::{PlaybackState, ViewportOpts};
use crate::spec::model::VisualizationSpec;
use serde_json::json;

fn playing_controller(duration: u64, fps: u32) -> PlaybackController<FrameQueue> {
    let spec: VisualizationSpec = serde_json::from_value(json!({
        "id": "loop",
        "duration": duration,
        "fps": fps,
        "layers": [{
            "type": "circle",
            "props": {"x": 100, "y": 200, "r": 30, "fill": "#3498db"},
            "animations": [{"property": "x", "from": 100, "to": 250, "start": 0, "end": duration}]
        }]
    }))
    .unwrap();
    let opts = ViewportOpts {
        shadows: false,
        ..ViewportOpts::default()
    };
    let mut c = PlaybackController::with_queue(opts).unwrap();
    c.load_spec(spec).unwrap();
    c.set_playing(true);
    c
}

#[test]
fn simulated_clock_only_moves_forward() {
    let mut clock = SimulatedClock::starting_at(10.0);
    clock.sleep_until(25.0);
    assert_eq!(clock.now_ms(), 25.0);
    clock.sleep_until(5.0);
    assert_eq!(clock.now_ms(), 25.0);
}

#[test]
fn rejects_bad_refresh_rate() {
    for hz in [0.0, -60.0, f64::NAN] {
        let opts = RefreshLoopOpts {
            refresh_hz: hz,
            realtime: false,
        };
        assert!(RefreshLoop::new(opts).is_err());
    }
}

#[test]
fn runs_to_completion_and_pushes_every_draw() {
    let mut c = playing_controller(1000, 10);
    let mut sink = InMemorySink::new();
    let mut lp = RefreshLoop::new(RefreshLoopOpts::default()).unwrap();
    let stats = lp.run(&mut c, &mut sink).unwrap();

    assert_eq!(c.state(), PlaybackState::Finished);
    assert!(sink.ended());
    assert_eq!(sink.config().map(|cfg| (cfg.width, cfg.height, cfg.fps)), Some((500, 400, 10)));
    assert_eq!(sink.frames().len() as u64, stats.frames_drawn);
    assert!(stats.frames_drawn <= 11);
    assert!(stats.ticks_throttled > 0);

    let times: Vec<f64> = sink.frames().iter().map(|(t, _)| *t).collect();
    assert_eq!(times.first(), Some(&0.0));
    assert_eq!(times.last(), Some(&1000.0));
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn idle_controller_produces_no_frames() {
    let mut c = playing_controller(1000, 10);
    c.set_playing(false);
    let mut sink = InMemorySink::new();
    let mut lp = RefreshLoop::new(RefreshLoopOpts::default()).unwrap();
    let stats = lp.run(&mut c, &mut sink).unwrap();
    assert_eq!(stats.frames_drawn, 0);
    assert!(sink.frames().is_empty());
    assert!(sink.ended());
}

#[test]
fn realtime_loop_sleeps_between_refreshes() {
    let mut c = playing_controller(60, 60);
    let mut sink = InMemorySink::new();
    let opts = RefreshLoopOpts {
        refresh_hz: 120.0,
        realtime: true,
    };
    let started = std::time::Instant::now();
    RefreshLoop::new(opts).unwrap().run(&mut c, &mut sink).unwrap();
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(c.state(), PlaybackState::Finished);
}
