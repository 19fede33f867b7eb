use super::*;

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data: vec![128, 0, 0, 128, 0, 0, 255, 255],
        premultiplied: true,
    }
}

#[test]
fn in_memory_sink_captures_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 2,
        height: 1,
        fps: 30,
    })
    .unwrap();
    sink.push_frame(0.0, &frame()).unwrap();
    sink.push_frame(33.4, &frame()).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.config().map(|c| c.fps), Some(30));
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.frames()[1].0, 33.4);
    assert!(sink.ended());
}

#[test]
fn file_names_are_ordered_and_carry_elapsed() {
    assert_eq!(PngDirSink::file_name(0, 0.0), "frame_00000_0ms.png");
    assert_eq!(PngDirSink::file_name(12, 1999.6), "frame_00012_2000ms.png");
}

#[test]
fn png_sink_writes_straight_alpha() {
    let dir = std::env::temp_dir().join(format!("vizplay-sink-{}", std::process::id()));
    let mut sink = PngDirSink::new(&dir);
    sink.begin(SinkConfig {
        width: 2,
        height: 1,
        fps: 30,
    })
    .unwrap();
    sink.push_frame(40.0, &frame()).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written().len(), 1);
    let img = image::open(&sink.written()[0]).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
    let _ = std::fs::remove_dir_all(&dir);
}
