use camflow_common::framerate::FrameRate;
use camflow_motion_model::frame::DisplacementField;
use camflow_motion_model::geometry::FrameGeometry;
use camflow_motion_model::sample::FlowSample;
use camflow_processing_core::metrics::MotionMetricExtractor;
use camflow_processing_core::pan_segment::PanSegmenter;
use camflow_processing_core::zoom_segment::ZoomSegmenter;

const GEOMETRY: FrameGeometry = FrameGeometry {
    width: 120,
    height: 40,
};

fn zoom_in_field(step: f64) -> DisplacementField {
    let (cx, cy) = GEOMETRY.center();
    DisplacementField::from_fn(GEOMETRY, |x, y| {
        let vx = x as f64 - cx;
        let vy = y as f64 - cy;
        let len = (vx * vx + vy * vy).sqrt();
        if len == 0.0 {
            [step as f32, 0.0]
        } else {
            [(vx / len * step) as f32, (vy / len * step) as f32]
        }
    })
}

fn pan_left_field(step: f32) -> DisplacementField {
    DisplacementField::from_fn(GEOMETRY, |_, _| [-step, 0.0])
}

/// Frames 30..=45 zoom in, frames 60..=80 pan left, everything else is still.
fn synthetic_series() -> Vec<FlowSample> {
    let extractor = MotionMetricExtractor::new(GEOMETRY);
    let still = DisplacementField::zeros(GEOMETRY);
    let zoom = zoom_in_field(8.0);
    let pan = pan_left_field(20.0);

    (2..=100u64)
        .map(|frame| {
            let field = match frame {
                30..=45 => &zoom,
                60..=80 => &pan,
                _ => &still,
            };
            extractor
                .sample(frame, field)
                .expect("synthetic fields match the geometry")
        })
        .collect()
}

#[test]
fn zoom_segment_covers_the_zoom_frames_only() {
    let samples = synthetic_series();
    let fps = FrameRate::new(30, 1).unwrap();

    let intervals = ZoomSegmenter::with_defaults().segment(&samples, fps, "synthetic.mp4");

    assert_eq!(intervals.len(), 1);
    assert!((intervals[0].start_secs() - 0.9).abs() < 1e-9);
    assert!((intervals[0].end_secs() - 1.5).abs() < 1e-9);
}

#[test]
fn pan_segment_covers_the_pan_frames_only() {
    let samples = synthetic_series();
    let fps = FrameRate::new(30, 1).unwrap();

    let pan_samples: Vec<&FlowSample> = samples
        .iter()
        .filter(|s| (60..=80).contains(&s.frame_index))
        .collect();
    assert!(pan_samples
        .iter()
        .all(|s| s.zoom_factor > 0.4 && s.zoom_factor < 0.7));

    let intervals = PanSegmenter::with_defaults().segment(&samples, fps, "synthetic.mp4");

    assert_eq!(intervals.len(), 1);
    assert!((intervals[0].start_secs() - 2.0).abs() < 1e-9);
    assert!((intervals[0].end_secs() - 80.0 / 30.0).abs() < 1e-9);
}

#[test]
fn segmenters_are_independent_and_repeatable() {
    let samples = synthetic_series();
    let fps = FrameRate::new(30, 1).unwrap();
    let zoom = ZoomSegmenter::with_defaults();
    let pan = PanSegmenter::with_defaults();

    let (a, b) = std::thread::scope(|scope| {
        let z = scope.spawn(|| zoom.segment(&samples, fps, "synthetic.mp4"));
        let p = scope.spawn(|| pan.segment(&samples, fps, "synthetic.mp4"));
        (z.join().unwrap(), p.join().unwrap())
    });

    assert_eq!(a, zoom.segment(&samples, fps, "synthetic.mp4"));
    assert_eq!(b, pan.segment(&samples, fps, "synthetic.mp4"));
}
