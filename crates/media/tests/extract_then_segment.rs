//! Full pipeline over a synthetic clip: decode, block-matching flow, store,
//! read back, segment, export.

use std::sync::atomic::AtomicBool;

use camflow_common::error::CamflowResult;
use camflow_common::framerate::FrameRate;
use camflow_media::edl::{format_edl_file, EdlPurpose, EditDecisionExporter};
use camflow_media::extract::{run_extraction, ExtractionOutcome};
use camflow_media::source::FrameSource;
use camflow_metrics_store::MetricsStore;
use camflow_motion_model::frame::GrayFrame;
use camflow_motion_model::geometry::FrameGeometry;
use camflow_motion_model::interval::EditDecisionList;
use camflow_motion_model::sample::FlowSample;
use camflow_processing_core::flow::BlockMatchFlow;
use camflow_processing_core::pan_segment::{PanSegmentConfig, PanSegmenter};

const GEOMETRY: FrameGeometry = FrameGeometry {
    width: 60,
    height: 40,
};
const FRAMES: u64 = 30;
const PAN_STEP: i64 = 12;

fn texture(x: i64, y: i64) -> u8 {
    let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    (h & 0xFF) as u8
}

/// Still for frames 1..=5, content slides left `PAN_STEP` px per frame up to
/// frame 25, still again afterwards.
struct PanningClip {
    next: u64,
}

impl FrameSource for PanningClip {
    fn geometry(&self) -> FrameGeometry {
        GEOMETRY
    }

    fn next_frame(&mut self) -> CamflowResult<Option<GrayFrame>> {
        if self.next > FRAMES {
            return Ok(None);
        }
        let k = self.next as i64;
        self.next += 1;

        let offset = PAN_STEP * (k.min(25) - 5).max(0);
        let mut pixels = Vec::with_capacity(GEOMETRY.pixel_count());
        for y in 0..GEOMETRY.height as i64 {
            for x in 0..GEOMETRY.width as i64 {
                pixels.push(texture(x + offset, y));
            }
        }
        Ok(GrayFrame::new(GEOMETRY, pixels))
    }
}

fn pan_segmenter() -> PanSegmenter {
    PanSegmenter::new(PanSegmentConfig {
        zoom_band: None,
        ..Default::default()
    })
}

#[test]
fn extraction_feeds_pan_segmentation() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    let store = MetricsStore::for_video(&video);
    let mut engine = BlockMatchFlow::default();
    let stop = AtomicBool::new(false);
    let mut live: Vec<FlowSample> = Vec::new();

    let outcome = run_extraction(
        &store,
        || Ok(PanningClip { next: 1 }),
        &mut engine,
        &stop,
        &mut |s| live.push(*s),
    )
    .unwrap();
    assert!(matches!(outcome, ExtractionOutcome::Completed { samples: 29, .. }));

    // Stored values come back bit for bit.
    let stored = store.read_all().unwrap();
    assert_eq!(stored, live);

    for s in stored.iter().filter(|s| (6..=25).contains(&s.frame_index)) {
        assert_eq!(s.magnitude, PAN_STEP as f64, "frame {}", s.frame_index);
        assert_eq!(s.angle_degrees, 180.0, "frame {}", s.frame_index);
    }
    for s in stored.iter().filter(|s| s.frame_index < 6 || s.frame_index > 25) {
        assert_eq!(s.magnitude, 0.0, "frame {}", s.frame_index);
    }

    let fps = FrameRate::new(10, 1).unwrap();
    let intervals = pan_segmenter().segment(&stored, fps, &video.display().to_string());
    assert_eq!(intervals.len(), 1);
    assert!((intervals[0].start_secs() - 0.6).abs() < 1e-9);
    assert!((intervals[0].end_secs() - 2.5).abs() < 1e-9);

    let edl = EditDecisionList::from_intervals(&intervals);
    let path = EditDecisionExporter::default()
        .write_file(&video, EdlPurpose::Final, &edl)
        .unwrap();
    assert_eq!(path, dir.path().join("clip.mp4.final.edl"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), format_edl_file(&edl));
}

#[test]
fn rerun_skips_and_segmentation_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    let store = MetricsStore::for_video(&video);
    let stop = AtomicBool::new(false);

    run_extraction(
        &store,
        || Ok(PanningClip { next: 1 }),
        &mut BlockMatchFlow::default(),
        &stop,
        &mut |_| {},
    )
    .unwrap();
    let before = std::fs::read(store.path()).unwrap();

    let outcome = run_extraction(
        &store,
        || Ok(PanningClip { next: 1 }),
        &mut BlockMatchFlow::default(),
        &stop,
        &mut |_| {},
    )
    .unwrap();
    assert!(matches!(outcome, ExtractionOutcome::Skipped { .. }));
    assert_eq!(std::fs::read(store.path()).unwrap(), before);

    let fps = FrameRate::new(10, 1).unwrap();
    let first = pan_segmenter().segment(&store.read_all().unwrap(), fps, "clip.mp4");
    let second = pan_segmenter().segment(&store.read_all().unwrap(), fps, "clip.mp4");
    assert_eq!(first, second);
}
