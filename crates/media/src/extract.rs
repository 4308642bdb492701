//! One extraction run: frames → flow → metrics → store.
//!
//! The first decoded frame has index 1 and only seeds the comparison; every
//! later frame `n` produces the sample for the transition `n-1 → n`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_metrics_store::MetricsStore;
use camflow_motion_model::sample::{FlowSample, SampleSink};
use camflow_processing_core::flow::FlowEngine;
use camflow_processing_core::metrics::MotionMetricExtractor;

use crate::source::FrameSource;

/// Frames between progress log lines.
const PROGRESS_EVERY: u64 = 100;

/// How an extraction run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// A committed metrics table already existed; nothing was decoded.
    Skipped { path: PathBuf },

    /// Every frame was processed and the table committed.
    Completed { path: PathBuf, samples: u64 },

    /// The stop flag was raised; the partial table stays uncommitted.
    Interrupted { part_path: PathBuf, samples: u64 },
}

/// Extract per-frame metrics for the store's input.
///
/// `open_source` is only called when no committed table exists, so a re-run
/// over an already processed input neither decodes nor computes flow.
/// `stop` is checked between frames. `on_sample` sees every sample after it
/// has been appended.
pub fn run_extraction<S, F>(
    store: &MetricsStore,
    open_source: F,
    engine: &mut dyn FlowEngine,
    stop: &AtomicBool,
    on_sample: &mut dyn FnMut(&FlowSample),
) -> CamflowResult<ExtractionOutcome>
where
    S: FrameSource,
    F: FnOnce() -> CamflowResult<S>,
{
    let input = store.input().display().to_string();

    if store.exists() {
        tracing::info!(
            input = %input,
            path = %store.path().display(),
            "Metrics already present; skipping"
        );
        return Ok(ExtractionOutcome::Skipped {
            path: store.path().to_path_buf(),
        });
    }

    let mut source = open_source()?;
    let geometry = source.geometry();
    let extractor = MotionMetricExtractor::new(geometry);

    let mut prev = source
        .next_frame()?
        .ok_or_else(|| CamflowError::input_unavailable(&input, "stream has no decodable frames"))?;

    let mut writer = store.create_writer()?;
    let started = Instant::now();
    let mut frame_index: u64 = 1;

    tracing::info!(
        input = %input,
        engine = engine.name(),
        width = geometry.width,
        height = geometry.height,
        "Extraction started"
    );

    loop {
        if stop.load(Ordering::SeqCst) {
            let samples = writer.samples_written();
            let part_path = writer.abandon()?;
            tracing::warn!(input = %input, frame = frame_index, "Extraction interrupted");
            return Ok(ExtractionOutcome::Interrupted { part_path, samples });
        }

        let Some(next) = source.next_frame()? else {
            break;
        };
        frame_index += 1;

        let field = engine.compute(&prev, &next)?;
        let sample = extractor.sample(frame_index, &field)?;
        writer.append(&sample)?;
        on_sample(&sample);
        prev = next;

        if frame_index % PROGRESS_EVERY == 0 {
            let elapsed = started.elapsed().as_secs_f64();
            tracing::info!(
                input = %input,
                frame = frame_index,
                fps = frame_index as f64 / elapsed.max(1e-9),
                "Extraction progress"
            );
        }
    }

    let samples = writer.samples_written();
    let path = writer.commit()?;
    tracing::info!(
        input = %input,
        samples,
        elapsed_secs = started.elapsed().as_secs_f64(),
        path = %path.display(),
        "Extraction complete"
    );

    Ok(ExtractionOutcome::Completed { path, samples })
}
