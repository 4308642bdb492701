//! Dense flow engines.
//!
//! The metrics stage only needs a per-pixel displacement field between two
//! consecutive frames; how it is estimated is up to the engine behind
//! [`FlowEngine`]. [`BlockMatchFlow`] is the built-in CPU engine.

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::frame::{DisplacementField, GrayFrame};
use camflow_motion_model::geometry::FrameGeometry;

/// Computes a dense displacement field between two consecutive frames.
///
/// The field maps each pixel of `prev` to its position in `next`:
/// `prev(x, y) ≈ next(x + dx, y + dy)`.
pub trait FlowEngine {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Estimate the displacement field from `prev` to `next`.
    fn compute(&mut self, prev: &GrayFrame, next: &GrayFrame) -> CamflowResult<DisplacementField>;
}

/// Configuration for [`BlockMatchFlow`].
#[derive(Debug, Clone)]
pub struct BlockMatchConfig {
    /// Block edge length in pixels.
    pub block_size: usize,

    /// Maximum displacement searched along each axis (pixels).
    pub search_range: usize,

    /// Cost added per pixel of displacement (L1), in mean-absolute-difference
    /// units. Keeps flat or identical regions at zero motion.
    pub motion_penalty: f64,
}

impl Default for BlockMatchConfig {
    fn default() -> Self {
        Self {
            block_size: 10,
            search_range: 12,
            motion_penalty: 0.05,
        }
    }
}

/// Exhaustive block matching on mean absolute difference.
///
/// The frame is tiled into blocks; each block's best offset within the
/// search window is assigned to every pixel of the block.
#[derive(Debug, Clone, Default)]
pub struct BlockMatchFlow {
    config: BlockMatchConfig,
}

impl BlockMatchFlow {
    pub fn new(config: BlockMatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BlockMatchConfig {
        &self.config
    }

    /// Best `(dx, dy)` for the block at `(bx, by)` of size `bw × bh`.
    fn match_block(
        &self,
        prev: &GrayFrame,
        next: &GrayFrame,
        (bx, by): (usize, usize),
        (bw, bh): (usize, usize),
    ) -> (i32, i32) {
        let geometry = prev.geometry();
        let range = self.config.search_range as i64;
        let pixels = (bw * bh) as f64;

        let mut best_cost = f64::MAX;
        let mut best = (0i32, 0i32);

        for dy in -range..=range {
            let top = by as i64 + dy;
            if top < 0 || top + bh as i64 > geometry.height as i64 {
                continue;
            }
            for dx in -range..=range {
                let left = bx as i64 + dx;
                if left < 0 || left + bw as i64 > geometry.width as i64 {
                    continue;
                }

                let mut sad = 0u64;
                for row in 0..bh {
                    for col in 0..bw {
                        let a = prev.luma(bx + col, by + row) as i32;
                        let b = next.luma(left as usize + col, top as usize + row) as i32;
                        sad += (a - b).unsigned_abs() as u64;
                    }
                }

                let cost =
                    sad as f64 / pixels + self.config.motion_penalty * (dx.abs() + dy.abs()) as f64;
                if cost < best_cost {
                    best_cost = cost;
                    best = (dx as i32, dy as i32);
                }
            }
        }

        best
    }
}

impl FlowEngine for BlockMatchFlow {
    fn name(&self) -> &str {
        "block-match"
    }

    fn compute(&mut self, prev: &GrayFrame, next: &GrayFrame) -> CamflowResult<DisplacementField> {
        let geometry = prev.geometry();
        if next.geometry() != geometry {
            return Err(CamflowError::geometry_mismatch(
                geometry.dims(),
                next.geometry().dims(),
            ));
        }
        if self.config.block_size == 0 {
            return Err(CamflowError::flow("block size must be positive"));
        }

        let block = self.config.block_size;
        let mut vectors = vec![[0.0f32, 0.0f32]; geometry.pixel_count()];

        for by in (0..geometry.height).step_by(block) {
            let bh = block.min(geometry.height - by);
            for bx in (0..geometry.width).step_by(block) {
                let bw = block.min(geometry.width - bx);
                let (dx, dy) = self.match_block(prev, next, (bx, by), (bw, bh));
                fill_block(&mut vectors, geometry, (bx, by), (bw, bh), [dx as f32, dy as f32]);
            }
        }

        DisplacementField::new(geometry, vectors)
            .ok_or_else(|| CamflowError::flow("displacement buffer size mismatch"))
    }
}

fn fill_block(
    vectors: &mut [[f32; 2]],
    geometry: FrameGeometry,
    (bx, by): (usize, usize),
    (bw, bh): (usize, usize),
    value: [f32; 2],
) {
    for row in by..by + bh {
        let start = row * geometry.width + bx;
        vectors[start..start + bw].fill(value);
    }
}
