//! Per-frame motion metrics from a dense displacement field.
//!
//! # Algorithm
//!
//! 1. **Polar** conversion of every displacement vector to magnitude and
//!    angle (degrees, `[0, 360)`).
//! 2. **Median** aggregation of magnitude and angle over the whole field, so
//!    a moving foreground subject does not drag the camera estimate.
//! 3. **Zoom factor**: the fraction of pixels whose displaced position is at
//!    least as far from the region center as the pixel itself. Values near 1
//!    mean content expands outward (zoom-in); near 0 it converges (zoom-out).
//!
//! Every pixel is compared independently; no smoothing is applied.

use camflow_common::error::{CamflowError, CamflowResult};
use camflow_motion_model::frame::DisplacementField;
use camflow_motion_model::geometry::{radial_distance, FrameGeometry, ReferenceGrid};
use camflow_motion_model::sample::FlowSample;

/// Aggregate metrics of one displacement field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowMetrics {
    pub magnitude: f64,
    pub angle_degrees: f64,
    pub zoom_factor: f64,
}

/// Converts displacement fields of a fixed geometry into [`FlowSample`]s.
///
/// The reference grid is built once in [`MotionMetricExtractor::new`] and
/// reused for every frame of the run.
#[derive(Debug, Clone)]
pub struct MotionMetricExtractor {
    geometry: FrameGeometry,
    grid: ReferenceGrid,
}

impl MotionMetricExtractor {
    pub fn new(geometry: FrameGeometry) -> Self {
        Self {
            geometry,
            grid: ReferenceGrid::new(geometry),
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Metrics for the transition ending at `frame_index`.
    pub fn sample(&self, frame_index: u64, field: &DisplacementField) -> CamflowResult<FlowSample> {
        let m = compute(field, self.geometry, &self.grid)?;
        Ok(FlowSample::new(
            frame_index,
            m.magnitude,
            m.angle_degrees,
            m.zoom_factor,
        ))
    }
}

/// Compute aggregate metrics for `field`.
///
/// Fails with [`CamflowError::GeometryMismatch`] when the field or grid was
/// built for a different geometry.
pub fn compute(
    field: &DisplacementField,
    geometry: FrameGeometry,
    grid: &ReferenceGrid,
) -> CamflowResult<FlowMetrics> {
    if field.geometry() != geometry {
        return Err(CamflowError::geometry_mismatch(
            geometry.dims(),
            field.geometry().dims(),
        ));
    }
    if grid.geometry() != geometry {
        return Err(CamflowError::geometry_mismatch(
            geometry.dims(),
            grid.geometry().dims(),
        ));
    }

    let (mut mags, mut angs): (Vec<f64>, Vec<f64>) = field
        .vectors()
        .iter()
        .map(|v| to_polar(v[0] as f64, v[1] as f64))
        .unzip();

    Ok(FlowMetrics {
        magnitude: median(&mut mags),
        angle_degrees: median(&mut angs),
        zoom_factor: zoom_factor(field, grid),
    })
}

/// Magnitude and angle (degrees, `[0, 360)`) of a vector.
pub fn to_polar(dx: f64, dy: f64) -> (f64, f64) {
    let magnitude = (dx * dx + dy * dy).sqrt();
    let mut angle = dy.atan2(dx).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle >= 360.0 {
        angle = 0.0;
    }
    (magnitude, angle)
}

/// Median of `values`; the mean of the two middle values for even lengths.
/// Reorders `values`. Returns 0 for an empty slice.
pub fn median(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }

    let mid = n / 2;
    let (lower, upper, _) = values.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return upper;
    }

    let lower_max = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lower_max + upper) / 2.0
}

/// Fraction of pixels whose displaced distance from center is `>=` their
/// reference distance. Caller guarantees matching geometry.
fn zoom_factor(field: &DisplacementField, grid: &ReferenceGrid) -> f64 {
    let geometry = grid.geometry();
    let total = geometry.pixel_count();
    if total == 0 {
        return 0.0;
    }

    let center = geometry.center();
    let reference = grid.distances();
    let vectors = field.vectors();

    let mut receded = 0usize;
    for y in 0..geometry.height {
        for x in 0..geometry.width {
            let i = y * geometry.width + x;
            let [dx, dy] = vectors[i];
            let moved = radial_distance(x as f64 + dx as f64, y as f64 + dy as f64, center);
            if moved >= reference[i] {
                receded += 1;
            }
        }
    }

    receded as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_from_center(x: usize, y: usize, center: (f64, f64)) -> (f64, f64) {
        let vx = x as f64 - center.0;
        let vy = y as f64 - center.1;
        let len = (vx * vx + vy * vy).sqrt();
        if len == 0.0 {
            (1.0, 0.0)
        } else {
            (vx / len, vy / len)
        }
    }

    #[test]
    fn test_polar_quadrants() {
        assert_eq!(to_polar(1.0, 0.0), (1.0, 0.0));
        let (_, a) = to_polar(0.0, 2.0);
        assert!((a - 90.0).abs() < 1e-12);
        let (m, a) = to_polar(-20.0, 0.0);
        assert_eq!(m, 20.0);
        assert!((a - 180.0).abs() < 1e-12);
        let (_, a) = to_polar(0.0, -1.0);
        assert!((a - 270.0).abs() < 1e-12);
        assert_eq!(to_polar(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_polar_never_reaches_360() {
        let (_, a) = to_polar(1.0, -1e-300);
        assert!((0.0..360.0).contains(&a));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn test_median_ignores_outliers() {
        let mut values = vec![2.0; 9];
        values.push(500.0);
        values.push(400.0);
        assert_eq!(median(&mut values), 2.0);
    }

    #[test]
    fn test_zero_field_is_deterministic() {
        let geometry = FrameGeometry::new(31, 17);
        let extractor = MotionMetricExtractor::new(geometry);
        let field = DisplacementField::zeros(geometry);

        let a = extractor.sample(2, &field).unwrap();
        let b = extractor.sample(3, &field).unwrap();

        // Every displaced distance equals its reference distance, so ties
        // resolve to "receded" for the whole field.
        assert_eq!(a.zoom_factor, 1.0);
        assert_eq!(a.zoom_factor, b.zoom_factor);
        assert_eq!(a.magnitude, 0.0);
        assert_eq!(a.angle_degrees, 0.0);
        assert_eq!(b.frame_index, 3);
    }

    #[test]
    fn test_uniform_pan_field() {
        let geometry = FrameGeometry::new(20, 20);
        let extractor = MotionMetricExtractor::new(geometry);
        let field = DisplacementField::from_fn(geometry, |_, _| [-2.0, 0.0]);
        let sample = extractor.sample(2, &field).unwrap();
        assert_eq!(sample.magnitude, 2.0);
        assert!((sample.angle_degrees - 180.0).abs() < 1e-9);
        // Columns 0..=11 end up at least as far from x=10 as they started.
        assert!((sample.zoom_factor - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_foreground_outliers_do_not_move_median() {
        let geometry = FrameGeometry::new(10, 10);
        let field = DisplacementField::from_fn(geometry, |x, y| {
            if x < 3 && y < 3 {
                [0.0, 50.0]
            } else {
                [3.0, 0.0]
            }
        });
        let m = compute(&field, geometry, &ReferenceGrid::new(geometry)).unwrap();
        assert_eq!(m.magnitude, 3.0);
        assert_eq!(m.angle_degrees, 0.0);
    }

    #[test]
    fn test_geometry_mismatch() {
        let extractor = MotionMetricExtractor::new(FrameGeometry::new(10, 10));
        let field = DisplacementField::zeros(FrameGeometry::new(10, 9));
        match extractor.sample(2, &field) {
            Err(CamflowError::GeometryMismatch { expected, actual }) => {
                assert_eq!(expected, (10, 10));
                assert_eq!(actual, (10, 9));
            }
            other => panic!("expected GeometryMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_grid_mismatch() {
        let geometry = FrameGeometry::new(8, 8);
        let grid = ReferenceGrid::new(FrameGeometry::new(4, 4));
        let field = DisplacementField::zeros(geometry);
        assert!(compute(&field, geometry, &grid).is_err());
    }

    proptest! {
        #[test]
        fn prop_outward_field_is_full_zoom(
            w in 1usize..24,
            h in 1usize..24,
            step in 0.01f64..6.0,
        ) {
            let geometry = FrameGeometry::new(w, h);
            let center = geometry.center();
            let field = DisplacementField::from_fn(geometry, |x, y| {
                let (ux, uy) = unit_from_center(x, y, center);
                [(ux * step) as f32, (uy * step) as f32]
            });
            let m = compute(&field, geometry, &ReferenceGrid::new(geometry)).unwrap();
            prop_assert_eq!(m.zoom_factor, 1.0);
        }

        #[test]
        fn prop_inward_field_is_zero_zoom(
            half_w in 0usize..12,
            half_h in 0usize..12,
            fraction in 0.05f64..0.95,
        ) {
            // Odd dimensions keep every pixel strictly off-center.
            let geometry = FrameGeometry::new(2 * half_w + 1, 2 * half_h + 1);
            let center = geometry.center();
            let grid = ReferenceGrid::new(geometry);
            let field = DisplacementField::from_fn(geometry, |x, y| {
                let (ux, uy) = unit_from_center(x, y, center);
                let d = grid.distance_at(x, y).unwrap_or(0.0) * fraction;
                [(-ux * d) as f32, (-uy * d) as f32]
            });
            let m = compute(&field, geometry, &grid).unwrap();
            prop_assert_eq!(m.zoom_factor, 0.0);
        }

        #[test]
        fn prop_angle_in_range(dx in -100.0f64..100.0, dy in -100.0f64..100.0) {
            let (_, a) = to_polar(dx, dy);
            prop_assert!((0.0..360.0).contains(&a));
        }
    }
}
