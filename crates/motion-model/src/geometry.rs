//! Analysis-region geometry and the per-run reference grid.

/// Dimensions of the analysis region: a fixed-size crop from the frame center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameGeometry {
    pub width: usize,
    pub height: usize,
}

impl FrameGeometry {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// The centered crop of `crop_width × crop_height` inside a
    /// `source_width × source_height` frame, clamped to the frame size.
    pub fn centered_crop(
        source_width: usize,
        source_height: usize,
        crop_width: usize,
        crop_height: usize,
    ) -> Self {
        Self {
            width: crop_width.min(source_width),
            height: crop_height.min(source_height),
        }
    }

    /// Number of pixels in the region.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Geometric center `(w/2, h/2)`.
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// `(width, height)` tuple, used in mismatch errors.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Euclidean distance of `(x, y)` from `center`.
///
/// Both the reference grid and displaced positions go through this function,
/// so a zero displacement reproduces the reference distance bit for bit.
#[inline]
pub fn radial_distance(x: f64, y: f64, center: (f64, f64)) -> f64 {
    let dx = x - center.0;
    let dy = y - center.1;
    (dx * dx + dy * dy).sqrt()
}

/// Precomputed distance from center for every pixel of a [`FrameGeometry`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceGrid {
    geometry: FrameGeometry,
    distances: Vec<f64>,
}

impl ReferenceGrid {
    /// Build the grid once for a run.
    pub fn new(geometry: FrameGeometry) -> Self {
        let center = geometry.center();
        let mut distances = Vec::with_capacity(geometry.pixel_count());
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                distances.push(radial_distance(x as f64, y as f64, center));
            }
        }
        Self {
            geometry,
            distances,
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Row-major distances, one per pixel.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Distance of pixel `(x, y)` from center.
    pub fn distance_at(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        self.distances.get(y * self.geometry.width + x).copied()
    }
}
