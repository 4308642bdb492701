//! Grayscale frames and dense displacement fields.

use crate::geometry::FrameGeometry;

/// An 8-bit grayscale frame of the analysis region, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    geometry: FrameGeometry,
    pixels: Vec<u8>,
}

impl GrayFrame {
    /// Wrap a luma buffer. Returns `None` when the buffer length does not
    /// match `geometry`.
    pub fn new(geometry: FrameGeometry, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != geometry.pixel_count() {
            return None;
        }
        Some(Self { geometry, pixels })
    }

    /// A frame filled with a single luma value.
    pub fn filled(geometry: FrameGeometry, value: u8) -> Self {
        Self {
            geometry,
            pixels: vec![value; geometry.pixel_count()],
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Luma at `(x, y)`. Callers stay in bounds.
    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.geometry.width + x]
    }
}

/// One `(dx, dy)` displacement per pixel, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    geometry: FrameGeometry,
    vectors: Vec<[f32; 2]>,
}

impl DisplacementField {
    /// Wrap a vector buffer. Returns `None` when the buffer length does not
    /// match `geometry`.
    pub fn new(geometry: FrameGeometry, vectors: Vec<[f32; 2]>) -> Option<Self> {
        if vectors.len() != geometry.pixel_count() {
            return None;
        }
        Some(Self { geometry, vectors })
    }

    /// A field with no motion.
    pub fn zeros(geometry: FrameGeometry) -> Self {
        Self {
            geometry,
            vectors: vec![[0.0, 0.0]; geometry.pixel_count()],
        }
    }

    /// Build a field by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(geometry: FrameGeometry, mut f: impl FnMut(usize, usize) -> [f32; 2]) -> Self {
        let mut vectors = Vec::with_capacity(geometry.pixel_count());
        for y in 0..geometry.height {
            for x in 0..geometry.width {
                vectors.push(f(x, y));
            }
        }
        Self { geometry, vectors }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn vectors(&self) -> &[[f32; 2]] {
        &self.vectors
    }

    /// Displacement at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<[f32; 2]> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        self.vectors.get(y * self.geometry.width + x).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_frame_rejects_wrong_length() {
        let g = FrameGeometry::new(3, 2);
        assert!(GrayFrame::new(g, vec![0; 5]).is_none());
        let frame = GrayFrame::new(g, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(frame.luma(2, 1), 5);
    }

    #[test]
    fn test_field_from_fn_is_row_major() {
        let g = FrameGeometry::new(3, 2);
        let field = DisplacementField::from_fn(g, |x, y| [x as f32, y as f32]);
        assert_eq!(field.vectors()[4], [1.0, 1.0]);
        assert_eq!(field.get(2, 1), Some([2.0, 1.0]));
        assert_eq!(field.get(3, 0), None);
    }
}
