//! Rolling averages for the live extraction trace.

use std::collections::VecDeque;

use camflow_motion_model::sample::FlowSample;

/// Mean zoom, angle, and magnitude over the last `capacity` samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingMeans {
    pub zoom_factor: f64,
    pub angle_degrees: f64,
    pub magnitude: f64,
}

/// Fixed-size sliding window over recent samples.
pub struct RollingWindow {
    capacity: usize,
    samples: VecDeque<FlowSample>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Add a sample, evicting the oldest when full, and return the means
    /// over the current window.
    pub fn push(&mut self, sample: FlowSample) -> RollingMeans {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        let n = self.samples.len() as f64;
        let (zoom, angle, mag) = self.samples.iter().fold((0.0, 0.0, 0.0), |acc, s| {
            (acc.0 + s.zoom_factor, acc.1 + s.angle_degrees, acc.2 + s.magnitude)
        });
        RollingMeans {
            zoom_factor: zoom / n,
            angle_degrees: angle / n,
            magnitude: mag / n,
        }
    }
}
