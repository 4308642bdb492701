//! Detected camera-motion spans and the edit decisions derived from them.

/// A time span of a source video, `end_secs > start_secs >= 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    start_secs: f64,
    end_secs: f64,
    source: String,
}

impl Interval {
    /// Create an interval. Returns `None` unless `0 <= start < end` and both
    /// bounds are finite.
    pub fn new(start_secs: f64, end_secs: f64, source: impl Into<String>) -> Option<Self> {
        if !start_secs.is_finite() || !end_secs.is_finite() {
            return None;
        }
        if start_secs < 0.0 || end_secs <= start_secs {
            return None;
        }
        Some(Self {
            start_secs,
            end_secs,
            source: source.into(),
        })
    }

    pub fn start_secs(&self) -> f64 {
        self.start_secs
    }

    pub fn end_secs(&self) -> f64 {
        self.end_secs
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// One `(source, offset, duration)` entry of an edit decision list.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDecision {
    pub source: String,
    pub offset_secs: f64,
    pub duration_secs: f64,
}

/// Ordered sub-clips to assemble into an output sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditDecisionList {
    pub entries: Vec<EditDecision>,
}

impl EditDecisionList {
    /// Derive one entry per interval, keeping interval order.
    pub fn from_intervals(intervals: &[Interval]) -> Self {
        let entries = intervals
            .iter()
            .map(|interval| EditDecision {
                source: interval.source.clone(),
                offset_secs: interval.start_secs,
                duration_secs: interval.duration_secs(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry durations.
    pub fn total_duration_secs(&self) -> f64 {
        self.entries.iter().map(|e| e.duration_secs).sum()
    }
}
