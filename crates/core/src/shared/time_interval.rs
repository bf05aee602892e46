/// A closed time span `[start, end]` in seconds, relative to t=0 of the media.
///
/// Used both for detected silence and for planned keep segments. Instances
/// are value objects: once built they are never mutated, only replaced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
}

impl TimeInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration_secs(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `start <= end` and both endpoints are finite.
    pub fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start <= self.end
    }

    /// True when the two intervals overlap or share an endpoint.
    ///
    /// Touching counts: `[0,2]` and `[2,5]` form one continuous span and
    /// must be merged rather than emitted as a zero-length cut.
    pub fn overlaps_or_touches(&self, other: &TimeInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest interval covering both `self` and `other`.
    pub fn union_span(&self, other: &TimeInterval) -> TimeInterval {
        TimeInterval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Clamps both endpoints into `[lo, hi]`.
    pub fn clamped(&self, lo: f64, hi: f64) -> TimeInterval {
        TimeInterval {
            start: self.start.max(lo).min(hi),
            end: self.end.max(lo).min(hi),
        }
    }
}
