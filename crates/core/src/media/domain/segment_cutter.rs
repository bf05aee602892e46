use std::path::Path;

use crate::shared::time_interval::TimeInterval;

/// Extracts the given spans from a source file and concatenates them, in
/// order, into the output file.
///
/// The planner guarantees `segments` is non-empty, sorted, and
/// non-overlapping; implementations may rely on that.
pub trait SegmentCutter: Send {
    fn cut(
        &self,
        input: &Path,
        output: &Path,
        segments: &[TimeInterval],
        media_duration: f64,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
