use std::path::Path;

use crate::shared::time_interval::TimeInterval;

/// Finds spans of an input file that sit below an amplitude threshold.
///
/// Implementations own the decode and signal-processing details; the
/// pipeline only sees ordered, non-overlapping intervals. Runs are emitted
/// raw: minimum-duration filtering is the planner's decision, not the
/// detector's.
pub trait SilenceDetector: Send {
    /// Detects silence in the file's audio track.
    ///
    /// Returns `None` when the file has no audio track at all; the caller
    /// then treats the entire recording as voiced.
    fn detect(
        &self,
        path: &Path,
        threshold_db: f64,
    ) -> Result<Option<Vec<TimeInterval>>, Box<dyn std::error::Error>>;

    /// Measures the mean loudness (dBFS) of `[start, start + duration]`.
    ///
    /// Used to calibrate a threshold against a known-quiet stretch of the
    /// recording.
    fn measure_volume(
        &self,
        path: &Path,
        start: f64,
        duration: f64,
    ) -> Result<Option<f64>, Box<dyn std::error::Error>>;
}
