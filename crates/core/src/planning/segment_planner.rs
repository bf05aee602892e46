use thiserror::Error;

use crate::planning::planner_config::PlannerConfig;
use crate::shared::time_interval::TimeInterval;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Turns detected silence into the ordered list of spans worth keeping.
///
/// Pure interval algebra: filter short silences, take the voiced complement,
/// pad, merge. Same inputs always yield the same output; all failures are
/// raised before any computation happens.
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Computes the keep intervals for a recording of `media_duration` seconds.
    ///
    /// `silences` must be sorted ascending by start, pairwise non-overlapping,
    /// and contained in `[0, media_duration]`. The detector upholds this; a
    /// violation here means a caller bug, so it is rejected rather than
    /// silently re-sorted.
    ///
    /// An empty result means the whole recording sat below the threshold and
    /// there is nothing to keep. That is a valid outcome, not an error.
    pub fn plan(
        media_duration: f64,
        silences: &[TimeInterval],
        config: &PlannerConfig,
    ) -> Result<Vec<TimeInterval>, PlanError> {
        if let Some(problem) = config.validation_error() {
            return Err(PlanError::InvalidConfiguration(problem));
        }
        validate_input(media_duration, silences)?;

        let cuts: Vec<&TimeInterval> = silences
            .iter()
            .filter(|s| s.duration_secs() >= config.min_silence_duration)
            .collect();

        let voiced = voiced_complement(media_duration, &cuts);

        let padded: Vec<TimeInterval> = voiced
            .iter()
            .map(|v| {
                TimeInterval::new(v.start - config.leading_pad, v.end + config.trailing_pad)
                    .clamped(0.0, media_duration)
            })
            .collect();

        Ok(merge_touching(&padded))
    }
}

fn validate_input(media_duration: f64, silences: &[TimeInterval]) -> Result<(), PlanError> {
    if !media_duration.is_finite() || media_duration <= 0.0 {
        return Err(PlanError::InvalidInput(format!(
            "media duration must be positive, got {media_duration}"
        )));
    }

    let mut previous_end = 0.0_f64;
    for (i, s) in silences.iter().enumerate() {
        if !s.is_well_formed() {
            return Err(PlanError::InvalidInput(format!(
                "silence #{i} is malformed: [{}, {}]",
                s.start, s.end
            )));
        }
        if s.start < 0.0 || s.end > media_duration {
            return Err(PlanError::InvalidInput(format!(
                "silence #{i} [{}, {}] lies outside [0, {media_duration}]",
                s.start, s.end
            )));
        }
        if i > 0 && s.start < previous_end {
            return Err(PlanError::InvalidInput(format!(
                "silence #{i} starts at {} before the previous one ends at {previous_end}",
                s.start
            )));
        }
        previous_end = s.end;
    }
    Ok(())
}

/// Regions of `[0, media_duration]` not covered by any retained silence.
fn voiced_complement(media_duration: f64, cuts: &[&TimeInterval]) -> Vec<TimeInterval> {
    let mut voiced = Vec::with_capacity(cuts.len() + 1);
    let mut cursor = 0.0_f64;

    for cut in cuts {
        if cursor < cut.start {
            voiced.push(TimeInterval::new(cursor, cut.start));
        }
        cursor = cut.end;
    }
    if cursor < media_duration {
        voiced.push(TimeInterval::new(cursor, media_duration));
    }
    voiced
}

/// Collapses overlapping or touching intervals into maximal spans.
///
/// Input must be sorted by start, which padding preserves. Merging is
/// transitive: a chain of pairwise-touching intervals becomes one span.
pub fn merge_touching(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for iv in intervals {
        match merged.last_mut() {
            Some(last) if last.overlaps_or_touches(iv) => *last = last.union_span(iv),
            _ => merged.push(*iv),
        }
    }
    merged
}
