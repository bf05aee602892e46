/// Timing parameters that shape how aggressively silence is removed.
///
/// `threshold_db` belongs to the detection step but travels with the rest of
/// the parameters so a preset fully describes one pacing profile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Amplitude threshold below which audio counts as silent (dBFS).
    /// More negative means quieter audio is required to register as silence.
    pub threshold_db: f64,
    /// Seconds of silence retained immediately before a voiced segment.
    pub leading_pad: f64,
    /// Seconds of silence retained immediately after a voiced segment.
    pub trailing_pad: f64,
    /// Silences shorter than this are absorbed into surrounding speech
    /// instead of becoming cut points.
    pub min_silence_duration: f64,
}

impl PlannerConfig {
    /// Relaxed pacing: generous pauses survive, only long silences go.
    pub fn slow() -> Self {
        Self {
            threshold_db: -40.0,
            leading_pad: 0.5,
            trailing_pad: 0.8,
            min_silence_duration: 1.0,
        }
    }

    /// Balanced pacing, the default profile.
    pub fn medium() -> Self {
        Self {
            threshold_db: -35.0,
            leading_pad: 0.3,
            trailing_pad: 0.5,
            min_silence_duration: 0.8,
        }
    }

    /// Tight pacing: short pauses are cut, output feels dense.
    pub fn fast() -> Self {
        Self {
            threshold_db: -30.0,
            leading_pad: 0.1,
            trailing_pad: 0.2,
            min_silence_duration: 0.5,
        }
    }

    /// Looks a preset up by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "slow" => Some(Self::slow()),
            "medium" => Some(Self::medium()),
            "fast" => Some(Self::fast()),
            _ => None,
        }
    }

    /// Returns a description of the first invalid field, if any.
    ///
    /// The planner turns this into `PlanError::InvalidConfiguration` before
    /// doing any work.
    pub fn validation_error(&self) -> Option<String> {
        if !self.threshold_db.is_finite() {
            return Some(format!("threshold must be finite, got {}", self.threshold_db));
        }
        for (name, value) in [
            ("leading pad", self.leading_pad),
            ("trailing pad", self.trailing_pad),
            ("minimum silence duration", self.min_silence_duration),
        ] {
            if !value.is_finite() {
                return Some(format!("{name} must be finite, got {value}"));
            }
            if value < 0.0 {
                return Some(format!("{name} must be non-negative, got {value}"));
            }
        }
        None
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::medium()
    }
}
