use crate::shared::constants::RMS_DB_FLOOR;
use crate::shared::time_interval::TimeInterval;

/// Loudness of decoded mono samples measured over half-overlapping windows.
///
/// Window `i` covers `[i * hop, i * hop + window)` seconds and carries the
/// RMS level of those samples in dBFS. This is the real signal measurement
/// the silence threshold is compared against.
#[derive(Clone, Debug)]
pub struct VolumeProfile {
    window_db: Vec<f64>,
    hop_secs: f64,
    total_duration: f64,
}

impl VolumeProfile {
    pub fn from_samples(
        samples: &[f32],
        sample_rate: u32,
        window_secs: f64,
        hop_secs: f64,
    ) -> Self {
        let window = (sample_rate as f64 * window_secs) as usize;
        let hop = ((sample_rate as f64 * hop_secs) as usize).max(1);
        let total_duration = samples.len() as f64 / sample_rate as f64;

        let mut window_db = Vec::new();
        if window > 0 {
            let mut i = 0;
            while i + window <= samples.len() {
                window_db.push(rms_db(&samples[i..i + window]));
                i += hop;
            }
        }

        Self {
            window_db,
            hop_secs,
            total_duration,
        }
    }

    pub fn window_db(&self) -> &[f64] {
        &self.window_db
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Start time of window `idx` in seconds.
    pub fn time_at_window(&self, idx: usize) -> f64 {
        idx as f64 * self.hop_secs
    }

    /// Maximal runs of windows below `threshold_db`, as time intervals.
    ///
    /// The below-threshold mask is smoothed with a majority filter of the
    /// given width first, so a single noisy window neither breaks a silence
    /// in two nor registers as one on its own. A run still open at the last
    /// window extends to the end of the audio.
    pub fn silence_runs(&self, threshold_db: f64, smooth_kernel: usize) -> Vec<TimeInterval> {
        let raw: Vec<bool> = self.window_db.iter().map(|db| *db < threshold_db).collect();
        let mask = majority_smooth(&raw, smooth_kernel);

        let mut runs = Vec::new();
        let mut run_start: Option<f64> = None;

        for (i, silent) in mask.iter().enumerate() {
            match (silent, run_start) {
                (true, None) => run_start = Some(self.time_at_window(i)),
                (false, Some(start)) => {
                    runs.push(TimeInterval::new(start, self.time_at_window(i)));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(TimeInterval::new(start, self.total_duration));
        }
        runs
    }
}

/// RMS level of a sample slice in dBFS, floored to avoid log(0).
pub fn rms_db(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 20.0 * RMS_DB_FLOOR.log10();
    }
    let mean_square: f64 = samples
        .iter()
        .map(|s| (*s as f64) * (*s as f64))
        .sum::<f64>()
        / samples.len() as f64;
    20.0 * mean_square.sqrt().max(RMS_DB_FLOOR).log10()
}

/// Majority vote over a sliding window, clipped at the mask edges.
///
/// `kernel <= 1` leaves the mask untouched. A constant mask stays constant,
/// so an all-silent recording still yields one full-length run.
fn majority_smooth(mask: &[bool], kernel: usize) -> Vec<bool> {
    if kernel <= 1 || mask.is_empty() {
        return mask.to_vec();
    }
    let half = kernel / 2;
    (0..mask.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(mask.len());
            let votes = mask[lo..hi].iter().filter(|v| **v).count();
            votes * 2 > hi - lo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RATE: u32 = 1000;

    fn profile(samples: &[f32]) -> VolumeProfile {
        // 100ms windows, 50ms hop at 1 kHz: window = 100 samples, hop = 50.
        VolumeProfile::from_samples(samples, RATE, 0.1, 0.05)
    }

    fn tone(secs: f64, amplitude: f32) -> Vec<f32> {
        vec![amplitude; (secs * RATE as f64) as usize]
    }

    // ── rms_db ───────────────────────────────────────────────────────

    #[test]
    fn test_rms_db_of_full_scale_is_zero() {
        assert_relative_eq!(rms_db(&[1.0, -1.0, 1.0, -1.0]), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rms_db_of_half_scale() {
        // 20 * log10(0.5) ≈ -6.02 dB
        assert_relative_eq!(rms_db(&[0.5, -0.5]), -6.0206, epsilon = 1e-3);
    }

    #[test]
    fn test_rms_db_of_digital_silence_is_floored() {
        assert_relative_eq!(rms_db(&[0.0; 100]), -200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rms_db_of_empty_slice_is_floored() {
        assert_relative_eq!(rms_db(&[]), -200.0, epsilon = 1e-9);
    }

    // ── Profile shape ────────────────────────────────────────────────

    #[test]
    fn test_window_count_and_timestamps() {
        let p = profile(&tone(1.0, 0.5));
        // 1000 samples, window 100, hop 50: windows start at 0..=900.
        assert_eq!(p.window_db().len(), 19);
        assert_relative_eq!(p.time_at_window(0), 0.0);
        assert_relative_eq!(p.time_at_window(2), 0.1);
        assert_relative_eq!(p.total_duration(), 1.0);
    }

    #[test]
    fn test_too_few_samples_for_one_window() {
        let p = profile(&tone(0.05, 0.5));
        assert!(p.window_db().is_empty());
    }

    #[test]
    fn test_loud_tone_measures_above_threshold() {
        let p = profile(&tone(1.0, 0.5));
        assert!(p.window_db().iter().all(|db| *db > -35.0));
    }

    // ── Silence runs ─────────────────────────────────────────────────

    #[test]
    fn test_all_voiced_yields_no_runs() {
        let p = profile(&tone(2.0, 0.5));
        assert!(p.silence_runs(-35.0, 5).is_empty());
    }

    #[test]
    fn test_all_silent_yields_single_full_run() {
        let p = profile(&tone(2.0, 0.0));
        let runs = p.silence_runs(-35.0, 5);
        assert_eq!(runs.len(), 1);
        assert_relative_eq!(runs[0].start, 0.0);
        assert_relative_eq!(runs[0].end, 2.0);
    }

    #[test]
    fn test_silence_gap_between_speech() {
        let mut samples = tone(1.0, 0.5);
        samples.extend(tone(1.0, 0.0));
        samples.extend(tone(1.0, 0.5));
        let runs = profile(&samples).silence_runs(-35.0, 5);

        assert_eq!(runs.len(), 1);
        // Window granularity is 50ms; the run must bracket the true gap.
        assert!((runs[0].start - 1.0).abs() < 0.15);
        assert!((runs[0].end - 2.0).abs() < 0.15);
    }

    #[test]
    fn test_trailing_silence_extends_to_total_duration() {
        let mut samples = tone(1.0, 0.5);
        samples.extend(tone(1.0, 0.0));
        let runs = profile(&samples).silence_runs(-35.0, 5);

        assert_eq!(runs.len(), 1);
        assert_relative_eq!(runs[0].end, 2.0);
    }

    #[test]
    fn test_runs_are_sorted_and_disjoint() {
        let mut samples = Vec::new();
        for _ in 0..3 {
            samples.extend(tone(0.8, 0.5));
            samples.extend(tone(0.8, 0.0));
        }
        let runs = profile(&samples).silence_runs(-35.0, 5);
        assert!(!runs.is_empty());
        for pair in runs.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn test_single_noisy_blip_does_not_break_silence() {
        // 2s of silence with one loud 50ms blip in the middle: the
        // majority filter should swallow the blip and keep one run.
        let mut samples = tone(1.0, 0.0);
        samples.extend(tone(0.05, 0.9));
        samples.extend(tone(1.0, 0.0));
        let runs = profile(&samples).silence_runs(-35.0, 5);
        assert_eq!(runs.len(), 1);
    }

    // ── majority_smooth ──────────────────────────────────────────────

    #[test]
    fn test_smooth_kernel_one_is_identity() {
        let mask = vec![true, false, true, false];
        assert_eq!(majority_smooth(&mask, 1), mask);
    }

    #[test]
    fn test_smooth_removes_isolated_true() {
        let mask = vec![false, false, true, false, false];
        assert_eq!(majority_smooth(&mask, 5), vec![false; 5]);
    }

    #[test]
    fn test_smooth_fills_isolated_false() {
        let mask = vec![true, true, false, true, true];
        assert_eq!(majority_smooth(&mask, 5), vec![true; 5]);
    }

    #[test]
    fn test_smooth_preserves_constant_mask() {
        assert_eq!(majority_smooth(&[true; 8], 5), vec![true; 8]);
        assert_eq!(majority_smooth(&[false; 8], 5), vec![false; 8]);
    }

    #[test]
    fn test_smooth_empty_mask() {
        assert!(majority_smooth(&[], 5).is_empty());
    }
}
