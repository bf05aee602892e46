use std::path::Path;

use crate::analysis::domain::silence_detector::SilenceDetector;
use crate::analysis::domain::volume_profile::{rms_db, VolumeProfile};
use crate::media::domain::audio_reader::AudioReader;
use crate::shared::constants::{
    ANALYSIS_SAMPLE_RATE, RMS_HOP_SECS, RMS_WINDOW_SECS, SILENCE_MASK_KERNEL,
};
use crate::shared::time_interval::TimeInterval;

/// Silence detection over a real RMS loudness profile.
///
/// Decodes the audio track through the injected reader, measures
/// half-overlapping RMS windows, and thresholds the dB profile. The decode
/// is the expensive part; the profile math itself is pure and lives in
/// `volume_profile`.
pub struct RmsSilenceDetector {
    reader: Box<dyn AudioReader>,
    sample_rate: u32,
    window_secs: f64,
    hop_secs: f64,
    smooth_kernel: usize,
}

impl RmsSilenceDetector {
    pub fn new(reader: Box<dyn AudioReader>) -> Self {
        Self {
            reader,
            sample_rate: ANALYSIS_SAMPLE_RATE,
            window_secs: RMS_WINDOW_SECS,
            hop_secs: RMS_HOP_SECS,
            smooth_kernel: SILENCE_MASK_KERNEL,
        }
    }
}

impl SilenceDetector for RmsSilenceDetector {
    fn detect(
        &self,
        path: &Path,
        threshold_db: f64,
    ) -> Result<Option<Vec<TimeInterval>>, Box<dyn std::error::Error>> {
        let audio = match self.reader.read_mono(path, self.sample_rate)? {
            Some(a) => a,
            None => return Ok(None),
        };

        let profile = VolumeProfile::from_samples(
            audio.samples(),
            audio.sample_rate(),
            self.window_secs,
            self.hop_secs,
        );
        let runs = profile.silence_runs(threshold_db, self.smooth_kernel);

        log::info!(
            "Detected {} silence span(s) over {:.1}s of audio",
            runs.len(),
            profile.total_duration()
        );
        for (i, run) in runs.iter().enumerate() {
            log::debug!(
                "  silence {}: {:.2}s - {:.2}s ({:.2}s)",
                i + 1,
                run.start,
                run.end,
                run.duration_secs()
            );
        }

        Ok(Some(runs))
    }

    fn measure_volume(
        &self,
        path: &Path,
        start: f64,
        duration: f64,
    ) -> Result<Option<f64>, Box<dyn std::error::Error>> {
        let window = match self
            .reader
            .read_mono_window(path, self.sample_rate, start, duration)?
        {
            Some(w) => w,
            None => return Ok(None),
        };

        if window.samples().is_empty() {
            return Err(format!(
                "sample range {start:.2}s + {duration:.2}s is outside the audio track"
            )
            .into());
        }
        Ok(Some(rms_db(window.samples())))
    }
}
