/// Decoded mono audio: f32 PCM samples normalized to [-1.0, 1.0].
///
/// The analysis path always works on a single channel, so the segment
/// carries no channel count; readers downmix before constructing one.
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Samples covering `[start, start + duration]` seconds, clipped to the
    /// segment bounds. Empty when the range lies entirely past the end.
    pub fn slice_secs(&self, start: f64, duration: f64) -> &[f32] {
        let lo = ((start.max(0.0)) * self.sample_rate as f64) as usize;
        let hi = (((start + duration).max(0.0)) * self.sample_rate as f64) as usize;
        let lo = lo.min(self.samples.len());
        let hi = hi.min(self.samples.len());
        &self.samples[lo..hi]
    }
}
