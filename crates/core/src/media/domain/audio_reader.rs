use std::path::Path;

use crate::media::domain::audio_segment::AudioSegment;

/// Decodes the audio track of a media file into mono PCM.
///
/// Implementations handle codec and container details; the analysis layer
/// only ever sees an `AudioSegment` at its requested sample rate.
pub trait AudioReader: Send {
    /// Decodes and downmixes the best audio stream.
    ///
    /// Returns `None` when the file carries no audio track.
    fn read_mono(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>>;

    /// Decodes only `[start, start + duration]` seconds of the best audio
    /// stream.
    ///
    /// The default decodes the full track and slices; implementations that
    /// can seek should override it to skip the rest of the file.
    fn read_mono_window(
        &self,
        path: &Path,
        target_sample_rate: u32,
        start: f64,
        duration: f64,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        match self.read_mono(path, target_sample_rate)? {
            Some(segment) => Ok(Some(AudioSegment::new(
                segment.slice_secs(start, duration).to_vec(),
                target_sample_rate,
            ))),
            None => Ok(None),
        }
    }
}
