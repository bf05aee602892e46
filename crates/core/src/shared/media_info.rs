use std::path::PathBuf;

/// Container-level facts about an input file, as reported by the prober.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub has_audio: bool,
    /// Sample rate of the best audio stream, if one exists.
    pub audio_sample_rate: Option<u32>,
    pub source_path: Option<PathBuf>,
}
