/// Sample rate the analysis pipeline decodes to. Speech energy lives well
/// below 11 kHz, so 22.05 kHz mono keeps decode cheap without hurting RMS.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// RMS sliding window length (100 ms).
pub const RMS_WINDOW_SECS: f64 = 0.1;

/// RMS window hop (50 ms, half-overlapping windows).
pub const RMS_HOP_SECS: f64 = 0.05;

/// Majority-filter width applied to the silence mask before run extraction.
pub const SILENCE_MASK_KERNEL: usize = 5;

/// Floor applied before converting RMS to dB, avoiding log(0).
pub const RMS_DB_FLOOR: f64 = 1e-10;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "m4v"];

/// H.264 CRF used when segments have to be re-encoded.
pub const CUT_CRF: u32 = 23;

/// x264 preset used when segments have to be re-encoded.
pub const CUT_PRESET: &str = "fast";
