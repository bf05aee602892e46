use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::media::domain::segment_cutter::SegmentCutter;
use crate::shared::constants::{CUT_CRF, CUT_PRESET};
use crate::shared::time_interval::TimeInterval;

/// A keep list whose single interval starts within this many seconds of 0
/// counts as starting at the beginning of the file.
const FULL_START_EPSILON: f64 = 0.1;

/// ...and whose end lies within this many seconds of the media duration
/// counts as reaching the end. Container durations are only accurate to
/// about a second, so the tolerance is deliberately loose.
const FULL_END_EPSILON: f64 = 1.0;

#[derive(Error, Debug)]
pub enum CutError {
    #[error("ffmpeg binary not found: {0}")]
    BinaryNotFound(#[from] which::Error),
    #[error("ffmpeg exited with {status}: {stderr}")]
    Ffmpeg { status: String, stderr: String },
    #[error("failed to run ffmpeg: {0}")]
    Io(#[from] std::io::Error),
}

/// Cuts and concatenates segments by invoking the external `ffmpeg` binary.
///
/// The binary is treated as an opaque collaborator: this type only builds
/// argument lists and checks exit codes. Strategy per keep list:
/// whole-file → stream copy; one partial segment → seek + trim re-encode;
/// several segments → one `filter_complex` trim/concat invocation, with a
/// per-segment extract + concat-demuxer fallback when that fails.
pub struct FfmpegSegmentCutter {
    binary: PathBuf,
}

impl FfmpegSegmentCutter {
    /// Uses the given binary path, or resolves `ffmpeg` from `PATH`.
    pub fn new(explicit_path: Option<&Path>) -> Result<Self, CutError> {
        match explicit_path {
            Some(p) => Ok(Self::with_binary(p.to_path_buf())),
            None => Ok(Self::with_binary(which::which("ffmpeg")?)),
        }
    }

    /// Uses an already-resolved binary path.
    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Runs `ffmpeg -version` to confirm the binary actually executes.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    fn run(&self, args: &[String]) -> Result<(), CutError> {
        log::debug!("Running: {} {}", self.binary.display(), args.join(" "));
        let output = Command::new(&self.binary).args(args).output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(CutError::Ffmpeg {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            })
        }
    }

    fn cut_multi(
        &self,
        input: &Path,
        output: &Path,
        segments: &[TimeInterval],
    ) -> Result<(), CutError> {
        match self.run(&filter_complex_args(input, output, segments)) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("filter_complex concat failed ({e}), falling back to concat demuxer");
                self.cut_multi_fallback(input, output, segments)
            }
        }
    }

    /// Extracts each segment into a temp dir, then joins them with the
    /// concat demuxer. Slower than filter_complex but tolerant of inputs
    /// the filter graph chokes on.
    fn cut_multi_fallback(
        &self,
        input: &Path,
        output: &Path,
        segments: &[TimeInterval],
    ) -> Result<(), CutError> {
        let temp_dir = tempfile::tempdir()?;

        let mut list = String::new();
        for (i, segment) in segments.iter().enumerate() {
            let part = temp_dir.path().join(format!("segment_{i:04}.mp4"));
            self.run(&extract_segment_args(input, &part, segment))?;
            list.push_str(&concat_list_line(&part));
        }

        let list_path = temp_dir.path().join("concat_list.txt");
        let mut file = std::fs::File::create(&list_path)?;
        file.write_all(list.as_bytes())?;
        file.flush()?;

        self.run(&concat_demux_args(&list_path, output))
    }
}

impl SegmentCutter for FfmpegSegmentCutter {
    fn cut(
        &self,
        input: &Path,
        output: &Path,
        segments: &[TimeInterval],
        media_duration: f64,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match segments {
            [] => Err("no segments to cut".into()),
            [only] if is_effectively_full(only, media_duration) => {
                log::info!("Keep list covers the whole file, stream copying");
                Ok(self.run(&stream_copy_args(input, output))?)
            }
            [only] => Ok(self.run(&single_trim_args(input, output, only))?),
            many => Ok(self.cut_multi(input, output, many)?),
        }
    }
}

/// Whether a single keep interval spans essentially the entire file, making
/// a lossless stream copy safe.
fn is_effectively_full(segment: &TimeInterval, media_duration: f64) -> bool {
    segment.start.abs() < FULL_START_EPSILON
        && (media_duration - segment.end).abs() < FULL_END_EPSILON
}

fn stream_copy_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c".into(),
        "copy".into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn encode_args() -> Vec<String> {
    vec![
        "-c:v".into(),
        "libx264".into(),
        "-c:a".into(),
        "aac".into(),
        "-preset".into(),
        CUT_PRESET.into(),
        "-crf".into(),
        CUT_CRF.to_string(),
        "-avoid_negative_ts".into(),
        "make_zero".into(),
    ]
}

fn single_trim_args(input: &Path, output: &Path, segment: &TimeInterval) -> Vec<String> {
    let mut args = vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-ss".into(),
        segment.start.to_string(),
        "-t".into(),
        segment.duration_secs().to_string(),
    ];
    args.extend(encode_args());
    args.push("-y".into());
    args.push(output.to_string_lossy().into_owned());
    args
}

/// One invocation that trims every segment from repeated `-ss`/`-t` inputs
/// and joins them through the concat filter.
fn filter_complex_args(input: &Path, output: &Path, segments: &[TimeInterval]) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut filter = String::new();

    for (i, segment) in segments.iter().enumerate() {
        args.push("-ss".into());
        args.push(segment.start.to_string());
        args.push("-t".into());
        args.push(segment.duration_secs().to_string());
        args.push("-i".into());
        args.push(input.to_string_lossy().into_owned());
        filter.push_str(&format!("[{i}:v][{i}:a]"));
    }
    filter.push_str(&format!("concat=n={}:v=1:a=1[outv][outa]", segments.len()));

    args.push("-filter_complex".into());
    args.push(filter);
    args.push("-map".into());
    args.push("[outv]".into());
    args.push("-map".into());
    args.push("[outa]".into());
    args.extend(encode_args());
    args.push("-y".into());
    args.push(output.to_string_lossy().into_owned());
    args
}

fn extract_segment_args(input: &Path, part: &Path, segment: &TimeInterval) -> Vec<String> {
    single_trim_args(input, part, segment)
}

fn concat_demux_args(list_path: &Path, output: &Path) -> Vec<String> {
    vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        list_path.to_string_lossy().into_owned(),
        "-c".into(),
        "copy".into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]
}

/// One line of a concat-demuxer list file. Single quotes in the path are
/// escaped the way the demuxer expects (`'\''`).
fn concat_list_line(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', "'\\''");
    format!("file '{escaped}'\n")
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim_end();
    match trimmed.char_indices().nth_back(799) {
        Some((idx, _)) => trimmed[idx..].to_string(),
        None => trimmed.to_string(),
    }
}
