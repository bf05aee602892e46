use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use silencecut_core::analysis::domain::silence_detector::SilenceDetector;
use silencecut_core::analysis::infrastructure::rms_silence_detector::RmsSilenceDetector;
use silencecut_core::media::domain::segment_cutter::SegmentCutter;
use silencecut_core::media::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use silencecut_core::media::infrastructure::ffmpeg_prober::FfmpegProber;
use silencecut_core::media::infrastructure::ffmpeg_segment_cutter::FfmpegSegmentCutter;
use silencecut_core::pipeline::batch_processor::{find_video_files, BatchProcessor};
use silencecut_core::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
use silencecut_core::pipeline::remove_silence_use_case::RemoveSilenceUseCase;
use silencecut_core::planning::planner_config::PlannerConfig;

/// Removes silent segments from spoken-word video.
#[derive(Parser)]
#[command(name = "silencecut")]
struct Cli {
    /// Input video file, or a directory when --batch is used.
    input: PathBuf,

    /// Output file, or output directory when --batch is used
    /// (required unless --sample or --dry-run is used).
    output: Option<PathBuf>,

    /// Pacing preset: slow, medium or fast.
    #[arg(long, default_value = "medium")]
    preset: String,

    /// Silence threshold in dBFS (overrides the preset).
    #[arg(long)]
    threshold: Option<f64>,

    /// Seconds of silence kept before each voiced segment (overrides the preset).
    #[arg(long)]
    leading_pad: Option<f64>,

    /// Seconds of silence kept after each voiced segment (overrides the preset).
    #[arg(long)]
    trailing_pad: Option<f64>,

    /// Minimum silence duration that becomes a cut point (overrides the preset).
    #[arg(long)]
    min_silence: Option<f64>,

    /// Path to the ffmpeg binary (default: resolved from PATH).
    #[arg(long)]
    ffmpeg_path: Option<PathBuf>,

    /// Measure the volume of a window, given as start,duration in seconds,
    /// and suggest a threshold instead of cutting.
    #[arg(long)]
    sample: Option<String>,

    /// Plan and report the kept segments without writing any output.
    #[arg(long)]
    dry_run: bool,

    /// Process every video file in the input directory.
    #[arg(long)]
    batch: bool,

    /// Worker threads for batch mode.
    #[arg(long, default_value = "2")]
    jobs: usize,

    /// Write a JSON batch report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;

    if let Some(window) = &cli.sample {
        let (start, duration) = parse_sample(window)?;
        return run_sample(&cli.input, start, duration);
    }

    if cli.batch {
        run_batch(&cli, config)
    } else {
        run_single(&cli, config)
    }
}

fn run_single(cli: &Cli, config: PlannerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // A dry run never reaches the cutter, so the binary is neither resolved
    // nor availability-checked for it.
    let cutter: Box<dyn SegmentCutter> = if cli.dry_run {
        Box::new(FfmpegSegmentCutter::with_binary(PathBuf::from("ffmpeg")))
    } else {
        Box::new(build_cutter(cli.ffmpeg_path.as_deref())?)
    };

    let mut use_case = RemoveSilenceUseCase::new(
        Box::new(FfmpegProber),
        Box::new(RmsSilenceDetector::new(Box::new(FfmpegAudioReader))),
        cutter,
        config,
        Box::new(StdoutPipelineLogger::new()),
    )
    .with_dry_run(cli.dry_run);

    // Validation guarantees an output path unless this is a dry run.
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("/dev/null"));
    let summary = use_case.execute(&cli.input, &output)?;

    if cli.dry_run {
        println!(
            "Would keep {} segment(s) of {:.1}s:",
            summary.keep.len(),
            summary.media_duration
        );
        for (i, seg) in summary.keep.iter().enumerate() {
            println!(
                "  {:3}: {:8.2}s - {:8.2}s  ({:.2}s)",
                i + 1,
                seg.start,
                seg.end,
                seg.duration_secs()
            );
        }
        println!(
            "Would remove {:.1}s, keeping {:.1}s",
            summary.removed_secs, summary.kept_secs
        );
    } else if !summary.output_written {
        eprintln!("No output written: every segment fell below the silence threshold");
    }

    Ok(())
}

fn run_batch(cli: &Cli, config: PlannerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let files = find_video_files(&cli.input)?;
    if files.is_empty() {
        return Err(format!("No video files found in {}", cli.input.display()).into());
    }
    log::info!("Found {} video file(s)", files.len());

    let output_dir = cli
        .output
        .as_ref()
        .ok_or("--batch requires an output directory")?;

    // Resolve the binary once so every worker shares the same executable.
    // Dry runs never cut, so no binary is resolved or checked for them.
    let binary = if cli.dry_run {
        PathBuf::from("ffmpeg")
    } else {
        build_cutter(cli.ffmpeg_path.as_deref())?.binary().to_path_buf()
    };

    let make_use_case = || batch_use_case(&binary, config, cli.dry_run);

    let report = BatchProcessor::new(cli.jobs).process(&files, output_dir, make_use_case)?;

    if cli.dry_run {
        println!("Dry run, no files were written");
    }
    println!(
        "Batch finished: {} succeeded, {} failed ({:.1}s total)",
        report.succeeded, report.failed, report.total_processing_secs
    );
    for entry in report.entries.iter().filter(|e| !e.success) {
        println!(
            "  failed: {} ({})",
            entry.input.display(),
            entry.error.as_deref().unwrap_or("unknown error")
        );
    }

    if let Some(path) = &cli.report {
        report.write_json(path)?;
        log::info!("Report written to {}", path.display());
    }

    if report.failed > 0 {
        return Err(format!("{} file(s) failed", report.failed).into());
    }
    Ok(())
}

fn run_sample(input: &Path, start: f64, duration: f64) -> Result<(), Box<dyn std::error::Error>> {
    let detector = RmsSilenceDetector::new(Box::new(FfmpegAudioReader));
    match detector.measure_volume(input, start, duration)? {
        Some(level_db) => {
            println!(
                "Measured volume over {start:.1}s + {duration:.1}s: {level_db:.1} dBFS"
            );
            println!("Suggested threshold: {:.1} dBFS", level_db - 10.0);
        }
        None => {
            println!("{} has no audio track", input.display());
        }
    }
    Ok(())
}

/// One worker's pipeline for batch mode. Workers aggregate their own
/// results, so progress logging is silenced.
fn batch_use_case(
    ffmpeg_binary: &Path,
    config: PlannerConfig,
    dry_run: bool,
) -> RemoveSilenceUseCase {
    RemoveSilenceUseCase::new(
        Box::new(FfmpegProber),
        Box::new(RmsSilenceDetector::new(Box::new(FfmpegAudioReader))),
        Box::new(FfmpegSegmentCutter::with_binary(ffmpeg_binary.to_path_buf())),
        config,
        Box::new(NullPipelineLogger),
    )
    .with_dry_run(dry_run)
}

fn build_cutter(
    ffmpeg_path: Option<&Path>,
) -> Result<FfmpegSegmentCutter, Box<dyn std::error::Error>> {
    let cutter = FfmpegSegmentCutter::new(ffmpeg_path)?;
    if !cutter.is_available() {
        return Err(format!(
            "ffmpeg at {} is not executable; install ffmpeg or pass --ffmpeg-path",
            cutter.binary().display()
        )
        .into());
    }
    Ok(cutter)
}

fn build_config(cli: &Cli) -> Result<PlannerConfig, Box<dyn std::error::Error>> {
    let mut config = PlannerConfig::preset(&cli.preset)
        .ok_or_else(|| format!("Preset must be slow, medium or fast, got '{}'", cli.preset))?;

    if let Some(threshold) = cli.threshold {
        config.threshold_db = threshold;
    }
    if let Some(pad) = cli.leading_pad {
        config.leading_pad = pad;
    }
    if let Some(pad) = cli.trailing_pad {
        config.trailing_pad = pad;
    }
    if let Some(min) = cli.min_silence {
        config.min_silence_duration = min;
    }

    if let Some(problem) = config.validation_error() {
        return Err(problem.into());
    }
    Ok(config)
}

fn parse_sample(window: &str) -> Result<(f64, f64), Box<dyn std::error::Error>> {
    let parts: Vec<&str> = window.split(',').collect();
    if parts.len() != 2 {
        return Err(format!("--sample expects start,duration in seconds, got '{window}'").into());
    }
    let start: f64 = parts[0].trim().parse()?;
    let duration: f64 = parts[1].trim().parse()?;
    if start < 0.0 || duration <= 0.0 {
        return Err(format!(
            "--sample needs start >= 0 and duration > 0, got {start} and {duration}"
        )
        .into());
    }
    Ok((start, duration))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if cli.batch && !cli.input.is_dir() {
        return Err(format!(
            "--batch needs a directory as input, got {}",
            cli.input.display()
        )
        .into());
    }
    if !cli.batch && cli.input.is_dir() {
        return Err(format!(
            "{} is a directory; use --batch to process it",
            cli.input.display()
        )
        .into());
    }
    if cli.sample.is_some() && cli.batch {
        return Err("--sample and --batch are mutually exclusive".into());
    }
    if cli.batch && cli.output.is_none() {
        return Err("--batch requires an output directory".into());
    }
    if cli.output.is_none() && cli.sample.is_none() && !cli.dry_run {
        return Err("Output is required unless --sample or --dry-run is used".into());
    }
    if cli.jobs == 0 {
        return Err("--jobs must be at least 1".into());
    }
    if cli.report.is_some() && !cli.batch {
        return Err("--report only applies to --batch runs".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_batch_requires_output_even_for_dry_run() {
        let tmp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "silencecut",
            tmp.path().to_str().unwrap(),
            "--batch",
            "--dry-run",
        ])
        .unwrap();

        let err = validate(&cli).unwrap_err();
        assert!(err.to_string().contains("output directory"));
    }

    #[test]
    fn test_validate_batch_with_output_passes() {
        let tmp = TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "silencecut",
            tmp.path().to_str().unwrap(),
            "out",
            "--batch",
        ])
        .unwrap();
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_batch_use_case_propagates_dry_run() {
        let binary = Path::new("ffmpeg");
        assert!(batch_use_case(binary, PlannerConfig::medium(), true).is_dry_run());
        assert!(!batch_use_case(binary, PlannerConfig::medium(), false).is_dry_run());
    }

    #[test]
    fn test_parse_sample_valid() {
        let (start, duration) = parse_sample("2.5,1.0").unwrap();
        assert_eq!(start, 2.5);
        assert_eq!(duration, 1.0);
    }

    #[test]
    fn test_parse_sample_trims_spaces() {
        assert!(parse_sample(" 0 , 3 ").is_ok());
    }

    #[test]
    fn test_parse_sample_rejects_bad_shapes() {
        assert!(parse_sample("2.5").is_err());
        assert!(parse_sample("a,b").is_err());
        assert!(parse_sample("1,2,3").is_err());
        assert!(parse_sample("-1,2").is_err());
        assert!(parse_sample("0,0").is_err());
    }
}
