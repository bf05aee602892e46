use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::pipeline::remove_silence_use_case::RemoveSilenceUseCase;
use crate::shared::constants::VIDEO_EXTENSIONS;

/// Outcome of one file in a batch run.
#[derive(Serialize, Clone, Debug)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    pub success: bool,
    pub error: Option<String>,
    pub removed_secs: f64,
    pub processing_secs: f64,
}

/// Aggregated batch results, serializable as a JSON report.
#[derive(Serialize, Clone, Debug)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_processing_secs: f64,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn from_entries(mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| a.input.cmp(&b.input));
        Self {
            total: entries.len(),
            succeeded: entries.iter().filter(|e| e.success).count(),
            failed: entries.iter().filter(|e| !e.success).count(),
            total_processing_secs: entries.iter().map(|e| e.processing_secs).sum(),
            entries,
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Video files directly inside `dir`, matched by extension, sorted by path.
pub fn find_video_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Output path for one batch input: `<output_dir>/<stem>_filtered.<ext>`.
pub fn batch_output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => output_dir.join(format!("{stem}_filtered.{ext}")),
        None => output_dir.join(format!("{stem}_filtered")),
    }
}

/// Runs the remove-silence pipeline over many files with a small worker pool.
///
/// Files flow through a crossbeam channel; each worker owns its own use-case
/// instance (ffmpeg handles and decoders are not shared), built by the
/// factory closure. One failing file never aborts the rest of the batch.
pub struct BatchProcessor {
    jobs: usize,
}

impl BatchProcessor {
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    pub fn process<F>(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        make_use_case: F,
    ) -> Result<BatchReport, Box<dyn std::error::Error>>
    where
        F: Fn() -> RemoveSilenceUseCase + Send + Sync,
    {
        fs::create_dir_all(output_dir)?;

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<PathBuf>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<BatchEntry>();

        for file in files {
            job_tx.send(file.clone())?;
        }
        drop(job_tx);

        let workers = self.jobs.min(files.len().max(1));
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let make_use_case = &make_use_case;
                scope.spawn(move || {
                    let mut use_case = make_use_case();
                    for input in job_rx {
                        let entry = process_one(&mut use_case, &input, output_dir);
                        if result_tx.send(entry).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        Ok(BatchReport::from_entries(result_rx.iter().collect()))
    }
}

fn process_one(use_case: &mut RemoveSilenceUseCase, input: &Path, output_dir: &Path) -> BatchEntry {
    let output = batch_output_path(input, output_dir);
    log::info!("Processing {}", input.display());

    let started = Instant::now();
    match use_case.execute(input, &output) {
        Ok(summary) => BatchEntry {
            input: input.to_path_buf(),
            output,
            success: true,
            error: None,
            removed_secs: summary.removed_secs,
            processing_secs: started.elapsed().as_secs_f64(),
        },
        Err(e) => {
            log::warn!("Failed on {}: {e}", input.display());
            BatchEntry {
                input: input.to_path_buf(),
                output,
                success: false,
                error: Some(e.to_string()),
                removed_secs: 0.0,
                processing_secs: started.elapsed().as_secs_f64(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::silence_detector::SilenceDetector;
    use crate::media::domain::media_prober::MediaProber;
    use crate::media::domain::segment_cutter::SegmentCutter;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::planning::planner_config::PlannerConfig;
    use crate::shared::media_info::MediaInfo;
    use crate::shared::time_interval::TimeInterval;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    // ─── Stubs ───

    struct StubProber;
    impl MediaProber for StubProber {
        fn probe(&self, path: &Path) -> Result<MediaInfo, Box<dyn std::error::Error>> {
            Ok(MediaInfo {
                duration_secs: 10.0,
                has_audio: true,
                audio_sample_rate: Some(48000),
                source_path: Some(path.to_path_buf()),
            })
        }
    }

    struct StubDetector;
    impl SilenceDetector for StubDetector {
        fn detect(
            &self,
            _: &Path,
            _: f64,
        ) -> Result<Option<Vec<TimeInterval>>, Box<dyn std::error::Error>> {
            Ok(Some(vec![TimeInterval::new(2.0, 4.0)]))
        }
        fn measure_volume(
            &self,
            _: &Path,
            _: f64,
            _: f64,
        ) -> Result<Option<f64>, Box<dyn std::error::Error>> {
            Ok(None)
        }
    }

    struct StubCutter;
    impl SegmentCutter for StubCutter {
        fn cut(
            &self,
            _: &Path,
            _: &Path,
            _: &[TimeInterval],
            _: f64,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct CountingCutter {
        calls: Arc<Mutex<usize>>,
    }
    impl SegmentCutter for CountingCutter {
        fn cut(
            &self,
            _: &Path,
            _: &Path,
            _: &[TimeInterval],
            _: f64,
        ) -> Result<(), Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct FailingCutter;
    impl SegmentCutter for FailingCutter {
        fn cut(
            &self,
            _: &Path,
            _: &Path,
            _: &[TimeInterval],
            _: f64,
        ) -> Result<(), Box<dyn std::error::Error>> {
            Err("ffmpeg exploded".into())
        }
    }

    fn stub_use_case() -> RemoveSilenceUseCase {
        RemoveSilenceUseCase::new(
            Box::new(StubProber),
            Box::new(StubDetector),
            Box::new(StubCutter),
            PlannerConfig::medium(),
            Box::new(NullPipelineLogger),
        )
    }

    // ── File discovery ───────────────────────────────────────────────

    #[test]
    fn test_find_video_files_filters_by_extension() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.mp4"), b"").unwrap();
        fs::write(tmp.path().join("b.txt"), b"").unwrap();
        fs::write(tmp.path().join("c.MOV"), b"").unwrap();

        let files = find_video_files(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp4", "c.MOV"]);
    }

    #[test]
    fn test_find_video_files_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("clips.mp4")).unwrap();
        assert!(find_video_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_find_video_files_missing_dir_errors() {
        assert!(find_video_files(Path::new("/nonexistent/batch/dir")).is_err());
    }

    // ── Output naming ────────────────────────────────────────────────

    #[test]
    fn test_batch_output_path_keeps_extension() {
        let out = batch_output_path(Path::new("/in/talk.mp4"), Path::new("/out"));
        assert_eq!(out, Path::new("/out/talk_filtered.mp4"));
    }

    #[test]
    fn test_batch_output_path_without_extension() {
        let out = batch_output_path(Path::new("/in/talk"), Path::new("/out"));
        assert_eq!(out, Path::new("/out/talk_filtered"));
    }

    // ── Batch runs ───────────────────────────────────────────────────

    #[test]
    fn test_process_reports_success_per_file() {
        let tmp = TempDir::new().unwrap();
        let files = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];

        let report = BatchProcessor::new(2)
            .process(&files, tmp.path(), stub_use_case)
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 0);
        assert!(report.entries.iter().all(|e| e.error.is_none()));
    }

    #[test]
    fn test_process_continues_past_failures() {
        let tmp = TempDir::new().unwrap();
        let files = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];

        let make = || {
            RemoveSilenceUseCase::new(
                Box::new(StubProber),
                Box::new(StubDetector),
                Box::new(FailingCutter),
                PlannerConfig::medium(),
                Box::new(NullPipelineLogger),
            )
        };
        let report = BatchProcessor::new(1).process(&files, tmp.path(), make).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 2);
        assert!(report.entries[0].error.as_deref().unwrap().contains("ffmpeg"));
    }

    #[test]
    fn test_dry_run_batch_plans_without_cutting() {
        let tmp = TempDir::new().unwrap();
        let files = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
        let calls = Arc::new(Mutex::new(0usize));

        let make = {
            let calls = calls.clone();
            move || {
                RemoveSilenceUseCase::new(
                    Box::new(StubProber),
                    Box::new(StubDetector),
                    Box::new(CountingCutter {
                        calls: calls.clone(),
                    }),
                    PlannerConfig::medium(),
                    Box::new(NullPipelineLogger),
                )
                .with_dry_run(true)
            }
        };
        let report = BatchProcessor::new(2).process(&files, tmp.path(), make).unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(*calls.lock().unwrap(), 0);
        // Planned removals are still reported, only the cut is skipped.
        assert!(report.entries.iter().all(|e| e.removed_secs > 0.0));
    }

    #[test]
    fn test_report_entries_sorted_by_input() {
        let tmp = TempDir::new().unwrap();
        let files = vec![
            PathBuf::from("c.mp4"),
            PathBuf::from("a.mp4"),
            PathBuf::from("b.mp4"),
        ];
        let report = BatchProcessor::new(3)
            .process(&files, tmp.path(), stub_use_case)
            .unwrap();

        let inputs: Vec<_> = report.entries.iter().map(|e| e.input.clone()).collect();
        assert_eq!(
            inputs,
            vec![
                PathBuf::from("a.mp4"),
                PathBuf::from("b.mp4"),
                PathBuf::from("c.mp4")
            ]
        );
    }

    #[test]
    fn test_empty_file_list_yields_empty_report() {
        let tmp = TempDir::new().unwrap();
        let report = BatchProcessor::new(2)
            .process(&[], tmp.path(), stub_use_case)
            .unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.succeeded, 0);
    }

    #[test]
    fn test_write_json_report() {
        let tmp = TempDir::new().unwrap();
        let report = BatchReport::from_entries(vec![BatchEntry {
            input: PathBuf::from("a.mp4"),
            output: PathBuf::from("out/a_filtered.mp4"),
            success: true,
            error: None,
            removed_secs: 3.2,
            processing_secs: 1.5,
        }]);

        let path = tmp.path().join("reports").join("batch.json");
        report.write_json(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["succeeded"], 1);
        assert_eq!(parsed["entries"][0]["input"], "a.mp4");
    }
}
