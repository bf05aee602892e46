use std::path::Path;
use std::time::Instant;

use crate::analysis::domain::silence_detector::SilenceDetector;
use crate::media::domain::media_prober::MediaProber;
use crate::media::domain::segment_cutter::SegmentCutter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::planning::planner_config::PlannerConfig;
use crate::planning::segment_planner::SegmentPlanner;
use crate::shared::time_interval::TimeInterval;

/// What one run did, for reporting and batch aggregation.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub media_duration: f64,
    pub silence_count: usize,
    pub keep: Vec<TimeInterval>,
    pub kept_secs: f64,
    pub removed_secs: f64,
    pub output_written: bool,
}

/// Orchestrates one probe → detect → plan → cut run.
///
/// All collaborators arrive behind trait objects, so the whole flow is
/// testable with stubs and never touches ffmpeg in unit tests.
pub struct RemoveSilenceUseCase {
    prober: Box<dyn MediaProber>,
    detector: Box<dyn SilenceDetector>,
    cutter: Box<dyn SegmentCutter>,
    config: PlannerConfig,
    logger: Box<dyn PipelineLogger>,
    dry_run: bool,
}

impl RemoveSilenceUseCase {
    pub fn new(
        prober: Box<dyn MediaProber>,
        detector: Box<dyn SilenceDetector>,
        cutter: Box<dyn SegmentCutter>,
        config: PlannerConfig,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            prober,
            detector,
            cutter,
            config,
            logger,
            dry_run: false,
        }
    }

    /// Plan only: report what would be kept without invoking the cutter.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        self.logger.stage_started("probe");
        let started = Instant::now();
        let info = self.prober.probe(input)?;
        self.logger
            .stage_finished("probe", started.elapsed().as_secs_f64() * 1000.0);

        self.logger.stage_started("analyze");
        let started = Instant::now();
        let silences = match self.detector.detect(input, self.config.threshold_db)? {
            Some(runs) => clamp_to_media(runs, info.duration_secs),
            None => {
                self.logger
                    .info("No audio track found, keeping the whole recording");
                Vec::new()
            }
        };
        self.logger
            .stage_finished("analyze", started.elapsed().as_secs_f64() * 1000.0);

        self.logger.stage_started("plan");
        let started = Instant::now();
        let keep = SegmentPlanner::plan(info.duration_secs, &silences, &self.config)?;
        self.logger
            .stage_finished("plan", started.elapsed().as_secs_f64() * 1000.0);

        let kept_secs: f64 = keep.iter().map(TimeInterval::duration_secs).sum();
        let removed_secs = (info.duration_secs - kept_secs).max(0.0);
        self.logger.metric("silence_count", silences.len() as f64);
        self.logger.metric("keep_count", keep.len() as f64);
        self.logger.metric("removed_secs", removed_secs);

        let mut summary = RunSummary {
            media_duration: info.duration_secs,
            silence_count: silences.len(),
            keep,
            kept_secs,
            removed_secs,
            output_written: false,
        };

        if summary.keep.is_empty() {
            self.logger
                .info("Entire recording is below the silence threshold, nothing to keep");
            self.logger.summary();
            return Ok(summary);
        }

        if self.dry_run {
            self.logger.info("Dry run, skipping the cut stage");
            self.logger.summary();
            return Ok(summary);
        }

        self.logger.stage_started("cut");
        let started = Instant::now();
        self.cutter
            .cut(input, output, &summary.keep, info.duration_secs)?;
        self.logger
            .stage_finished("cut", started.elapsed().as_secs_f64() * 1000.0);

        summary.output_written = true;
        self.logger.info(&format!(
            "Removed {:.1}s of {:.1}s, output written to {}",
            summary.removed_secs,
            summary.media_duration,
            output.display()
        ));
        self.logger.summary();
        Ok(summary)
    }
}

/// Clips detector runs to the container duration.
///
/// The decoded audio track can run slightly longer than the container
/// reports; a run ending a fraction past the end would otherwise be
/// rejected as out-of-range input.
fn clamp_to_media(runs: Vec<TimeInterval>, media_duration: f64) -> Vec<TimeInterval> {
    runs.into_iter()
        .map(|r| r.clamped(0.0, media_duration))
        .collect()
}
