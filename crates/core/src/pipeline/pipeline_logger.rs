use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use case from its output mechanism so the CLI, batch
/// workers, and tests can each observe a run differently without touching
/// the orchestration code.
pub trait PipelineLogger: Send {
    /// A named stage (probe, analyze, plan, cut) has begun.
    fn stage_started(&mut self, stage: &str);

    /// A named stage finished, with its wall-clock duration.
    fn stage_finished(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. silence count, removed seconds).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests and batch workers
/// that aggregate their own results.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn stage_started(&mut self, _stage: &str) {}
    fn stage_finished(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: stage timings and metrics through the `log` crate,
/// with a formatted summary at the end of the run.
pub struct StdoutPipelineLogger {
    timings: Vec<(String, f64)>,
    metrics: HashMap<String, f64>,
    start_time: Instant,
}

impl StdoutPipelineLogger {
    pub fn new() -> Self {
        Self {
            timings: Vec::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!("Run summary ({elapsed:.1}s total):")];

        for (stage, ms) in &self.timings {
            lines.push(format!("  {stage:10}: {:.2}s", ms / 1000.0));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: {:.2}", self.metrics[name]));
        }

        Some(lines.join("\n"))
    }

    pub fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, ms)| *ms)
    }

    pub fn metric_for(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn stage_started(&mut self, stage: &str) {
        log::info!("{stage}...");
    }

    fn stage_finished(&mut self, stage: &str, duration_ms: f64) {
        self.timings.push((stage.to_string(), duration_ms));
        log::debug!("{stage} finished in {duration_ms:.0}ms");
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_string(), value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.stage_started("analyze");
        logger.stage_finished("analyze", 12.0);
        logger.metric("silences", 3.0);
        logger.info("hello");
        logger.summary();
        // No panics = success
    }

    #[test]
    fn test_stage_timings_recorded_in_order() {
        let mut logger = StdoutPipelineLogger::new();
        logger.stage_finished("analyze", 120.0);
        logger.stage_finished("cut", 800.0);

        assert_eq!(logger.timing_for("analyze"), Some(120.0));
        assert_eq!(logger.timing_for("cut"), Some(800.0));
        assert_eq!(logger.timings[0].0, "analyze");
    }

    #[test]
    fn test_metric_overwrites_previous_value() {
        let mut logger = StdoutPipelineLogger::new();
        logger.metric("removed_secs", 3.0);
        logger.metric("removed_secs", 4.5);
        assert_eq!(logger.metric_for("removed_secs"), Some(4.5));
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new();
        logger.stage_finished("analyze", 120.0);
        logger.metric("silences", 3.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Run summary"));
        assert!(summary.contains("analyze"));
        assert!(summary.contains("silences"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutPipelineLogger::new().summary_string().is_none());
    }
}
