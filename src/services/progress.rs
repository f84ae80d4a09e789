//! Progress reporting service
//!
//! This module separates progress reporting concerns from the session logic,
//! allowing different frontends to implement their own progress handling.

use instant::Instant;

/// Progress stages of a removal session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Running the transparency heuristic
    TransparencyCheck,
    /// Request sent, waiting on the removal service
    Uploading,
    /// Wrapping the returned payload
    ResultHandling,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::TransparencyCheck => "Checking for existing transparency",
            ProcessingStage::Uploading => "Removing background",
            ProcessingStage::ResultHandling => "Receiving processed image",
            ProcessingStage::Completed => "Processing completed",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::TransparencyCheck => 10,
            ProcessingStage::Uploading => 20,
            ProcessingStage::ResultHandling => 90,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }
}

/// Trait for reporting progress during a removal session
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report successful completion
    fn report_completion(&self, total_ms: u64);

    /// Report an error during processing
    ///
    /// # Arguments
    /// * `stage` - Stage where error occurred
    /// * `error` - Error description
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _total_ms: u64) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Console progress reporter that logs progress
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to include elapsed times
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, total_ms: u64) {
        log::info!("✅ Background removed in {}ms", total_ms);
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("❌ Error during {}: {}", stage.description(), error);
    }
}

/// Spinner shown while the request is in flight
#[cfg(feature = "cli")]
pub struct SpinnerProgressReporter {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl SpinnerProgressReporter {
    #[must_use]
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new_spinner();
        if let Ok(style) =
            indicatif::ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
        {
            bar.set_style(style);
        }
        Self { bar }
    }
}

#[cfg(feature = "cli")]
impl Default for SpinnerProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for SpinnerProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.bar.set_message(update.description);
        if update.stage == ProcessingStage::Uploading {
            self.bar
                .enable_steady_tick(std::time::Duration::from_millis(100));
        }
    }

    fn report_completion(&self, total_ms: u64) {
        self.bar
            .finish_with_message(format!("✅ Background removed in {}ms", total_ms));
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.bar
            .abandon_with_message(format!("❌ {} failed: {}", stage.description(), error));
    }
}

/// Progress tracker pairing a reporter with a start time
pub struct ProgressTracker {
    reporter: Box<dyn ProgressReporter>,
    start_time: Instant,
}

impl ProgressTracker {
    #[must_use]
    pub fn new(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
        }
    }

    /// Tracker that discards everything
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Box::new(NoOpProgressReporter))
    }

    /// Restart the clock, e.g. when a new request begins
    pub fn restart(&mut self) {
        self.start_time = Instant::now();
    }

    pub fn report_stage(&self, stage: ProcessingStage) {
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.start_time));
    }

    /// Report the `Completed` stage, then the total time
    pub fn report_completion(&self) {
        self.report_stage(ProcessingStage::Completed);
        self.reporter
            .report_completion(self.start_time.elapsed().as_millis() as u64);
    }

    pub fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.reporter.report_error(stage, error);
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct RecordingReporter {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.events
                .lock()
                .unwrap()
                .push(format!("progress:{:?}", update.stage));
        }

        fn report_completion(&self, _total_ms: u64) {
            self.events.lock().unwrap().push("completed".to_string());
        }

        fn report_error(&self, stage: ProcessingStage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error:{:?}:{}", stage, error));
        }
    }

    #[test]
    fn test_stage_percentages_increase() {
        let stages = [
            ProcessingStage::TransparencyCheck,
            ProcessingStage::Uploading,
            ProcessingStage::ResultHandling,
            ProcessingStage::Completed,
        ];
        for pair in stages.windows(2) {
            assert!(pair[0].progress_percentage() < pair[1].progress_percentage());
        }
        assert_eq!(ProcessingStage::Completed.progress_percentage(), 100);
    }

    #[test]
    fn test_progress_update_creation() {
        let update = ProgressUpdate::new(ProcessingStage::Uploading, Instant::now());
        assert_eq!(update.stage, ProcessingStage::Uploading);
        assert_eq!(update.progress, 20);
        assert_eq!(update.description, "Removing background");
    }

    #[test]
    fn test_tracker_forwards_events() {
        let reporter = RecordingReporter::default();
        let events = Arc::clone(&reporter.events);
        let tracker = ProgressTracker::new(Box::new(reporter));

        tracker.report_stage(ProcessingStage::Uploading);
        tracker.report_error(ProcessingStage::Uploading, "HTTP 403");
        tracker.report_completion();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "progress:Uploading".to_string(),
                "error:Uploading:HTTP 403".to_string(),
                "progress:Completed".to_string(),
                "completed".to_string(),
            ]
        );
    }

    #[test]
    fn test_noop_and_console_reporters() {
        let update = ProgressUpdate::new(ProcessingStage::Completed, Instant::now());
        NoOpProgressReporter.report_progress(update.clone());
        ConsoleProgressReporter::new(true).report_progress(update.clone());
        ConsoleProgressReporter::new(false).report_progress(update);
        ConsoleProgressReporter::new(false).report_completion(5);
    }
}
