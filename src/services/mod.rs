//! Service layer
//!
//! This module contains service types that separate infrastructure concerns
//! (file I/O, format naming, progress output) from the session logic.

pub mod format;
pub mod io;
pub mod progress;

pub use format::FormatService;
pub use io::ImageIOService;
#[cfg(feature = "cli")]
pub use progress::SpinnerProgressReporter;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
    ProgressTracker, ProgressUpdate,
};
