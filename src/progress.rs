//! Per-file status reporting.
//!
//! The driver emits one [`FileStatus`] event for every source file it
//! considers, through a caller-supplied [`StatusCallback`]. The library
//! never prints; the CLI renders these events as colored glyph lines, and
//! tests collect them to assert on ordering and outcomes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use alacify::{ConversionDriver, DriverConfig, FileStatus, StatusCallback};
//!
//! struct PrintStatus;
//!
//! impl StatusCallback for PrintStatus {
//!     fn on_file(&self, status: &FileStatus) {
//!         println!("[{}/{}] {:?}: {}", status.index, status.total, status.outcome, status.stem);
//!     }
//! }
//!
//! let driver = ConversionDriver::new(DriverConfig::new("in", "out"))
//!     .with_status(Arc::new(PrintStatus));
//! ```

use crate::driver::Outcome;

/// A status event for one source file the driver has considered.
#[derive(Debug, Clone)]
pub struct FileStatus {
    /// 1-based position of this file in the run. Increments for every file
    /// considered, whether converted, failed, or skipped.
    pub index: usize,
    /// Total number of source files in the run.
    pub total: usize,
    /// The file's base name (stem, no directory, no extension).
    pub stem: String,
    /// What happened to the file.
    pub outcome: Outcome,
}

/// Trait for receiving per-file status events during a run.
///
/// Implementations must be [`Send`] and [`Sync`]; callbacks are infallible,
/// they observe the run but cannot alter it.
pub trait StatusCallback: Send + Sync {
    /// Called once per source file, immediately after its outcome is known.
    fn on_file(&self, status: &FileStatus);
}

/// A no-op implementation that discards all status events.
///
/// This is the default when no callback is configured.
pub(crate) struct NoOpStatus;

impl StatusCallback for NoOpStatus {
    fn on_file(&self, _status: &FileStatus) {}
}

/// A callback that collects every event, for tests and batch consumers.
#[derive(Default)]
pub struct CollectingStatus {
    events: std::sync::Mutex<Vec<FileStatus>>,
}

impl CollectingStatus {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The events recorded so far, in emission order.
    pub fn events(&self) -> Vec<FileStatus> {
        self.events.lock().expect("status collector poisoned").clone()
    }
}

impl StatusCallback for CollectingStatus {
    fn on_file(&self, status: &FileStatus) {
        self.events
            .lock()
            .expect("status collector poisoned")
            .push(status.clone());
    }
}
