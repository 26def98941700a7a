//! # alacify
//!
//! Batch-convert game audio streams to Apple Lossless by piping an external
//! decoder (`vgmstream-cli`) into an external encoder (`ffmpeg`), one source
//! file at a time.
//!
//! The crate does no codec work itself. Its job is the orchestration around
//! the two tools: enumerating sources, skipping files whose target already
//! exists (which makes every run idempotent and resumable), judging each
//! pipeline by the exit status of *every* stage, and tallying results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use alacify::{ConversionDriver, DriverConfig};
//!
//! # fn main() -> Result<(), alacify::AlacifyError> {
//! let config = DriverConfig::new("mkw_music_brstm", "mkw_music_alac");
//! let summary = ConversionDriver::new(config).run()?;
//!
//! println!(
//!     "{} converted, {} skipped, {} failed ({} targets on disk)",
//!     summary.converted, summary.skipped, summary.failed, summary.targets_on_disk,
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Resumable batch conversion**: a target file's existence is the only
//!   completion marker, so interrupted runs resume for free and repeat runs
//!   are all-skips
//! - **Explicit pipelines**: [`run_pipeline`] records every stage's exit
//!   status; [`FailurePolicy::AllStages`] (the default) refuses to call a
//!   conversion successful when the decoder died but the encoder exited 0
//! - **Non-aborting failures**: one bad file never stops the rest of the run
//! - **Configurable tools**: decoder, encoder, extensions, and codec flags
//!   are all [`DriverConfig`] settings, so tests (and other formats) swap
//!   them freely
//! - **Status callbacks**: per-file [`FileStatus`] events through the
//!   [`StatusCallback`] trait; rendering is the caller's business
//!
//! ## Requirements
//!
//! `vgmstream-cli` and `ffmpeg` (or whatever tools you configure) must be
//! installed; the driver resolves bare names on `PATH` and verifies both
//! before touching any files.

pub mod config;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod tools;

pub use config::{
    DEFAULT_DECODER, DEFAULT_ENCODER, DEFAULT_SOURCE_EXTENSION, DEFAULT_TARGET_EXTENSION,
    DriverConfig,
};
pub use driver::{ConversionDriver, Outcome, RunSummary};
pub use error::AlacifyError;
pub use pipeline::{FailurePolicy, PipelineReport, StageSpec, StageStatus, run_pipeline};
pub use progress::{CollectingStatus, FileStatus, StatusCallback};
pub use tools::{ToolInfo, probe_tool, resolve_tool};
