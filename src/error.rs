//! Error types for the `alacify` crate.
//!
//! This module defines [`AlacifyError`], the unified error type returned by
//! all fallible operations in the crate. Errors carry enough context (tool
//! names, paths, upstream messages) to diagnose the problem without extra
//! logging at the call site.
//!
//! Note that a source file which fails to convert is *not* an error: the
//! driver records it as [`Outcome::Failed`](crate::Outcome::Failed) and moves
//! on. Errors are reserved for conditions that make the whole run impossible
//! (missing tools, missing input directory) or for I/O problems talking to
//! the filesystem and child processes.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `alacify` operations.
///
/// Every public method that can fail returns `Result<T, AlacifyError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlacifyError {
    /// The decode tool could not be found, either at an explicit path or
    /// anywhere on `PATH`.
    #[error("Decoder not found: {program} (looked for an explicit path, then searched PATH)")]
    DecoderNotFound {
        /// The program path or name that was configured.
        program: String,
    },

    /// The encode tool could not be found, either at an explicit path or
    /// anywhere on `PATH`.
    #[error("Encoder not found: {program} (looked for an explicit path, then searched PATH)")]
    EncoderNotFound {
        /// The program path or name that was configured.
        program: String,
    },

    /// The input directory does not exist or is not a directory.
    #[error("Input directory not found: {path}")]
    InputDirNotFound {
        /// The configured input directory.
        path: PathBuf,
    },

    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {reason}")]
    OutputDirCreate {
        /// The configured output directory.
        path: PathBuf,
        /// Underlying reason the creation failed.
        reason: String,
    },

    /// A pipeline stage could not be spawned.
    ///
    /// This is distinct from a stage that runs and exits nonzero: a nonzero
    /// exit is recorded in the [`PipelineReport`](crate::PipelineReport),
    /// while a spawn failure (program vanished between the precondition
    /// check and the run, permission denied, ...) aborts the pipeline.
    #[error("Failed to spawn {program}: {reason}")]
    StageSpawn {
        /// The program that could not be started.
        program: String,
        /// Underlying reason the spawn failed.
        reason: String,
    },

    /// [`run_pipeline`](crate::run_pipeline) was called with no stages.
    #[error("Pipeline has no stages")]
    EmptyPipeline,

    /// An I/O error occurred while reading directories or waiting on
    /// child processes.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}
