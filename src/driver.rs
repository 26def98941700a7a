//! The batch conversion driver.
//!
//! [`ConversionDriver`] makes one sequential pass over an input directory,
//! piping each not-yet-converted source file through the decode and encode
//! tools, and reports per-file outcomes plus an aggregate [`RunSummary`].
//!
//! The driver is resumable: a target file's existence is the sole signal
//! that its source is done, so a run interrupted after N files picks up at
//! file N+1 next time, and a completed run degenerates to all-skips.
//!
//! # Example
//!
//! ```no_run
//! use alacify::{ConversionDriver, DriverConfig};
//!
//! # fn main() -> Result<(), alacify::AlacifyError> {
//! let driver = ConversionDriver::new(DriverConfig::new("mkw_music_brstm", "mkw_music_alac"));
//! let summary = driver.run()?;
//! println!("{} of {} on disk", summary.targets_on_disk, summary.total);
//! # Ok(())
//! # }
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DriverConfig;
use crate::error::AlacifyError;
use crate::pipeline::{StageSpec, run_pipeline};
use crate::progress::{FileStatus, NoOpStatus, StatusCallback};
use crate::tools;

/// Per-file result classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The pipeline ran and succeeded; the target was written this run.
    Converted,
    /// The pipeline ran and failed (or could not be started); the run
    /// continues with the next file.
    Failed,
    /// The target already existed, so no processes were spawned.
    Skipped,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let word = match self {
            Outcome::Converted => "converted",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        };
        write!(f, "{word}")
    }
}

/// Aggregate counters for one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Source files discovered in the input directory.
    pub total: usize,
    /// Files converted this run.
    pub converted: usize,
    /// Files whose pipeline failed this run.
    pub failed: usize,
    /// Files skipped because their target already existed.
    pub skipped: usize,
    /// Target-extension files physically present in the output directory
    /// after the run. Recomputed by re-listing the directory, so it is
    /// ground truth and includes successes from earlier runs.
    pub targets_on_disk: usize,
}

/// Drives one sequential conversion pass over an input directory.
pub struct ConversionDriver {
    config: DriverConfig,
    status: Arc<dyn StatusCallback>,
}

impl ConversionDriver {
    /// Create a driver for the given configuration, with no status callback.
    pub fn new(config: DriverConfig) -> Self {
        Self {
            config,
            status: Arc::new(NoOpStatus),
        }
    }

    /// Attach a status callback. One [`FileStatus`] event is emitted per
    /// source file considered.
    #[must_use]
    pub fn with_status(mut self, status: Arc<dyn StatusCallback>) -> Self {
        self.status = status;
        self
    }

    /// The driver's configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run one full pass.
    ///
    /// Preconditions (checked before any file is touched): the decoder and
    /// encoder must be resolvable, and the input directory must exist. The
    /// output directory is created if missing. Precondition violations are
    /// the only fatal conditions; a file whose pipeline fails is recorded
    /// as [`Outcome::Failed`] and the pass continues.
    ///
    /// # Errors
    ///
    /// - [`AlacifyError::DecoderNotFound`] / [`AlacifyError::EncoderNotFound`]
    ///   if a tool cannot be resolved.
    /// - [`AlacifyError::InputDirNotFound`] if the input directory is absent.
    /// - [`AlacifyError::OutputDirCreate`] if the output directory cannot be
    ///   created.
    /// - [`AlacifyError::Io`] on directory-listing or child-wait failures.
    pub fn run(&self) -> Result<RunSummary, AlacifyError> {
        let (decoder, encoder) = self.check_preconditions()?;
        let sources = self.scan_sources()?;
        let total = sources.len();

        log::info!(
            "converting {total} {} file(s) from {} to {}",
            self.config.source_extension,
            self.config.input_dir.display(),
            self.config.output_dir.display(),
        );

        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        for (index, source) in sources.iter().enumerate() {
            let outcome = self.convert_one(&decoder, &encoder, source)?;
            match outcome {
                Outcome::Converted => summary.converted += 1,
                Outcome::Failed => summary.failed += 1,
                Outcome::Skipped => summary.skipped += 1,
            }

            self.status.on_file(&FileStatus {
                index: index + 1,
                total,
                stem: file_stem(source),
                outcome,
            });
        }

        summary.targets_on_disk = self.count_targets()?;
        Ok(summary)
    }

    /// List the source files the driver would consider, filtered to the
    /// configured extension (case-insensitive) and sorted by file name
    /// unless sorting is disabled.
    pub fn scan_sources(&self) -> Result<Vec<PathBuf>, AlacifyError> {
        let mut sources = Vec::new();
        for entry in fs::read_dir(&self.config.input_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_extension(&path, &self.config.source_extension) {
                sources.push(path);
            }
        }

        if self.config.sort_sources {
            sources.sort_by_key(|path| path.file_name().map(|n| n.to_os_string()));
        }

        Ok(sources)
    }

    /// Count the target-extension files currently in the output directory.
    pub fn count_targets(&self) -> Result<usize, AlacifyError> {
        let mut count = 0;
        for entry in fs::read_dir(&self.config.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && has_extension(&path, &self.config.target_extension) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn check_preconditions(&self) -> Result<(PathBuf, PathBuf), AlacifyError> {
        let decoder =
            tools::resolve_tool(&self.config.decoder).ok_or_else(|| AlacifyError::DecoderNotFound {
                program: self.config.decoder.clone(),
            })?;
        let encoder =
            tools::resolve_tool(&self.config.encoder).ok_or_else(|| AlacifyError::EncoderNotFound {
                program: self.config.encoder.clone(),
            })?;

        if !self.config.input_dir.is_dir() {
            return Err(AlacifyError::InputDirNotFound {
                path: self.config.input_dir.clone(),
            });
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|error| {
            AlacifyError::OutputDirCreate {
                path: self.config.output_dir.clone(),
                reason: error.to_string(),
            }
        })?;

        Ok((decoder, encoder))
    }

    /// Convert one source file, or skip it if its target already exists.
    fn convert_one(
        &self,
        decoder: &Path,
        encoder: &Path,
        source: &Path,
    ) -> Result<Outcome, AlacifyError> {
        let target = self.config.target_for(source);
        if target.exists() {
            log::debug!("target exists, skipping: {}", target.display());
            return Ok(Outcome::Skipped);
        }

        let stages = [
            self.decode_stage(decoder, source),
            self.encode_stage(encoder, &target),
        ];

        match run_pipeline(&stages) {
            Ok(report) => {
                if report.succeeded(self.config.failure_policy) {
                    Ok(Outcome::Converted)
                } else {
                    if let Some(stage) = report.first_failure() {
                        log::warn!(
                            "{} failed with {} on {}",
                            stage.program,
                            stage.status,
                            source.display(),
                        );
                    }
                    Ok(Outcome::Failed)
                }
            }
            // A tool that resolved at precondition time but cannot be
            // spawned now fails this file, not the whole run.
            Err(AlacifyError::StageSpawn { program, reason }) => {
                log::warn!("could not spawn {program} for {}: {reason}", source.display());
                Ok(Outcome::Failed)
            }
            Err(error) => Err(error),
        }
    }

    /// The decode stage: raw decoded audio on stdout.
    fn decode_stage(&self, decoder: &Path, source: &Path) -> StageSpec {
        StageSpec::new(decoder).arg("-o").arg("-").arg(source)
    }

    /// The encode stage: decoded stream on stdin, target file out,
    /// overwriting any partial file from an interrupted earlier run.
    fn encode_stage(&self, encoder: &Path, target: &Path) -> StageSpec {
        StageSpec::new(encoder)
            .args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0"])
            .args(&self.config.encoder_args)
            .arg("-y")
            .arg(target)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display_words() {
        assert_eq!(Outcome::Converted.to_string(), "converted");
        assert_eq!(Outcome::Failed.to_string(), "failed");
        assert_eq!(Outcome::Skipped.to_string(), "skipped");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(has_extension(Path::new("a.BRSTM"), "brstm"));
        assert!(has_extension(Path::new("a.brstm"), "brstm"));
        assert!(!has_extension(Path::new("a.brstm.bak"), "brstm"));
        assert!(!has_extension(Path::new("brstm"), "brstm"));
    }

    #[test]
    fn encode_stage_places_overwrite_before_target() {
        let config = DriverConfig::new("in", "out");
        let driver = ConversionDriver::new(config);
        let stage = driver.encode_stage(Path::new("ffmpeg"), Path::new("out/a.m4a"));
        let rendered = format!("{stage:?}");
        assert!(rendered.contains("alac"));
        assert!(rendered.contains("-y"));
    }
}
