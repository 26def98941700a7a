//! Driver configuration.
//!
//! [`DriverConfig`] gathers everything the conversion driver needs: which
//! external programs to run, where to read sources and write targets, and
//! how to judge pipeline failure. Building it explicitly (rather than
//! hard-coding paths) lets tests substitute fake tools and temp directories.
//!
//! # Example
//!
//! ```no_run
//! use alacify::{DriverConfig, FailurePolicy};
//!
//! let config = DriverConfig::new("mkw_music_brstm", "mkw_music_alac")
//!     .with_decoder("/opt/vgmstream/vgmstream-cli")
//!     .with_failure_policy(FailurePolicy::AllStages);
//! ```

use std::path::{Path, PathBuf};

use crate::pipeline::FailurePolicy;

/// Default decoder program, searched on `PATH` when not overridden.
pub const DEFAULT_DECODER: &str = "vgmstream-cli";

/// Default encoder program, searched on `PATH` when not overridden.
pub const DEFAULT_ENCODER: &str = "ffmpeg";

/// Default source extension (BRSTM game-audio streams).
pub const DEFAULT_SOURCE_EXTENSION: &str = "brstm";

/// Default target extension (ALAC in an M4A container).
pub const DEFAULT_TARGET_EXTENSION: &str = "m4a";

/// Configuration for a [`ConversionDriver`](crate::ConversionDriver).
///
/// All settings other than the input and output directories have defaults
/// matching the classic BRSTM-to-ALAC use: `vgmstream-cli` decoding, `ffmpeg`
/// encoding to `-c:a alac`, `.brstm` in, `.m4a` out.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Decode tool: an explicit path, or a bare name to search on `PATH`.
    pub decoder: String,
    /// Encode tool: an explicit path, or a bare name to search on `PATH`.
    pub encoder: String,
    /// Directory containing the source files (read-only input).
    pub input_dir: PathBuf,
    /// Directory the targets are written to (created if missing).
    pub output_dir: PathBuf,
    /// Source file extension, without the leading dot.
    pub source_extension: String,
    /// Target file extension, without the leading dot.
    pub target_extension: String,
    /// Codec arguments inserted between the encoder's input and output
    /// (e.g. `["-c:a", "alac"]`).
    pub encoder_args: Vec<String>,
    /// Which stages' exit statuses decide a file's outcome.
    pub failure_policy: FailurePolicy,
    /// Sort the source listing lexicographically by file name.
    ///
    /// Raw directory order is unspecified and varies by filesystem; sorting
    /// (the default) makes progress output and test expectations stable.
    pub sort_sources: bool,
}

impl DriverConfig {
    /// Create a configuration for the given input and output directories,
    /// with all other settings at their defaults.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            decoder: DEFAULT_DECODER.to_string(),
            encoder: DEFAULT_ENCODER.to_string(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            encoder_args: vec!["-c:a".to_string(), "alac".to_string()],
            failure_policy: FailurePolicy::AllStages,
            sort_sources: true,
        }
    }

    /// Set the decode tool (path or bare program name).
    #[must_use]
    pub fn with_decoder(mut self, decoder: impl Into<String>) -> Self {
        self.decoder = decoder.into();
        self
    }

    /// Set the encode tool (path or bare program name).
    #[must_use]
    pub fn with_encoder(mut self, encoder: impl Into<String>) -> Self {
        self.encoder = encoder.into();
        self
    }

    /// Set the source extension. A leading dot is stripped, and matching
    /// against directory entries is case-insensitive.
    #[must_use]
    pub fn with_source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = normalize_extension(extension.into());
        self
    }

    /// Set the target extension. A leading dot is stripped.
    #[must_use]
    pub fn with_target_extension(mut self, extension: impl Into<String>) -> Self {
        self.target_extension = normalize_extension(extension.into());
        self
    }

    /// Replace the encoder codec arguments.
    ///
    /// These sit between the encoder's stdin input and the output path; the
    /// driver always supplies the input, overwrite, and quiet-logging flags
    /// itself.
    #[must_use]
    pub fn with_encoder_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.encoder_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set how pipeline failure is judged. Defaults to
    /// [`FailurePolicy::AllStages`].
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Control whether the source listing is sorted. Defaults to `true`.
    #[must_use]
    pub fn with_sort_sources(mut self, sort: bool) -> Self {
        self.sort_sources = sort;
        self
    }

    /// Compute the target path for a source file.
    ///
    /// This is a pure function of the source's file stem: the target is
    /// always `<output_dir>/<stem>.<target_extension>`, so re-running the
    /// driver finds earlier results exactly where it would write them.
    pub fn target_for(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir
            .join(format!("{stem}.{}", self.target_extension))
    }
}

fn normalize_extension(extension: String) -> String {
    extension.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_brstm_to_alac() {
        let config = DriverConfig::new("in", "out");
        assert_eq!(config.decoder, "vgmstream-cli");
        assert_eq!(config.encoder, "ffmpeg");
        assert_eq!(config.source_extension, "brstm");
        assert_eq!(config.target_extension, "m4a");
        assert_eq!(config.encoder_args, ["-c:a", "alac"]);
        assert_eq!(config.failure_policy, FailurePolicy::AllStages);
        assert!(config.sort_sources);
    }

    #[test]
    fn extensions_strip_leading_dot() {
        let config = DriverConfig::new("in", "out")
            .with_source_extension(".bfstm")
            .with_target_extension(".flac");
        assert_eq!(config.source_extension, "bfstm");
        assert_eq!(config.target_extension, "flac");
    }

    #[test]
    fn target_swaps_extension_only() {
        let config = DriverConfig::new("in", "out");
        let target = config.target_for(Path::new("in/n_circuit32.brstm"));
        assert_eq!(target, PathBuf::from("out/n_circuit32.m4a"));
    }
}
