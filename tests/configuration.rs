//! DriverConfig builder tests.

use std::path::{Path, PathBuf};

use alacify::{DriverConfig, FailurePolicy};

// ── Builder ────────────────────────────────────────────────────────

#[test]
fn builder_overrides_compose() {
    let config = DriverConfig::new("rips", "flac_out")
        .with_decoder("/opt/vgmstream/vgmstream-cli")
        .with_encoder("ffmpeg6")
        .with_source_extension("bfstm")
        .with_target_extension("flac")
        .with_encoder_args(["-c:a", "flac", "-compression_level", "8"])
        .with_failure_policy(FailurePolicy::FinalStage)
        .with_sort_sources(false);

    assert_eq!(config.decoder, "/opt/vgmstream/vgmstream-cli");
    assert_eq!(config.encoder, "ffmpeg6");
    assert_eq!(config.source_extension, "bfstm");
    assert_eq!(config.target_extension, "flac");
    assert_eq!(
        config.encoder_args,
        ["-c:a", "flac", "-compression_level", "8"]
    );
    assert_eq!(config.failure_policy, FailurePolicy::FinalStage);
    assert!(!config.sort_sources);
}

// ── Target derivation ──────────────────────────────────────────────

#[test]
fn target_is_a_pure_function_of_the_stem() {
    let config = DriverConfig::new("in", "out");

    // Directory stripped, extension swapped, stem untouched.
    assert_eq!(
        config.target_for(Path::new("in/deep/n_circuit32.brstm")),
        PathBuf::from("out/n_circuit32.m4a")
    );
    // Dots inside the stem survive: only the final extension is swapped.
    assert_eq!(
        config.target_for(Path::new("in/title.v2.brstm")),
        PathBuf::from("out/title.v2.m4a")
    );
}

#[test]
fn target_honours_custom_extension() {
    let config = DriverConfig::new("in", "out").with_target_extension(".flac");
    assert_eq!(
        config.target_for(Path::new("in/a.brstm")),
        PathBuf::from("out/a.flac")
    );
}
