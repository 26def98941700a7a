use std::{path::PathBuf, sync::Arc};

use alacify::{
    ConversionDriver, DriverConfig, FailurePolicy, FileStatus, Outcome, RunSummary,
    StatusCallback, probe_tool,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  alacify convert mkw_music_brstm --out mkw_music_alac\n  alacify convert rips --out alac --decoder /opt/vgmstream/vgmstream-cli --progress\n  alacify check\n  alacify completions zsh > _alacify";

#[derive(Debug, Parser)]
#[command(
    name = "alacify",
    version,
    about = "Batch-convert game audio streams to Apple Lossless via vgmstream-cli and ffmpeg",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar alongside per-file status lines.
    #[arg(long)]
    progress: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert every source file without an existing target.
    #[command(
        about = "Convert a directory of audio streams",
        after_help = "Examples:\n  alacify convert mkw_music_brstm --out mkw_music_alac\n  alacify convert rips --out flac_out --codec flac --target-ext flac\n  alacify convert rips --out alac --lenient --no-sort"
    )]
    Convert {
        /// Input directory containing the source files.
        input: PathBuf,
        /// Output directory for converted files (created if missing).
        #[arg(long)]
        out: PathBuf,
        /// Decode tool: a path, or a name searched on PATH.
        #[arg(long, default_value = alacify::DEFAULT_DECODER)]
        decoder: String,
        /// Encode tool: a path, or a name searched on PATH.
        #[arg(long, default_value = alacify::DEFAULT_ENCODER)]
        encoder: String,
        /// Source file extension.
        #[arg(long, default_value = alacify::DEFAULT_SOURCE_EXTENSION)]
        source_ext: String,
        /// Target file extension.
        #[arg(long, default_value = alacify::DEFAULT_TARGET_EXTENSION)]
        target_ext: String,
        /// Target audio codec (passed to the encoder as `-c:a <codec>`).
        #[arg(long, default_value = "alac")]
        codec: String,
        /// Judge each file by the encoder's exit status only, ignoring
        /// decoder failures (the classic shell-pipeline behavior).
        #[arg(long)]
        lenient: bool,
        /// Process files in raw directory order instead of sorted by name.
        #[arg(long)]
        no_sort: bool,
        /// Print the run summary as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Verify that the decode and encode tools are available.
    #[command(
        about = "Check external tool availability",
        after_help = "Examples:\n  alacify check\n  alacify check --decoder /opt/vgmstream/vgmstream-cli --json"
    )]
    Check {
        /// Decode tool: a path, or a name searched on PATH.
        #[arg(long, default_value = alacify::DEFAULT_DECODER)]
        decoder: String,
        /// Encode tool: a path, or a name searched on PATH.
        #[arg(long, default_value = alacify::DEFAULT_ENCODER)]
        encoder: String,
        /// Output the report as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Renders per-file status lines, routing them through the progress bar
/// when one is active so the bar does not mangle them.
struct TerminalStatus {
    bar: Option<ProgressBar>,
}

impl TerminalStatus {
    fn glyph_line(status: &FileStatus) -> String {
        let prefix = format!("[{}/{}]", status.index, status.total);
        let (glyph, word) = match status.outcome {
            Outcome::Converted => ("✓".green().bold(), "converted".green()),
            Outcome::Failed => ("✗".red().bold(), "failed".red()),
            Outcome::Skipped => ("»".yellow().bold(), "skipped".yellow()),
        };
        format!("{} {glyph} {word}: {}", prefix.dimmed(), status.stem)
    }
}

impl StatusCallback for TerminalStatus {
    fn on_file(&self, status: &FileStatus) {
        let line = Self::glyph_line(status);
        match &self.bar {
            Some(bar) => {
                bar.println(line);
                bar.inc(1);
            }
            None => println!("{line}"),
        }
    }
}

fn print_summary(summary: &RunSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "total": summary.total,
            "converted": summary.converted,
            "failed": summary.failed,
            "skipped": summary.skipped,
            "targets_on_disk": summary.targets_on_disk,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!();
    println!("Source files:    {}", summary.total);
    println!(
        "Converted:       {}",
        summary.converted.to_string().green()
    );
    println!(
        "Skipped:         {}",
        summary.skipped.to_string().yellow()
    );
    if summary.failed > 0 {
        println!("Failed:          {}", summary.failed.to_string().red());
    }
    // Re-counted from the output directory, so it includes earlier runs.
    println!("Targets on disk: {}", summary.targets_on_disk);
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            out,
            decoder,
            encoder,
            source_ext,
            target_ext,
            codec,
            lenient,
            no_sort,
            json,
        } => {
            let policy = if lenient {
                FailurePolicy::FinalStage
            } else {
                FailurePolicy::AllStages
            };

            let config = DriverConfig::new(input, out)
                .with_decoder(decoder)
                .with_encoder(encoder)
                .with_source_extension(source_ext)
                .with_target_extension(target_ext)
                .with_encoder_args(["-c:a".to_string(), codec])
                .with_failure_policy(policy)
                .with_sort_sources(!no_sort);

            if cli.global.verbose {
                eprintln!(
                    "{} {} -> {} ({} -> {})",
                    "converting".cyan().bold(),
                    config.input_dir.display(),
                    config.output_dir.display(),
                    config.source_extension,
                    config.target_extension,
                );
            }

            let driver = ConversionDriver::new(config);

            let bar = if cli.global.progress && !json {
                let total = driver.scan_sources().map(|s| s.len()).unwrap_or(0);
                let pb = ProgressBar::new(total as u64);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };

            let status = Arc::new(TerminalStatus {
                bar: bar.clone(),
            });
            let driver = if json {
                driver
            } else {
                driver.with_status(status)
            };

            let summary = driver.run()?;

            if let Some(pb) = bar {
                pb.finish_with_message("done");
            }

            print_summary(&summary, json)?;
        }
        Commands::Check {
            decoder,
            encoder,
            json,
        } => {
            let infos = [probe_tool(&decoder), probe_tool(&encoder)];

            if json {
                let payload: Vec<_> = infos
                    .iter()
                    .map(|info| {
                        json!({
                            "name": info.name,
                            "available": info.available,
                            "path": info.path.as_ref().map(|p| p.display().to_string()),
                            "version": info.version,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for info in &infos {
                    if info.available {
                        let path = info
                            .path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default();
                        let version = info.version.as_deref().unwrap_or("version unknown");
                        println!("{} {} ({version}) at {path}", "found".green().bold(), info.name);
                    } else {
                        println!("{} {}", "missing".red().bold(), info.name);
                    }
                }
            }

            if infos.iter().any(|info| !info.available) {
                return Err("one or more external tools are missing".into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "alacify", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStatus, Outcome, TerminalStatus};

    #[test]
    fn glyph_line_carries_index_and_stem() {
        colored::control::set_override(false);
        let line = TerminalStatus::glyph_line(&FileStatus {
            index: 3,
            total: 12,
            stem: "n_circuit32".to_string(),
            outcome: Outcome::Converted,
        });
        assert!(line.starts_with("[3/12]"));
        assert!(line.ends_with("converted: n_circuit32"));
    }

    #[test]
    fn glyph_line_distinguishes_outcomes() {
        colored::control::set_override(false);
        for (outcome, word) in [
            (Outcome::Converted, "converted"),
            (Outcome::Failed, "failed"),
            (Outcome::Skipped, "skipped"),
        ] {
            let line = TerminalStatus::glyph_line(&FileStatus {
                index: 1,
                total: 1,
                stem: "a".to_string(),
                outcome,
            });
            assert!(line.contains(word), "{line} should contain {word}");
        }
    }
}
