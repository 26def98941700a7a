//! Multi-stage external process pipelines.
//!
//! [`run_pipeline`] spawns an ordered sequence of external programs, wiring
//! each stage's stdout into the next stage's stdin (the shell's `a | b`),
//! then waits for every stage and records every stage's exit status in a
//! [`PipelineReport`]. Callers choose a [`FailurePolicy`] to decide which
//! statuses count.
//!
//! Capturing all statuses matters: an `a | b` shell pipeline judged only by
//! `b`'s exit code will happily report success when `a` died and `b` encoded
//! an empty stream. [`FailurePolicy::AllStages`] catches that.
//!
//! # Example
//!
//! ```no_run
//! use alacify::{FailurePolicy, StageSpec, run_pipeline};
//!
//! # fn main() -> Result<(), alacify::AlacifyError> {
//! let report = run_pipeline(&[
//!     StageSpec::new("vgmstream-cli").arg("-o").arg("-").arg("input.brstm"),
//!     StageSpec::new("ffmpeg")
//!         .args(["-hide_banner", "-loglevel", "error", "-i", "pipe:0"])
//!         .args(["-c:a", "alac", "-y", "output.m4a"]),
//! ])?;
//! assert!(report.succeeded(FailurePolicy::AllStages));
//! # Ok(())
//! # }
//! ```

use std::ffi::{OsStr, OsString};
use std::process::{Child, Command, ExitStatus, Stdio};

use crate::error::AlacifyError;

/// Which stages' exit statuses decide whether a pipeline succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Every stage must exit 0. This is the default: a decoder that dies
    /// mid-stream fails the pipeline even if the encoder shrugged and
    /// exited 0 on the truncated input.
    #[default]
    AllStages,
    /// Only the final stage's exit status counts. This reproduces the
    /// classic shell-pipeline behavior (`a | b; test $?`), where an
    /// upstream failure can be silently masked.
    FinalStage,
}

/// Specification of one stage in a pipeline: a program and its arguments.
#[derive(Debug, Clone)]
pub struct StageSpec {
    program: OsString,
    args: Vec<OsString>,
}

impl StageSpec {
    /// Create a stage for the given program.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    #[must_use]
    pub fn args(mut self, args: impl IntoIterator<Item = impl AsRef<OsStr>>) -> Self {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// The program, for diagnostics.
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    fn program_name(&self) -> String {
        std::path::Path::new(&self.program)
            .file_name()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .into_owned()
    }
}

/// Exit status of one completed stage.
#[derive(Debug, Clone)]
pub struct StageStatus {
    /// The stage's program name (final path component).
    pub program: String,
    /// The stage's exit status.
    pub status: ExitStatus,
}

impl StageStatus {
    /// Whether this stage exited 0.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Per-stage results of a completed pipeline, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// One entry per stage, in the order the stages were given.
    pub stages: Vec<StageStatus>,
}

impl PipelineReport {
    /// Judge the pipeline under the given policy.
    pub fn succeeded(&self, policy: FailurePolicy) -> bool {
        match policy {
            FailurePolicy::AllStages => self.stages.iter().all(StageStatus::success),
            FailurePolicy::FinalStage => self.stages.last().is_some_and(StageStatus::success),
        }
    }

    /// The first stage that exited nonzero, if any.
    pub fn first_failure(&self) -> Option<&StageStatus> {
        self.stages.iter().find(|stage| !stage.success())
    }
}

/// Run a sequence of stages as a single pipeline and wait for all of them.
///
/// The first stage's stdin and the last stage's stdout are null; every
/// stage's stderr is discarded (the decoder's diagnostics are noise here,
/// and the encoder is expected to be invoked with its own quiet flags).
/// Stages run concurrently in the usual pipeline sense, producer feeding
/// consumer, but the call blocks until every stage has exited.
///
/// # Errors
///
/// - [`AlacifyError::EmptyPipeline`] if `stages` is empty.
/// - [`AlacifyError::StageSpawn`] if a stage cannot be started; stages
///   already spawned are reaped before returning.
/// - [`AlacifyError::Io`] if waiting on a child fails.
///
/// A stage that runs and exits nonzero is *not* an error: its status is
/// recorded in the returned [`PipelineReport`].
pub fn run_pipeline(stages: &[StageSpec]) -> Result<PipelineReport, AlacifyError> {
    if stages.is_empty() {
        return Err(AlacifyError::EmptyPipeline);
    }

    let mut children: Vec<(String, Child)> = Vec::with_capacity(stages.len());
    let mut upstream: Option<std::process::ChildStdout> = None;

    for (index, spec) in stages.iter().enumerate() {
        let is_last = index == stages.len() - 1;

        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stderr(Stdio::null());

        match upstream.take() {
            Some(stdout) => command.stdin(Stdio::from(stdout)),
            None => command.stdin(Stdio::null()),
        };

        if is_last {
            command.stdout(Stdio::null());
        } else {
            command.stdout(Stdio::piped());
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(error) => {
                // Reap what we already started so nothing is left behind.
                for (_, mut running) in children {
                    let _ = running.kill();
                    let _ = running.wait();
                }
                return Err(AlacifyError::StageSpawn {
                    program: spec.program_name(),
                    reason: error.to_string(),
                });
            }
        };

        if !is_last {
            upstream = child.stdout.take();
        }

        children.push((spec.program_name(), child));
    }

    log::debug!(
        "pipeline started: {}",
        children
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    );

    let mut report = PipelineReport {
        stages: Vec::with_capacity(children.len()),
    };
    for (program, mut child) in children {
        let status = child.wait()?;
        log::debug!("stage {program} exited with {status}");
        report.stages.push(StageStatus { program, status });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pipeline_is_rejected() {
        let result = run_pipeline(&[]);
        assert!(matches!(result, Err(AlacifyError::EmptyPipeline)));
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let result = run_pipeline(&[StageSpec::new("alacify-no-such-program-xyz")]);
        match result {
            Err(AlacifyError::StageSpawn { program, .. }) => {
                assert_eq!(program, "alacify-no-such-program-xyz");
            }
            other => panic!("expected StageSpawn, got {other:?}"),
        }
    }

    #[test]
    fn single_stage_success() {
        let report = run_pipeline(&[StageSpec::new("true")]).expect("pipeline should run");
        assert_eq!(report.stages.len(), 1);
        assert!(report.succeeded(FailurePolicy::AllStages));
        assert!(report.succeeded(FailurePolicy::FinalStage));
        assert!(report.first_failure().is_none());
    }

    #[test]
    fn upstream_failure_is_policy_dependent() {
        // `false | cat`: the shell idiom this crate exists to not repeat.
        let report = run_pipeline(&[StageSpec::new("false"), StageSpec::new("cat")])
            .expect("pipeline should run");
        assert!(!report.succeeded(FailurePolicy::AllStages));
        assert!(report.succeeded(FailurePolicy::FinalStage));
        assert_eq!(report.first_failure().map(|s| s.program.as_str()), Some("false"));
    }

    #[test]
    fn final_stage_failure_fails_both_policies() {
        let report = run_pipeline(&[StageSpec::new("true"), StageSpec::new("false")])
            .expect("pipeline should run");
        assert!(!report.succeeded(FailurePolicy::AllStages));
        assert!(!report.succeeded(FailurePolicy::FinalStage));
    }

    #[test]
    fn stdout_flows_between_stages() {
        // `echo hi | grep hi` exits 0; `echo hi | grep nope` exits 1.
        let hit = run_pipeline(&[
            StageSpec::new("echo").arg("hi"),
            StageSpec::new("grep").arg("hi"),
        ])
        .expect("pipeline should run");
        assert!(hit.succeeded(FailurePolicy::AllStages));

        let miss = run_pipeline(&[
            StageSpec::new("echo").arg("hi"),
            StageSpec::new("grep").arg("nope"),
        ])
        .expect("pipeline should run");
        assert!(!miss.succeeded(FailurePolicy::FinalStage));
    }
}
