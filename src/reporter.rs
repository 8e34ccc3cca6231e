//! @ai:module:intent Thread-safe aggregation of the run outcome and console reporting
//! @ai:module:layer application
//! @ai:module:public_api Reporter, RunOutcome, RunSummary, Severity, ReportLine, VerificationCounts
//! @ai:module:depends_on error
//! @ai:module:stateless false
//! @ai:module:thread_safe true

use crate::error::Error;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// @ai:intent Aggregate outcome of a run, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Passed,
    Failed,
    TechnicalError,
}

impl RunOutcome {
    /// @ai:intent Process exit code for the outcome
    /// @ai:effects pure
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Passed => 0,
            RunOutcome::Failed => 1,
            RunOutcome::TechnicalError => 2,
        }
    }
}

/// @ai:intent Severity column of a reported line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Message,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Message => "message",
        }
    }
}

/// @ai:intent One line of a failure report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub severity: Severity,
    pub message: String,
}

impl ReportLine {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Message,
            message: message.into(),
        }
    }
}

/// @ai:intent Counters of what the run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerificationCounts {
    pub files: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// @ai:intent Final result of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    #[serde(flatten)]
    pub counts: VerificationCounts,
    pub elapsed_secs: f64,
}

struct ReporterState {
    outcome: RunOutcome,
    announced: HashSet<String>,
    counts: VerificationCounts,
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

/// @ai:intent Single owner of the outcome, the announced titles and the output streams
/// @ai:invariant the outcome only ever escalates
pub struct Reporter {
    title_root: PathBuf,
    state: Mutex<ReporterState>,
}

impl Reporter {
    /// @ai:intent Create a reporter writing to stdout and stderr
    /// @ai:effects pure
    pub fn stdio(title_root: &Path) -> Self {
        Self::with_writers(
            title_root,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// @ai:intent Create a reporter writing to the given streams
    /// @ai:effects pure
    pub fn with_writers(
        title_root: &Path,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            title_root: title_root.to_path_buf(),
            state: Mutex::new(ReporterState {
                outcome: RunOutcome::Passed,
                announced: HashSet::new(),
                counts: VerificationCounts::default(),
                out,
                err,
            }),
        }
    }

    /// @ai:intent Title of a file: its path relative to the checked directory
    /// @ai:effects pure
    fn title(&self, file: &Path) -> String {
        file.strip_prefix(&self.title_root)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(file)
            .display()
            .to_string()
    }

    /// @ai:intent Print "Processing <title>..." once per file
    /// @ai:effects state:write, io
    pub fn announce(&self, file: &Path) {
        let title = self.title(file);
        let mut state = self.state.lock();

        if state.announced.insert(title.clone()) {
            state.counts.files += 1;
            let _ = writeln!(state.out, "    Processing {}...", title);
            let _ = state.out.flush();
        }
    }

    /// @ai:effects state:write
    pub fn record_pass(&self) {
        self.state.lock().counts.passed += 1;
    }

    /// @ai:effects state:write
    pub fn record_skip(&self) {
        self.state.lock().counts.skipped += 1;
    }

    /// @ai:intent Print a failed verification and escalate the outcome to Failed
    /// @ai:pre lines is not empty
    /// @ai:effects state:write, io
    pub fn report_failure(&self, file: &Path, line_index: usize, lines: &[ReportLine]) {
        let mut state = self.state.lock();
        let state = &mut *state;

        let _ = state.out.flush();
        for line in lines {
            let _ = writeln!(
                state.err,
                "{}({}): {:7}: {}",
                file.display(),
                line_index + 1,
                line.severity.as_str(),
                line.message
            );
        }
        let _ = state.err.flush();

        state.counts.failed += 1;
        state.outcome = state.outcome.max(RunOutcome::Failed);
    }

    /// @ai:intent Print a technical error and escalate the outcome to TechnicalError
    /// @ai:effects state:write, io
    pub fn report_technical(&self, error: &Error) {
        let mut state = self.state.lock();
        let state = &mut *state;

        let _ = state.out.flush();
        let _ = writeln!(state.err, "ERROR: {}", error);
        let _ = state.err.flush();

        state.outcome = RunOutcome::TechnicalError;
    }

    /// @ai:intent Write a line to the standard stream under the reporting lock
    /// @ai:effects io
    pub fn print(&self, text: &str) {
        let mut state = self.state.lock();
        let _ = writeln!(state.out, "{}", text);
        let _ = state.out.flush();
    }

    pub fn outcome(&self) -> RunOutcome {
        self.state.lock().outcome
    }

    pub fn counts(&self) -> VerificationCounts {
        self.state.lock().counts
    }

    /// @ai:intent Snapshot of the outcome and counters
    /// @ai:effects pure
    pub fn summary(&self, elapsed: Duration) -> RunSummary {
        let state = self.state.lock();
        RunSummary {
            outcome: state.outcome,
            counts: state.counts,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedBuffer;

    fn reporter() -> (Reporter, SharedBuffer, SharedBuffer) {
        let out = SharedBuffer::default();
        let err = SharedBuffer::default();
        let reporter = Reporter::with_writers(
            Path::new("/work/Test"),
            Box::new(out.clone()),
            Box::new(err.clone()),
        );
        (reporter, out, err)
    }

    #[test]
    fn test_announce_once_per_file() {
        let (reporter, out, _) = reporter();

        reporter.announce(Path::new("/work/Test/a/Foo.cpp"));
        reporter.announce(Path::new("/work/Test/a/Foo.cpp"));
        reporter.announce(Path::new("/work/Test/Bar.cpp"));

        let expected_foo = format!("    Processing {}...", Path::new("a").join("Foo.cpp").display());
        assert_eq!(out.contents().lines().filter(|l| *l == expected_foo).count(), 1);
        assert!(out.contents().contains("    Processing Bar.cpp..."));
        assert_eq!(reporter.counts().files, 2);
    }

    #[test]
    fn test_single_file_title_falls_back_to_full_path() {
        let (reporter, out, _) = reporter();

        reporter.announce(Path::new("/work/Test"));

        assert!(out.contents().contains("Processing /work/Test..."));
    }

    #[test]
    fn test_failure_format_and_escalation() {
        let (reporter, _, err) = reporter();

        reporter.report_failure(
            Path::new("Foo.cpp"),
            9,
            &[
                ReportLine::error("Expected error not found."),
                ReportLine::message("Expected error: x"),
            ],
        );

        assert_eq!(
            err.contents(),
            "Foo.cpp(10): error  : Expected error not found.\nFoo.cpp(10): message: Expected error: x\n"
        );
        assert_eq!(reporter.outcome(), RunOutcome::Failed);
        assert_eq!(reporter.counts().failed, 1);
    }

    #[test]
    fn test_outcome_never_downgrades() {
        let (reporter, _, err) = reporter();

        reporter.report_technical(&Error::BuildFailed);
        reporter.report_failure(Path::new("Foo.cpp"), 0, &[ReportLine::error("x")]);

        assert_eq!(reporter.outcome(), RunOutcome::TechnicalError);
        assert_eq!(reporter.outcome().exit_code(), 2);
        assert!(err.contents().starts_with("ERROR: The solution did not build successfully."));
    }

    #[test]
    fn test_passed_by_default() {
        let (reporter, _, err) = reporter();

        reporter.record_pass();
        reporter.record_skip();

        assert_eq!(reporter.outcome(), RunOutcome::Passed);
        assert_eq!(reporter.outcome().exit_code(), 0);
        assert!(err.contents().is_empty());
        assert_eq!(
            reporter.counts(),
            VerificationCounts {
                files: 0,
                passed: 1,
                failed: 0,
                skipped: 1
            }
        );
    }
}
