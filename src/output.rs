//! @ai:module:intent Format the run summary and the elapsed time
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_summary, format_elapsed
//! @ai:module:depends_on reporter
//! @ai:module:stateless true

use crate::reporter::{RunOutcome, RunSummary};
use colored::Colorize;
use std::time::Duration;

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// @ai:intent Format the run summary as a string
/// @ai:effects pure
pub fn format_summary(summary: &RunSummary, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary).unwrap_or_default(),
        OutputFormat::Text => format_summary_text(summary),
    }
}

/// @ai:intent Format the run summary as a single human-readable line
/// @ai:effects pure
fn format_summary_text(summary: &RunSummary) -> String {
    let status = match summary.outcome {
        RunOutcome::Passed => "OK".green().bold(),
        RunOutcome::Failed => "FAILED".red().bold(),
        RunOutcome::TechnicalError => "ERROR".magenta().bold(),
    };
    let counts = &summary.counts;

    format!(
        "{} {} files, {} passed, {} failed, {} skipped",
        status, counts.files, counts.passed, counts.failed, counts.skipped
    )
}

/// @ai:intent Render a duration as "Time Elapsed HH:MM:SS.ss"
/// @ai:example (3723.456s) -> "Time Elapsed 01:02:03.46"
/// @ai:effects pure
pub fn format_elapsed(elapsed: Duration) -> String {
    let centis = (elapsed.as_millis() + 5) / 10;
    let hours = centis / 360_000;
    let minutes = centis / 6_000 % 60;
    let seconds = centis / 100 % 60;

    format!(
        "Time Elapsed {:02}:{:02}:{:02}.{:02}",
        hours,
        minutes,
        seconds,
        centis % 100
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::VerificationCounts;
    use pretty_assertions::assert_eq;

    fn summary(outcome: RunOutcome) -> RunSummary {
        RunSummary {
            outcome,
            counts: VerificationCounts {
                files: 3,
                passed: 4,
                failed: 1,
                skipped: 2,
            },
            elapsed_secs: 1.5,
        }
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(
            format_elapsed(Duration::from_millis(3_723_456)),
            "Time Elapsed 01:02:03.46"
        );
        assert_eq!(format_elapsed(Duration::ZERO), "Time Elapsed 00:00:00.00");
        assert_eq!(
            format_elapsed(Duration::from_millis(59_999)),
            "Time Elapsed 00:01:00.00"
        );
    }

    #[test]
    fn test_text_summary() {
        colored::control::set_override(false);
        assert_eq!(
            format_summary(&summary(RunOutcome::Failed), OutputFormat::Text),
            "FAILED 3 files, 4 passed, 1 failed, 2 skipped"
        );
    }

    #[test]
    fn test_json_summary() {
        let json = format_summary(&summary(RunOutcome::TechnicalError), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["outcome"], "technical_error");
        assert_eq!(value["files"], 3);
        assert_eq!(value["skipped"], 2);
        assert_eq!(value["elapsed_secs"], 1.5);
    }
}
