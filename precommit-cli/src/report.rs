//! Progress lines and end-of-run output.

use std::path::Path;

use console::style;
use precommit::{RunReport, Stage};

/// Progress line printed when a stage starts, if any.
///
/// Configure and Build share the "Building..." line.
pub(crate) fn progress_message(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::Format => Some("Formatting..."),
        Stage::Configure => Some("Building..."),
        Stage::Build => None,
        Stage::Test => Some("Testing..."),
    }
}

/// Print the progress line for `stage` to stderr.
pub(crate) fn print_progress(stage: Stage) {
    if let Some(message) = progress_message(stage) {
        eprintln!("{} {}", style("▶").cyan(), message);
    }
}

/// Hint printed when the environment check rejects the run.
pub(crate) fn print_environment_hint(project_root: &Path) {
    eprintln!(
        "{} Start the development container with the project mounted at {}, \
         or pass --project-root",
        style("💡").yellow(),
        style(project_root.display()).cyan()
    );
}

/// Human-readable summary on stderr.
pub(crate) fn print_summary(report: &RunReport) {
    if report.stages.is_empty() {
        eprintln!("{} Nothing to do, every stage skipped", style("ℹ").blue());
        return;
    }

    if report.is_clean() {
        eprintln!(
            "\n{} {} stage(s) completed",
            style("✓").green().bold(),
            report.stages.len()
        );
        return;
    }

    eprintln!(
        "\n{} {} command(s) exited non-zero:",
        style("⚠").yellow().bold(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!(
            "    {} {} {}",
            style("•").dim(),
            failure.command,
            style(format!("(exit {})", failure.code)).red()
        );
    }
}

/// Run report as a JSON document.
pub(crate) fn report_json(report: &RunReport) -> serde_json::Value {
    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|failure| {
            serde_json::json!({
                "command": failure.command,
                "code": failure.code,
            })
        })
        .collect();

    serde_json::json!({
        "stages": report.stages.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        "clean": report.is_clean(),
        "failures": failures,
    })
}
