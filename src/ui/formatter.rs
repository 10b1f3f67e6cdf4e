//! Pure formatting functions for UI output.
//!
//! Progress lines go to stdout, errors and warnings to stderr.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::orchestration::{bump_commit_message, ReleasePlan};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning and, when one exists, the command that finishes the step.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
    if let Some(fix) = warning.manual_fix() {
        eprintln!("  To finish this step by hand, run:\n    {}", style(fix).cyan());
    }
}

/// Render the steps a release would perform.
pub fn format_release_plan(plan: &ReleasePlan, publish_command: &str) -> Vec<String> {
    vec![
        format!("create annotated tag {}", plan.tag),
        format!("run `{}`", publish_command),
        format!("push {} to {}", plan.tag, plan.remote),
        format!("set version {} -> {}", plan.current, plan.next_version),
        format!("commit \"{}\"", bump_commit_message(&plan.next_version)),
        format!("push the commit to {}", plan.remote),
    ]
}

/// Display the release plan for a dry run.
pub fn display_release_plan(plan: &ReleasePlan, publish_command: &str) {
    println!(
        "\n{}",
        style(format!("Release plan for {}:", plan.version)).bold()
    );
    for (i, step) in format_release_plan(plan, publish_command).iter().enumerate() {
        println!("  Step {}: {}", i + 1, step);
    }
}
