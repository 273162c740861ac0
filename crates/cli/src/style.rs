//! Shared styling utilities for terminal output.

use console::Style;

use whatsup_core::MergeStatus;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Create a header-styled string (bold, white).
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Group heading coloured by severity.
pub fn merge_status(status: MergeStatus) -> String {
    let style = match status {
        MergeStatus::NoCommonAncestor => Style::new().dim(),
        MergeStatus::NoConflicts => Style::new().green(),
        MergeStatus::ConflictsWithMaster => Style::new().yellow(),
        MergeStatus::ConflictsWithMe => Style::new().red().bold(),
    };
    style.apply_to(status.to_string()).to_string()
}

/// Marker for a branch that also conflicts with mainline.
pub fn mainline_marker() -> String {
    let style = Style::new().yellow();
    style.apply_to("(M!)").to_string()
}
