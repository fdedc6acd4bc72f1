//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Human-readable status goes to stderr so stdout stays pipeable JSON.

use colored::Colorize;

use crate::domain::Change;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark) to stderr
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold) to stderr
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}", msg.to_string().cyan().bold());
}

/// Print one change line: `+` for new keys, `~` for changed ones, `-` for tombstones
pub fn change(change: &Change) {
    match change {
        Change::Added { value, .. } if value.is_null() => {
            eprintln!("  {} {}", "-".red(), change)
        }
        Change::Added { .. } => eprintln!("  {} {}", "+".green(), change),
        Change::Changed { .. } => eprintln!("  {} {}", "~".yellow(), change),
    }
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
