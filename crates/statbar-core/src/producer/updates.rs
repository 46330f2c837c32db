//! Count of pending package updates reported by an external command.

const ICON: char = '\u{f487}';

pub fn placeholder() -> String {
    format!("{} ??", ICON)
}

/// Counts the non-empty lines of the command output.
pub fn count(output: &str) -> usize {
    output.lines().filter(|l| !l.trim().is_empty()).count()
}

pub fn format(output: Option<&str>) -> String {
    match output {
        Some(out) => format!("{}{:3}", ICON, count(out).min(999)),
        None => placeholder(),
    }
}
