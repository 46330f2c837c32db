//! Battery charge state and capacity from a power-supply directory.

/// Capacity icons from empty to full.
pub const CAPACITY_ICONS: [char; 10] = [
    '\u{f579}', '\u{f57a}', '\u{f57b}', '\u{f57c}', '\u{f57d}', '\u{f57e}', '\u{f57f}',
    '\u{f580}', '\u{f581}', '\u{f578}',
];
const CAPACITY_UNKNOWN: char = '\u{f582}';

pub const STATUS_CHARGING: &str = "↑";
pub const STATUS_DISCHARGING: &str = "↓";
pub const STATUS_OTHER: &str = " ";
pub const STATUS_UNKNOWN: &str = "?";

/// Picks the icon for a 0–100 percentage; out-of-range values are clamped.
pub fn capacity_icon(percent: i64) -> char {
    let n = CAPACITY_ICONS.len() as i64;
    let index = (percent / (100 / n)).clamp(0, n - 1);
    CAPACITY_ICONS[index as usize]
}

pub fn capacity_placeholder() -> String {
    format!("{} ??%", CAPACITY_UNKNOWN)
}

pub fn format_capacity(percent: Option<i64>) -> String {
    match percent {
        Some(p) => format!("{}{:3}%", capacity_icon(p), p.clamp(0, 100)),
        None => capacity_placeholder(),
    }
}

/// Maps the `status` attribute to a one-column glyph.
///
/// The text is cut at the first non-printable byte and lower-cased, so
/// `"Charging\n"` and `"CHARGING"` are the same state.
pub fn format_status(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return STATUS_UNKNOWN.to_string();
    };
    let state: String = raw
        .chars()
        .take_while(|c| c.is_ascii_graphic() || *c == ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    match state.as_str() {
        "charging" => STATUS_CHARGING,
        "discharging" => STATUS_DISCHARGING,
        _ => STATUS_OTHER,
    }
    .to_string()
}
