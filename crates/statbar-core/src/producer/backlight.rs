//! Screen brightness from the backlight `brightness` attribute.

const ICON: char = '\u{faa7}';

pub fn placeholder() -> String {
    format!("{} ?????", ICON)
}

pub fn format(value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{} {:5}", ICON, v),
        None => placeholder(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_width() {
        assert_eq!(format(Some(4200)), "\u{faa7}  4200");
        assert_eq!(format(Some(96000)), "\u{faa7} 96000");
        assert_eq!(format(Some(4200)).chars().count(), placeholder().chars().count());
    }
}
