//! Audio volume of the default PulseAudio sink.

use crate::collector::parser::SinkState;

const ICON_ON: char = '\u{fa7d}';
const ICON_MUTED: char = '\u{fc5d}';
const ICON_UNKNOWN: char = '\u{fa7e}';

pub fn placeholder() -> String {
    format!("{} {:>4}", ICON_UNKNOWN, "???")
}

/// Mute glyph followed by the left channel volume, right-aligned in four columns.
pub fn format(state: Option<&SinkState>) -> String {
    let Some(state) = state else {
        return placeholder();
    };
    let icon = if state.muted { ICON_MUTED } else { ICON_ON };
    let volume: String = state.volume.chars().take(4).collect();
    format!("{} {:>4}", icon, volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(muted: bool, volume: &str) -> SinkState {
        SinkState {
            muted,
            volume: volume.to_string(),
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(format(Some(&sink(false, "65%"))), "\u{fa7d}  65%");
        assert_eq!(format(Some(&sink(true, "100%"))), "\u{fc5d} 100%");
        assert_eq!(format(Some(&sink(false, "150%"))), "\u{fa7d} 150%");
        assert_eq!(format(None), "\u{fa7e}  ???");
    }

    #[test]
    fn test_width_is_constant() {
        let expected = placeholder().chars().count();
        for v in ["0%", "5%", "65%", "100%", "1000%"] {
            assert_eq!(format(Some(&sink(false, v))).chars().count(), expected);
        }
    }
}
