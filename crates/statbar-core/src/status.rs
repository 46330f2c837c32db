//! Slot identities and the assembled status line.

use crate::fmt::truncate_at_boundary;
use crate::producer::{backlight, battery, clock, cpu, keyboard, memory, thermal, updates, volume};

/// Maximum length in bytes of the rendered line accepted by the sink.
pub const MAX_STATUS_LEN: usize = 255;

/// Named holder for one formatted metric fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    KbdLayout,
    CpuLoad,
    CpuTemp,
    Memory,
    Updates,
    Volume,
    Brightness,
    BatStatus,
    BatCapacity,
    Time,
}

impl Slot {
    pub const COUNT: usize = 10;

    /// All slots in render order.
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::KbdLayout,
        Slot::CpuLoad,
        Slot::CpuTemp,
        Slot::Memory,
        Slot::Updates,
        Slot::Volume,
        Slot::Brightness,
        Slot::BatStatus,
        Slot::BatCapacity,
        Slot::Time,
    ];

    /// Stable key used in logs.
    pub fn key(self) -> &'static str {
        match self {
            Slot::KbdLayout => "kbd_layout",
            Slot::CpuLoad => "cpu_load",
            Slot::CpuTemp => "cpu_temp",
            Slot::Memory => "memory",
            Slot::Updates => "updates",
            Slot::Volume => "volume",
            Slot::Brightness => "brightness",
            Slot::BatStatus => "bat_status",
            Slot::BatCapacity => "bat_capacity",
            Slot::Time => "time",
        }
    }

    /// Buffer size of the slot text in bytes.
    pub fn max_len(self) -> usize {
        match self {
            Slot::Time => 31,
            _ => 15,
        }
    }

    /// Text shown while the value is unknown.
    pub fn placeholder(self) -> String {
        match self {
            Slot::KbdLayout => keyboard::PLACEHOLDER.to_string(),
            Slot::CpuLoad => cpu::placeholder(),
            Slot::CpuTemp => thermal::PLACEHOLDER.to_string(),
            Slot::Memory => memory::placeholder(),
            Slot::Updates => updates::placeholder(),
            Slot::Volume => volume::placeholder(),
            Slot::Brightness => backlight::placeholder(),
            Slot::BatStatus => battery::STATUS_UNKNOWN.to_string(),
            Slot::BatCapacity => battery::capacity_placeholder(),
            Slot::Time => clock::PLACEHOLDER.to_string(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Current text of every slot.
///
/// Slots are only mutated through [`StatusLine::update`]; the line itself
/// is re-derived from scratch on every [`StatusLine::render`].
#[derive(Debug, Clone)]
pub struct StatusLine {
    slots: [String; Slot::COUNT],
}

impl StatusLine {
    /// Creates a line with every slot holding its placeholder.
    pub fn new() -> Self {
        Self {
            slots: Slot::ALL.map(Slot::placeholder),
        }
    }

    /// Replaces the text of `slot`, truncated to the slot's buffer size.
    pub fn update(&mut self, slot: Slot, text: impl Into<String>) {
        let mut text = text.into();
        let len = truncate_at_boundary(&text, slot.max_len()).len();
        text.truncate(len);
        self.slots[slot.index()] = text;
    }

    pub fn get(&self, slot: Slot) -> &str {
        &self.slots[slot.index()]
    }

    /// Assembles the full line in the fixed layout.
    pub fn render(&self) -> String {
        let s = |slot: Slot| self.get(slot);
        let line = format!(
            " {} │ {} {} │ {} │ {} │ {} │ {} │ {}{} │ {} ",
            s(Slot::KbdLayout),
            s(Slot::CpuLoad),
            s(Slot::CpuTemp),
            s(Slot::Memory),
            s(Slot::Updates),
            s(Slot::Volume),
            s(Slot::Brightness),
            s(Slot::BatStatus),
            s(Slot::BatCapacity),
            s(Slot::Time),
        );
        truncate_at_boundary(&line, MAX_STATUS_LEN).to_string()
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_order_matches_index() {
        for (i, slot) in Slot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i, "{}", slot);
        }
    }

    #[test]
    fn test_new_line_holds_placeholders() {
        let line = StatusLine::new();
        assert_eq!(line.get(Slot::CpuLoad), "CPU ???");
        assert_eq!(line.get(Slot::KbdLayout), "??");
        assert_eq!(line.get(Slot::BatStatus), "?");
    }

    #[test]
    fn test_render_layout() {
        let mut line = StatusLine::new();
        line.update(Slot::KbdLayout, "US");
        line.update(Slot::CpuLoad, "CPU 12%");
        line.update(Slot::CpuTemp, "42°C");
        line.update(Slot::Memory, "MEM 62%");
        line.update(Slot::Updates, "u");
        line.update(Slot::Volume, "v");
        line.update(Slot::Brightness, "b");
        line.update(Slot::BatStatus, "↓");
        line.update(Slot::BatCapacity, "c");
        line.update(Slot::Time, "Tue Mar 05 02:07pm");

        assert_eq!(
            line.render(),
            " US │ CPU 12% 42°C │ MEM 62% │ u │ v │ b │ ↓c │ Tue Mar 05 02:07pm "
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut line = StatusLine::new();
        line.update(Slot::Memory, "MEM 10%");
        assert_eq!(line.render(), line.render());
    }

    #[test]
    fn test_update_truncates_on_char_boundary() {
        let mut line = StatusLine::new();
        // 14 ASCII bytes followed by a 3-byte glyph: the glyph does not fit in 15 bytes.
        line.update(Slot::Volume, "abcdefghijklmn\u{fa7d}");
        assert_eq!(line.get(Slot::Volume), "abcdefghijklmn");
    }

    #[test]
    fn test_render_never_exceeds_sink_limit() {
        let mut line = StatusLine::new();
        for slot in Slot::ALL {
            line.update(slot, "\u{2588}".repeat(64));
        }
        let rendered = line.render();
        assert!(rendered.len() <= MAX_STATUS_LEN);
    }
}
