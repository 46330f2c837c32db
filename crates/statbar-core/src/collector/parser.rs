//! Parsers for metric sources.
//!
//! These are pure functions over the text of `/proc` files, sysfs
//! attributes and tool output. They are designed to be easily testable
//! with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Aggregate CPU time counters from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCounters {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
}

impl CpuCounters {
    /// Sum of all seven counters.
    pub fn total(&self) -> u64 {
        self.busy() + self.idle + self.iowait
    }

    /// Time spent doing work (idle and iowait excluded).
    pub fn busy(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Format: `cpu  user nice system idle iowait irq softirq [steal guest guest_nice]`
pub fn parse_cpu_counters(content: &str) -> Result<CpuCounters, ParseError> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("missing aggregate cpu line"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .take(7)
        .map(|s| s.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|e| ParseError::new(format!("invalid cpu counter: {}", e)))?;

    if values.len() < 7 {
        return Err(ParseError::new(format!(
            "not enough cpu counters: expected 7, got {}",
            values.len()
        )));
    }

    Ok(CpuCounters {
        user: values[0],
        nice: values[1],
        system: values[2],
        idle: values[3],
        iowait: values[4],
        irq: values[5],
        softirq: values[6],
    })
}

/// Parsed data from `/proc/meminfo` (values in kB).
#[derive(Debug, Clone, Default)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_available: u64,
    pub buffers: u64,
    pub cached: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen_total = false;

    let parse_kb = |line: &str| -> Result<u64, ParseError> {
        line.split_whitespace()
            .nth(1)
            .ok_or_else(|| ParseError::new(format!("missing value in '{}'", line)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid value in '{}'", line)))
    };

    for line in content.lines() {
        if line.starts_with("MemTotal:") {
            info.mem_total = parse_kb(line)?;
            seen_total = true;
        } else if line.starts_with("MemFree:") {
            info.mem_free = parse_kb(line)?;
        } else if line.starts_with("MemAvailable:") {
            info.mem_available = parse_kb(line)?;
        } else if line.starts_with("Buffers:") {
            info.buffers = parse_kb(line)?;
        } else if line.starts_with("Cached:") {
            info.cached = parse_kb(line)?;
        }
    }

    if !seen_total {
        return Err(ParseError::new("missing MemTotal"));
    }

    Ok(info)
}

/// Parses a single integer sysfs attribute such as `capacity` or `brightness`.
pub fn parse_int(content: &str) -> Result<i64, ParseError> {
    let value = content.trim();
    value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid integer '{}'", value)))
}

/// State of one PulseAudio sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkState {
    pub muted: bool,
    /// Left channel volume as printed by pactl, e.g. `"65%"`.
    pub volume: String,
}

/// Extracts the state of `sink_name` from `pactl list sinks` output.
///
/// Each sink block starts with a `Sink #N` header and carries indented
/// `Name:`, `Mute:` and `Volume:` lines. The left channel percentage is
/// the fifth whitespace-separated token of the `Volume:` line.
pub fn parse_pactl_sinks(content: &str, sink_name: &str) -> Result<SinkState, ParseError> {
    let sink_name = sink_name.trim();
    let mut in_sink = false;
    let mut muted = None;
    let mut volume = None;

    for line in content.lines() {
        let line = line.trim_start();
        if let Some(name) = line.strip_prefix("Name:") {
            in_sink = name.trim() == sink_name;
        } else if !in_sink {
            continue;
        } else if let Some(mute) = line.strip_prefix("Mute:") {
            muted = Some(mute.trim() == "yes");
        } else if line.starts_with("Volume:") {
            volume = line.split_whitespace().nth(4).map(str::to_string);
        }
    }

    match (muted, volume) {
        (Some(muted), Some(volume)) => Ok(SinkState { muted, volume }),
        _ => Err(ParseError::new(format!("sink '{}' not listed", sink_name))),
    }
}

/// Parses the `layout:` line of `setxkbmap -query` into the group list.
pub fn parse_layouts(content: &str) -> Result<Vec<String>, ParseError> {
    let layouts = content
        .lines()
        .find_map(|line| line.strip_prefix("layout:"))
        .ok_or_else(|| ParseError::new("missing layout line"))?;

    Ok(layouts
        .trim()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_counters() {
        let content = "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
";
        let cpu = parse_cpu_counters(content).unwrap();
        assert_eq!(cpu.user, 10000);
        assert_eq!(cpu.softirq, 100);
        assert_eq!(cpu.busy(), 10000 + 500 + 3000 + 200 + 100);
        assert_eq!(cpu.total(), 94800);
    }

    #[test]
    fn test_parse_cpu_counters_short_line() {
        let err = parse_cpu_counters("cpu 1 2 3\n").unwrap_err();
        assert!(err.message.contains("expected 7"));
    }

    #[test]
    fn test_parse_cpu_counters_missing_aggregate() {
        assert!(parse_cpu_counters("cpu0 1 2 3 4 5 6 7\n").is_err());
        assert!(parse_cpu_counters("").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
";
        let info = parse_meminfo(content).unwrap();

        assert_eq!(info.mem_total, 16384000);
        assert_eq!(info.mem_free, 8192000);
        assert_eq!(info.mem_available, 12000000);
        assert_eq!(info.buffers, 512000);
        assert_eq!(info.cached, 2048000);
    }

    #[test]
    fn test_parse_meminfo_requires_total() {
        assert!(parse_meminfo("MemFree: 10 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: lots kB\n").is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("87\n").unwrap(), 87);
        assert_eq!(parse_int("  -3 ").unwrap(), -3);
        assert!(parse_int("").is_err());
        assert!(parse_int("Full\n").is_err());
    }

    const PACTL_SINKS: &str = "\
Sink #0
\tState: SUSPENDED
\tName: alsa_output.pci-0000_00_1f.3.analog-stereo
\tMute: no
\tVolume: front-left: 42598 /  65% / -11.23 dB,   front-right: 42598 /  65% / -11.23 dB
\t        balance 0.00
\tBase Volume: 65536 / 100% / 0.00 dB
Sink #1
\tState: RUNNING
\tName: bluez_sink.00_1B_66.a2dp_sink
\tMute: yes
\tVolume: front-left: 65536 / 100% / 0.00 dB,   front-right: 65536 / 100% / 0.00 dB
\tBase Volume: 65536 / 100% / 0.00 dB
";

    #[test]
    fn test_parse_pactl_sinks_picks_named_sink() {
        let analog =
            parse_pactl_sinks(PACTL_SINKS, "alsa_output.pci-0000_00_1f.3.analog-stereo\n").unwrap();
        assert_eq!(
            analog,
            SinkState {
                muted: false,
                volume: "65%".to_string()
            }
        );

        let bt = parse_pactl_sinks(PACTL_SINKS, "bluez_sink.00_1B_66.a2dp_sink").unwrap();
        assert!(bt.muted);
        assert_eq!(bt.volume, "100%");
    }

    #[test]
    fn test_parse_pactl_sinks_unknown_sink() {
        assert!(parse_pactl_sinks(PACTL_SINKS, "nope").is_err());
        assert!(parse_pactl_sinks("", "nope").is_err());
    }

    #[test]
    fn test_parse_layouts() {
        let content = "\
rules:      evdev
model:      pc105
layout:     us,ru
options:    grp:alt_shift_toggle
";
        assert_eq!(parse_layouts(content).unwrap(), vec!["us", "ru"]);
        assert!(parse_layouts("rules: evdev\n").is_err());
    }
}
