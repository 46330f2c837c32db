//! Runtime configuration of the engine.
//!
//! The daemon maps its command-line flags onto [`Config`]; the defaults
//! describe a typical Linux laptop running PulseAudio and X11.

use std::path::PathBuf;
use std::time::Duration;

/// How a listener command's notifications reach the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeMode {
    /// The listener's stdout pipe joins the epoll set; everything runs on one thread.
    #[default]
    Descriptor,
    /// A dedicated thread blocks on the listener and updates the board under the status mutex.
    Worker,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base path of the proc filesystem.
    pub proc_path: PathBuf,
    /// Thermal zone temperature file (millidegrees Celsius).
    pub thermal_zone: Option<PathBuf>,
    /// Power-supply directory holding `status` and `capacity`.
    pub battery_dir: PathBuf,
    /// Backlight brightness file; also registered for change notification.
    pub backlight: Option<PathBuf>,

    /// Upper bound of a single wait; fallback sampling happens at least this often.
    pub fallback_interval: Duration,
    /// Period of the wall-clock aligned timer.
    pub clock_interval: Duration,
    /// Clock ticks between two runs of the updates command.
    pub updates_every: u32,

    pub updates_cmd: Option<String>,
    pub default_sink_cmd: String,
    pub list_sinks_cmd: String,
    /// Prints the current keyboard layout (name or group index).
    pub keyboard_query_cmd: Option<String>,
    /// Prints `setxkbmap -query` style output used to resolve group indexes.
    pub layouts_cmd: String,

    /// Long-running command printing one line per keyboard layout change.
    pub keyboard_listen_cmd: Option<String>,
    /// Long-running command printing one line per audio state change.
    pub audio_listen_cmd: Option<String>,
    pub bridge_mode: BridgeMode,
}

impl Config {
    pub const DEFAULT_BATTERY_DIR: &'static str = "/sys/class/power_supply/BAT0";
    pub const DEFAULT_BACKLIGHT: &'static str = "/sys/class/backlight/intel_backlight/brightness";
    pub const DEFAULT_THERMAL_ZONE: &'static str = "/sys/class/thermal/thermal_zone0/temp";
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_path: PathBuf::from("/proc"),
            thermal_zone: Some(PathBuf::from(Self::DEFAULT_THERMAL_ZONE)),
            battery_dir: PathBuf::from(Self::DEFAULT_BATTERY_DIR),
            backlight: Some(PathBuf::from(Self::DEFAULT_BACKLIGHT)),
            fallback_interval: Duration::from_secs(2),
            clock_interval: Duration::from_secs(60),
            updates_every: 60,
            updates_cmd: Some("checkupdates".to_string()),
            default_sink_cmd: "pactl get-default-sink".to_string(),
            list_sinks_cmd: "pactl list sinks".to_string(),
            keyboard_query_cmd: Some("xkb-switch -p".to_string()),
            layouts_cmd: "setxkbmap -query".to_string(),
            keyboard_listen_cmd: Some("xkb-switch -W".to_string()),
            audio_listen_cmd: Some("pactl subscribe".to_string()),
            bridge_mode: BridgeMode::Descriptor,
        }
    }
}
