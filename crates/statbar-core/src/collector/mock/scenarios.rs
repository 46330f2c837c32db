//! Pre-built mock scenarios for testing.

use super::commands::MockCommands;
use super::filesystem::MockFs;
use crate::config::Config;

impl MockFs {
    /// A laptop at the default [`Config`] paths.
    ///
    /// Battery discharging at 87%, backlight at 4200, CPU at 42°C and
    /// memory 62% used (see [`MockFs::MEMINFO`]).
    pub fn laptop() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file("/proc/meminfo", Self::MEMINFO);
        fs.add_file(Config::DEFAULT_THERMAL_ZONE, "42000\n");
        fs.add_file(
            format!("{}/status", Config::DEFAULT_BATTERY_DIR),
            "Discharging\n",
        );
        fs.add_file(format!("{}/capacity", Config::DEFAULT_BATTERY_DIR), "87\n");
        fs.add_file(Config::DEFAULT_BACKLIGHT, "4200\n");

        fs
    }

    /// (16384000 - 2048000) - (512000 + 3584000) = 10240000 kB used, 62%.
    pub const MEMINFO: &'static str = "\
MemTotal:       16384000 kB
MemFree:         2048000 kB
MemAvailable:    6144000 kB
Buffers:          512000 kB
Cached:          3584000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
";
}

impl MockCommands {
    /// Command outputs matching the default [`Config`] commands.
    ///
    /// Layout `us` (group 0 of `us,ru`), default sink unmuted at 65%,
    /// three pending updates.
    pub fn desktop() -> Self {
        let mut commands = Self::new();
        commands.add_output("xkb-switch -p", "us\n");
        commands.add_output(
            "setxkbmap -query",
            "rules:      evdev\nmodel:      pc105\nlayout:     us,ru\n",
        );
        commands.add_output(
            "pactl get-default-sink",
            "alsa_output.pci-0000_00_1f.3.analog-stereo\n",
        );
        commands.add_output(
            "pactl list sinks",
            "\
Sink #0
\tState: RUNNING
\tName: alsa_output.pci-0000_00_1f.3.analog-stereo
\tMute: no
\tVolume: front-left: 42598 /  65% / -11.23 dB,   front-right: 42598 /  65% / -11.23 dB
",
        );
        commands.add_output(
            "checkupdates",
            "linux 6.6.1-1 -> 6.6.2-1\nmesa 23.2.1-1 -> 23.2.1-2\nzstd 1.5.5-1 -> 1.5.5-2\n",
        );
        commands
    }
}
