//! statbard - event-driven status line daemon.
//!
//! Watches system state through epoll (file changes, a wall-clock timer,
//! keyboard and audio listeners) and publishes one status line per change
//! to stdout or the X root window name.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use statbar_core::collector::{RealCommands, RealFs};
use statbar_core::sink::{Sink, StdoutSink, XsetrootSink};
use statbar_core::{BridgeMode, Config, EventLoop};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    /// One line per render on stdout.
    Stdout,
    /// X root window name via `xsetroot -name`.
    Xsetroot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BridgeArg {
    /// Listener pipes join the epoll set.
    Descriptor,
    /// One thread per listener.
    Worker,
}

impl From<BridgeArg> for BridgeMode {
    fn from(arg: BridgeArg) -> Self {
        match arg {
            BridgeArg::Descriptor => BridgeMode::Descriptor,
            BridgeArg::Worker => BridgeMode::Worker,
        }
    }
}

/// Event-driven status line daemon.
#[derive(Parser, Debug)]
#[command(name = "statbard", about = "Event-driven status line daemon", version)]
struct Args {
    /// Fallback sampling interval in seconds for sources without change notification.
    #[arg(short, long, default_value = "2")]
    interval: u64,

    /// Wall-clock timer period in seconds; ticks align to multiples of it.
    #[arg(long, default_value = "60")]
    clock_interval: u64,

    /// Clock ticks between two runs of the updates command.
    #[arg(long, default_value = "60")]
    updates_every: u32,

    /// Where the status line is published.
    #[arg(long, value_enum, default_value = "stdout")]
    sink: SinkKind,

    /// How listener notifications reach the dispatch loop.
    #[arg(long, value_enum, default_value = "descriptor")]
    bridge_mode: BridgeArg,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    proc_path: PathBuf,

    /// Power-supply directory holding `status` and `capacity`.
    #[arg(long, default_value = Config::DEFAULT_BATTERY_DIR)]
    battery_dir: PathBuf,

    /// Backlight brightness file, watched for changes.
    #[arg(long, default_value = Config::DEFAULT_BACKLIGHT)]
    backlight: PathBuf,

    /// Do not read or watch a backlight.
    #[arg(long)]
    no_backlight: bool,

    /// Thermal zone temperature file (millidegrees Celsius).
    #[arg(long, default_value = Config::DEFAULT_THERMAL_ZONE)]
    thermal_zone: PathBuf,

    /// Do not read a thermal zone.
    #[arg(long)]
    no_thermal: bool,

    /// Command listing pending package updates, one per line.
    #[arg(long, default_value = "checkupdates")]
    updates_cmd: String,

    /// Do not run the updates command.
    #[arg(long)]
    no_updates: bool,

    /// Command printing the default audio sink name.
    #[arg(long, default_value = "pactl get-default-sink")]
    default_sink_cmd: String,

    /// Command listing audio sinks with mute and volume state.
    #[arg(long, default_value = "pactl list sinks")]
    list_sinks_cmd: String,

    /// Command printing the current keyboard layout.
    #[arg(long, default_value = "xkb-switch -p")]
    keyboard_cmd: String,

    /// Command printing configured layouts (`setxkbmap -query` format).
    #[arg(long, default_value = "setxkbmap -query")]
    layouts_cmd: String,

    /// Long-running command printing one line per layout change.
    #[arg(long, default_value = "xkb-switch -W")]
    keyboard_listen_cmd: String,

    /// Do not start the keyboard listener.
    #[arg(long)]
    no_keyboard_listener: bool,

    /// Long-running command printing one line per audio change.
    #[arg(long, default_value = "pactl subscribe")]
    audio_listen_cmd: String,

    /// Do not start the audio listener.
    #[arg(long)]
    no_audio_listener: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> Config {
        let unless = |disabled: bool, value: &str| (!disabled).then(|| value.to_string());
        Config {
            proc_path: self.proc_path.clone(),
            thermal_zone: (!self.no_thermal).then(|| self.thermal_zone.clone()),
            battery_dir: self.battery_dir.clone(),
            backlight: (!self.no_backlight).then(|| self.backlight.clone()),
            fallback_interval: Duration::from_secs(self.interval.max(1)),
            clock_interval: Duration::from_secs(self.clock_interval.max(1)),
            updates_every: self.updates_every.max(1),
            updates_cmd: unless(self.no_updates, &self.updates_cmd),
            default_sink_cmd: self.default_sink_cmd.clone(),
            list_sinks_cmd: self.list_sinks_cmd.clone(),
            keyboard_query_cmd: Some(self.keyboard_cmd.clone()),
            layouts_cmd: self.layouts_cmd.clone(),
            keyboard_listen_cmd: unless(self.no_keyboard_listener, &self.keyboard_listen_cmd),
            audio_listen_cmd: unless(self.no_audio_listener, &self.audio_listen_cmd),
            bridge_mode: self.bridge_mode.into(),
        }
    }

    fn sink(&self) -> Box<dyn Sink> {
        match self.sink {
            SinkKind::Stdout => Box::new(StdoutSink::new()),
            SinkKind::Xsetroot => Box::new(XsetrootSink::new()),
        }
    }
}

/// Initializes the tracing subscriber on stderr; stdout carries status lines.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["statbard", "statbar_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.config();
    info!(
        "statbard {} ({}) starting",
        env!("CARGO_PKG_VERSION"),
        statbar_core::REVISION
    );
    info!(
        "Config: interval={}s, clock={}s, updates every {} tick(s), sink={:?}, bridges={:?}",
        config.fallback_interval.as_secs(),
        config.clock_interval.as_secs(),
        config.updates_every,
        args.sink,
        config.bridge_mode
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let started = EventLoop::new(&config, RealFs::new(), RealCommands::new(), args.sink());
    let mut event_loop = match started {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    event_loop.run(&running);

    info!("statbard stopped");
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("statbard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_match_core_config() {
        let config = parse(&[]).config();
        let default = Config::default();

        assert_eq!(config.fallback_interval, default.fallback_interval);
        assert_eq!(config.clock_interval, default.clock_interval);
        assert_eq!(config.updates_every, default.updates_every);
        assert_eq!(config.backlight, default.backlight);
        assert_eq!(config.thermal_zone, default.thermal_zone);
        assert_eq!(config.updates_cmd, default.updates_cmd);
        assert_eq!(config.keyboard_listen_cmd, default.keyboard_listen_cmd);
        assert_eq!(config.audio_listen_cmd, default.audio_listen_cmd);
        assert_eq!(config.bridge_mode, BridgeMode::Descriptor);
    }

    #[test]
    fn disable_switches_clear_sources() {
        let config = parse(&[
            "--no-backlight",
            "--no-thermal",
            "--no-updates",
            "--no-keyboard-listener",
            "--no-audio-listener",
        ])
        .config();

        assert!(config.backlight.is_none());
        assert!(config.thermal_zone.is_none());
        assert!(config.updates_cmd.is_none());
        assert!(config.keyboard_listen_cmd.is_none());
        assert!(config.audio_listen_cmd.is_none());
    }

    #[test]
    fn overrides_and_modes() {
        let args = parse(&[
            "-i",
            "5",
            "--clock-interval",
            "0",
            "--bridge-mode",
            "worker",
            "--sink",
            "xsetroot",
            "--backlight",
            "/sys/class/backlight/acpi_video0/brightness",
        ]);
        assert_eq!(args.sink, SinkKind::Xsetroot);

        let config = args.config();
        assert_eq!(config.fallback_interval, Duration::from_secs(5));
        // zero would make the timer unusable
        assert_eq!(config.clock_interval, Duration::from_secs(1));
        assert_eq!(config.bridge_mode, BridgeMode::Worker);
        assert_eq!(
            config.backlight.as_deref(),
            Some(std::path::Path::new("/sys/class/backlight/acpi_video0/brightness"))
        );
    }

    #[test]
    fn rejects_unknown_sink() {
        assert!(Args::try_parse_from(["statbard", "--sink", "dbus"]).is_err());
    }
}
