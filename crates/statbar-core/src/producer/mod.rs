//! Metric producers.
//!
//! Each submodule formats one slot from its data source. Formatting is
//! kept in pure functions; [`Producers`] binds them to the configured
//! files and commands and absorbs every read or parse failure into the
//! slot's placeholder.

pub mod backlight;
pub mod battery;
pub mod clock;
pub mod cpu;
pub mod keyboard;
pub mod memory;
pub mod thermal;
pub mod updates;
pub mod volume;

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::collector::parser::{
    parse_cpu_counters, parse_int, parse_layouts, parse_meminfo, parse_pactl_sinks,
};
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::config::Config;
use crate::status::Slot;
use clock::ClockFn;
use cpu::CpuLoad;

/// A request to re-invoke the producer of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// Re-sample the slot from its own data source.
    Slot(Slot),
    /// Keyboard layout carried by a state-change notification.
    KeyboardLayout(String),
}

impl Refresh {
    pub fn slot(&self) -> Slot {
        match self {
            Refresh::Slot(slot) => *slot,
            Refresh::KeyboardLayout(_) => Slot::KbdLayout,
        }
    }
}

/// All producers bound to their data sources.
pub struct Producers<F: FileSystem, R: CommandRunner> {
    fs: F,
    commands: R,
    cpu: CpuLoad,
    clock: ClockFn,
    stat_path: PathBuf,
    meminfo_path: PathBuf,
    thermal_zone: Option<PathBuf>,
    battery_dir: PathBuf,
    backlight: Option<PathBuf>,
    updates_cmd: Option<String>,
    default_sink_cmd: String,
    list_sinks_cmd: String,
    keyboard_query_cmd: Option<String>,
    layouts_cmd: String,
}

impl<F: FileSystem, R: CommandRunner> Producers<F, R> {
    pub fn new(fs: F, commands: R, config: &Config) -> Self {
        Self {
            fs,
            commands,
            cpu: CpuLoad::new(),
            clock: clock::local_now,
            stat_path: config.proc_path.join("stat"),
            meminfo_path: config.proc_path.join("meminfo"),
            thermal_zone: config.thermal_zone.clone(),
            battery_dir: config.battery_dir.clone(),
            backlight: config.backlight.clone(),
            updates_cmd: config.updates_cmd.clone(),
            default_sink_cmd: config.default_sink_cmd.clone(),
            list_sinks_cmd: config.list_sinks_cmd.clone(),
            keyboard_query_cmd: config.keyboard_query_cmd.clone(),
            layouts_cmd: config.layouts_cmd.clone(),
        }
    }

    /// Replaces the time source of the clock producer.
    pub fn with_clock(mut self, clock: ClockFn) -> Self {
        self.clock = clock;
        self
    }

    /// Mutable access to the filesystem, for fixtures that change over time.
    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    /// Configured files and directories that do not exist.
    ///
    /// Their slots render placeholders until the source appears.
    pub fn missing_sources(&self) -> Vec<&Path> {
        [
            Some(self.stat_path.as_path()),
            Some(self.meminfo_path.as_path()),
            self.thermal_zone.as_deref(),
            Some(self.battery_dir.as_path()),
            self.backlight.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|path| !self.fs.exists(path))
        .collect()
    }

    /// Runs the producer a refresh request points at.
    pub fn produce(&mut self, refresh: &Refresh) -> (Slot, String) {
        match refresh {
            Refresh::Slot(slot) => self.produce_slot(*slot),
            Refresh::KeyboardLayout(payload) => (Slot::KbdLayout, self.keyboard(payload)),
        }
    }

    pub fn produce_slot(&mut self, slot: Slot) -> (Slot, String) {
        let text = match slot {
            Slot::KbdLayout => self.current_keyboard(),
            Slot::CpuLoad => self.cpu_load(),
            Slot::CpuTemp => self.cpu_temp(),
            Slot::Memory => self.memory(),
            Slot::Updates => self.updates(),
            Slot::Volume => self.volume(),
            Slot::Brightness => self.brightness(),
            Slot::BatStatus => {
                let raw = self.read(&self.battery_dir.join("status"));
                battery::format_status(raw.as_deref())
            }
            Slot::BatCapacity => {
                battery::format_capacity(self.read_int(&self.battery_dir.join("capacity")))
            }
            Slot::Time => clock::format(&(self.clock)()),
        };
        trace!("{} = {:?}", slot, text);
        (slot, text)
    }

    fn cpu_load(&mut self) -> String {
        let counters = self
            .read(&self.stat_path)
            .and_then(|content| match parse_cpu_counters(&content) {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!("{}: {}", self.stat_path.display(), e);
                    None
                }
            });
        self.cpu.sample(counters)
    }

    fn cpu_temp(&self) -> String {
        let value = self.thermal_zone.as_deref().and_then(|p| self.read_int(p));
        thermal::format(value)
    }

    fn memory(&self) -> String {
        let info = self
            .read(&self.meminfo_path)
            .and_then(|content| match parse_meminfo(&content) {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!("{}: {}", self.meminfo_path.display(), e);
                    None
                }
            });
        memory::format(info.as_ref())
    }

    fn brightness(&self) -> String {
        let value = self.backlight.as_deref().and_then(|p| self.read_int(p));
        backlight::format(value)
    }

    fn updates(&self) -> String {
        let output = self.updates_cmd.as_deref().and_then(|cmd| self.run(cmd));
        updates::format(output.as_deref())
    }

    fn volume(&self) -> String {
        let state = self.run(&self.default_sink_cmd).and_then(|sink| {
            let listing = self.run(&self.list_sinks_cmd)?;
            match parse_pactl_sinks(&listing, &sink) {
                Ok(state) => Some(state),
                Err(e) => {
                    debug!("{}: {}", self.list_sinks_cmd, e);
                    None
                }
            }
        });
        volume::format(state.as_ref())
    }

    fn current_keyboard(&self) -> String {
        match self.keyboard_query_cmd.as_deref().and_then(|cmd| self.run(cmd)) {
            Some(payload) => self.keyboard(&payload),
            None => keyboard::PLACEHOLDER.to_string(),
        }
    }

    fn keyboard(&self, payload: &str) -> String {
        let Some(group) = keyboard::group_index(payload) else {
            return keyboard::format_name(payload);
        };
        let layouts = self
            .run(&self.layouts_cmd)
            .and_then(|out| match parse_layouts(&out) {
                Ok(layouts) => Some(layouts),
                Err(e) => {
                    debug!("{}: {}", self.layouts_cmd, e);
                    None
                }
            })
            .unwrap_or_default();
        keyboard::format_group(group, &layouts)
    }

    fn read(&self, path: &Path) -> Option<String> {
        match self.fs.read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                debug!("read {}: {}", path.display(), e);
                None
            }
        }
    }

    fn read_int(&self, path: &Path) -> Option<i64> {
        let content = self.read(path)?;
        match parse_int(&content) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("{}: {}", path.display(), e);
                None
            }
        }
    }

    fn run(&self, cmdline: &str) -> Option<String> {
        match self.commands.run(cmdline) {
            Ok(out) => Some(out),
            Err(e) => {
                debug!("run '{}': {}", cmdline, e);
                None
            }
        }
    }
}
