//! The dispatch loop.
//!
//! ```text
//!   ┌──────────┐   ready tokens    ┌─────────────┐   Vec<Refresh>   ┌───────┐
//!   │ WAITING  │ ────────────────▶ │ DISPATCHING │ ───────────────▶ │ Board │ ──▶ Sink
//!   │ epoll    │ ◀──────────────── │ decode+plan │   one render     └───────┘
//!   └──────────┘                   └─────────────┘
//! ```
//!
//! [`EventLoop`] owns the kernel descriptors and turns readiness into
//! [`Wake`] values; [`Dispatcher`] decides which producers each wake
//! re-invokes and renders at most once per wake. The split keeps all
//! scheduling decisions testable without touching the kernel.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::board::{self, Board, SharedBoard};
use crate::collector::traits::{CommandRunner, FileSystem};
use crate::config::{BridgeMode, Config};
use crate::error::StartupError;
use crate::event::bridge::{Drained, Worker};
use crate::event::{BridgeKind, CommandStream, Epoll, Inotify, MinuteTimer, WatchId};
use crate::producer::{Producers, Refresh};
use crate::sink::Sink;
use crate::status::Slot;

/// Slots without a dedicated change notification, re-sampled on every fallback tick.
pub const FALLBACK_SLOTS: [Slot; 6] = [
    Slot::BatStatus,
    Slot::BatCapacity,
    Slot::Memory,
    Slot::CpuLoad,
    Slot::CpuTemp,
    Slot::Brightness,
];

/// One decoded readiness event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wake {
    /// The wall-clock timer fired `expirations` times since the last read.
    Clock { expirations: u64 },
    /// Watched files changed.
    Files(Vec<WatchId>),
    /// The keyboard bridge delivered a new layout.
    Keyboard(String),
    /// The audio bridge signalled a state change.
    Audio,
}

/// Timing policy of the two logical timers.
#[derive(Debug, Clone)]
pub struct Schedule {
    fallback_interval: Duration,
    next_fallback: Instant,
    clock_ticks: u32,
    updates_every: u32,
}

impl Schedule {
    /// The tick counter starts full so the first clock tick also runs the
    /// updates producer.
    pub fn new(fallback_interval: Duration, updates_every: u32, now: Instant) -> Self {
        let updates_every = updates_every.max(1);
        Self {
            fallback_interval,
            next_fallback: now + fallback_interval,
            clock_ticks: updates_every,
            updates_every,
        }
    }

    /// How long the next wait may block before fallback sampling is due.
    pub fn timeout(&self, now: Instant) -> Duration {
        self.next_fallback.saturating_duration_since(now)
    }

    /// Whether a fallback tick is due; re-arms the deadline when it is.
    pub fn fallback_due(&mut self, now: Instant) -> bool {
        if now < self.next_fallback {
            return false;
        }
        self.next_fallback = now + self.fallback_interval;
        true
    }

    /// Counts clock expirations; true when the slow producer is due.
    pub fn clock_tick(&mut self, expirations: u64) -> bool {
        let expirations = u32::try_from(expirations).unwrap_or(u32::MAX);
        self.clock_ticks = self.clock_ticks.saturating_add(expirations);
        if self.clock_ticks >= self.updates_every {
            self.clock_ticks = 0;
            return true;
        }
        false
    }
}

/// Associates a watched path with the slot its changes refresh.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    pub id: WatchId,
    pub path: PathBuf,
    pub slot: Slot,
}

/// Reverse lookup from watch id to binding.
#[derive(Debug, Clone, Default)]
pub struct WatchTable {
    bindings: Vec<WatchBinding>,
}

impl WatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, id: WatchId, path: impl Into<PathBuf>, slot: Slot) {
        self.bindings.push(WatchBinding {
            id,
            path: path.into(),
            slot,
        });
    }

    pub fn lookup(&self, id: WatchId) -> Option<&WatchBinding> {
        self.bindings.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// De-duplicated producer invocations collected during one wake.
#[derive(Debug, Default)]
struct Plan {
    refreshes: Vec<Refresh>,
}

impl Plan {
    fn push(&mut self, refresh: Refresh) {
        // A newer keyboard payload supersedes an older one.
        if let Refresh::KeyboardLayout(_) = refresh {
            self.refreshes.retain(|r| r.slot() != Slot::KbdLayout);
        }
        if !self.refreshes.contains(&refresh) {
            self.refreshes.push(refresh);
        }
    }

    fn push_slot(&mut self, slot: Slot) {
        self.push(Refresh::Slot(slot));
    }
}

/// Decides which producers run for each wake and renders once per wake.
pub struct Dispatcher<F: FileSystem, R: CommandRunner> {
    board: SharedBoard<F, R>,
    watches: WatchTable,
    schedule: Schedule,
}

impl<F: FileSystem, R: CommandRunner> Dispatcher<F, R> {
    pub fn new(board: SharedBoard<F, R>, watches: WatchTable, schedule: Schedule) -> Self {
        Self {
            board,
            watches,
            schedule,
        }
    }

    /// Handle to the status mutex, for bridge workers.
    pub fn board(&self) -> SharedBoard<F, R> {
        Arc::clone(&self.board)
    }

    pub fn watches(&self) -> &WatchTable {
        &self.watches
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Produces every slot except the expensive updates query, then renders.
    pub fn initial_render(&self) {
        let refreshes: Vec<Refresh> = Slot::ALL
            .into_iter()
            .filter(|&slot| slot != Slot::Updates)
            .map(Refresh::Slot)
            .collect();
        board::lock(&self.board).refresh(&refreshes);
    }

    /// Handles everything that became ready in one wake.
    ///
    /// Returns whether a render happened.
    pub fn handle(&mut self, wakes: Vec<Wake>, now: Instant) -> bool {
        let mut plan = Plan::default();

        for wake in wakes {
            match wake {
                Wake::Clock { expirations } => {
                    if expirations == 0 {
                        continue;
                    }
                    plan.push_slot(Slot::Time);
                    if self.schedule.clock_tick(expirations) {
                        debug!("updates check due");
                        plan.push_slot(Slot::Updates);
                    }
                }
                Wake::Files(ids) => {
                    for id in ids {
                        match self.watches.lookup(id) {
                            Some(binding) => {
                                trace!("{} changed", binding.path.display());
                                plan.push_slot(binding.slot);
                            }
                            None => debug!("event for unknown watch {:?}", id),
                        }
                    }
                }
                Wake::Keyboard(payload) => plan.push(Refresh::KeyboardLayout(payload)),
                Wake::Audio => plan.push_slot(Slot::Volume),
            }
        }

        if self.schedule.fallback_due(now) {
            for slot in FALLBACK_SLOTS {
                plan.push_slot(slot);
            }
        }

        if plan.refreshes.is_empty() {
            return false;
        }
        debug!("dispatching {} producer(s)", plan.refreshes.len());
        board::lock(&self.board).refresh(&plan.refreshes);
        true
    }
}

const TOKEN_CLOCK: u64 = 0;
const TOKEN_INOTIFY: u64 = 1;
const TOKEN_KEYBOARD: u64 = 2;
const TOKEN_AUDIO: u64 = 3;

fn bridge_token(kind: BridgeKind) -> u64 {
    match kind {
        BridgeKind::Keyboard => TOKEN_KEYBOARD,
        BridgeKind::Audio => TOKEN_AUDIO,
    }
}

/// The running engine: kernel sources, bridges and the dispatcher.
pub struct EventLoop<F: FileSystem + 'static, R: CommandRunner + 'static> {
    dispatcher: Dispatcher<F, R>,
    epoll: Epoll,
    inotify: Inotify,
    timer: MinuteTimer,
    streams: Vec<CommandStream>,
    workers: Vec<Worker>,
}

impl<F: FileSystem + 'static, R: CommandRunner + 'static> EventLoop<F, R> {
    /// Opens every source, produces the initial line and renders it.
    ///
    /// Any source that cannot be opened is fatal.
    pub fn new(
        config: &Config,
        fs: F,
        commands: R,
        sink: Box<dyn Sink>,
    ) -> Result<Self, StartupError> {
        let producers = Producers::new(fs, commands, config);
        Self::with_producers(config, producers, sink)
    }

    pub fn with_producers(
        config: &Config,
        producers: Producers<F, R>,
        sink: Box<dyn Sink>,
    ) -> Result<Self, StartupError> {
        let epoll = Epoll::new().map_err(StartupError::Epoll)?;
        let inotify = Inotify::new().map_err(StartupError::Inotify)?;

        let mut watches = WatchTable::new();
        if let Some(path) = &config.backlight {
            let id = watch(&inotify, path)?;
            watches.bind(id, path, Slot::Brightness);
        }
        epoll
            .add(inotify.raw_fd(), TOKEN_INOTIFY)
            .map_err(StartupError::Epoll)?;

        let timer = MinuteTimer::new(config.clock_interval).map_err(StartupError::Timer)?;
        epoll
            .add(timer.raw_fd(), TOKEN_CLOCK)
            .map_err(StartupError::Epoll)?;

        for path in producers.missing_sources() {
            warn!("{} does not exist; its slot shows a placeholder", path.display());
        }

        let schedule =
            Schedule::new(config.fallback_interval, config.updates_every, Instant::now());
        let board = Board::new(producers, sink).into_shared();
        let dispatcher = Dispatcher::new(board, watches, schedule);
        dispatcher.initial_render();

        let mut event_loop = Self {
            dispatcher,
            epoll,
            inotify,
            timer,
            streams: Vec::new(),
            workers: Vec::new(),
        };

        let listeners = [
            (BridgeKind::Keyboard, &config.keyboard_listen_cmd),
            (BridgeKind::Audio, &config.audio_listen_cmd),
        ];
        for (kind, cmd) in listeners {
            if let Some(cmd) = cmd {
                event_loop.attach_bridge(kind, cmd, config.bridge_mode)?;
            }
        }

        info!(
            "Sources ready: {} watch(es), {} descriptor bridge(s), {} worker bridge(s)",
            event_loop.dispatcher.watches().len(),
            event_loop.streams.len(),
            event_loop.workers.len()
        );
        Ok(event_loop)
    }

    fn attach_bridge(
        &mut self,
        kind: BridgeKind,
        cmdline: &str,
        mode: BridgeMode,
    ) -> Result<(), StartupError> {
        let bridge_err = |source| StartupError::Bridge {
            command: cmdline.to_string(),
            source,
        };
        let stream = CommandStream::spawn(kind, cmdline).map_err(bridge_err)?;

        match mode {
            BridgeMode::Descriptor => {
                stream.lines().set_nonblocking().map_err(bridge_err)?;
                self.epoll
                    .add(stream.raw_fd(), bridge_token(kind))
                    .map_err(StartupError::Epoll)?;
                self.streams.push(stream);
            }
            BridgeMode::Worker => {
                let worker = stream
                    .into_worker(self.dispatcher.board())
                    .map_err(bridge_err)?;
                self.workers.push(worker);
            }
        }
        Ok(())
    }

    pub fn dispatcher(&self) -> &Dispatcher<F, R> {
        &self.dispatcher
    }

    /// Runs until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) {
        let mut tokens = Vec::new();
        info!("Starting dispatch loop");

        while running.load(Ordering::SeqCst) {
            let timeout = self.dispatcher.schedule().timeout(Instant::now());
            match self.epoll.wait(&mut tokens, timeout) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("epoll_wait failed: {}", e);
                    continue;
                }
            }

            // Failed reads contribute no wakes; an empty set still lets a
            // due fallback tick through.
            let wakes = self.decode(&tokens);
            self.dispatcher.handle(wakes, Instant::now());
        }

        info!("Dispatch loop stopped");
    }

    /// Reads every ready source and turns it into wakes.
    fn decode(&mut self, tokens: &[u64]) -> Vec<Wake> {
        let mut wakes = Vec::with_capacity(tokens.len());

        for &token in tokens {
            match token {
                TOKEN_CLOCK => match self.timer.read() {
                    Ok(expirations) => wakes.push(Wake::Clock { expirations }),
                    Err(e) => warn!("timer read failed: {}", e),
                },
                TOKEN_INOTIFY => match self.inotify.read_events() {
                    Ok(ids) if !ids.is_empty() => wakes.push(Wake::Files(ids)),
                    Ok(_) => {}
                    Err(e) => warn!("inotify read failed: {}", e),
                },
                TOKEN_KEYBOARD | TOKEN_AUDIO => {
                    if let Some(wake) = self.read_bridge(token) {
                        wakes.push(wake);
                    }
                }
                other => debug!("unknown epoll token {}", other),
            }
        }

        wakes
    }

    fn read_bridge(&mut self, token: u64) -> Option<Wake> {
        let index = self
            .streams
            .iter()
            .position(|s| bridge_token(s.kind) == token)?;
        let stream = &mut self.streams[index];
        let kind = stream.kind;

        match stream.lines_mut().drain() {
            Ok(Drained::Line(line)) => Some(match kind {
                BridgeKind::Keyboard => Wake::Keyboard(line.trim().to_string()),
                BridgeKind::Audio => Wake::Audio,
            }),
            Ok(Drained::Pending) => None,
            Ok(Drained::Closed) => {
                warn!("{} listener exited; its slot will no longer update", kind.name());
                self.detach(index);
                None
            }
            Err(e) => {
                warn!("{} listener read failed: {}", kind.name(), e);
                None
            }
        }
    }

    fn detach(&mut self, index: usize) {
        let stream = self.streams.remove(index);
        if let Err(e) = self.epoll.delete(stream.raw_fd()) {
            debug!("epoll delete: {}", e);
        }
    }
}

fn watch(inotify: &Inotify, path: &Path) -> Result<WatchId, StartupError> {
    let id = inotify.add_watch(path).map_err(|source| StartupError::Watch {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("watching {} as {:?}", path.display(), id);
    Ok(id)
}
