//! statbar-core - event-driven status line engine.
//!
//! Provides:
//! - `collector` - data-source seams (filesystem, external commands), parsers, mocks
//! - `producer` - one producer per status slot, each absorbing its own failures
//! - `status` - slot identities and the assembled status line
//! - `board` - status line + producers + sink behind one mutex
//! - `sink` - presentation surfaces (stdout, `xsetroot`)
//! - `event` - Linux event sources (epoll, inotify, timerfd, command bridges)
//! - `dispatch` - the dispatch loop multiplexing all sources into renders
//! - `config` - runtime configuration assembled by the daemon

pub mod board;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod fmt;
pub mod producer;
pub mod sink;
pub mod status;

pub use board::{Board, SharedBoard};
pub use config::{BridgeMode, Config};
pub use dispatch::{Dispatcher, EventLoop, Schedule, Wake};
pub use error::StartupError;
pub use status::{Slot, StatusLine};

/// Source revision embedded at build time.
pub const REVISION: &str = env!("STATBAR_REVISION");
