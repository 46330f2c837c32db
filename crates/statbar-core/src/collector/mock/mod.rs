//! In-memory stand-ins for the data-source seams.

mod commands;
mod filesystem;
mod scenarios;

pub use commands::MockCommands;
pub use filesystem::MockFs;
