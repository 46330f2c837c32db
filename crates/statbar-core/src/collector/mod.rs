//! Data sources consumed by the metric producers.
//!
//! Producers never touch `std::fs` or `std::process` directly; they go
//! through the [`FileSystem`] and [`CommandRunner`] seams so the whole
//! engine can run against in-memory fixtures.
//!
//! ```text
//!        ┌──────────────────────────────┐
//!        │          Producers           │
//!        └──────┬────────────────┬──────┘
//!               │                │
//!        ┌──────▼──────┐  ┌──────▼────────┐
//!        │ FileSystem  │  │ CommandRunner │   (traits)
//!        └──────┬──────┘  └──────┬────────┘
//!          ┌────┴────┐      ┌────┴─────────┐
//!       RealFs    MockFs  RealCommands  MockCommands
//! ```
//!
//! # Testing
//!
//! ```
//! use statbar_core::collector::{MockCommands, MockFs};
//! use statbar_core::producer::Producers;
//! use statbar_core::{Config, Slot};
//!
//! let mut producers = Producers::new(MockFs::laptop(), MockCommands::new(), &Config::default());
//! let (slot, text) = producers.produce_slot(Slot::Memory);
//! assert_eq!(slot, Slot::Memory);
//! assert!(text.starts_with("MEM"));
//! ```

pub mod mock;
pub mod parser;
pub mod traits;

pub use mock::{MockCommands, MockFs};
pub use parser::ParseError;
pub use traits::{CommandRunner, FileSystem, RealCommands, RealFs};
