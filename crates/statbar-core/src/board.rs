//! The status board: slot texts, their producers and the sink.
//!
//! A [`Board`] is the unit guarded by the process-wide status mutex.
//! Running producers and rendering happen inside one `refresh` call, so
//! a render can never observe a slot half-way through an update.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::collector::traits::{CommandRunner, FileSystem};
use crate::producer::{Producers, Refresh};
use crate::sink::Sink;
use crate::status::StatusLine;

/// The status mutex shared between the dispatch loop and bridge workers.
pub type SharedBoard<F, R> = Arc<Mutex<Board<F, R>>>;

pub struct Board<F: FileSystem, R: CommandRunner> {
    status: StatusLine,
    producers: Producers<F, R>,
    sink: Box<dyn Sink>,
    renders: u64,
}

impl<F: FileSystem, R: CommandRunner> Board<F, R> {
    pub fn new(producers: Producers<F, R>, sink: Box<dyn Sink>) -> Self {
        Self {
            status: StatusLine::new(),
            producers,
            sink,
            renders: 0,
        }
    }

    pub fn into_shared(self) -> SharedBoard<F, R> {
        Arc::new(Mutex::new(self))
    }

    /// Runs every requested producer, then renders once.
    pub fn refresh(&mut self, refreshes: &[Refresh]) {
        for refresh in refreshes {
            let (slot, text) = self.producers.produce(refresh);
            self.status.update(slot, text);
        }
        self.render();
    }

    /// Publishes the current line. Sink failures are logged; the slot
    /// texts stay in memory for the next render.
    pub fn render(&mut self) {
        let line = self.status.render();
        self.renders += 1;
        debug!("render #{}: {}", self.renders, line);

        if let Err(e) = self.sink.set_text(&line).and_then(|()| self.sink.flush()) {
            warn!("Failed to publish status line: {}", e);
        }
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn producers_mut(&mut self) -> &mut Producers<F, R> {
        &mut self.producers
    }

    /// Number of renders since creation.
    pub fn renders(&self) -> u64 {
        self.renders
    }
}

/// Locks the board, recovering from a poisoned mutex.
///
/// A panic in another holder leaves slot texts that are each complete
/// strings, so the board is still safe to render.
pub fn lock<F: FileSystem, R: CommandRunner>(
    board: &SharedBoard<F, R>,
) -> MutexGuard<'_, Board<F, R>> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockCommands, MockFs};
    use crate::config::Config;
    use crate::sink::MemorySink;
    use crate::status::Slot;
    use std::io;

    fn board(sink: MemorySink) -> Board<MockFs, MockCommands> {
        let producers =
            Producers::new(MockFs::laptop(), MockCommands::desktop(), &Config::default());
        Board::new(producers, Box::new(sink))
    }

    #[test]
    fn test_refresh_renders_once() {
        let sink = MemorySink::new();
        let mut board = board(sink.clone());

        board.refresh(&[
            Refresh::Slot(Slot::Memory),
            Refresh::Slot(Slot::BatCapacity),
            Refresh::KeyboardLayout("de".into()),
        ]);

        assert_eq!(board.renders(), 1);
        let published = sink.published();
        assert_eq!(published.len(), 1);
        assert!(published[0].starts_with(" DE │ "));
        assert!(published[0].contains("MEM 62%"));
        assert!(published[0].contains("\u{f581} 87%"));
    }

    #[test]
    fn test_render_twice_is_identical() {
        let sink = MemorySink::new();
        let mut board = board(sink.clone());
        board.refresh(&[Refresh::Slot(Slot::Brightness)]);
        board.render();
        board.render();

        let published = sink.published();
        assert_eq!(published.len(), 3);
        assert_eq!(published[1], published[2]);
    }

    struct BrokenSink;

    impl Sink for BrokenSink {
        fn set_text(&mut self, _text: &str) -> io::Result<()> {
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "display gone"))
        }
    }

    #[test]
    fn test_publish_failure_keeps_state() {
        let producers =
            Producers::new(MockFs::laptop(), MockCommands::desktop(), &Config::default());
        let mut board = Board::new(producers, Box::new(BrokenSink));

        board.refresh(&[Refresh::Slot(Slot::Memory)]);
        assert_eq!(board.renders(), 1);
        assert_eq!(board.status().get(Slot::Memory), "MEM 62%");
    }

    #[test]
    fn test_lock_survives_poisoning() {
        let shared = board(MemorySink::new()).into_shared();
        let poisoner = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("producer blew up");
        })
        .join();

        assert!(shared.is_poisoned());
        lock(&shared).render();
        assert_eq!(lock(&shared).renders(), 1);
    }
}
