//! Listener and event loop glue.
//!
//! Everything here runs on a single-threaded tokio runtime inside a
//! `LocalSet`: one local task per accepted socket, no locking.

use std::cell::Cell;

pub mod listener;

/// Per-server bookkeeping shared with the accept loop.
///
/// Connections only ever hold a `Weak` handle to it.
#[derive(Debug, Default)]
pub struct ServerLoop {
    active: Cell<usize>,
    completed: Cell<u64>,
}

impl ServerLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_connections(&self) -> usize {
        self.active.get()
    }

    /// Connections that have been fully torn down.
    pub fn completed_connections(&self) -> u64 {
        self.completed.get()
    }

    pub(crate) fn connection_opened(&self) {
        self.active.set(self.active.get() + 1);
    }

    pub(crate) fn connection_closed(&self) {
        self.active.set(self.active.get().saturating_sub(1));
        self.completed.set(self.completed.get() + 1);
    }
}
