use crate::grid::SliceRect;
use crate::runner::RunResult;
use std::path::Path;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Receives a run's progress from the worker thread.
///
/// Every method has a no-op default, so implementors only pick what they render.
pub trait RunObserver: Send + Sync {
    /// One line of the human-readable run log.
    fn on_log(&self, _line: &str) {}

    /// A slice of `source` was written.
    fn on_slice(&self, _source: &Path, _rect: &SliceRect) {}

    /// The run is over and its result is final.
    fn on_finished(&self, _result: &RunResult) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Append-only, thread-safe store of log lines.
///
/// Appends and reader wake-ups happen under one lock, so a reader never sees
/// a half-applied append.
#[derive(Debug, Default)]
pub struct Console {
    lines: Mutex<Vec<String>>,
    changed: Condvar,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a Vec<String> half-pushed.
        self.lines.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn append(&self, line: &str) {
        let mut lines = self.lock();
        lines.push(line.to_string());
        self.changed.notify_all();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Lines appended after the first `from`.
    pub fn since(&self, from: usize) -> Vec<String> {
        self.lock().iter().skip(from).cloned().collect()
    }

    /// Block until at least `n` lines exist or `timeout` passes. Returns the line count.
    pub fn wait_for_len(&self, n: usize, timeout: Duration) -> usize {
        let lines = self.lock();
        let (lines, _) = self
            .changed
            .wait_timeout_while(lines, timeout, |lines| lines.len() < n)
            .unwrap_or_else(|e| e.into_inner());
        lines.len()
    }
}

impl RunObserver for Console {
    fn on_log(&self, line: &str) {
        self.append(line);
    }
}
