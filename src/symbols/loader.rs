//! Background artwork loading.
//!
//! The loader runs at most one decode at a time on a worker thread. A failed
//! decode is retried after a short pause until it succeeds or the loader is
//! cancelled. Callers poll [`ImageLoader::is_ready`] before submitting and
//! observe completion through [`Symbol::is_loaded`].
//!
//! Cancelling drops the in-flight worker and starts over with an empty slot.
//! The abandoned thread notices the flag at its next retry and exits; its
//! result, if any, is still stored on the symbol.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tiny_skia::Pixmap;
use tracing::{debug, warn};

use super::pool::Symbol;

/// Pause between two decode attempts of the same file.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// How often [`ImageLoader::wait`] polls the slot.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

struct InFlight {
    symbol: Arc<Symbol>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Single-slot background decoder for symbol artwork.
pub struct ImageLoader {
    slot: Option<InFlight>,
    retry_delay: Duration,
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// True when no decode is in flight.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot.as_ref().map_or(true, |f| f.handle.is_finished())
    }

    /// Name of the symbol currently being decoded.
    #[must_use]
    pub fn in_flight(&self) -> Option<&str> {
        self.slot
            .as_ref()
            .filter(|f| !f.handle.is_finished())
            .map(|f| f.symbol.name())
    }

    /// Start decoding `symbol` in the background.
    ///
    /// Does nothing and returns false unless the loader is ready, the symbol
    /// has an artwork path and is not loaded yet.
    pub fn submit(&mut self, symbol: &Arc<Symbol>) -> bool {
        if !self.is_ready() || symbol.is_loaded() {
            return false;
        }
        let Some(path) = symbol.path().map(|p| p.to_path_buf()) else {
            warn!(symbol = symbol.name(), "no artwork file for symbol");
            return false;
        };
        self.reap();

        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let worker_symbol = Arc::clone(symbol);
        let delay = self.retry_delay;

        let handle = thread::spawn(move || {
            let mut attempts = 0u32;
            while !worker_cancel.load(Ordering::Relaxed) {
                attempts += 1;
                match Pixmap::load_png(&path) {
                    Ok(pixmap) => {
                        worker_symbol.set_artwork(pixmap);
                        debug!(symbol = worker_symbol.name(), attempts, "artwork loaded");
                        return;
                    }
                    Err(e) => {
                        if attempts == 1 {
                            warn!(symbol = worker_symbol.name(), error = %e, "artwork load failed, retrying");
                        }
                        thread::sleep(delay);
                    }
                }
            }
            debug!(symbol = worker_symbol.name(), attempts, "artwork load abandoned");
        });

        self.slot = Some(InFlight {
            symbol: Arc::clone(symbol),
            cancel,
            handle,
        });
        true
    }

    /// Abandon the in-flight decode and start over with an empty slot.
    pub fn cancel(&mut self) {
        if let Some(flight) = self.slot.take() {
            flight.cancel.store(true, Ordering::Relaxed);
            // Detached: the thread exits on its own at the next retry.
            drop(flight.handle);
        }
    }

    /// Block until the slot is free or `timeout` elapses.
    ///
    /// Returns whether the loader is ready.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_ready() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.reap();
        true
    }

    /// Load every symbol in turn, waiting up to `per_symbol` for each.
    ///
    /// Returns the names of symbols that did not load in time. Those decodes
    /// are cancelled.
    pub fn load_all<'a, I>(&mut self, symbols: I, per_symbol: Duration) -> Vec<String>
    where
        I: IntoIterator<Item = &'a Arc<Symbol>>,
    {
        let mut missing = Vec::new();
        for symbol in symbols {
            if symbol.is_loaded() {
                continue;
            }
            if !self.wait(per_symbol) {
                self.cancel();
            }
            if !self.submit(symbol) || !self.wait(per_symbol) {
                self.cancel();
            }
            if !symbol.is_loaded() {
                missing.push(symbol.name().to_owned());
            }
        }
        missing
    }

    fn reap(&mut self) {
        if !self.slot.as_ref().is_some_and(|f| f.handle.is_finished()) {
            return;
        }
        if let Some(flight) = self.slot.take() {
            let _ = flight.handle.join();
        }
    }
}

impl Drop for ImageLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_png(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut pixmap = Pixmap::new(3, 2).unwrap();
        pixmap.fill(tiny_skia::Color::BLACK);
        pixmap.save_png(&path).unwrap();
        path
    }

    #[test]
    fn test_loads_symbol() {
        let dir = TempDir::new().unwrap();
        let path = temp_png(&dir, "ok.png");
        let symbol = Arc::new(Symbol::from_file("ok", path));
        let mut loader = ImageLoader::new();

        assert!(loader.is_ready());
        assert!(loader.submit(&symbol));
        assert!(loader.wait(Duration::from_secs(5)));
        assert!(symbol.is_loaded());
        assert_eq!(symbol.artwork().unwrap().width(), 3);
    }

    #[test]
    fn test_submit_while_busy_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = Arc::new(Symbol::from_file("ghost", dir.path().join("ghost.png")));
        let other = Arc::new(Symbol::from_file("other", temp_png(&dir, "other.png")));
        let mut loader = ImageLoader::new().with_retry_delay(Duration::from_millis(1));

        assert!(loader.submit(&missing));
        assert!(!loader.is_ready());
        assert_eq!(loader.in_flight(), Some("ghost"));
        assert!(!loader.submit(&other));
        assert!(!other.is_loaded());

        loader.cancel();
        assert!(loader.is_ready());
        assert!(loader.submit(&other));
        assert!(loader.wait(Duration::from_secs(5)));
        assert!(other.is_loaded());
        assert!(!missing.is_loaded());
    }

    #[test]
    fn test_submit_without_path() {
        let symbol = Arc::new(Symbol::named("nameless"));
        let mut loader = ImageLoader::new();
        assert!(!loader.submit(&symbol));
        assert!(loader.is_ready());
    }

    #[test]
    fn test_load_all_reports_missing() {
        let dir = TempDir::new().unwrap();
        let good = Arc::new(Symbol::from_file("good", temp_png(&dir, "good.png")));
        let bad = Arc::new(Symbol::from_file("bad", dir.path().join("bad.png")));
        let mut loader = ImageLoader::new().with_retry_delay(Duration::from_millis(1));

        let missing = loader.load_all([&good, &bad], Duration::from_millis(200));
        assert_eq!(missing, vec!["bad".to_string()]);
        assert!(good.is_loaded());
        assert!(loader.is_ready());
    }
}
