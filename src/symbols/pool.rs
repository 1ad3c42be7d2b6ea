//! Symbol pool.
//!
//! The pool owns every selectable symbol. Cards never hold symbols directly,
//! only `SymbolRef`s into the pool they were generated from.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;
use tracing::debug;

/// Directory depth explored by [`SymbolPool::scan_dir`].
pub const MAX_SCAN_DEPTH: usize = 3;

/// File extensions recognised as symbol artwork.
pub const ARTWORK_EXTENSIONS: &[&str] = &["png"];

/// Index of a symbol in its pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolRef(pub u32);

impl SymbolRef {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// A selectable symbol.
///
/// Artwork is set at most once, either up front or by the `ImageLoader`.
#[derive(Debug)]
pub struct Symbol {
    name: String,
    path: Option<PathBuf>,
    artwork: OnceLock<Pixmap>,
}

impl Symbol {
    /// Symbol whose artwork will be loaded from `path`.
    pub fn from_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
            artwork: OnceLock::new(),
        }
    }

    /// Symbol with artwork already in memory.
    pub fn with_artwork(name: impl Into<String>, artwork: Pixmap) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(artwork);
        Self {
            name: name.into(),
            path: None,
            artwork: cell,
        }
    }

    /// Symbol with a name only (name-text cards, tests).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            artwork: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn artwork(&self) -> Option<&Pixmap> {
        self.artwork.get()
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.artwork.get().is_some()
    }

    /// Store decoded artwork. Returns false if artwork was already set.
    pub fn set_artwork(&self, artwork: Pixmap) -> bool {
        self.artwork.set(artwork).is_ok()
    }
}

/// Ordered collection of symbols.
///
/// ## Example
///
/// ```
/// use dobble_cards::symbols::{Symbol, SymbolPool};
///
/// let mut pool = SymbolPool::new();
/// let cat = pool.push(Symbol::named("cat"));
///
/// assert_eq!(pool.get(cat).unwrap().name(), "cat");
/// assert_eq!(pool.find("cat"), Some(cat));
/// ```
#[derive(Clone, Debug, Default)]
pub struct SymbolPool {
    symbols: Vec<Arc<Symbol>>,
    by_name: FxHashMap<String, SymbolRef>,
}

impl SymbolPool {
    /// Create a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool of artwork-less symbols, one per name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self::new();
        for name in names {
            pool.push(Symbol::named(name));
        }
        pool
    }

    /// Collect every artwork file under `dir`.
    ///
    /// Sub-directories are visited before the files of a directory, down to
    /// [`MAX_SCAN_DEPTH`]. Entries are visited in name order so the pool is
    /// stable across runs.
    pub fn scan_dir(dir: &Path) -> std::io::Result<Self> {
        let mut pool = Self::new();
        pool.scan_into(dir, 0)?;
        debug!(dir = %dir.display(), symbols = pool.len(), "scanned symbol directory");
        Ok(pool)
    }

    fn scan_into(&mut self, dir: &Path, depth: usize) -> std::io::Result<()> {
        if !dir.is_dir() || depth > MAX_SCAN_DEPTH {
            return Ok(());
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        entries.sort();

        for path in entries.iter().filter(|p| p.is_dir()) {
            self.scan_into(path, depth + 1)?;
        }

        for path in entries.iter().filter(|p| p.is_file() && is_artwork(p)) {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.is_empty() {
                    self.push(Symbol::from_file(stem, path.clone()));
                }
            }
        }
        Ok(())
    }

    /// Append a symbol and return its reference.
    ///
    /// Later symbols with a duplicate name stay reachable by reference but
    /// the name index keeps pointing at the first one.
    pub fn push(&mut self, symbol: Symbol) -> SymbolRef {
        let id = SymbolRef::new(self.symbols.len() as u32);
        self.by_name.entry(symbol.name().to_owned()).or_insert(id);
        self.symbols.push(Arc::new(symbol));
        id
    }

    #[must_use]
    pub fn get(&self, id: SymbolRef) -> Option<&Arc<Symbol>> {
        self.symbols.get(id.index())
    }

    /// Look up a symbol by display name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<SymbolRef> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Every reference in pool order.
    #[must_use]
    pub fn refs(&self) -> Vec<SymbolRef> {
        (0..self.symbols.len() as u32).map(SymbolRef::new).collect()
    }

    /// Iterate over `(reference, symbol)` pairs in pool order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolRef, &Arc<Symbol>)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolRef::new(i as u32), s))
    }

    /// Check that every symbol in `ids` has its artwork.
    #[must_use]
    pub fn all_loaded(&self, ids: &[SymbolRef]) -> bool {
        ids.iter()
            .all(|id| self.get(*id).is_some_and(|s| s.is_loaded()))
    }
}

fn is_artwork(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ARTWORK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
