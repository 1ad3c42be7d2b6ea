//! # dobble-cards
//!
//! Printable card sets for spot-the-matching-symbol games.
//!
//! ## Design Principles
//!
//! 1. **Exact Designs**: A set of `K`-symbol cards is the projective plane of
//!    order `K - 1`. Any two cards share exactly one symbol and every symbol
//!    appears on exactly `K` cards. Orders that are neither 1 nor prime are
//!    refused.
//!
//! 2. **Explicit Services**: Symbol pools, renderers, settings and jobs are
//!    plain values passed by reference. Nothing is process-global.
//!
//! 3. **Seams Over Backends**: The layout engine talks to a `CardRenderer`
//!    and a `PageSink`. The PDF backend and the symbol renderer are the
//!    standard implementations, not the only ones.
//!
//! ## Modules
//!
//! - `core`: Page geometry, print settings, errors
//! - `symbols`: Symbol pool and background artwork loading
//! - `cards`: Card values, the set generator, card rendering
//! - `layout`: Sheet geometry, pagination, PDF output, print jobs

pub mod cards;
pub mod core;
pub mod layout;
pub mod symbols;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, DesignError, PageSize, PrintError, PrintSettings, Rect, Segment,
};

pub use crate::symbols::{ImageLoader, Symbol, SymbolPool, SymbolRef};

pub use crate::cards::{
    cards_for, generate, Card, CardRenderer, CardSetGenerator, CardShape, CardVariant,
    LayoutRng, SymbolCardRenderer, SUPPORTED_SYMBOLS_PER_CARD,
};

pub use crate::layout::{
    BorderAssets, CancelToken, JobEvent, JobHandle, JobListener, JobOutcome, LayoutReport,
    PageSink, PdfSink, PrintJob, SheetGeometry, SheetLayout, SystemViewer, Viewer,
};
