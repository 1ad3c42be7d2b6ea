//! Error types.
//!
//! Generation errors are raised before any card exists. Print errors end the
//! job they occur in; the caller gets a short classification through
//! [`PrintError::user_message`] and the full chain through `Display`.
//!
//! A user-requested abort is not an error. It is reported as
//! `JobOutcome::Aborted`.

use std::path::PathBuf;

use thiserror::Error;

use super::config::ConfigError;
use crate::symbols::SymbolRef;

/// Card set generation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DesignError {
    #[error("A card needs at least 2 symbols, got {symbols_per_card}")]
    SymbolsPerCardTooSmall { symbols_per_card: usize },

    #[error("{symbols_per_card} symbols per card gives design order {order}, which is not prime")]
    UnsupportedOrder { symbols_per_card: usize, order: usize },

    #[error("{symbols_per_card} symbols per card needs more cards than fit in usize")]
    TooManySymbolsPerCard { symbols_per_card: usize },

    #[error("Not enough symbols: {required} required, {available} available")]
    InsufficientSymbols { required: usize, available: usize },

    #[error("{0} appears more than once in the symbol pool")]
    DuplicateSymbol(SymbolRef),
}

/// Print job failures.
#[derive(Debug, Error)]
pub enum PrintError {
    #[error("Destination {path} is unavailable: {source}")]
    DestinationUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid destination {path}: {reason}")]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("Rendering failed: {0}")]
    RenderFailure(String),

    #[error("No cards to print")]
    EmptyCardSet,

    #[error("A {card_size_cm}cm card does not fit in the {usable_width_cm}x{usable_height_cm}cm printable area")]
    CardTooLarge {
        card_size_cm: f64,
        usable_width_cm: f64,
        usable_height_cm: f64,
    },

    #[error(transparent)]
    Design(#[from] DesignError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PrintError {
    /// Build a render failure from anything printable.
    pub fn render(message: impl std::fmt::Display) -> Self {
        Self::RenderFailure(message.to_string())
    }

    /// Classify an I/O error raised while opening `path` for writing.
    ///
    /// Missing parent directories and malformed names are the caller's
    /// mistake; everything else (locked, read-only, permissions) means the
    /// destination exists but cannot be used right now.
    pub fn destination(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let path = path.into();
        match source.kind() {
            ErrorKind::NotFound | ErrorKind::InvalidInput => Self::InvalidDestination {
                path,
                reason: source.to_string(),
            },
            _ => Self::DestinationUnavailable { path, source },
        }
    }

    /// Short message suitable for a status line.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::DestinationUnavailable { .. } => "File already opened",
            Self::InvalidDestination { .. } => "Invalid path",
            Self::RenderFailure(_) | Self::EmptyCardSet => "Cards generation failed",
            Self::CardTooLarge { .. } => "Cards do not fit on the page",
            Self::Design(DesignError::InsufficientSymbols { .. }) => "Not enough symbols selected",
            Self::Design(_) => "Unsupported number of symbols per card",
            Self::Config(_) => "Invalid print settings",
        }
    }
}
