//! Card values.
//!
//! A `Card` is created by the generator and never changes afterwards. It
//! only refers to symbols; artwork and names live in the `SymbolPool`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::symbols::SymbolRef;

/// Inline capacity for symbols on one card. Covers every supported size.
pub type CardSymbols = SmallVec<[SymbolRef; 8]>;

/// Outline of a printed card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardShape {
    #[default]
    Square,
    /// Has no border asset of its own yet; borders fall back to `Square`.
    Circle,
}

/// The two renderings printed for every card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardVariant {
    /// Symbol artwork arranged in a circle.
    Image,
    /// Symbol names stacked in rows.
    Names,
}

impl std::fmt::Display for CardVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Names => write!(f, "names"),
        }
    }
}

/// One card of a generated set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    index: usize,
    shape: CardShape,
    symbols: CardSymbols,
    render_size_px: u32,
}

impl Card {
    /// Create a card. `index` is its position in the generated set.
    #[must_use]
    pub fn new(
        index: usize,
        shape: CardShape,
        symbols: impl IntoIterator<Item = SymbolRef>,
        render_size_px: u32,
    ) -> Self {
        Self {
            index,
            shape,
            symbols: symbols.into_iter().collect(),
            render_size_px,
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn shape(&self) -> CardShape {
        self.shape
    }

    #[must_use]
    pub fn symbols(&self) -> &[SymbolRef] {
        &self.symbols
    }

    /// Edge length in pixels of the card raster.
    #[must_use]
    pub fn render_size_px(&self) -> u32 {
        self.render_size_px
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[must_use]
    pub fn contains(&self, symbol: SymbolRef) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Symbols this card has in common with `other`.
    #[must_use]
    pub fn shared_with(&self, other: &Card) -> CardSymbols {
        self.symbols
            .iter()
            .copied()
            .filter(|s| other.contains(*s))
            .collect()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card {} [", self.index)?;
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", symbol.raw())?;
        }
        write!(f, "]")
    }
}
