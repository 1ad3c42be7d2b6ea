//! Cards: the generated design and its two visual forms.
//!
//! ## Key Types
//!
//! - `Card`: One line of the design, `K` symbol references
//! - `CardShape`: Closed set of card outlines
//! - `CardVariant`: Image or name-text rendering of a card
//! - `CardSetGenerator`: Builds the card set from a symbol pool
//! - `CardRenderer`: Turns a card into a square raster

pub mod card;
pub mod generator;
pub mod renderer;
pub mod rng;

pub use card::{Card, CardShape, CardSymbols, CardVariant};
pub use generator::{
    cards_for, checked_cards_for, generate, is_supported_order, projective_plane,
    CardSetGenerator, SUPPORTED_SYMBOLS_PER_CARD,
};
pub use renderer::{CardRenderer, SymbolCardRenderer};
pub use rng::LayoutRng;
