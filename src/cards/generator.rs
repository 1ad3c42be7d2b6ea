//! Card set generation.
//!
//! Cards are the lines of a finite projective plane of order `q = K - 1`:
//! `q² + q + 1` lines of `q + 1` points each, where any two lines meet in
//! exactly one point and every point lies on exactly `q + 1` lines. Points
//! map onto the first `N` entries of the symbol pool.
//!
//! ## Construction
//!
//! 1. The `q × q` grid of base points `0..q²`, row `i` = `[i·q .. i·q + q)`.
//!    Its rows form one parallel class.
//! 2. For each shift `s` in `1..q`, a derived class whose line `i` holds
//!    `grid[(s·j) mod q][(i + j) mod q]` for `j` in `0..q`. These are
//!    parallel classes only when `q` is prime.
//! 3. The transpose of the grid, one more class.
//! 4. Each of the `q + 1` classes gets its own extra point, appended to every
//!    line of the class. Extra points are numbered from `N - q - 1`.
//! 5. One last line made of the `q + 1` extra points.
//!
//! Lines are emitted in that order: base rows, derived classes by shift,
//! transpose, then the line of extra points.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::card::{Card, CardShape};
use crate::core::{DesignError, PrintSettings};
use crate::symbols::SymbolRef;

/// Symbols-per-card values offered to users.
pub const SUPPORTED_SYMBOLS_PER_CARD: [usize; 5] = [2, 3, 4, 6, 8];

/// Number of cards (and of distinct symbols) for `symbols_per_card`.
///
/// Saturates at `usize::MAX`; see [`checked_cards_for`].
#[must_use]
pub const fn cards_for(symbols_per_card: usize) -> usize {
    match checked_cards_for(symbols_per_card) {
        Some(n) => n,
        None => usize::MAX,
    }
}

/// `K² − K + 1`, or `None` on overflow.
#[must_use]
pub const fn checked_cards_for(symbols_per_card: usize) -> Option<usize> {
    let order = symbols_per_card.saturating_sub(1);
    match symbols_per_card.checked_mul(order) {
        Some(n) => n.checked_add(1),
        None => None,
    }
}

/// Check whether the construction is valid for design order `order`.
#[must_use]
pub fn is_supported_order(order: usize) -> bool {
    order == 1 || is_prime(order)
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Lines of the projective plane of order `order`, as 0-based point indices.
///
/// The caller guarantees `order` is 1 or prime; other orders produce lines
/// that violate the one-intersection property.
#[must_use]
pub fn projective_plane(order: usize) -> Vec<Vec<usize>> {
    let q = order;
    let n = q * q + q + 1;
    let first_extra = n - q - 1;

    let grid: Vec<Vec<usize>> = (0..q)
        .map(|i| (0..q).map(|j| i * q + j).collect())
        .collect();

    let mut lines: Vec<Vec<usize>> = Vec::with_capacity(n);

    // Base rows
    for row in &grid {
        let mut line = Vec::with_capacity(q + 1);
        line.extend_from_slice(row);
        line.push(first_extra);
        lines.push(line);
    }

    // Derived classes; the transpose takes extra point `first_extra + 1`.
    for shift in 1..q {
        for i in 0..q {
            let mut line: Vec<usize> = (0..q)
                .map(|j| grid[(shift * j) % q][(i + j) % q])
                .collect();
            line.push(first_extra + 1 + shift);
            lines.push(line);
        }
    }

    // Transpose
    for i in 0..q {
        let mut line: Vec<usize> = (0..q).map(|j| grid[j][i]).collect();
        line.push(first_extra + 1);
        lines.push(line);
    }

    // Line of extra points
    lines.push((first_extra..n).collect());

    lines
}

/// Builds card sets from a symbol pool.
///
/// ## Example
///
/// ```
/// use dobble_cards::cards::CardSetGenerator;
/// use dobble_cards::symbols::SymbolRef;
///
/// let pool: Vec<SymbolRef> = (0..7).map(SymbolRef::new).collect();
/// let cards = CardSetGenerator::new().generate(3, &pool).unwrap();
///
/// assert_eq!(cards.len(), 7);
/// assert_eq!(cards[0].shared_with(&cards[1]).len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct CardSetGenerator {
    shape: CardShape,
    render_size_px: u32,
}

impl Default for CardSetGenerator {
    fn default() -> Self {
        Self::for_settings(&PrintSettings::default())
    }
}

impl CardSetGenerator {
    /// Square cards sized for the default print settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Square cards sized for `settings`.
    #[must_use]
    pub fn for_settings(settings: &PrintSettings) -> Self {
        Self {
            shape: CardShape::Square,
            render_size_px: settings.render_size_px(),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: CardShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_render_size(mut self, size_px: u32) -> Self {
        self.render_size_px = size_px;
        self
    }

    /// Generate the full card set.
    ///
    /// Uses the first `cards_for(symbols_per_card)` entries of `pool`, which
    /// must be distinct. Fails before producing anything if the parameters
    /// are unusable.
    pub fn generate(
        &self,
        symbols_per_card: usize,
        pool: &[SymbolRef],
    ) -> Result<Vec<Card>, DesignError> {
        if symbols_per_card < 2 {
            return Err(DesignError::SymbolsPerCardTooSmall { symbols_per_card });
        }
        let order = symbols_per_card - 1;
        let Some(required) = checked_cards_for(symbols_per_card) else {
            return Err(DesignError::TooManySymbolsPerCard { symbols_per_card });
        };
        if !is_supported_order(order) {
            return Err(DesignError::UnsupportedOrder {
                symbols_per_card,
                order,
            });
        }

        if pool.len() < required {
            return Err(DesignError::InsufficientSymbols {
                required,
                available: pool.len(),
            });
        }

        let used = &pool[..required];
        let mut seen = FxHashSet::default();
        if let Some(dup) = used.iter().find(|s| !seen.insert(**s)) {
            return Err(DesignError::DuplicateSymbol(*dup));
        }

        let cards: Vec<Card> = projective_plane(order)
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                Card::new(
                    index,
                    self.shape,
                    line.into_iter().map(|point| used[point]),
                    self.render_size_px,
                )
            })
            .collect();

        debug!(
            symbols_per_card,
            order,
            cards = cards.len(),
            "generated card set"
        );
        Ok(cards)
    }
}

/// Generate square cards with the default render size.
pub fn generate(symbols_per_card: usize, pool: &[SymbolRef]) -> Result<Vec<Card>, DesignError> {
    CardSetGenerator::new().generate(symbols_per_card, pool)
}
