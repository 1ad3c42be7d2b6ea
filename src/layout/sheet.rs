//! Sheet geometry and pagination.
//!
//! Everything is derived once per job from the page size and the settings,
//! through a single centimetre-to-page-unit ratio. A page holds
//! `columns × rows` cards; a page that is not full uses a reduced grid packed
//! row-major from the top-left, and the used block is centred in the
//! printable area.

use serde::{Deserialize, Serialize};

use crate::cards::CardVariant;
use crate::core::{PageSize, PrintError, PrintSettings, Rect};

/// Slack in card widths when counting how many cards fit along an axis.
/// Only absorbs f32 rounding of an exact fit.
const FIT_EPSILON: f32 = 1e-5;

/// Fixed sheet geometry for one job, in page units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SheetGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub card_size: f32,
    pub columns: usize,
    pub rows: usize,
}

impl SheetGeometry {
    /// Geometry from raw page-unit measurements.
    #[must_use]
    pub fn new(page_width: f32, page_height: f32, margin: f32, card_size: f32) -> Self {
        let fit = |usable: f32| {
            if card_size > 0.0 && usable > 0.0 {
                (usable / card_size + FIT_EPSILON).floor() as usize
            } else {
                0
            }
        };
        Self {
            page_width,
            page_height,
            margin,
            card_size,
            columns: fit(page_width - 2.0 * margin),
            rows: fit(page_height - 2.0 * margin),
        }
    }

    /// Geometry for `settings` on `page`.
    ///
    /// Fails when not even one card fits in the printable area.
    pub fn from_settings(page: PageSize, settings: &PrintSettings) -> Result<Self, PrintError> {
        let ratio = page.units_per_cm();
        let geometry = Self::new(
            page.width,
            page.height,
            settings.sheet_margin_cm as f32 * ratio,
            settings.card_size_cm as f32 * ratio,
        );
        if geometry.capacity() == 0 {
            return Err(PrintError::CardTooLarge {
                card_size_cm: settings.card_size_cm,
                usable_width_cm: f64::from(geometry.usable_width() / ratio),
                usable_height_cm: f64::from(geometry.usable_height() / ratio),
            });
        }
        Ok(geometry)
    }

    #[must_use]
    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    #[must_use]
    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    /// Cards per full page.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.columns * self.rows
    }

    /// Pages needed for `total_items`.
    #[must_use]
    pub fn page_count(&self, total_items: usize) -> usize {
        match self.capacity() {
            0 => 0,
            capacity => total_items.div_ceil(capacity),
        }
    }

    /// Plan the page holding `items` cards, starting at item `first_item`.
    ///
    /// `items` is clamped to the page capacity.
    #[must_use]
    pub fn plan_page(&self, index: usize, first_item: usize, items: usize) -> PagePlan {
        let items = items.min(self.capacity());
        let (columns, rows) = if items == self.capacity() || self.columns == 0 {
            (self.columns, self.rows)
        } else {
            (items.min(self.columns), items.div_ceil(self.columns))
        };

        let used_width = columns as f32 * self.card_size;
        let used_height = rows as f32 * self.card_size;
        PagePlan {
            index,
            first_item,
            items,
            columns,
            rows,
            origin_x: self.margin + (self.usable_width() - used_width) / 2.0,
            origin_y: self.margin + (self.usable_height() - used_height) / 2.0,
            card_size: self.card_size,
        }
    }

    /// Plan every page for `total_items`.
    #[must_use]
    pub fn plan(&self, total_items: usize) -> Vec<PagePlan> {
        let capacity = self.capacity();
        (0..self.page_count(total_items))
            .map(|page| {
                let first = page * capacity;
                self.plan_page(page, first, (total_items - first).min(capacity))
            })
            .collect()
    }
}

/// Placement of the items on one page.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PagePlan {
    /// Page number, from 0.
    pub index: usize,
    /// Global index of the first item on this page.
    pub first_item: usize,
    /// Items placed on this page.
    pub items: usize,
    /// Columns of the used grid.
    pub columns: usize,
    /// Rows of the used grid.
    pub rows: usize,
    /// Top-left corner of the used block.
    pub origin_x: f32,
    pub origin_y: f32,
    pub card_size: f32,
}

impl PagePlan {
    /// Cell of the `slot`-th item on this page, row-major from the top-left.
    #[must_use]
    pub fn cell(&self, slot: usize) -> Rect {
        let columns = self.columns.max(1);
        let (row, column) = (slot / columns, slot % columns);
        Rect::square(
            self.origin_x + column as f32 * self.card_size,
            self.origin_y + row as f32 * self.card_size,
            self.card_size,
        )
    }

    /// Bounding box of the used grid.
    #[must_use]
    pub fn occupied(&self) -> Rect {
        Rect::new(
            self.origin_x,
            self.origin_y,
            self.columns as f32 * self.card_size,
            self.rows as f32 * self.card_size,
        )
    }

    /// Global item indices on this page.
    #[must_use]
    pub fn item_range(&self) -> std::ops::Range<usize> {
        self.first_item..self.first_item + self.items
    }
}

/// Card index and variant for global item `item` of a set of `card_count`.
///
/// The first `card_count` items are image variants, the rest name variants.
#[must_use]
pub fn item_source(item: usize, card_count: usize) -> (usize, CardVariant) {
    if item < card_count {
        (item, CardVariant::Image)
    } else {
        (item % card_count.max(1), CardVariant::Names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SheetGeometry {
        // 180 x 260 usable, 50-unit cards.
        SheetGeometry::new(200.0, 280.0, 10.0, 50.0)
    }

    #[test]
    fn test_grid_dimensions() {
        let g = scenario();
        assert_eq!((g.columns, g.rows), (3, 5));
        assert_eq!(g.capacity(), 15);
    }

    #[test]
    fn test_fit_tolerance() {
        // Exactly three cards across.
        assert_eq!(SheetGeometry::new(170.0, 100.0, 10.0, 50.0).columns, 3);
        // 2.9995 cards across is two, not three.
        let g = SheetGeometry::new(20.0 + 2.9995 * 50.0, 100.0, 10.0, 50.0);
        assert_eq!(g.columns, 2);
        assert!(g.columns as f32 * g.card_size <= g.usable_width());
    }

    #[test]
    fn test_page_count() {
        let g = scenario();
        assert_eq!(g.page_count(0), 0);
        assert_eq!(g.page_count(14), 1);
        assert_eq!(g.page_count(15), 1);
        assert_eq!(g.page_count(16), 2);
        assert_eq!(g.page_count(114), 8);
    }

    #[test]
    fn test_reduced_grid_centered() {
        let g = scenario();
        let plan = g.plan_page(0, 0, 14);
        assert_eq!((plan.columns, plan.rows), (3, 5));
        assert!((plan.origin_x - 25.0).abs() < 1e-4);
        assert!((plan.origin_y - 15.0).abs() < 1e-4);

        let plan = g.plan_page(1, 15, 2);
        assert_eq!((plan.columns, plan.rows), (2, 1));
        assert!((plan.origin_x - 50.0).abs() < 1e-4);
        assert!((plan.origin_y - 115.0).abs() < 1e-4);
    }

    #[test]
    fn test_cells_row_major() {
        let plan = scenario().plan_page(0, 0, 15);
        assert_eq!(plan.cell(0), Rect::square(25.0, 15.0, 50.0));
        assert_eq!(plan.cell(2), Rect::square(125.0, 15.0, 50.0));
        assert_eq!(plan.cell(3), Rect::square(25.0, 65.0, 50.0));
        assert!(plan.occupied().contains(&plan.cell(14)));
    }

    #[test]
    fn test_plan_splits_items() {
        let plans = scenario().plan(32);
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].item_range(), 0..15);
        assert_eq!(plans[1].item_range(), 15..30);
        assert_eq!(plans[2].item_range(), 30..32);
        assert_eq!(plans.iter().map(|p| p.items).sum::<usize>(), 32);
    }

    #[test]
    fn test_a4_defaults() {
        let g = SheetGeometry::from_settings(PageSize::A4, &PrintSettings::default()).unwrap();
        assert_eq!((g.columns, g.rows), (4, 5));
    }

    #[test]
    fn test_card_too_large() {
        let settings = PrintSettings::new()
            .with_card_size_cm(20.0)
            .with_margin_cm(2.0);
        let err = SheetGeometry::from_settings(PageSize::A4, &settings).unwrap_err();
        assert!(matches!(err, PrintError::CardTooLarge { .. }));
    }

    #[test]
    fn test_item_source() {
        assert_eq!(item_source(0, 7), (0, CardVariant::Image));
        assert_eq!(item_source(6, 7), (6, CardVariant::Image));
        assert_eq!(item_source(7, 7), (0, CardVariant::Names));
        assert_eq!(item_source(13, 7), (6, CardVariant::Names));
    }
}
