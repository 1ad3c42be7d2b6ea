//! Placement and pagination loop.
//!
//! Every card is printed twice: items `0..N` are the image variants of the
//! cards in order, items `N..2N` their name variants. Items are placed
//! row-major, page after page, each one rendered at the card's own raster
//! size and scaled into its cell. Overlays go on top once a page's items are
//! down.
//!
//! The cancel token is polled before each item. Once it is set no further
//! item is placed and no further page is started; the pages written so far
//! are closed and the document is finalised.

use serde::Serialize;
use tracing::{debug, info};

use super::border::BorderAssets;
use super::job::{CancelToken, JobEvent, JobListener};
use super::overlay::{cut_guides, registration_marks};
use super::sheet::{item_source, PagePlan, SheetGeometry};
use super::sink::PageSink;
use crate::cards::{Card, CardRenderer};
use crate::core::{PageSize, PrintError, PrintSettings};

/// Summary of one layout run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    /// Pages written to the sink.
    pub pages: usize,
    pub items_placed: usize,
    pub total_items: usize,
    pub aborted: bool,
}

/// Lays out card sets with fixed settings and page geometry.
#[derive(Clone, Debug)]
pub struct SheetLayout {
    settings: PrintSettings,
    geometry: SheetGeometry,
    borders: Option<BorderAssets>,
}

impl SheetLayout {
    /// Derive the page geometry for `settings` on `page`.
    pub fn new(settings: PrintSettings, page: PageSize) -> Result<Self, PrintError> {
        let geometry = SheetGeometry::from_settings(page, &settings)?;
        Ok(Self::with_geometry(settings, geometry))
    }

    /// Use an explicit geometry.
    #[must_use]
    pub fn with_geometry(settings: PrintSettings, geometry: SheetGeometry) -> Self {
        Self {
            settings,
            geometry,
            borders: None,
        }
    }

    /// Border artwork to use instead of the generated outline.
    #[must_use]
    pub fn with_border_assets(mut self, borders: BorderAssets) -> Self {
        self.borders = Some(borders);
        self
    }

    #[must_use]
    pub fn geometry(&self) -> &SheetGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn settings(&self) -> &PrintSettings {
        &self.settings
    }

    /// Place both variants of every card into `sink`.
    ///
    /// On error the sink is discarded before returning.
    pub fn run(
        &self,
        cards: &[Card],
        renderer: &dyn CardRenderer,
        sink: &mut dyn PageSink,
        cancel: &CancelToken,
        listener: &mut dyn JobListener,
    ) -> Result<LayoutReport, PrintError> {
        let result = self.place_all(cards, renderer, sink, cancel, listener);
        if result.is_err() {
            sink.discard();
        }
        result
    }

    fn place_all(
        &self,
        cards: &[Card],
        renderer: &dyn CardRenderer,
        sink: &mut dyn PageSink,
        cancel: &CancelToken,
        listener: &mut dyn JobListener,
    ) -> Result<LayoutReport, PrintError> {
        let Some(first) = cards.first() else {
            return Err(PrintError::EmptyCardSet);
        };

        let generated;
        let borders = match (&self.borders, self.settings.use_borders) {
            (_, false) => None,
            (Some(assets), true) => Some(assets),
            (None, true) => {
                generated = BorderAssets::standard(first.render_size_px())?;
                Some(&generated)
            }
        };

        let card_count = cards.len();
        let total = 2 * card_count;
        let plans = self.geometry.plan(total);
        info!(
            cards = card_count,
            items = total,
            pages = plans.len(),
            columns = self.geometry.columns,
            rows = self.geometry.rows,
            "laying out cards"
        );
        listener.on_event(JobEvent::Started {
            cards: card_count,
            items: total,
            pages: plans.len(),
        });

        let mut report = LayoutReport {
            total_items: total,
            ..LayoutReport::default()
        };

        for plan in &plans {
            sink.begin_page()?;
            let placed = self.place_page(
                plan, cards, renderer, borders, sink, cancel, listener, &mut report,
            )?;

            if self.settings.use_cut_guides {
                sink.draw_overlay(&cut_guides(plan))?;
            }
            if self.settings.use_registration_marks {
                sink.draw_overlay(&registration_marks(plan, &self.geometry))?;
            }
            sink.end_page()?;
            report.pages += 1;

            debug!(page = plan.index, items = placed, "page finished");
            listener.on_event(JobEvent::PageFinished {
                page: plan.index,
                items: placed,
            });
            if report.aborted {
                break;
            }
        }

        sink.finish()?;
        Ok(report)
    }

    /// Place the items of one page. Returns how many were placed.
    #[allow(clippy::too_many_arguments)]
    fn place_page(
        &self,
        plan: &PagePlan,
        cards: &[Card],
        renderer: &dyn CardRenderer,
        borders: Option<&BorderAssets>,
        sink: &mut dyn PageSink,
        cancel: &CancelToken,
        listener: &mut dyn JobListener,
        report: &mut LayoutReport,
    ) -> Result<usize, PrintError> {
        let mut placed = 0;
        for (slot, item) in plan.item_range().enumerate() {
            if cancel.is_cancelled() {
                report.aborted = true;
                break;
            }

            let (index, variant) = item_source(item, cards.len());
            let card = &cards[index];
            let size = card.render_size_px();
            let raster = renderer.render(card, variant, size)?;
            if raster.width() != size || raster.height() != size {
                return Err(PrintError::render(format!(
                    "card {index} {variant} raster is {}x{}, expected {size}x{size}",
                    raster.width(),
                    raster.height()
                )));
            }

            let cell = plan.cell(slot);
            sink.draw_card(cell, &raster)?;
            if let Some(assets) = borders {
                sink.draw_border(cell, card.shape(), assets.for_shape(card.shape()))?;
            }

            placed += 1;
            report.items_placed += 1;
            listener.on_event(JobEvent::ItemPlaced {
                item,
                page: plan.index,
                variant,
                done: report.items_placed,
                total: report.total_items,
            });
        }
        Ok(placed)
    }
}
