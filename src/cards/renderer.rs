//! Card rasterisation.
//!
//! `CardRenderer` is the seam between the layout engine and whatever draws
//! the cards. Both methods must be free of side effects and must return a
//! raster of exactly `size_px × size_px`.
//!
//! `SymbolCardRenderer` is the standard implementation:
//!
//! - **Image variant**: white card, one symbol in the centre, the others on a
//!   circle of radius `size / 3` starting at a random angle. Each symbol is
//!   fitted into a `size / 5` square slot with its aspect ratio kept.
//! - **Name variant**: white card, one bold name per row, rows spaced
//!   `size / (K + 1)` apart, each shifted horizontally by a random amount
//!   that keeps the laid-out name inside the padding. Text goes through
//!   `usvg`/`resvg` with the system fonts.

use std::f32::consts::FRAC_PI_4;
use std::fmt::Write as _;
use std::sync::Arc;

use resvg::usvg::{self, fontdb};
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};
use tracing::debug;

use super::card::{Card, CardVariant};
use super::rng::LayoutRng;
use crate::core::PrintError;
use crate::symbols::{SymbolPool, SymbolRef};

/// Symbol slot edge relative to the card edge.
const SYMBOL_SLOT_DIVISOR: u32 = 5;

/// Font size relative to the card edge.
const FONT_RATIO: f32 = 0.08;

/// Horizontal padding of the name rows, in pixels.
const NAME_PADDING: f32 = 15.0;

const NAME_STYLE: &str = r#"font-family="sans-serif" font-weight="bold" fill="black""#;

/// Renders cards into square rasters.
pub trait CardRenderer: Send + Sync {
    /// Symbol artwork arranged in a circle.
    fn render_image_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError>;

    /// Symbol names stacked in rows.
    fn render_name_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError>;

    /// Dispatch on `variant`.
    fn render(&self, card: &Card, variant: CardVariant, size_px: u32) -> Result<Pixmap, PrintError> {
        match variant {
            CardVariant::Image => self.render_image_variant(card, size_px),
            CardVariant::Names => self.render_name_variant(card, size_px),
        }
    }
}

/// Renders cards from a symbol pool's artwork and names.
pub struct SymbolCardRenderer {
    pool: Arc<SymbolPool>,
    fonts: Arc<fontdb::Database>,
    rng: LayoutRng,
}

impl SymbolCardRenderer {
    /// Renderer using the system fonts.
    #[must_use]
    pub fn new(pool: Arc<SymbolPool>) -> Self {
        Self::with_fonts(pool, Arc::new(system_fonts()))
    }

    /// Renderer using an explicit font database.
    #[must_use]
    pub fn with_fonts(pool: Arc<SymbolPool>, fonts: Arc<fontdb::Database>) -> Self {
        Self {
            pool,
            fonts,
            rng: LayoutRng::default(),
        }
    }

    /// Seed for placement jitter.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = LayoutRng::new(seed);
        self
    }

    #[must_use]
    pub fn pool(&self) -> &SymbolPool {
        &self.pool
    }

    fn draw_symbol(
        &self,
        canvas: &mut Pixmap,
        id: SymbolRef,
        center_x: f32,
        center_y: f32,
        slot: f32,
    ) -> Result<(), PrintError> {
        let symbol = self
            .pool
            .get(id)
            .ok_or_else(|| PrintError::render(format!("{id} is not in the symbol pool")))?;
        let art = symbol.artwork().ok_or_else(|| {
            PrintError::render(format!("artwork for '{}' is not loaded", symbol.name()))
        })?;

        let (w, h) = (art.width() as f32, art.height() as f32);
        let scale = (slot / w).min(slot / h);
        let tx = center_x - w * scale / 2.0;
        let ty = center_y - h * scale / 2.0;

        let paint = PixmapPaint {
            quality: FilterQuality::Bicubic,
            ..PixmapPaint::default()
        };
        canvas.draw_pixmap(
            0,
            0,
            art.as_ref(),
            &paint,
            Transform::from_row(scale, 0.0, 0.0, scale, tx, ty),
            None,
        );
        Ok(())
    }

    fn svg_options(&self) -> usvg::Options<'static> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fonts);
        options
    }

    /// Laid-out width of each name at `font_size`. Names the fonts cannot
    /// lay out measure zero.
    fn name_widths(&self, names: &[&str], font_size: f32) -> Result<Vec<f32>, PrintError> {
        let mut svg = String::from(r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1">"#);
        for (i, name) in names.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<text id="name{i}" x="0" y="{font_size:.1}" {NAME_STYLE} font-size="{font_size:.1}">{}</text>"#,
                escape_xml(name)
            );
        }
        svg.push_str("</svg>");

        let tree = usvg::Tree::from_str(&svg, &self.svg_options()).map_err(PrintError::render)?;
        Ok((0..names.len())
            .map(|i| {
                tree.node_by_id(&format!("name{i}"))
                    .map_or(0.0, |node| node.abs_bounding_box().width())
            })
            .collect())
    }

    fn names_svg(&self, card: &Card, size_px: u32) -> Result<String, PrintError> {
        let size = size_px as f32;
        let count = card.len();
        let row_height = size / (count + 1) as f32;
        let font_size = size * FONT_RATIO;
        let mut rng = self.rng.for_card(card.index(), CardVariant::Names);

        let names = card
            .symbols()
            .iter()
            .map(|id| {
                self.pool
                    .get(*id)
                    .map(|symbol| symbol.name())
                    .ok_or_else(|| PrintError::render(format!("{id} is not in the symbol pool")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let widths = self.name_widths(&names, font_size)?;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size_px}" height="{size_px}" viewBox="0 0 {size_px} {size_px}">"#
        );
        for (i, (name, width)) in names.iter().zip(&widths).enumerate() {
            let x = NAME_PADDING + rng.up_to(size - width - 2.0 * NAME_PADDING);
            let y = row_height / 8.0 + (i + 1) as f32 * row_height;
            let _ = write!(
                svg,
                r#"<text x="{x:.1}" y="{y:.1}" {NAME_STYLE} font-size="{font_size:.1}">{}</text>"#,
                escape_xml(name)
            );
        }
        svg.push_str("</svg>");
        Ok(svg)
    }
}

impl CardRenderer for SymbolCardRenderer {
    fn render_image_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError> {
        let mut canvas = blank_card(size_px)?;
        let Some((first, rest)) = card.symbols().split_first() else {
            return Ok(canvas);
        };

        let size = size_px as f32;
        let center = size / 2.0;
        let slot = (size_px / SYMBOL_SLOT_DIVISOR).max(1) as f32;
        self.draw_symbol(&mut canvas, *first, center, center, slot)?;

        if !rest.is_empty() {
            let step = std::f32::consts::TAU / rest.len() as f32;
            let radius = size / 3.0;
            let start = self.rng.for_card(card.index(), CardVariant::Image).angle();
            for (i, id) in rest.iter().enumerate() {
                let angle = start + step * i as f32 + FRAC_PI_4;
                let x = center + radius * angle.sin();
                let y = center + radius * angle.cos();
                self.draw_symbol(&mut canvas, *id, x, y, slot)?;
            }
        }
        Ok(canvas)
    }

    fn render_name_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError> {
        let mut canvas = blank_card(size_px)?;
        if card.is_empty() {
            return Ok(canvas);
        }

        let svg = self.names_svg(card, size_px)?;
        let tree = usvg::Tree::from_str(&svg, &self.svg_options()).map_err(PrintError::render)?;
        resvg::render(&tree, Transform::identity(), &mut canvas.as_mut());
        Ok(canvas)
    }
}

/// White, opaque `size_px × size_px` raster.
fn blank_card(size_px: u32) -> Result<Pixmap, PrintError> {
    let mut pixmap = Pixmap::new(size_px, size_px)
        .ok_or_else(|| PrintError::render(format!("cannot allocate a {size_px}px card")))?;
    pixmap.fill(Color::WHITE);
    Ok(pixmap)
}

/// Load the system fonts, making sure `sans-serif` resolves to something.
#[must_use]
pub fn system_fonts() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let query = fontdb::Query {
        families: &[fontdb::Family::SansSerif],
        ..fontdb::Query::default()
    };
    if db.query(&query).is_none() {
        let fallback = db
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(name) = fallback {
            debug!(family = %name, "no sans-serif font, using fallback");
            db.set_sans_serif_family(name);
        }
    }
    db
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
