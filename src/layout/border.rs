//! Border artwork drawn over every card.
//!
//! Only a square border exists. `CardShape::Circle` goes through the same
//! lookup and gets the square asset.

use std::path::Path;

use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use crate::cards::CardShape;
use crate::core::PrintError;

/// Border stroke width relative to the asset edge.
const STROKE_RATIO: f32 = 0.012;

/// Lookup table from card shape to border asset.
#[derive(Clone, Debug)]
pub struct BorderAssets {
    square: Pixmap,
}

impl BorderAssets {
    /// A plain black square outline of `size_px` pixels on a transparent
    /// background.
    pub fn standard(size_px: u32) -> Result<Self, PrintError> {
        let mut pixmap = Pixmap::new(size_px, size_px)
            .ok_or_else(|| PrintError::render(format!("cannot allocate a {size_px}px border")))?;

        let size = size_px as f32;
        let width = (size * STROKE_RATIO).max(1.0);
        let inset = width / 2.0;
        let rect = tiny_skia::Rect::from_xywh(inset, inset, size - width, size - width)
            .ok_or_else(|| PrintError::render("border too small"))?;
        let path = PathBuilder::from_rect(rect);

        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        paint.anti_alias = true;
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        Ok(Self { square: pixmap })
    }

    /// Use an existing raster as the square border.
    #[must_use]
    pub fn from_square(square: Pixmap) -> Self {
        Self { square }
    }

    /// Load the square border from a PNG file.
    pub fn load_square(path: &Path) -> Result<Self, PrintError> {
        let square = Pixmap::load_png(path)
            .map_err(|e| PrintError::render(format!("border {}: {e}", path.display())))?;
        Ok(Self::from_square(square))
    }

    /// Asset for `shape`.
    #[must_use]
    pub fn for_shape(&self, shape: CardShape) -> &Pixmap {
        match shape {
            CardShape::Square => &self.square,
            CardShape::Circle => {
                debug!("no circle border asset, using square");
                &self.square
            }
        }
    }
}
