//! Document backend seam.
//!
//! The layout engine decides where everything goes; a `PageSink` turns those
//! decisions into a document. Coordinates are page units with the origin at
//! the top-left corner.

use tiny_skia::Pixmap;

use super::overlay::Overlay;
use crate::cards::CardShape;
use crate::core::{PrintError, Rect};

pub trait PageSink {
    /// Start a new, empty page.
    fn begin_page(&mut self) -> Result<(), PrintError>;

    /// Draw a card raster scaled into `cell`.
    fn draw_card(&mut self, cell: Rect, raster: &Pixmap) -> Result<(), PrintError>;

    /// Draw the border asset of `shape` scaled into `cell`.
    fn draw_border(&mut self, cell: Rect, shape: CardShape, asset: &Pixmap)
        -> Result<(), PrintError>;

    /// Composite an overlay over the current page.
    fn draw_overlay(&mut self, overlay: &Overlay) -> Result<(), PrintError>;

    /// Close the current page.
    fn end_page(&mut self) -> Result<(), PrintError>;

    /// Finalise the document. No call is valid afterwards.
    fn finish(&mut self) -> Result<(), PrintError>;

    /// Throw away whatever was written after a failure.
    fn discard(&mut self) {}
}
