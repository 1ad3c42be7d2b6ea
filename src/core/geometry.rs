//! Page units and the small geometric types the layout engine emits.
//!
//! Page units are PDF points (1/72 inch). Layout coordinates have their
//! origin at the top-left corner of the page with `y` growing downwards;
//! document backends flip the axis if they need to.

use serde::{Deserialize, Serialize};

/// Centimetres to inches.
pub const CM_TO_INCH: f64 = 0.393701;

/// Width of an A4 sheet in centimetres.
pub const A4_WIDTH_CM: f32 = 21.0;

/// Height of an A4 sheet in centimetres.
pub const A4_HEIGHT_CM: f32 = 29.7;

/// Physical size of the output page, in page units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
    /// Physical width of the sheet in centimetres.
    pub width_cm: f32,
}

impl PageSize {
    /// A4 portrait, 595 x 842 points.
    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
        width_cm: A4_WIDTH_CM,
    };

    /// Page units per centimetre.
    ///
    /// Derived from the width only; every length on the page goes through
    /// this single ratio.
    #[must_use]
    pub fn units_per_cm(&self) -> f32 {
        self.width / self.width_cm
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Axis-aligned rectangle in page units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square cell with its top-left corner at `(x, y)`.
    #[must_use]
    pub const fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check whether `other` lies entirely inside this rectangle.
    ///
    /// A small tolerance absorbs float rounding on shared edges.
    #[must_use]
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Straight line segment in page units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Segment {
    #[must_use]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.x1 == self.x2
    }

    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        self.y1 == self.y2
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        ((self.x2 - self.x1).powi(2) + (self.y2 - self.y1).powi(2)).sqrt()
    }
}
