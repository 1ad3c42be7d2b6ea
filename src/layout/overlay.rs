//! Cutting aids drawn over a finished page.

use serde::{Deserialize, Serialize};

use super::sheet::{PagePlan, SheetGeometry};
use crate::core::Segment;

/// Stroke width of cut guides.
pub const CUT_GUIDE_WIDTH: f32 = 1.0;

/// Dash length of cut guides (equal on and off).
pub const CUT_GUIDE_DASH: f32 = 9.0;

/// Stroke width of registration marks.
pub const MARK_WIDTH: f32 = 2.0;

/// Length of one registration tick.
pub const MARK_LENGTH: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayKind {
    CutGuides,
    RegistrationMarks,
}

/// A set of black strokes sharing one style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub segments: Vec<Segment>,
    pub stroke_width: f32,
    pub dash: Option<f32>,
}

impl Overlay {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Dashed lines on every interior column and row boundary of the used grid.
///
/// Lines span the occupied block only.
#[must_use]
pub fn cut_guides(plan: &PagePlan) -> Overlay {
    let block = plan.occupied();
    let mut segments = Vec::new();

    for column in 1..plan.columns {
        let x = block.x + column as f32 * plan.card_size;
        segments.push(Segment::new(x, block.y, x, block.bottom()));
    }
    for row in 1..plan.rows {
        let y = block.y + row as f32 * plan.card_size;
        segments.push(Segment::new(block.x, y, block.right(), y));
    }

    Overlay {
        kind: OverlayKind::CutGuides,
        segments,
        stroke_width: CUT_GUIDE_WIDTH,
        dash: Some(CUT_GUIDE_DASH),
    }
}

/// Ticks in the sheet margins, aligned with every column and row boundary.
///
/// Column boundaries get a tick at the top and bottom edge of the printable
/// area, row boundaries at the left and right edge.
#[must_use]
pub fn registration_marks(plan: &PagePlan, geometry: &SheetGeometry) -> Overlay {
    let block = plan.occupied();
    let top = geometry.margin;
    let bottom = geometry.page_height - geometry.margin;
    let left = geometry.margin;
    let right = geometry.page_width - geometry.margin;
    let mut segments = Vec::with_capacity(2 * (plan.columns + plan.rows + 2));

    for column in 0..=plan.columns {
        let x = block.x + column as f32 * plan.card_size;
        segments.push(Segment::new(x, top, x, top + MARK_LENGTH));
        segments.push(Segment::new(x, bottom - MARK_LENGTH, x, bottom));
    }
    for row in 0..=plan.rows {
        let y = block.y + row as f32 * plan.card_size;
        segments.push(Segment::new(left, y, left + MARK_LENGTH, y));
        segments.push(Segment::new(right - MARK_LENGTH, y, right, y));
    }

    Overlay {
        kind: OverlayKind::RegistrationMarks,
        segments,
        stroke_width: MARK_WIDTH,
        dash: None,
    }
}
