//! Pagination, item sequencing and cancellation through the public API.

use std::sync::Mutex;

use dobble_cards::layout::{cut_guides, item_source, registration_marks, Overlay, OverlayKind};
use dobble_cards::{
    generate, CancelToken, Card, CardRenderer, CardShape, CardVariant, JobEvent, PageSink,
    PrintError, PrintSettings, Rect, SheetGeometry, SheetLayout, SymbolRef,
};
use proptest::prelude::*;
use tiny_skia::Pixmap;

/// Renderer that records which (card, variant) pairs it was asked for.
#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<(usize, CardVariant)>>,
}

impl RecordingRenderer {
    fn raster(size: u32) -> Result<Pixmap, PrintError> {
        Pixmap::new(size, size).ok_or_else(|| PrintError::render("alloc"))
    }

    fn calls(&self) -> Vec<(usize, CardVariant)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CardRenderer for RecordingRenderer {
    fn render_image_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError> {
        self.calls.lock().unwrap().push((card.index(), CardVariant::Image));
        Self::raster(size_px)
    }

    fn render_name_variant(&self, card: &Card, size_px: u32) -> Result<Pixmap, PrintError> {
        self.calls.lock().unwrap().push((card.index(), CardVariant::Names));
        Self::raster(size_px)
    }
}

#[derive(Debug, PartialEq)]
enum SinkCall {
    Begin,
    Card(Rect),
    Border(Rect, CardShape),
    Overlay(OverlayKind),
    End,
    Finish,
}

#[derive(Default)]
struct RecordingSink {
    calls: Vec<SinkCall>,
}

impl RecordingSink {
    fn cards(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Card(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    fn count(&self, f: impl Fn(&SinkCall) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }
}

impl PageSink for RecordingSink {
    fn begin_page(&mut self) -> Result<(), PrintError> {
        self.calls.push(SinkCall::Begin);
        Ok(())
    }
    fn draw_card(&mut self, cell: Rect, _: &Pixmap) -> Result<(), PrintError> {
        self.calls.push(SinkCall::Card(cell));
        Ok(())
    }
    fn draw_border(&mut self, cell: Rect, shape: CardShape, _: &Pixmap) -> Result<(), PrintError> {
        self.calls.push(SinkCall::Border(cell, shape));
        Ok(())
    }
    fn draw_overlay(&mut self, overlay: &Overlay) -> Result<(), PrintError> {
        self.calls.push(SinkCall::Overlay(overlay.kind));
        Ok(())
    }
    fn end_page(&mut self) -> Result<(), PrintError> {
        self.calls.push(SinkCall::End);
        Ok(())
    }
    fn finish(&mut self) -> Result<(), PrintError> {
        self.calls.push(SinkCall::Finish);
        Ok(())
    }
}

fn fano_cards() -> Vec<Card> {
    let pool: Vec<SymbolRef> = (0..7).map(SymbolRef::new).collect();
    dobble_cards::CardSetGenerator::new()
        .with_render_size(16)
        .generate(3, &pool)
        .unwrap()
}

/// 180 x 260 usable area, 50-unit cards.
fn scenario_geometry() -> SheetGeometry {
    SheetGeometry::new(200.0, 280.0, 10.0, 50.0)
}

#[test]
fn test_scenario_single_centered_page() {
    let geometry = scenario_geometry();
    assert_eq!((geometry.columns, geometry.rows), (3, 5));
    assert_eq!(geometry.capacity(), 15);
    assert_eq!(geometry.page_count(14), 1);

    let plans = geometry.plan(14);
    assert_eq!(plans.len(), 1);
    assert_eq!((plans[0].columns, plans[0].rows), (3, 5));
    assert_eq!(plans[0].items, 14);

    let block = plans[0].occupied();
    let usable = Rect::new(10.0, 10.0, 180.0, 260.0);
    assert!(usable.contains(&block));
    assert!(((block.x - usable.x) - (usable.right() - block.right())).abs() < 1e-4);
    assert!(((block.y - usable.y) - (usable.bottom() - block.bottom())).abs() < 1e-4);
}

#[test]
fn test_item_sequencing() {
    let cards = fano_cards();
    let renderer = RecordingRenderer::default();
    let mut sink = RecordingSink::default();
    let layout = SheetLayout::with_geometry(PrintSettings::default(), scenario_geometry());

    let report = layout
        .run(&cards, &renderer, &mut sink, &CancelToken::new(), &mut |_: JobEvent| {})
        .unwrap();
    assert_eq!(report.items_placed, 14);

    let expected: Vec<_> = (0..14).map(|item| item_source(item, 7)).collect();
    assert_eq!(renderer.calls(), expected);
    assert_eq!(renderer.calls()[7], (0, CardVariant::Names));

    // Row-major placement from the top-left of the centred block.
    let cells = sink.cards();
    assert_eq!(cells[0], Rect::square(25.0, 15.0, 50.0));
    assert_eq!(cells[1], Rect::square(75.0, 15.0, 50.0));
    assert_eq!(cells[3], Rect::square(25.0, 65.0, 50.0));
    assert_eq!(
        sink.count(|c| matches!(c, SinkCall::Border(_, CardShape::Square))),
        14
    );
    assert_eq!(sink.calls.last(), Some(&SinkCall::Finish));
}

#[test]
fn test_progress_events() {
    let cards = fano_cards();
    let mut sink = RecordingSink::default();
    let layout = SheetLayout::with_geometry(PrintSettings::default(), scenario_geometry());
    let mut done = Vec::new();
    let mut pages = Vec::new();

    layout
        .run(
            &cards,
            &RecordingRenderer::default(),
            &mut sink,
            &CancelToken::new(),
            &mut |e: JobEvent| match e {
                JobEvent::ItemPlaced { done: d, total, .. } => {
                    assert_eq!(total, 14);
                    done.push(d);
                }
                JobEvent::PageFinished { page, items } => pages.push((page, items)),
                _ => {}
            },
        )
        .unwrap();

    assert_eq!(done, (1..=14).collect::<Vec<_>>());
    assert_eq!(pages, vec![(0, 14)]);
}

#[test]
fn test_cancel_mid_page_stops_everything() {
    let cards = fano_cards();
    let mut sink = RecordingSink::default();
    // 2 x 2 grid: four items per page, four pages planned.
    let geometry = SheetGeometry::new(120.0, 120.0, 10.0, 50.0);
    let layout = SheetLayout::with_geometry(PrintSettings::default(), geometry);
    let cancel = CancelToken::new();
    let token = cancel.clone();

    let report = layout
        .run(
            &cards,
            &RecordingRenderer::default(),
            &mut sink,
            &cancel,
            &mut |e: JobEvent| {
                if let JobEvent::ItemPlaced { done: 6, .. } = e {
                    token.cancel();
                }
            },
        )
        .unwrap();

    assert!(report.aborted);
    assert_eq!(report.items_placed, 6);
    assert_eq!(report.pages, 2);
    assert_eq!(sink.cards().len(), 6);
    assert_eq!(sink.count(|c| *c == SinkCall::Begin), 2);
    assert_eq!(sink.count(|c| *c == SinkCall::End), 2);
    assert_eq!(sink.calls.last(), Some(&SinkCall::Finish));
}

#[test]
fn test_overlays_follow_items() {
    let cards = fano_cards();
    let mut sink = RecordingSink::default();
    let settings = PrintSettings::default()
        .with_cut_guides(true)
        .with_registration_marks(true);
    let layout = SheetLayout::with_geometry(settings, scenario_geometry());

    layout
        .run(
            &cards,
            &RecordingRenderer::default(),
            &mut sink,
            &CancelToken::new(),
            &mut |_: JobEvent| {},
        )
        .unwrap();

    let n = sink.calls.len();
    assert_eq!(sink.calls[n - 4], SinkCall::Overlay(OverlayKind::CutGuides));
    assert_eq!(
        sink.calls[n - 3],
        SinkCall::Overlay(OverlayKind::RegistrationMarks)
    );
    assert_eq!(sink.calls[n - 2], SinkCall::End);
}

#[test]
fn test_reduced_grid_overlays() {
    let geometry = scenario_geometry();
    let plan = geometry.plan_page(1, 15, 2);
    assert_eq!((plan.columns, plan.rows), (2, 1));

    let guides = cut_guides(&plan);
    assert_eq!(guides.segments.len(), 1);
    assert!(guides.segments[0].is_vertical());
    assert!((guides.segments[0].length() - 50.0).abs() < 1e-4);

    let marks = registration_marks(&plan, &geometry);
    assert_eq!(marks.segments.len(), 2 * 3 + 2 * 2);
}

#[test]
fn test_circle_cards_use_square_border() {
    let pool: Vec<SymbolRef> = (0..3).map(SymbolRef::new).collect();
    let cards = dobble_cards::CardSetGenerator::new()
        .with_shape(CardShape::Circle)
        .with_render_size(8)
        .generate(2, &pool)
        .unwrap();
    let mut sink = RecordingSink::default();
    SheetLayout::with_geometry(PrintSettings::default(), scenario_geometry())
        .run(
            &cards,
            &RecordingRenderer::default(),
            &mut sink,
            &CancelToken::new(),
            &mut |_: JobEvent| {},
        )
        .unwrap();
    assert_eq!(
        sink.count(|c| matches!(c, SinkCall::Border(_, CardShape::Circle))),
        6
    );
}

#[test]
fn test_generated_cards_print_twice() {
    let pool: Vec<SymbolRef> = (0..13).map(SymbolRef::new).collect();
    let cards = generate(4, &pool).unwrap();
    let geometry = SheetGeometry::from_settings(Default::default(), &PrintSettings::default())
        .unwrap();
    assert_eq!(geometry.page_count(2 * cards.len()), 2);
}

proptest! {
    #[test]
    fn prop_pagination_capacity(
        columns in 1usize..6,
        rows in 1usize..8,
        items in 0usize..200,
    ) {
        let card = 50.0;
        let margin = 10.0;
        let geometry = SheetGeometry::new(
            2.0 * margin + columns as f32 * card + 7.0,
            2.0 * margin + rows as f32 * card + 3.0,
            margin,
            card,
        );
        prop_assert_eq!((geometry.columns, geometry.rows), (columns, rows));

        let capacity = columns * rows;
        prop_assert_eq!(geometry.page_count(items), items.div_ceil(capacity));

        let plans = geometry.plan(items);
        prop_assert_eq!(plans.iter().map(|p| p.items).sum::<usize>(), items);
        let usable = Rect::new(margin, margin, geometry.usable_width(), geometry.usable_height());
        for plan in &plans {
            prop_assert!(plan.items <= capacity);
            prop_assert!(plan.columns * plan.rows >= plan.items);
            prop_assert!(usable.contains(&plan.occupied()));
            for slot in 0..plan.items {
                prop_assert!(plan.occupied().contains(&plan.cell(slot)));
            }
        }
    }
}
