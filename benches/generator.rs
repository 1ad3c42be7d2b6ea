use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dobble_cards::{
    cards_for, generate, CardRenderer, CardSetGenerator, CardVariant, PageSize, PrintSettings,
    SheetGeometry, Symbol, SymbolCardRenderer, SymbolPool, SymbolRef,
    SUPPORTED_SYMBOLS_PER_CARD,
};
use resvg::usvg::fontdb;
use tiny_skia::{Color, Pixmap};

fn card_set_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for k in SUPPORTED_SYMBOLS_PER_CARD {
        let pool: Vec<SymbolRef> = (0..cards_for(k) as u32).map(SymbolRef::new).collect();
        group.bench_with_input(BenchmarkId::from_parameter(k), &pool, |b, pool| {
            b.iter(|| generate(black_box(k), black_box(pool)).expect("design"));
        });
    }
    group.finish();
}

fn page_planning(c: &mut Criterion) {
    let geometry =
        SheetGeometry::from_settings(PageSize::A4, &PrintSettings::default()).expect("geometry");
    c.bench_function("plan_114_items", |b| {
        b.iter(|| geometry.plan(black_box(114)));
    });
}

fn image_variant(c: &mut Criterion) {
    let mut pool = SymbolPool::new();
    for i in 0..57 {
        let mut art = Pixmap::new(64, 64).expect("pixmap");
        art.fill(Color::from_rgba8((i * 4) as u8, 120, 200, 255));
        pool.push(Symbol::with_artwork(format!("s{i}"), art));
    }
    let cards = CardSetGenerator::new()
        .with_render_size(295)
        .generate(8, &pool.refs())
        .expect("design");
    let renderer =
        SymbolCardRenderer::with_fonts(Arc::new(pool), Arc::new(fontdb::Database::new()));

    c.bench_function("render_image_variant_k8", |b| {
        b.iter(|| {
            renderer
                .render(black_box(&cards[0]), CardVariant::Image, 295)
                .expect("raster")
        });
    });
}

criterion_group!(benches, card_set_generation, page_planning, image_variant);
criterion_main!(benches);
