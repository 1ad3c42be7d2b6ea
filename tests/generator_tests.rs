//! Design invariants of generated card sets.

use dobble_cards::cards::projective_plane;
use dobble_cards::{cards_for, generate, Card, DesignError, SymbolRef, SUPPORTED_SYMBOLS_PER_CARD};
use proptest::prelude::*;
use rustc_hash::FxHashMap;

fn pool(n: usize) -> Vec<SymbolRef> {
    (0..n as u32).map(SymbolRef::new).collect()
}

fn assert_design(cards: &[Card], k: usize) {
    let n = cards_for(k);
    assert_eq!(cards.len(), n, "card count for k = {k}");

    for card in cards {
        assert_eq!(card.len(), k, "{card} has the wrong size");
        let mut symbols = card.symbols().to_vec();
        symbols.sort();
        symbols.dedup();
        assert_eq!(symbols.len(), k, "{card} repeats a symbol");
    }

    for (i, a) in cards.iter().enumerate() {
        for b in &cards[i + 1..] {
            assert_eq!(a.shared_with(b).len(), 1, "{a} and {b}");
        }
    }

    let mut appearances: FxHashMap<SymbolRef, usize> = FxHashMap::default();
    for symbol in cards.iter().flat_map(|c| c.symbols()) {
        *appearances.entry(*symbol).or_default() += 1;
    }
    assert_eq!(appearances.len(), n);
    assert!(appearances.values().all(|count| *count == k));
}

#[test]
fn test_supported_sizes_are_designs() {
    for k in SUPPORTED_SYMBOLS_PER_CARD {
        let cards = generate(k, &pool(cards_for(k))).unwrap();
        assert_design(&cards, k);
    }
}

#[test]
fn test_fano_plane() {
    let cards = generate(3, &pool(7)).unwrap();
    assert_eq!(cards.len(), 7);
    assert!(cards.iter().all(|c| c.len() == 3));
    assert_design(&cards, 3);
}

#[test]
fn test_larger_sets() {
    assert_eq!(generate(6, &pool(31)).unwrap().len(), 31);
    assert_eq!(generate(8, &pool(57)).unwrap().len(), 57);
    // K - 1 = 11 is prime too.
    assert_design(&generate(12, &pool(133)).unwrap(), 12);
}

#[test]
fn test_determinism() {
    let symbols = pool(57);
    assert_eq!(generate(8, &symbols).unwrap(), generate(8, &symbols).unwrap());
}

#[test]
fn test_insufficient_symbols_is_all_or_nothing() {
    for k in SUPPORTED_SYMBOLS_PER_CARD {
        let required = cards_for(k);
        assert_eq!(
            generate(k, &pool(required - 1)),
            Err(DesignError::InsufficientSymbols {
                required,
                available: required - 1,
            })
        );
    }
}

#[test]
fn test_non_prime_orders_refused() {
    for k in [5, 7, 9, 10] {
        assert!(matches!(
            generate(k, &pool(cards_for(k))),
            Err(DesignError::UnsupportedOrder { .. })
        ));
    }
}

#[test]
fn test_plane_point_counts() {
    for q in [1usize, 2, 3, 5, 7] {
        let lines = projective_plane(q);
        let n = q * q + q + 1;
        let mut counts = vec![0usize; n];
        for point in lines.iter().flatten() {
            counts[*point] += 1;
        }
        assert!(counts.iter().all(|c| *c == q + 1), "order {q}");
    }
}

proptest! {
    #[test]
    fn prop_any_pool_offset_is_a_design(
        k_index in 0..SUPPORTED_SYMBOLS_PER_CARD.len(),
        offset in 0u32..10_000,
        extra in 0usize..20,
    ) {
        let k = SUPPORTED_SYMBOLS_PER_CARD[k_index];
        let symbols: Vec<SymbolRef> = (0..(cards_for(k) + extra) as u32)
            .map(|i| SymbolRef::new(offset + i))
            .collect();
        let cards = generate(k, &symbols).unwrap();
        assert_design(&cards, k);
        prop_assert!(cards
            .iter()
            .flat_map(|c| c.symbols())
            .all(|s| symbols[..cards_for(k)].contains(s)));
    }

    #[test]
    fn prop_short_pools_fail(k_index in 0..SUPPORTED_SYMBOLS_PER_CARD.len(), short in 1usize..3) {
        let k = SUPPORTED_SYMBOLS_PER_CARD[k_index];
        let available = cards_for(k).saturating_sub(short);
        let is_insufficient = matches!(
            generate(k, &pool(available)),
            Err(DesignError::InsufficientSymbols { .. })
        );
        prop_assert!(is_insufficient);
    }
}
