#![cfg(not(target_arch = "wasm32"))]

use colframe::{row_concat, Table, TableBuilder};
use proptest::prelude::*;

fn counting(n: usize) -> Table {
    TableBuilder::new()
        .set_ints("c", (0..n as i64).collect())
        .build()
        .unwrap()
}

fn values(table: &Table) -> Vec<i64> {
    table.ints("c").unwrap().to_vec()
}

fn indices(len: usize, max: usize) -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(0..len.max(1), 0..max)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn index_views_compose(
        (n, a, b) in (1usize..40).prop_flat_map(|n| {
            indices(n, 60).prop_flat_map(move |a| {
                let len = a.len();
                (Just(n), Just(a), indices(len, 60))
            })
        })
    ) {
        let table = counting(n);
        let first = table.index_view(&a).unwrap();
        if a.is_empty() {
            prop_assert_eq!(first.num_rows(), 0);
        } else {
            let nested = first.index_view(&b).unwrap();
            let composed: Vec<usize> = b.iter().map(|&j| a[j]).collect();
            let direct = table.index_view(&composed).unwrap();
            prop_assert_eq!(values(&nested), values(&direct));
            nested.check_consistency().unwrap();
        }
    }

    #[test]
    fn reverse_is_an_involution(n in 0usize..100, seed in any::<u64>()) {
        use rand::SeedableRng;
        let table = counting(n).shuffle_view_with(&mut rand::rngs::StdRng::seed_from_u64(seed));
        let twice = table.reverse_view().reverse_view();
        prop_assert_eq!(values(&twice), values(&table));
    }

    #[test]
    fn sorted_views_are_sorted(data in proptest::collection::vec(-50i64..50, 0..80)) {
        let table = TableBuilder::new().set_ints("c", data.clone()).build().unwrap();
        let ascending = values(&table.sorted_view("c").unwrap());
        let descending = values(&table.sorted_view("c").unwrap().reverse_view());

        prop_assert!(ascending.windows(2).all(|w| w[0] <= w[1]));
        prop_assert!(descending.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(values(&table), data);
    }

    #[test]
    fn top_views_pick_the_extremes(
        data in proptest::collection::vec(-50i64..50, 1..60),
        n in 0usize..70,
        sorted in any::<bool>(),
    ) {
        let table = TableBuilder::new().set_ints("c", data.clone()).build().unwrap();
        let mut expected = data.clone();
        expected.sort_unstable();
        let k = n.min(data.len());

        let mut smallest = values(&table.top_view("c", n, true, sorted).unwrap());
        if !sorted {
            smallest.sort_unstable();
        }
        prop_assert_eq!(&smallest[..], &expected[..k]);

        let mut largest = values(&table.top_view("c", n, false, sorted).unwrap());
        if !sorted {
            largest.sort_unstable_by(|a, b| b.cmp(a));
        }
        let mut tail = expected[expected.len() - k..].to_vec();
        tail.reverse();
        prop_assert_eq!(largest, tail);
    }

    #[test]
    fn splits_cover_the_rows(n in 0usize..60, k in 1usize..12, batch in 1usize..12) {
        let table = counting(n).reverse_view();

        let parts = table.split_n_view(k);
        prop_assert_eq!(parts.len(), k);
        let refs: Vec<&Table> = parts.iter().collect();
        prop_assert_eq!(values(&row_concat(&refs).unwrap()), values(&table));

        let batches = table.split_view(batch).unwrap();
        prop_assert!(batches.iter().rev().skip(1).all(|b| b.num_rows() == batch));
        let refs: Vec<&Table> = batches.iter().collect();
        prop_assert_eq!(values(&row_concat(&refs).unwrap()), values(&table));
    }

    #[test]
    fn copies_are_idempotent(n in 0usize..50, seed in any::<u64>()) {
        use rand::SeedableRng;
        let table = counting(n).shuffle_view_with(&mut rand::rngs::StdRng::seed_from_u64(seed));
        let once = table.copy();
        let twice = once.copy();
        prop_assert_eq!(values(&once), values(&twice));
        prop_assert_eq!(values(&once), values(&table));
        prop_assert!(twice.is_identity_index());
    }
}

fn floats(table: &Table) -> Vec<f64> {
    table.floats("c").unwrap().to_vec()
}

/// One of the view-producing operations, picked by `kind`.
fn derived(parent: &Table, kind: usize, seed: u64) -> Table {
    let n = parent.num_rows();
    let s = seed as usize;
    match kind {
        0 => {
            let repeated: Vec<usize> =
                (0..2 * n).map(|k| k.wrapping_mul(k).wrapping_add(s) % n).collect();
            parent.index_view(&repeated).unwrap()
        }
        1 => {
            let mask: Vec<bool> = (0..n).map(|i| (seed >> (i % 64)) & 1 == 1).collect();
            parent.mask_view(&mask).unwrap()
        }
        2 => parent.reverse_view().sorted_view("c").unwrap(),
        3 => {
            let from = (s % (n + 1)) as isize;
            let to = (s / 7 % (n + 1)) as isize;
            parent.slice_view(from, to).unwrap()
        }
        4 => parent.column_view(&["c"]).unwrap(),
        _ => parent.shallow_copy(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 192,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn detached_writes_stay_local(
        n in 1usize..30,
        kind in 0usize..6,
        seed in any::<u64>(),
        x in -1e6f64..1e6,
    ) {
        let parent = TableBuilder::new()
            .set_floats("c", (0..n).map(|i| i as f64).collect())
            .set_ints("n", (0..n as i64).collect())
            .build()
            .unwrap();
        let view = derived(&parent, kind, seed);
        let sibling = parent.view();
        let before = (floats(&parent), floats(&view), floats(&sibling));

        let mut detached = view.detached_view(&["c"]).unwrap();
        prop_assert!(!detached.raw().shared_columns().contains("c"));
        if detached.num_rows() == 0 {
            return Ok(());
        }
        let row = (seed % detached.num_rows() as u64) as usize;
        detached.floats_mut("c").unwrap().set(row, x);

        prop_assert_eq!(detached.floats("c").unwrap()[row], x);
        prop_assert_eq!(floats(&parent), before.0);
        prop_assert_eq!(floats(&view), before.1);
        prop_assert_eq!(floats(&sibling), before.2);
        prop_assert_eq!(parent.ints("n").unwrap().to_vec(), (0..n as i64).collect::<Vec<_>>());
    }
}
