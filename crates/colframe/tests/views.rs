use colframe::{FrameError, Table, TableBuilder};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn counting(n: i64) -> Table {
    TableBuilder::new()
        .set_ints("col", (0..n).collect())
        .build()
        .unwrap()
}

fn ints(table: &Table, name: &str) -> Vec<i64> {
    table.ints(name).unwrap().to_vec()
}

#[test]
fn index_slice_scenario() {
    let table = counting(10);

    let picked = table.index_view(&[9, 8, 7, 6, 5]).unwrap().copy();
    assert_eq!(ints(&picked, "col"), vec![9, 8, 7, 6, 5]);
    assert!(picked.is_identity_index());

    let slice = table.slice_view(2, 6).unwrap();
    assert_eq!(ints(&slice, "col"), vec![2, 3, 4, 5]);
    let tail = slice.slice_view(2, -1).unwrap();
    assert_eq!(ints(&tail, "col"), vec![4, 5]);
    tail.check_consistency().unwrap();
}

#[test]
fn index_view_may_repeat_rows() {
    let table = counting(3);
    let view = table.index_view(&[0, 0, 2, 2, 1, 1]).unwrap();
    assert_eq!(view.num_rows(), 6);
    assert_eq!(ints(&view, "col"), vec![0, 0, 2, 2, 1, 1]);
    assert!(!view.is_identity_index());
    assert_eq!(
        table.index_view(&[3]).unwrap_err(),
        FrameError::RowOutOfBounds { index: 3, len: 3 }
    );
}

#[test]
fn reversed_slices_and_bad_bounds() {
    let table = counting(6);
    let reversed = table.slice_view(4, 1).unwrap();
    assert_eq!(ints(&reversed, "col"), vec![3, 2, 1]);
    assert_eq!(ints(&table.slice_view(0, -1).unwrap(), "col"), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(ints(&table.slice_view(-3, -1).unwrap(), "col"), vec![4, 5]);
    assert_eq!(
        table.slice_view(0, 7).unwrap_err(),
        FrameError::InvalidSlice {
            from: 0,
            to: 7,
            rows: 6
        }
    );
    assert!(table.slice_view(-8, 2).is_err());
}

#[test]
fn mask_scenario() {
    let table = counting(10);
    let mask: Vec<bool> = (0..10).map(|i| i % 2 == 0 && i < 5).collect();
    let evens = table.mask_view(&mask).unwrap();
    assert_eq!(ints(&evens, "col"), vec![0, 2, 4]);

    let narrowed = evens.mask_view(&[false, true, true]).unwrap();
    assert_eq!(ints(&narrowed, "col"), vec![2, 4]);
    assert_eq!(
        narrowed.mask_view(&[true]).unwrap_err(),
        FrameError::MaskLengthMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn masks_from_the_table_scratch() {
    let table = counting(5);
    let mut mask = table.zero_mask();
    mask[1] = true;
    mask[3] = true;
    let view = table.mask_view(&mask).unwrap();
    drop(mask);
    assert_eq!(ints(&view, "col"), vec![1, 3]);
}

#[test]
fn split_n_scenario() {
    let table = counting(5);
    let parts = table.split_n_view(3);
    let sizes: Vec<usize> = parts.iter().map(Table::num_rows).collect();
    assert_eq!(sizes, vec![2, 2, 1]);
    for part in &parts {
        part.check_consistency().unwrap();
    }
    assert_eq!(ints(&parts[2], "col"), vec![4]);

    let many = counting(2).split_n_view(4);
    let sizes: Vec<usize> = many.iter().map(Table::num_rows).collect();
    assert_eq!(sizes, vec![1, 1, 0, 0]);
    assert!(many[3].contains("col"));
    assert!(table.split_n_view(0).is_empty());
}

#[test]
fn split_in_batches() {
    let table = counting(7);
    let batches = table.split_view(3).unwrap();
    let sizes: Vec<usize> = batches.iter().map(Table::num_rows).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(table.split_view(0).unwrap_err(), FrameError::InvalidBatchSize);
    assert_eq!(counting(0).split_view(4).unwrap().len(), 1);
}

#[test]
fn train_test_split_takes_the_tail() {
    let table = counting(10);
    let (train, test) = table.split_train_test_views(0.25).unwrap();
    assert_eq!(ints(&train, "col"), (0..8).collect::<Vec<_>>());
    assert_eq!(ints(&test, "col"), vec![8, 9]);
    assert!(matches!(
        table.split_train_test_views(1.5),
        Err(FrameError::InvalidRatio(_))
    ));
    assert!(table.split_train_test_views(f64::NAN).is_err());
}

#[test]
fn sorting_bools_and_missing_ints() {
    let table = TableBuilder::new()
        .set_bools("b", vec![false, true, true, false, false])
        .set_ints("n", vec![3, -1, 0, 7, -1])
        .build()
        .unwrap();

    let by_bool = table.sorted_view("b").unwrap();
    assert_eq!(
        by_bool.bools("b").unwrap().to_vec(),
        vec![false, false, false, true, true]
    );
    // stable: ties keep their order
    assert_eq!(ints(&by_bool, "n"), vec![3, 7, -1, -1, 0]);
    assert_eq!(
        table.bools("b").unwrap().to_vec(),
        vec![false, true, true, false, false]
    );

    let by_int = table.sorted_view("n").unwrap();
    assert_eq!(ints(&by_int, "n"), vec![-1, -1, 0, 3, 7]);
    assert_eq!(
        ints(&by_int.reverse_view(), "n"),
        vec![7, 3, 0, -1, -1]
    );
}

#[test]
fn missing_ints_sort_as_minus_one() {
    let table = TableBuilder::new()
        .set_ints("c", vec![3, -5, -1, 0, -2])
        .build()
        .unwrap();
    assert_eq!(ints(&table.sorted_view("c").unwrap(), "c"), vec![-5, -2, -1, 0, 3]);

    let lowest = table.top_view("c", 1, true, true).unwrap();
    assert_eq!(ints(&lowest, "c"), vec![-5]);
    let highest = table.top_view("c", 2, false, false).unwrap();
    let mut picked = ints(&highest, "c");
    picked.sort_unstable();
    assert_eq!(picked, vec![0, 3]);
}

#[test]
fn sorting_floats_and_objects() {
    let table = TableBuilder::new()
        .set_floats("x", vec![2.5, -1.0, 0.0])
        .add_strings("s", [Some("a"), Some("b"), None])
        .build()
        .unwrap();
    let sorted = table.sorted_view("x").unwrap();
    assert_eq!(sorted.floats("x").unwrap().to_vec(), vec![-1.0, 0.0, 2.5]);
    assert_eq!(
        table.sorted_view("s").unwrap_err(),
        FrameError::NotNumeric("s".to_owned())
    );
    assert_eq!(
        table.sorted_view("missing").unwrap_err(),
        FrameError::UnknownColumn("missing".to_owned())
    );
}

#[test]
fn top_rows() {
    let table = TableBuilder::new()
        .set_floats("x", vec![5.0, 1.0, 4.0, 2.0, 3.0])
        .build()
        .unwrap();

    let largest = table.top_view("x", 2, false, true).unwrap();
    assert_eq!(largest.floats("x").unwrap().to_vec(), vec![5.0, 4.0]);

    let smallest = table.top_view("x", 3, true, false).unwrap();
    let mut values = smallest.floats("x").unwrap().to_vec();
    values.sort_by(f64::total_cmp);
    assert_eq!(values, vec![1.0, 2.0, 3.0]);

    assert_eq!(table.top_view("x", 99, true, true).unwrap().num_rows(), 5);
    assert_eq!(table.top_view("x", 0, true, false).unwrap().num_rows(), 0);
}

#[test]
fn reset_index_orders_physical_rows() {
    let table = counting(8);
    let mut rng = StdRng::seed_from_u64(11);
    let shuffled = table.shuffle_view_with(&mut rng);
    let reset = shuffled.reset_index_view();
    assert_eq!(reset.row_index().as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    assert!(reset.is_identity_index());
}

#[test]
fn seeded_shuffles_and_samples_are_reproducible() {
    let table = counting(50);
    let a = table.shuffle_view_with(&mut StdRng::seed_from_u64(3));
    let b = table.shuffle_view_with(&mut StdRng::seed_from_u64(3));
    assert_eq!(a.row_index(), b.row_index());

    let mut sorted = ints(&a, "col");
    sorted.sort_unstable();
    assert_eq!(sorted, (0..50).collect::<Vec<_>>());

    let sample = table
        .sample_view_with(10, false, &mut StdRng::seed_from_u64(9))
        .unwrap();
    let mut picked = ints(&sample, "col");
    picked.sort_unstable();
    picked.dedup();
    assert_eq!(picked.len(), 10);

    assert_eq!(
        table.sample_view(51, false).unwrap_err(),
        FrameError::SampleTooLarge {
            requested: 51,
            available: 50
        }
    );
    assert_eq!(
        table.sample_view(1, true).unwrap_err(),
        FrameError::ReplacementSampling
    );
}

#[test]
fn column_projection() {
    let table = TableBuilder::new()
        .set_ints("a", vec![1, 2])
        .set_floats("b", vec![0.5, 1.5])
        .add_strings("c", [Some("x"), Some("y")])
        .build()
        .unwrap();

    let projected = table.column_view(&["c", "a"]).unwrap();
    assert_eq!(projected.column_names(), vec!["c", "a"]);
    assert!(projected.is_string_column("c"));
    assert!(projected.raw().shared_columns().contains("a"));

    let all = table.column_view::<&str>(&[]).unwrap();
    assert_eq!(all.num_columns(), 3);

    assert_eq!(
        table.column_view(&["a", "zzz"]).unwrap_err(),
        FrameError::UnknownColumn("zzz".to_owned())
    );
}

#[test]
fn headers_by_type() {
    let table = TableBuilder::new()
        .set_ints("i", vec![1])
        .set_floats("f", vec![1.0])
        .set_bools("b", vec![true])
        .set_objects("o", vec![None])
        .add_strings("s", [Some("x")])
        .build()
        .unwrap();
    assert_eq!(table.int_header().names(), vec!["i"]);
    assert_eq!(table.float_header().names(), vec!["f"]);
    assert_eq!(table.bool_header().names(), vec!["b"]);
    assert_eq!(table.object_header().names(), vec!["o", "s"]);
    assert_eq!(table.string_header().names(), vec!["s"]);
    assert_eq!(
        table.header().except(&table.object_header()).names(),
        vec!["b", "f", "i"]
    );
}

#[test]
fn failed_views_leave_the_parent_alone() {
    let table = counting(4);
    let before = table.raw().identity();
    assert!(table.mask_view(&[true]).is_err());
    assert!(table.sorted_view("nope").is_err());
    assert!(table.detached_view(&["nope"]).is_err());
    assert_eq!(table.raw().identity(), before);
    assert_eq!(ints(&table, "col"), vec![0, 1, 2, 3]);
}
