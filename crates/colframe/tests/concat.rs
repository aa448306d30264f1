use colframe::{
    check_no_column_overlap, column_concat_view, column_copy_concat, column_smart_concat,
    row_concat, FrameError, Object, RawTable, Table, TableBuilder,
};
use pretty_assertions::assert_eq;

fn people() -> Table {
    TableBuilder::new()
        .set_ints("age", vec![31, 42, 27])
        .add_strings("name", [Some("ana"), Some("bo"), None])
        .build()
        .unwrap()
}

#[test]
fn rows_stack_in_order() {
    let table = people();
    let head = table.slice_view(0, 1).unwrap();
    let reversed = table.reverse_view();
    let stacked = row_concat(&[&head, &reversed]).unwrap();

    assert_eq!(stacked.ints("age").unwrap().to_vec(), vec![31, 27, 42, 31]);
    assert_eq!(
        stacked.strings("name").unwrap().iter().collect::<Vec<_>>(),
        vec![Some("ana"), None, Some("bo"), Some("ana")]
    );
    assert!(stacked.is_identity_index());
    stacked.check_consistency().unwrap();
}

#[test]
fn row_concat_requires_the_same_columns() {
    let table = people();
    let ages = table.column_view(&["age"]).unwrap();
    assert_eq!(
        row_concat(&[&ages, &table]).unwrap_err(),
        FrameError::ColumnSetMismatch { table: 1 }
    );
    assert_eq!(
        row_concat(&[&table, &ages]).unwrap_err(),
        FrameError::MissingColumn {
            column: "name".to_owned(),
            table: 1
        }
    );
    assert_eq!(row_concat(&[]).unwrap_err(), FrameError::EmptyInput);
}

#[test]
fn column_views_need_compatible_indices() {
    let table = people();
    let ages = table.column_view(&["age"]).unwrap();
    let names = table.column_view(&["name"]).unwrap();
    let joined = column_concat_view(&[&ages, &names]).unwrap();
    assert_eq!(joined.column_names(), vec!["age", "name"]);
    assert!(joined.is_string_column("name"));
    assert!(joined.raw().shared_columns().contains("age"));

    let reversed_names = names.reverse_view();
    assert_eq!(
        column_concat_view(&[&ages, &reversed_names]).unwrap_err(),
        FrameError::IndexMismatch
    );
    let short = names.slice_view(0, 2).unwrap();
    assert_eq!(
        column_concat_view(&[&ages, &short]).unwrap_err(),
        FrameError::RowCountMismatch {
            table: 1,
            expected: 3,
            actual: 2
        }
    );
    assert_eq!(
        column_concat_view(&[&table, &ages]).unwrap_err(),
        FrameError::ColumnOverlap {
            column: "age".to_owned(),
            table: 1
        }
    );
}

#[test]
fn smart_concat_falls_back_to_copies() {
    let table = people();
    let ages = table.column_view(&["age"]).unwrap();
    let names = table.column_view(&["name"]).unwrap().reverse_view();

    let joined = column_smart_concat(&[&ages, &names]).unwrap();
    assert_eq!(joined.ints("age").unwrap().to_vec(), vec![31, 42, 27]);
    assert_eq!(
        joined.strings("name").unwrap().iter().collect::<Vec<_>>(),
        vec![None, Some("bo"), Some("ana")]
    );
    assert!(joined.is_identity_index());

    let copied = column_copy_concat(&[&ages, &names]).unwrap();
    assert_eq!(copied.num_rows(), 3);
    assert!(check_no_column_overlap(&[&ages, &names]).is_ok());
}

#[test]
fn raw_tables_merge_by_rows_and_columns() {
    let a = TableBuilder::new()
        .set_ints("n", vec![1, 2])
        .set_objects("o", vec![Some(Object::Bool(true)), None])
        .into_raw();
    let b = TableBuilder::new()
        .set_ints("n", vec![3])
        .set_objects("o", vec![Some(Object::Float(0.5))])
        .into_raw();

    let rows = RawTable::merge_rows(&[&a, &b]).unwrap();
    assert_eq!(rows.int_values("n").unwrap(), &[1, 2, 3]);
    assert_eq!(rows.object_values("o").unwrap()[2], Some(Object::Float(0.5)));

    let c = TableBuilder::new().set_floats("x", vec![0.0, 1.0]).into_raw();
    let columns = RawTable::merge_columns(&[&a, &c]).unwrap();
    assert_eq!(columns.column_names(), vec!["n", "o", "x"]);
    assert!(columns.shared_columns().contains("x"));

    assert_eq!(
        RawTable::merge_columns(&[&a, &b]).unwrap_err(),
        FrameError::RowCountMismatch {
            table: 1,
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(RawTable::merge_rows(&[]).unwrap().num_columns(), 0);
}
