//! Selection, copy and paste tests.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

mod fixtures;

use fixtures::{Item, TestFactory};
use gridview::{
    CellPool, Clipboard, Coordinate, GridError, GridModel, MemoryClipboard, Range, SelectionModel,
};

#[test]
fn test_serialize_cells() {
    let grid = fixtures::grid(5, false);
    let mut selection = SelectionModel::new();
    selection.begin(Coordinate::cell(1, 0));
    selection.extend(Coordinate::cell(2, 1));
    selection.end();

    assert_eq!(selection.serialize_to_text(&grid).unwrap(), "item1\t1\nitem2\t2");
}

#[test]
fn test_serialize_with_header_labels() {
    let grid = fixtures::grid(5, true);
    let mut selection = SelectionModel::new();
    selection.add_range(Range::new(Coordinate::RowHeader(0), Coordinate::RowHeader(1)));
    selection.add_range(Range::new(Coordinate::ColumnHeader(0), Coordinate::ColumnHeader(1)));

    // Corner empty, column labels on the first line, row labels first per line.
    assert_eq!(
        selection.serialize_to_text(&grid).unwrap(),
        "\tName\tWeight\nitem0\titem0\t0\nitem1\titem1\t1"
    );
}

#[test]
fn test_serialize_quotes_special_fields() {
    let grid = fixtures::grid(2, false);
    grid.row_data(0).unwrap().borrow_mut().name = "tab\there".into();
    let mut selection = SelectionModel::new();
    selection.add_range(Range::cells(0, 0, 1, 0));
    assert_eq!(selection.serialize_to_text(&grid).unwrap(), "\"tab\there\"\nitem1");
}

#[test]
fn test_serialize_unrendered_rows() {
    let grid = fixtures::grid(1000, false);
    let mut selection = SelectionModel::new();
    selection.begin(Coordinate::cell(900, 1));
    assert_eq!(selection.serialize_to_text(&grid).unwrap(), "900");
    assert_eq!(SelectionModel::new().serialize_to_text(&grid).unwrap(), "");
}

#[test]
fn test_paste_collects_errors_without_aborting() {
    let mut grid = fixtures::grid(3, false);
    let selection = SelectionModel::new();
    let report =
        selection.deserialize_and_apply("7\t(1,2)\nheavy\t3 4\n", Coordinate::cell(0, 1), &mut grid);

    assert_eq!(
        report.applied,
        vec![Coordinate::cell(0, 1), Coordinate::cell(0, 2), Coordinate::cell(1, 2)]
    );
    assert_eq!(report.errors.len(), 1);
    let (position, err) = &report.errors[0];
    assert_eq!(*position, Coordinate::cell(1, 1));
    assert!(matches!(err, GridError::Parse(_)));

    let first = grid.row_data(0).unwrap();
    assert_eq!(first.borrow().weight, 7.0);
    assert_eq!(first.borrow().position, [1.0, 2.0, 0.0]);
    assert_eq!(grid.row_data(1).unwrap().borrow().weight, 1.0);
    assert_eq!(grid.row_data(1).unwrap().borrow().position, [3.0, 4.0, 0.0]);
}

#[test]
fn test_paste_out_of_range_and_read_only() {
    let mut grid = fixtures::grid(1, false);
    let report =
        SelectionModel::new().deserialize_and_apply("a\t1\t2\t3\nb", Coordinate::cell(0, 0), &mut grid);
    assert_eq!(report.applied, vec![Coordinate::cell(0, 1), Coordinate::cell(0, 2)]);
    let kinds: Vec<_> = report
        .errors
        .iter()
        .map(|(p, e)| (*p, matches!(e, GridError::ReadOnly(_)), matches!(e, GridError::OutOfRange(_))))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Coordinate::cell(0, 0), true, false),
            (Coordinate::cell(0, 3), false, true),
            (Coordinate::cell(1, 0), false, true),
        ]
    );
}

#[test]
fn test_copy_paste_round_trip() {
    let source = fixtures::grid(6, false);
    for (i, data) in (0..6).filter_map(|i| source.row_data(i).map(|d| (i, d))) {
        let mut item = data.borrow_mut();
        item.weight = 10.5 * i as f64;
        item.position = [i as f64, -2.25, 1e3];
    }
    let mut selection = SelectionModel::new();
    selection.begin(Coordinate::cell(1, 1));
    selection.extend(Coordinate::cell(4, 2));
    selection.end();
    let text = selection.serialize_to_text(&source).unwrap();

    let mut target = fixtures::grid(6, false);
    let report = selection.deserialize_and_apply(&text, Coordinate::cell(1, 1), &mut target);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.applied.len(), 8);

    let all = source.all_range();
    let render = |grid: &gridview::GridModel<fixtures::Item>| -> Vec<_> {
        all.iter().map(|p| grid.value(p).unwrap().render()).collect()
    };
    assert_eq!(render(&source), render(&target));
}

#[test]
fn test_view_copy_and_paste() {
    let mut pool = CellPool::new();
    let mut factory = TestFactory::default();
    let mut clipboard = MemoryClipboard::new();
    let mut view = fixtures::view(20, false, 300.0, 299.0);
    view.refresh(&mut pool, &mut factory);
    view.tick(&mut pool, &mut factory);

    view.pointer_down(Coordinate::cell(2, 1), false, &mut factory);
    view.pointer_move(Coordinate::cell(3, 1), &mut factory);
    view.pointer_up();
    assert_eq!(view.copy_selection(&mut clipboard).unwrap(), "2\n3");
    assert_eq!(clipboard.get_text().as_deref(), Some("2\n3"));

    clipboard.set_text("8.5\nnope");
    let report = view.paste(&clipboard, &mut factory);
    assert_eq!(report.applied, vec![Coordinate::cell(2, 1)]);
    assert_eq!(report.errors.len(), 1);

    let good = view.grid().widget_at(Coordinate::cell(2, 1)).unwrap();
    let bad = view.grid().widget_at(Coordinate::cell(3, 1)).unwrap();
    assert_eq!(factory.widget(good).text, "8.5");
    assert_eq!(factory.widget(good).error, None);
    assert_eq!(factory.widget(bad).text, "3");
    let (_, err) = &report.errors[0];
    assert_eq!(factory.widget(bad).error, Some(err.to_string()));
}

/// Rendered data cells and column labels, for before/after comparisons.
fn snapshot(grid: &GridModel<Item>) -> (Vec<Option<String>>, Vec<Option<String>>) {
    let cells = grid.all_range().iter().map(|p| grid.value(p).unwrap().render()).collect();
    let labels = (0..grid.column_count()).map(|c| grid.text(Coordinate::ColumnHeader(c))).collect();
    (cells, labels)
}

#[test]
fn test_paste_back_copy_with_column_labels() {
    let mut pool = CellPool::new();
    let mut factory = TestFactory::default();
    let mut clipboard = MemoryClipboard::new();
    let mut view = fixtures::view(20, true, 300.0, 299.0);
    view.refresh(&mut pool, &mut factory);
    view.tick(&mut pool, &mut factory);

    view.pointer_down(Coordinate::ColumnHeader(1), false, &mut factory);
    view.pointer_move(Coordinate::cell(2, 2), &mut factory);
    view.pointer_up();
    assert_eq!(
        view.copy_selection(&mut clipboard).unwrap(),
        "Weight\tPosition\n0\t(0, 0.5, -1)\n1\t(1, 0.5, -1)\n2\t(2, 0.5, -1)"
    );

    let before = snapshot(view.grid());
    let report = view.paste(&clipboard, &mut factory);
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(
        report.applied[..3],
        [Coordinate::ColumnHeader(1), Coordinate::ColumnHeader(2), Coordinate::cell(0, 1)]
    );
    assert_eq!(report.applied.len(), 8);
    assert_eq!(snapshot(view.grid()), before);
}

#[test]
fn test_paste_back_copy_with_both_header_axes() {
    let mut grid = fixtures::grid(4, true);
    let mut selection = SelectionModel::new();
    selection.add_range(Range::new(Coordinate::RowHeader(0), Coordinate::RowHeader(1)));
    selection.add_range(Range::new(Coordinate::ColumnHeader(1), Coordinate::ColumnHeader(2)));
    let text = selection.serialize_to_text(&grid).unwrap();
    assert!(text.starts_with("\tName\tWeight\tPosition\nitem0\t"), "{text}");

    // The bounding box starts at the header corner.
    let span = selection.bounding_box().unwrap();
    let anchor = Coordinate::from_indices(span.min_row, span.min_column);
    assert_eq!(anchor, Coordinate::Invalid);

    let before = snapshot(&grid);
    let report = selection.deserialize_and_apply(&text, anchor, &mut grid);
    let rejected: Vec<_> = report
        .errors
        .iter()
        .map(|(p, e)| (*p, matches!(e, GridError::ReadOnly(_))))
        .collect();
    assert_eq!(rejected, vec![(Coordinate::cell(0, 0), true), (Coordinate::cell(1, 0), true)]);
    assert!(report.applied.contains(&Coordinate::ColumnHeader(0)));
    assert!(report.applied.contains(&Coordinate::RowHeader(1)));
    assert!(!report.applied.contains(&Coordinate::Invalid));
    assert_eq!(snapshot(&grid), before);
    assert_eq!(grid.text(Coordinate::RowHeader(1)).as_deref(), Some("item1"));
}

#[test]
fn test_pointer_selection_marks_widgets() {
    let mut pool = CellPool::new();
    let mut factory = TestFactory::default();
    let mut view = fixtures::view(20, false, 300.0, 299.0);
    view.refresh(&mut pool, &mut factory);
    view.tick(&mut pool, &mut factory);

    view.pointer_down(Coordinate::cell(0, 0), false, &mut factory);
    view.pointer_move(Coordinate::cell(1, 1), &mut factory);
    let widget = |view: &gridview::GridView<fixtures::Item>, r, c| {
        view.grid().widget_at(Coordinate::cell(r, c)).unwrap()
    };
    assert!(factory.widget(widget(&view, 1, 1)).selected);
    assert!(!factory.widget(widget(&view, 2, 1)).selected);
    assert!(factory.widget(widget(&view, 0, 0)).interactable);

    // Additive selection keeps the first range.
    view.pointer_up();
    view.pointer_down(Coordinate::cell(5, 2), true, &mut factory);
    assert!(factory.widget(widget(&view, 0, 1)).selected);
    assert!(factory.widget(widget(&view, 5, 2)).selected);
    assert!(factory.widget(widget(&view, 5, 2)).interactable);
    assert!(!factory.widget(widget(&view, 0, 0)).interactable);

    // Plain click starts over.
    view.pointer_down(Coordinate::cell(9, 0), false, &mut factory);
    assert!(!factory.widget(widget(&view, 0, 1)).selected);
    assert!(!factory.widget(widget(&view, 5, 2)).interactable);
}

#[test]
fn test_arrow_keys_move_active_cell() {
    let mut pool = CellPool::new();
    let mut factory = TestFactory::default();
    let mut view = fixtures::view(20, false, 300.0, 299.0);
    view.refresh(&mut pool, &mut factory);
    view.tick(&mut pool, &mut factory);

    assert_eq!(view.move_active(0, 1, &mut factory), Coordinate::cell(0, 0));
    assert_eq!(view.move_active(0, 1, &mut factory), Coordinate::cell(0, 1));
    assert_eq!(view.move_active(100, 100, &mut factory), Coordinate::cell(19, 2));
    assert!(view.selection().is_selected(Coordinate::cell(19, 2)));
    assert!(!view.selection().is_selected(Coordinate::cell(0, 1)));
}

#[test]
fn test_hit_testing() {
    let mut view = fixtures::view(20, true, 300.0, 299.0);
    assert_eq!(view.coordinate_at(150.0, 65.0), Coordinate::cell(2, 1));
    assert_eq!(view.coordinate_at(-10.0, 65.0), Coordinate::RowHeader(2));
    assert_eq!(view.coordinate_at(150.0, -10.0), Coordinate::ColumnHeader(1));
    assert_eq!(view.coordinate_at(-1.0, -1.0), Coordinate::Invalid);
}

#[test]
fn test_hit_testing_headers_after_scroll() {
    let mut pool = CellPool::new();
    let mut factory = TestFactory::default();
    let mut view = fixtures::view(20, true, 300.0, 299.0);
    view.scroll_to(0.0, 150.0, &mut pool, &mut factory);

    assert_eq!(view.coordinate_at(150.0, -10.0), Coordinate::ColumnHeader(1));
    assert_eq!(view.coordinate_at(-10.0, 65.0), Coordinate::RowHeader(7));
    assert_eq!(view.coordinate_at(150.0, 65.0), Coordinate::cell(7, 1));
}
