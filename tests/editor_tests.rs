//! Cell editing tests.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod fixtures;

use fixtures::{Item, TestFactory};
use gridview::{CellEditor, CellPool, Coordinate, GridError, GridView};

fn rendered_view(factory: &mut TestFactory) -> GridView<Item> {
    let mut pool = CellPool::new();
    let mut view = fixtures::view(20, true, 400.0, 400.0);
    view.refresh(&mut pool, factory);
    view.tick(&mut pool, factory);
    view
}

fn widget_state(
    view: &GridView<Item>,
    factory: &TestFactory,
    position: Coordinate,
) -> (String, Option<String>) {
    let widget = factory.widget(view.grid().widget_at(position).unwrap());
    (widget.text.clone(), widget.error.clone())
}

#[test]
fn test_begin_edit_returns_current_text() {
    let mut factory = TestFactory::default();
    let view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();

    assert_eq!(editor.begin_edit(&view, Coordinate::cell(2, 1)).unwrap(), "2");
    assert_eq!(editor.editing(), Some(Coordinate::cell(2, 1)));
    assert_eq!(
        editor.begin_edit(&view, Coordinate::cell(1, 2)).unwrap(),
        "(1, 0.5, -1)"
    );
    assert_eq!(editor.begin_edit(&view, Coordinate::ColumnHeader(0)).unwrap(), "Name");
}

#[test]
fn test_begin_edit_refuses_read_only_and_missing_cells() {
    let mut factory = TestFactory::default();
    let view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();

    let err = editor.begin_edit(&view, Coordinate::cell(0, 0)).unwrap_err();
    assert!(matches!(err, GridError::ReadOnly(_)));
    let err = editor.begin_edit(&view, Coordinate::cell(99, 1)).unwrap_err();
    assert!(matches!(err, GridError::OutOfRange(_)));
    assert_eq!(editor.editing(), None);
}

#[test]
fn test_commit_writes_and_marks_dirty() {
    let mut factory = TestFactory::default();
    let mut view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();
    let position = Coordinate::cell(3, 1);

    editor.begin_edit(&view, position).unwrap();
    assert_eq!(editor.commit_edit(&mut view, " 12.5 ", &mut factory), Ok(position));

    assert_eq!(editor.editing(), None);
    assert_eq!(view.grid().row_data(3).unwrap().borrow().weight, 12.5);
    assert_eq!(widget_state(&view, &factory, position), ("12.5".to_string(), None));
    let dirty: Vec<_> = editor.dirty_cells().map(|(p, e)| (*p, e.value.clone())).collect();
    assert_eq!(dirty, vec![(position, " 12.5 ".to_string())]);

    editor.clear_dirty();
    assert!(!editor.is_dirty());
}

#[test]
fn test_rejected_commit_reports_caret_and_stays_open() {
    let mut factory = TestFactory::default();
    let mut view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();
    let position = Coordinate::cell(4, 2);

    editor.begin_edit(&view, position).unwrap();
    let rejection = editor
        .commit_edit(&mut view, "(1, 2,\n 3", &mut factory)
        .unwrap_err();
    assert_eq!(rejection.position, position);
    assert_eq!(rejection.caret, Some((0, 0)));
    assert_eq!(rejection.offset, Some(0));
    assert_eq!(
        rejection.to_string(),
        "C5: unterminated '(', expected ')' (line 1, column 1)"
    );

    assert_eq!(editor.editing(), Some(position));
    assert_eq!(editor.error(position), Some(&rejection));
    assert_eq!(
        widget_state(&view, &factory, position),
        ("(4, 0.5, -1)".to_string(), Some(rejection.to_string()))
    );
    assert!(!editor.is_dirty());

    // Fixing the text clears the message.
    assert_eq!(editor.commit_edit(&mut view, "(1, 2, 3)", &mut factory), Ok(position));
    assert_eq!(editor.error(position), None);
    assert_eq!(widget_state(&view, &factory, position), ("(1, 2, 3)".to_string(), None));
}

#[test]
fn test_cancel_clears_error_message() {
    let mut factory = TestFactory::default();
    let mut view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();
    let position = Coordinate::cell(5, 1);

    editor.begin_edit(&view, position).unwrap();
    let rejection = editor.commit_edit(&mut view, "x y", &mut factory).unwrap_err();
    assert_eq!(rejection.caret, Some((0, 2)));
    let message = widget_state(&view, &factory, position).1.unwrap();
    assert!(message.starts_with("B6: "), "{message}");
    assert!(message.ends_with("(line 1, column 3)"), "{message}");

    editor.cancel_edit(&view, &mut factory);
    assert_eq!(editor.editing(), None);
    assert_eq!(editor.error(position), None);
    assert_eq!(widget_state(&view, &factory, position), ("5".to_string(), None));
}

#[test]
fn test_rename_row_header() {
    let mut factory = TestFactory::default();
    let mut view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();
    let position = Coordinate::RowHeader(1);

    assert_eq!(editor.begin_edit(&view, position).unwrap(), "item1");
    assert_eq!(editor.commit_edit(&mut view, "renamed", &mut factory), Ok(position));
    assert_eq!(view.grid().text(position).as_deref(), Some("renamed"));
    assert_eq!(widget_state(&view, &factory, position).0, "renamed");
    assert_eq!(view.grid().row_data(1).unwrap().borrow().name, "renamed");
}

#[test]
fn test_commit_without_edit() {
    let mut factory = TestFactory::default();
    let mut view = rendered_view(&mut factory);
    let mut editor = CellEditor::new();

    let rejection = editor.commit_edit(&mut view, "1", &mut factory).unwrap_err();
    assert_eq!(rejection.position, Coordinate::Invalid);
    assert_eq!(rejection.caret, None);
}
