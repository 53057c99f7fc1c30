//! Test fixtures: a recording widget factory and a small row type.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut pool = CellPool::new();
//! let mut factory = TestFactory::default();
//! let mut view = fixtures::view(100, false, 300.0, 299.0);
//! view.refresh(&mut pool, &mut factory);
//! view.tick(&mut pool, &mut factory);
//! ```
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use gridview::config::Size;
use gridview::grid::CellRect;
use gridview::layout::Viewport;
use gridview::parser::{parse_float, parse_vector};
use gridview::{
    CellFactory, CellTypeId, CellValue, Column, Coordinate, GridConfig, GridModel, GridView,
    RowData, WidgetId,
};

// ============================================================================
// Recording factory
// ============================================================================

/// Host-side state of one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub cell_type: CellTypeId,
    pub active: bool,
    pub text: String,
    pub rect: Option<CellRect>,
    pub interactable: bool,
    pub selected: bool,
    /// Message of the last rejected edit
    pub error: Option<String>,
}

/// Records every call the engine makes.
#[derive(Debug, Default)]
pub struct TestFactory {
    next: u64,
    pub widgets: BTreeMap<WidgetId, Widget>,
    pub created: usize,
    pub deactivations: usize,
}

impl TestFactory {
    pub fn widget(&self, id: WidgetId) -> &Widget {
        self.widgets.get(&id).expect("widget was created by this factory")
    }

    pub fn active_count(&self) -> usize {
        self.widgets.values().filter(|w| w.active).count()
    }

    fn entry(&mut self, id: WidgetId) -> &mut Widget {
        self.widgets.get_mut(&id).expect("widget was created by this factory")
    }
}

impl CellFactory for TestFactory {
    fn create(&mut self, cell_type: CellTypeId) -> WidgetId {
        self.next += 1;
        self.created += 1;
        let id = WidgetId(self.next);
        self.widgets.insert(
            id,
            Widget {
                cell_type,
                active: false,
                text: String::new(),
                rect: None,
                interactable: true,
                selected: false,
                error: None,
            },
        );
        id
    }

    fn activate(&mut self, widget: WidgetId) {
        self.entry(widget).active = true;
    }

    fn deactivate(&mut self, widget: WidgetId) {
        self.deactivations += 1;
        self.entry(widget).active = false;
    }

    fn set_text(&mut self, widget: WidgetId, text: &str) {
        self.entry(widget).text = text.to_string();
    }

    fn set_position(&mut self, widget: WidgetId, rect: CellRect) {
        self.entry(widget).rect = Some(rect);
    }

    fn interactable(&self, widget: WidgetId) -> bool {
        self.widget(widget).interactable
    }

    fn set_interactable(&mut self, widget: WidgetId, interactable: bool) {
        self.entry(widget).interactable = interactable;
    }

    fn set_selected(&mut self, widget: WidgetId, selected: bool) {
        self.entry(widget).selected = selected;
    }

    fn set_error(&mut self, widget: WidgetId, message: Option<&str>) {
        self.entry(widget).error = message.map(str::to_string);
    }
}

// ============================================================================
// Row type
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub weight: f64,
    pub position: [f64; 3],
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl RowData for Item {
    fn set_name(&mut self, name: &str) -> bool {
        self.name = name.to_string();
        true
    }
}

/// Read-only `Name`, editable `Weight` and `Position`.
pub fn item_columns() -> Vec<Column<Item>> {
    vec![
        Column::new("Name", |i: &Item| CellValue::from(i.name.as_str())),
        Column::new("Weight", |i: &Item| CellValue::Number(i.weight)).with_setter(
            |i: &mut Item, text: &str| {
                i.weight = parse_float(text)?;
                Ok(())
            },
        ),
        Column::new("Position", |i: &Item| CellValue::from(i.position))
            .with_cell_type(CellTypeId(1))
            .with_setter(|i: &mut Item, text: &str| {
                i.position = parse_vector::<3>(text)?;
                Ok(())
            }),
    ]
}

pub fn items(count: usize) -> Vec<Rc<RefCell<Item>>> {
    (0..count)
        .map(|i| {
            Rc::new(RefCell::new(Item {
                name: format!("item{i}"),
                weight: i as f64,
                position: [i as f64, 0.5, -1.0],
            }))
        })
        .collect()
}

/// 100x30 cells, no padding.
pub fn config(headers: bool) -> GridConfig {
    GridConfig {
        default_cell_size: Size::new(100.0, 30.0),
        cell_padding: Size::new(0.0, 0.0),
        show_row_headers: headers,
        show_column_headers: headers,
        ..GridConfig::default()
    }
}

pub fn grid(rows: usize, headers: bool) -> GridModel<Item> {
    let mut grid = GridModel::with_columns(config(headers), item_columns());
    grid.set_objects(items(rows));
    grid
}

pub fn view(rows: usize, headers: bool, width: f32, height: f32) -> GridView<Item> {
    GridView::new(grid(rows, headers), Viewport::new(width, height))
}

/// Row indices of the data cells in `positions`.
pub fn cell_rows(positions: &[Coordinate]) -> Vec<usize> {
    let mut rows: Vec<usize> = positions
        .iter()
        .filter_map(|p| match p {
            Coordinate::Cell { row, .. } => Some(*row),
            _ => None,
        })
        .collect();
    rows.dedup();
    rows
}
