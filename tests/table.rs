// Integration tests for the table engine

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use memscope::config::InspectorConfig;
use memscope::error::LoadError;
use memscope::inspect::{ExpandState, Inspector};
use memscope::layout::{FieldType, LayoutBuilder, LayoutCache, ScalarKind};
use memscope::memory::{Address, SnapshotMemory};
use memscope::table::{
    Column, ColumnWidth, LoadState, NumericColumn, RowSource, SortDirection, StructColumn,
    TableView, TextColumn,
};
use ratatui::{backend::TestBackend, Terminal};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: u64,
    score: i64,
    label: String,
}

fn columns() -> Vec<Box<dyn Column<Row>>> {
    vec![
        Box::new(
            NumericColumn::uint("id", |r: &Row| r.id)
                .with_width(ColumnWidth::Fixed(6))
                .as_primary(),
        ),
        Box::new(NumericColumn::int("score", |r: &Row| r.score).with_width(ColumnWidth::Fixed(8))),
        Box::new(TextColumn::new("label", |r: &Row| Some(r.label.clone()))),
    ]
}

fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}

fn draw(terminal: &mut Terminal<TestBackend>, table: &mut TableView<Row>) {
    terminal
        .draw(|f| table.draw(f, f.area(), None, true))
        .unwrap();
}

/// Poll until the background load settles
fn settle(table: &mut TableView<Row>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while table.load_state().is_in_flight() && Instant::now() < deadline {
        table.poll();
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_ten_thousand_rows_round_trip() {
    // Loaded with ids ascending and scores descending
    let rows: Vec<Row> = (0..10_000)
        .map(|i| Row {
            id: i,
            score: 10_000 - i as i64,
            label: format!("row {}", i),
        })
        .collect();
    let mut table = TableView::new("rows", 1);
    table.set_columns(columns());
    table.set_rows(rows.clone());

    let original: Vec<usize> = (0..10_000).collect();
    assert_eq!(table.display_order(), original.as_slice());

    assert!(table.click_header(1));
    let ascending: Vec<usize> = (0..10_000).rev().collect();
    assert_eq!(table.display_order(), ascending.as_slice());
    assert_eq!(table.rows(), rows.as_slice());

    assert!(table.click_header(1));
    assert_eq!(
        table.sort().map(|s| s.direction),
        Some(SortDirection::Descending)
    );
    assert_eq!(table.display_order(), original.as_slice());
    assert_eq!(table.rows(), rows.as_slice());
}

#[test]
fn test_ties_keep_load_order_both_ways() {
    let rows: Vec<Row> = (0..12)
        .map(|i| Row {
            id: i,
            score: (i % 3) as i64,
            label: String::new(),
        })
        .collect();
    let mut table = TableView::new("rows", 1);
    table.set_columns(columns());
    table.set_rows(rows);

    table.click_header(1);
    assert_eq!(
        table.display_order(),
        &[0, 3, 6, 9, 1, 4, 7, 10, 2, 5, 8, 11]
    );
    table.click_header(1);
    assert_eq!(
        table.display_order(),
        &[2, 5, 8, 11, 1, 4, 7, 10, 0, 3, 6, 9]
    );
}

#[test]
fn test_zero_rows_renders_headers() {
    let mut table = TableView::new("empty", 1);
    table.set_columns(columns());
    table.set_rows(Vec::new());

    let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
    draw(&mut terminal, &mut table);

    let screen = screen(&terminal);
    assert!(screen[0].contains("empty (0)"));
    assert!(screen[1].contains("id ▲"));
    assert!(screen[1].contains("score"));
    assert!(screen[1].contains("label"));
    assert!(screen[2..5].iter().all(|l| l.trim_matches(|c| c == '│' || c == ' ').is_empty()));
    assert_eq!(table.load_state(), LoadState::Completed);
}

#[test]
fn test_only_visible_rows_are_drawn() {
    let rows: Vec<Row> = (0..1_000)
        .map(|i| Row {
            id: i,
            score: 0,
            label: format!("row {}", i),
        })
        .collect();
    let mut table = TableView::new("rows", 1);
    table.set_columns(columns());
    table.set_rows(rows);

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    table.scroll_by(500);
    draw(&mut terminal, &mut table);

    let screen = screen(&terminal);
    // border, header, 5 rows, border
    assert!(screen[2].contains("row 500"));
    assert!(screen[6].contains("row 504"));
    assert!(!screen.iter().any(|l| l.contains("row 505")));
}

#[test]
fn test_header_click_hit_test() {
    let mut table = TableView::new("rows", 1);
    table.set_columns(columns());
    table.set_rows(vec![
        Row {
            id: 1,
            score: 5,
            label: "b".into(),
        },
        Row {
            id: 2,
            score: 3,
            label: "a".into(),
        },
    ]);

    // Nothing laid out yet
    assert!(!table.click_at(9, 1));

    let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
    draw(&mut terminal, &mut table);

    // Inside the border: id spans x 1..7, score starts at x 8
    assert!(table.click_at(9, 1));
    assert_eq!(table.sort().map(|s| s.column), Some(1));
    assert_eq!(table.display_order(), &[1, 0]);

    // Body rows are not headers
    assert!(!table.click_at(9, 2));

    draw(&mut terminal, &mut table);
    assert!(screen(&terminal)[1].contains("score ▲"));
}

struct SlowSource {
    delay: Duration,
    fail: bool,
}

impl RowSource<Row> for SlowSource {
    fn is_async(&self) -> bool {
        true
    }

    fn fetch(&self) -> Result<Vec<Row>, LoadError> {
        thread::sleep(self.delay);
        if self.fail {
            return Err(LoadError::Source("backend offline".into()));
        }
        Ok(vec![Row {
            id: 1,
            score: 1,
            label: "loaded".into(),
        }])
    }
}

#[test]
fn test_background_load_shows_progress_then_rows() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_millis(100),
        fail: false,
    });
    let mut table = TableView::new("rows", 1).with_source(source);
    table.set_columns(columns());
    table.load_rows();
    assert!(table.load_state().is_in_flight());

    let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
    draw(&mut terminal, &mut table);
    assert!(screen(&terminal)[2].contains("Loading…"));

    settle(&mut table);
    assert_eq!(table.load_state(), LoadState::Completed);
    draw(&mut terminal, &mut table);
    assert!(screen(&terminal)[2].contains("loaded"));

    // Unchanged source: no new load
    table.load_rows();
    assert_eq!(table.load_state(), LoadState::Completed);
}

#[test]
fn test_failed_load_shows_error_panel() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_millis(10),
        fail: true,
    });
    let mut table = TableView::new("rows", 1).with_source(source);
    table.set_columns(columns());
    table.load_rows();
    settle(&mut table);

    assert_eq!(
        table.load_state(),
        LoadState::Failed(LoadError::Source("backend offline".into()))
    );
    assert!(table.rows().is_empty());

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    draw(&mut terminal, &mut table);
    let screen = screen(&terminal);
    assert!(screen.iter().any(|l| l.contains("Failed to load rows")));
    assert!(screen.iter().any(|l| l.contains("press r to retry")));

    // A failed load is retried by the next load_rows
    table.load_rows();
    assert!(table.load_state().is_in_flight());
    settle(&mut table);
}

/// Serves three rows until switched to failing; every switch bumps the revision
struct FlakySource {
    failing: AtomicBool,
    revision: AtomicU64,
}

impl FlakySource {
    fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            revision: AtomicU64::new(0),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
        self.revision.fetch_add(1, Ordering::SeqCst);
    }
}

impl RowSource<Row> for FlakySource {
    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn is_async(&self) -> bool {
        true
    }

    fn fetch(&self) -> Result<Vec<Row>, LoadError> {
        thread::sleep(Duration::from_millis(50));
        if self.failing.load(Ordering::SeqCst) {
            return Err(LoadError::Source("down".into()));
        }
        Ok((10..13)
            .map(|i| Row {
                id: i,
                score: 0,
                label: format!("row {}", i),
            })
            .collect())
    }
}

#[test]
fn test_reload_in_flight_hides_previous_rows() {
    let source = Arc::new(FlakySource::new());
    let mut table = TableView::new("rows", 1).with_source(source);
    table.set_columns(columns());
    table.load_rows();
    settle(&mut table);
    assert_eq!(table.rows().len(), 3);

    table.reload_rows();
    assert!(table.load_state().is_in_flight());

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    draw(&mut terminal, &mut table);
    let lines = screen(&terminal);
    assert!(lines[2].contains("Loading…"));
    assert!(!lines.iter().any(|l| l.contains("row 11")));

    settle(&mut table);
    draw(&mut terminal, &mut table);
    assert!(screen(&terminal)[2].contains("row 10"));
}

#[test]
fn test_failed_reload_empties_the_table() {
    let source = Arc::new(FlakySource::new());
    let mut table = TableView::new("rows", 1).with_source(source.clone());
    table.set_columns(columns());
    table.load_rows();
    settle(&mut table);
    table.select_next();
    table.select_next();
    assert_eq!(table.selected_item().map(|r| r.id), Some(11));

    source.set_failing(true);
    table.reload_rows();
    settle(&mut table);

    assert_eq!(
        table.load_state(),
        LoadState::Failed(LoadError::Source("down".into()))
    );
    assert!(table.rows().is_empty());
    assert!(table.display_order().is_empty());
    assert!(table.selected_item().is_none());

    let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
    draw(&mut terminal, &mut table);
    assert!(screen(&terminal)[0].contains("rows (0)"));

    // Still interactive
    table.select_next();
    assert!(table.selected_item().is_none());
    table.click_header(1);
    assert!(table.display_order().is_empty());

    source.set_failing(false);
    table.load_rows();
    settle(&mut table);
    assert_eq!(table.rows().len(), 3);
}

#[derive(Debug)]
struct Placed {
    id: u64,
    pos: Address,
}

#[test]
fn test_struct_column_renders_through_inspector() {
    let layouts = LayoutCache::new();
    let mut vec2 = LayoutBuilder::new("Vec2", 8);
    vec2.field("x", 0, FieldType::scalar(ScalarKind::F32))
        .field("y", 4, FieldType::scalar(ScalarKind::F32));
    layouts.register(vec2);

    let mut mem = SnapshotMemory::new();
    let mut bytes = 3.0f32.to_ne_bytes().to_vec();
    bytes.extend((-1.0f32).to_ne_bytes());
    mem.insert(0x1000, bytes);

    let config = InspectorConfig::default();
    let expanded = ExpandState::new();
    let inspector = Inspector::new(&layouts, &mem, &expanded, &config);

    let mut table: TableView<Placed> = TableView::new("placed", 1);
    table.set_columns(vec![
        Box::new(NumericColumn::uint("id", |r: &Placed| r.id).with_width(ColumnWidth::Fixed(4))),
        Box::new(StructColumn::new("pos", "Vec2", |r: &Placed| Some(r.pos))),
    ]);
    table.set_rows(vec![
        Placed { id: 1, pos: 0x1000 },
        Placed { id: 2, pos: 0x5000 },
    ]);

    let mut terminal = Terminal::new(TestBackend::new(48, 6)).unwrap();
    terminal
        .draw(|f| table.draw(f, f.area(), Some(&inspector), false))
        .unwrap();

    let buffer = terminal.backend().buffer();
    let width = usize::from(buffer.area.width);
    let lines: Vec<String> = buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect();
    assert!(lines[2].contains("{ x: 3, y: -1 }"));
    assert!(lines[3].contains("<invalid 0x00005000>"));
}
