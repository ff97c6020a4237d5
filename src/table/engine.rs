//! Table engine
//!
//! [`TableView`] owns the rows of one table, the columns that present them,
//! the sort state and the scroll/selection state. Sorting produces a
//! permutation of row indices; the row collection itself is never reordered.
//! Drawing is virtualized: only rows inside the viewport are asked to draw.

use super::column::{CellContext, Column, ColumnWidth, SortKey};
use super::loader::{LoadState, RowLoader, RowSource};
use super::virtualize::{scroll_to_reveal, visible_range};
use crate::inspect::Inspector;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    }
}

/// Active sort: column index and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: usize,
    pub direction: SortDirection,
}

pub struct TableView<R> {
    title: String,
    columns: Vec<Box<dyn Column<R>>>,
    rows: Vec<R>,
    loader: Option<RowLoader<R>>,
    sort: Option<SortSpec>,
    /// Display position -> row index
    order: Vec<usize>,
    offset: usize,
    /// Selected row, as an index into `rows`
    selected: Option<usize>,
    row_height: u16,
    /// Header cells of the last draw, for mouse hit-testing
    header_cells: Vec<(usize, Rect)>,
    /// Rows that fit the body in the last draw
    page: usize,
}

impl<R: Send + 'static> TableView<R> {
    pub fn new(title: &str, row_height: u16) -> Self {
        TableView {
            title: title.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            loader: None,
            sort: None,
            order: Vec::new(),
            offset: 0,
            selected: None,
            row_height: row_height.max(1),
            header_cells: Vec::new(),
            page: 0,
        }
    }

    /// Attach the source `load_rows` reads from
    pub fn with_source(mut self, source: Arc<dyn RowSource<R>>) -> Self {
        self.loader = Some(RowLoader::new(source));
        self
    }

    /// Replace the columns. The first primary sortable column becomes the
    /// initial ascending sort; without one, sorting is disabled and rows show
    /// in load order.
    pub fn set_columns(&mut self, columns: Vec<Box<dyn Column<R>>>) {
        self.sort = columns
            .iter()
            .position(|c| c.primary() && c.sortable())
            .map(|column| SortSpec {
                column,
                direction: SortDirection::Ascending,
            });
        self.columns = columns;
        self.header_cells.clear();
        self.resort();
    }

    pub fn columns(&self) -> &[Box<dyn Column<R>>] {
        &self.columns
    }

    /// Whether some column declares a primary sort key
    pub fn sorting_enabled(&self) -> bool {
        self.columns.iter().any(|c| c.primary() && c.sortable())
    }

    /// Load rows from the source unless it is unchanged since the last load
    pub fn load_rows(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let fetched = loader.load();
        self.apply_load(fetched);
    }

    /// Load rows from the source unconditionally
    pub fn reload_rows(&mut self) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };
        let fetched = loader.reload();
        self.apply_load(fetched);
    }

    /// Pick up a finished background load. Returns whether rows changed.
    pub fn poll(&mut self) -> bool {
        let Some(loader) = self.loader.as_mut() else {
            return false;
        };
        let fetched = loader.poll();
        self.apply_load(fetched)
    }

    /// A failed load leaves the table empty
    fn apply_load(&mut self, fetched: Option<Vec<R>>) -> bool {
        match fetched {
            Some(rows) => {
                self.set_rows(rows);
                true
            }
            None if matches!(self.load_state(), LoadState::Failed(_)) && !self.rows.is_empty() => {
                self.selected = None;
                self.set_rows(Vec::new());
                true
            }
            None => false,
        }
    }

    pub fn load_state(&self) -> LoadState {
        match &self.loader {
            Some(loader) => loader.state().clone(),
            None => LoadState::Completed,
        }
    }

    /// Replace the rows directly
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        if self.selected.is_some_and(|s| s >= self.rows.len()) {
            self.selected = None;
        }
        self.resort();
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    /// Sort by `column`: the active column flips direction, another column
    /// starts ascending. Returns `false` for columns that cannot sort.
    pub fn click_header(&mut self, column: usize) -> bool {
        if !self.sorting_enabled() || !self.columns.get(column).is_some_and(|c| c.sortable()) {
            return false;
        }
        self.sort = Some(match self.sort {
            Some(spec) if spec.column == column => SortSpec {
                column,
                direction: spec.direction.flipped(),
            },
            _ => SortSpec {
                column,
                direction: SortDirection::Ascending,
            },
        });
        self.resort();
        true
    }

    /// Hit-test a click against the header laid out in the last draw
    pub fn click_at(&mut self, x: u16, y: u16) -> bool {
        let hit = self
            .header_cells
            .iter()
            .find(|(_, rect)| y == rect.y && x >= rect.x && x < rect.x + rect.width)
            .map(|(column, _)| *column);
        match hit {
            Some(column) => self.click_header(column),
            None => false,
        }
    }

    /// Sort by the next sortable column after the active one
    pub fn cycle_sort(&mut self) -> bool {
        let start = self.sort.map_or(0, |s| s.column + 1);
        let n = self.columns.len();
        let next = (0..n)
            .map(|i| (start + i) % n)
            .find(|&c| self.columns[c].sortable());
        match next {
            Some(column) => self.click_header(column),
            None => false,
        }
    }

    /// Row indices in display order
    pub fn display_order(&self) -> &[usize] {
        &self.order
    }

    fn resort(&mut self) {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        if let Some(spec) = self.sort {
            if let Some(column) = self.columns.get(spec.column) {
                let keys: Vec<SortKey> = self.rows.iter().map(|r| column.sort_key(r)).collect();
                // Stable in both directions: ties keep load order
                match spec.direction {
                    SortDirection::Ascending => order.sort_by(|&a, &b| keys[a].cmp(&keys[b])),
                    SortDirection::Descending => order.sort_by(|&a, &b| keys[b].cmp(&keys[a])),
                }
            }
        }
        self.order = order;
    }

    pub fn scroll_by(&mut self, delta: isize) {
        let max = self.rows.len().saturating_sub(self.page.max(1));
        self.offset = self.offset.saturating_add_signed(delta).min(max);
    }

    fn selected_position(&self) -> Option<usize> {
        let selected = self.selected?;
        self.order.iter().position(|&r| r == selected)
    }

    pub fn select_next(&mut self) {
        let next = self.selected_position().map_or(0, |p| p + 1);
        if let Some(&row) = self.order.get(next) {
            self.selected = Some(row);
            self.reveal(next);
        }
    }

    pub fn select_prev(&mut self) {
        let prev = self.selected_position().map_or(0, |p| p.saturating_sub(1));
        if let Some(&row) = self.order.get(prev) {
            self.selected = Some(row);
            self.reveal(prev);
        }
    }

    fn reveal(&mut self, position: usize) {
        self.offset = scroll_to_reveal(self.offset, self.page, position);
    }

    /// Index into `rows` of the selected row
    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&R> {
        self.selected.and_then(|s| self.rows.get(s))
    }

    /// Draw header and visible rows. Loading, failure and emptiness are
    /// shown inside the table; nothing here fails.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, inspector: Option<&Inspector<'_>>, focused: bool) {
        let border_style = if focused {
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(DEFAULT_THEME.border_normal)
        };
        let block = Block::default()
            .title(format!(" {} ({}) ", self.title, self.rows.len()))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let header_area = Rect { height: 1, ..inner };
        let body = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };
        let cells = self.column_cells(header_area);
        self.draw_header(frame, &cells);

        match self.load_state() {
            LoadState::InFlight => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        "Loading…",
                        Style::default()
                            .fg(DEFAULT_THEME.comment)
                            .add_modifier(Modifier::ITALIC),
                    )),
                    body,
                );
                return;
            }
            LoadState::Failed(e) => {
                let panel = Paragraph::new(vec![
                    Line::from(Span::styled(
                        "Failed to load rows",
                        Style::default()
                            .fg(DEFAULT_THEME.error)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(e.to_string(), Style::default().fg(DEFAULT_THEME.fg))),
                    Line::from(Span::styled(
                        "press r to retry",
                        Style::default().fg(DEFAULT_THEME.comment),
                    )),
                ])
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(DEFAULT_THEME.error)),
                );
                frame.render_widget(panel, body);
                return;
            }
            _ => {}
        }

        let row_height = usize::from(self.row_height);
        self.page = usize::from(body.height) / row_height;
        let range = visible_range(self.offset, usize::from(body.height), row_height, self.order.len());
        self.offset = range.start;

        for (line_no, position) in range.enumerate() {
            let row_index = self.order[position];
            let row = &self.rows[row_index];
            let selected = self.selected == Some(row_index);
            let y = body.y + (line_no * row_height) as u16;
            let style = if selected {
                Style::default().bg(DEFAULT_THEME.current_line_bg)
            } else {
                Style::default()
            };

            for (column, cell) in self.columns.iter().zip(cells.iter()) {
                let ctx = CellContext {
                    row: row_index,
                    selected,
                    width: cell.width,
                    inspector,
                };
                let rect = Rect {
                    y,
                    height: self.row_height,
                    ..*cell
                };
                frame.render_widget(Paragraph::new(column.draw(row, &ctx)).style(style), rect);
            }
        }
    }

    fn column_cells(&self, header: Rect) -> Rc<[Rect]> {
        let constraints = self.columns.iter().map(|c| match c.width() {
            ColumnWidth::Fixed(w) => Constraint::Length(w),
            ColumnWidth::Proportional(w) => Constraint::Fill(w.max(1)),
        });
        Layout::horizontal(constraints).spacing(1).split(header)
    }

    fn draw_header(&mut self, frame: &mut Frame, cells: &[Rect]) {
        self.header_cells.clear();
        for (index, (column, cell)) in self.columns.iter().zip(cells.iter()).enumerate() {
            let mut spans = vec![Span::styled(
                column.header().to_string(),
                Style::default()
                    .fg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD),
            )];
            if let Some(spec) = self.sort.filter(|s| s.column == index) {
                spans.push(Span::styled(
                    spec.direction.indicator(),
                    Style::default().fg(DEFAULT_THEME.secondary),
                ));
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), *cell);
            self.header_cells.push((index, *cell));
        }
    }
}
