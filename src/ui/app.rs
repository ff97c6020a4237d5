//! Main TUI application state and logic

use crate::config::InspectorConfig;
use crate::demo::{self, DemoWorld, EntityRow};
use crate::inspect::{
    DocIndex, Documentation, DocumentationLookup, ExpandState, Inspector, Language, NodeKind,
    PresentationOptions, RenderMode, TreeBuilder, TreeLine,
};
use crate::layout::{LayoutCache, TypeKey};
use crate::memory::{AddressPath, LiveMemory, PathSegment};
use crate::table::{LoadState, StructColumn, TableView};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Inspector,
    Table,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Inspector => FocusedPane::Table,
            FocusedPane::Table => FocusedPane::Inspector,
        }
    }
}

/// Rows in the demo entity table
const TABLE_ROWS: usize = 10_000;
/// Simulated latency of the entity table's backend
const LOAD_DELAY: Duration = Duration::from_millis(400);

/// The main application state
pub struct App {
    layouts: LayoutCache,
    memory: LiveMemory,
    docs: DocIndex,
    config: InspectorConfig,
    world: DemoWorld,

    /// Open/closed nodes and array windows of the inspector tree
    expanded: ExpandState,
    options: PresentationOptions,
    table: TableView<EntityRow>,

    /// Tree lines of the last frame
    lines: Vec<TreeLine>,
    tree_selected: usize,
    tree_scroll: crate::ui::panes::TreeScrollState,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Last copied value
    pub yank: Option<String>,

    /// Documentation shown in the popup
    popup: Option<(String, Documentation)>,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,
    status_is_error: bool,
}

impl App {
    pub fn new(config: InspectorConfig) -> Self {
        let layouts = LayoutCache::new();
        demo::register_layouts(&layouts);
        let world = DemoWorld::new(TABLE_ROWS);

        let mut table = TableView::new("Entities", config.row_height)
            .with_source(world.row_source(LOAD_DELAY));
        table.set_columns(demo::entity_columns());
        table.load_rows();

        App {
            layouts,
            memory: LiveMemory::new(),
            docs: demo::docs(),
            config,
            world,
            expanded: ExpandState::new(),
            options: PresentationOptions::default().with_title("world"),
            table,
            lines: Vec::new(),
            tree_selected: 0,
            tree_scroll: Default::default(),
            focused_pane: FocusedPane::Inspector,
            yank: None,
            popup: None,
            should_quit: false,
            status_message: String::from("Ready!"),
            status_is_error: false,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            if self.table.poll() {
                self.set_status(format!("Loaded {} rows", self.table.rows().len()));
            }

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse_event(mouse),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Rebuild the inspector tree for this frame
    fn build_tree(&mut self) {
        let inspector = Inspector::new(&self.layouts, &self.memory, &self.expanded, &self.config)
            .with_docs(&self.docs);
        let mut out = TreeBuilder::new();

        let root = TypeKey::new("Entity");
        let mut error = inspector
            .render(&mut out, self.world.root(), &root, &self.options)
            .err();

        if let Some((row, item)) = self.table.selected_row().zip(self.table.selected_item()) {
            let options = self
                .options
                .clone()
                .with_address_path(StructColumn::<EntityRow>::row_path(row))
                .with_title(format!("row {}", item.id))
                .with_default_open(true);
            if let Err(e) = inspector.render(&mut out, item.pos, &TypeKey::new("Vec2"), &options) {
                error.get_or_insert(e);
            }
        }

        if let Some(e) = error {
            tracing::error!(error = %e, "layout error while rendering");
            self.status_message = format!("Layout error: {}", e);
            self.status_is_error = true;
        }
        self.lines = out.into_lines();
        self.tree_selected = self.tree_selected.min(self.lines.len().saturating_sub(1));
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        self.build_tree();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[0]);

        super::panes::render_tree_pane(
            frame,
            columns[0],
            super::panes::TreeRenderData {
                lines: &self.lines,
                selected: self.tree_selected,
                render_mode: self.options.render_mode,
            },
            self.focused_pane == FocusedPane::Inspector,
            &mut self.tree_scroll,
        );

        let inspector = Inspector::new(&self.layouts, &self.memory, &self.expanded, &self.config);
        self.table.draw(
            frame,
            columns[1],
            Some(&inspector),
            self.focused_pane == FocusedPane::Table,
        );

        let load_state = self.table.load_state();
        super::panes::render_status_bar(
            frame,
            main_chunks[1],
            super::panes::StatusRenderData {
                message: &self.status_message,
                is_error: self.status_is_error,
                path: self.selected_line().map(|l| l.path.to_string()),
                load_state: &load_state,
                language: self.options.language,
                render_mode: self.options.render_mode,
            },
        );

        if let Some((name, doc)) = &self.popup {
            super::panes::render_docs_popup(frame, main_chunks[0], name, doc);
        }
    }

    fn selected_line(&self) -> Option<&TreeLine> {
        match self.focused_pane {
            FocusedPane::Inspector => self.lines.get(self.tree_selected),
            FocusedPane::Table => None,
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.status_is_error = false;
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('d') | KeyCode::Enter) {
                self.popup = None;
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Char('s') => {
                if self.table.cycle_sort() {
                    self.announce_sort();
                } else {
                    self.set_status("No sortable column");
                }
            }
            KeyCode::Char('r') => {
                self.table.reload_rows();
                self.set_status("Reloading rows...");
            }
            KeyCode::Char('c') => self.copy_selected(),
            KeyCode::Char('d') => self.open_docs(),
            KeyCode::Char('l') => {
                self.options.language = match self.options.language {
                    Language::En => Language::De,
                    Language::De => Language::Fr,
                    Language::Fr => Language::Ja,
                    Language::Ja => Language::En,
                };
                self.set_status(format!("Language: {:?}", self.options.language));
            }
            KeyCode::Char('m') => {
                self.options.render_mode = match self.options.render_mode {
                    RenderMode::Raw => RenderMode::Rich,
                    RenderMode::Rich => RenderMode::Raw,
                };
            }
            KeyCode::Char('p') => {
                self.options.expand_pointers = !self.options.expand_pointers;
                self.set_status(if self.options.expand_pointers {
                    "Following pointers eagerly"
                } else {
                    "Following pointers on demand"
                });
            }
            _ => match self.focused_pane {
                FocusedPane::Inspector => self.handle_tree_key(key.code),
                FocusedPane::Table => self.handle_table_key(key.code),
            },
        }
    }

    fn handle_tree_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                self.tree_selected = self.tree_selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.tree_selected + 1 < self.lines.len() {
                    self.tree_selected += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(line) = self.lines.get(self.tree_selected) {
                    if let NodeKind::Branch { open } = line.kind {
                        self.expanded.set_open(line.path.clone(), !open);
                    }
                }
            }
            KeyCode::Right => {
                if let Some(line) = self.lines.get(self.tree_selected) {
                    if line.kind == (NodeKind::Branch { open: false }) {
                        self.expanded.set_open(line.path.clone(), true);
                    }
                }
            }
            KeyCode::Left => self.collapse_or_ascend(),
            KeyCode::PageUp => self.scroll_array(-1),
            KeyCode::PageDown => self.scroll_array(1),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.table.select_prev(),
            KeyCode::Down => self.table.select_next(),
            KeyCode::PageUp => self.table.scroll_by(-10),
            KeyCode::PageDown => self.table.scroll_by(10),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.table.click_at(mouse.column, mouse.row) {
                    self.focused_pane = FocusedPane::Table;
                    self.announce_sort();
                }
            }
            MouseEventKind::ScrollUp => match self.focused_pane {
                FocusedPane::Inspector => self.handle_tree_key(KeyCode::Up),
                FocusedPane::Table => self.table.scroll_by(-3),
            },
            MouseEventKind::ScrollDown => match self.focused_pane {
                FocusedPane::Inspector => self.handle_tree_key(KeyCode::Down),
                FocusedPane::Table => self.table.scroll_by(3),
            },
            _ => {}
        }
    }

    fn announce_sort(&mut self) {
        if let Some(spec) = self.table.sort() {
            let header = self
                .table
                .columns()
                .get(spec.column)
                .map(|c| c.header().to_string())
                .unwrap_or_default();
            self.set_status(format!("Sorted by {} ({:?})", header, spec.direction));
        }
    }

    /// Close the selected branch, or move to the parent line
    fn collapse_or_ascend(&mut self) {
        let Some(line) = self.lines.get(self.tree_selected) else {
            return;
        };
        if line.kind == (NodeKind::Branch { open: true }) {
            self.expanded.set_open(line.path.clone(), false);
            return;
        }
        let depth = line.depth;
        if let Some(parent) = self.lines[..self.tree_selected]
            .iter()
            .rposition(|l| l.depth + 1 == depth)
        {
            self.tree_selected = parent;
        }
    }

    /// Move the window of the array around the selected line by one page
    fn scroll_array(&mut self, direction: isize) {
        let Some(line) = self.lines.get(self.tree_selected) else {
            return;
        };
        let array_path = match line.kind {
            NodeKind::Ellipsis { .. } => Some(line.path.clone()),
            _ if line.elements.is_some() => Some(line.path.clone()),
            _ => match line.path.last() {
                Some(PathSegment::Index(_)) => line.path.parent(),
                _ => None,
            },
        };
        let Some(array_path) = array_path else {
            self.set_status("Not inside an array");
            return;
        };
        let Some(count) = self.array_len(&array_path) else {
            return;
        };
        if count <= self.config.array_virtualize_threshold {
            return;
        }
        let window = self.config.array_window;
        let offset = self.expanded.scroll_window(
            &array_path,
            direction * window as isize,
            count,
            window,
        );
        self.set_status(format!("Elements {}..{} of {}", offset, (offset + window).min(count), count));
    }

    fn array_len(&self, path: &AddressPath) -> Option<usize> {
        self.lines
            .iter()
            .find(|l| l.path == *path && l.elements.is_some())
            .and_then(|l| l.elements)
    }

    fn copy_selected(&mut self) {
        let copy = self.selected_line().and_then(|l| l.copy.clone());
        match copy {
            Some(text) => {
                self.set_status(format!("Copied {}", text));
                self.yank = Some(text);
            }
            None => self.set_status("Nothing to copy"),
        }
    }

    fn open_docs(&mut self) {
        let name = self
            .selected_line()
            .and_then(|l| l.doc_key.clone().or_else(|| l.type_docs.clone()));
        let Some(name) = name else {
            self.set_status("No documentation");
            return;
        };
        match self.docs.documentation(&name) {
            Some(doc) => self.popup = Some((name, doc)),
            None => self.set_status(format!("No documentation for {}", name)),
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.table.load_state()
    }
}
