//! Column contract and the stock column kinds
//!
//! A table knows nothing about its rows. Each [`Column`] turns a row into a
//! header cell, a sort key and a drawn cell:
//!
//! - [`NumericColumn`]: right-aligned numbers
//! - [`TextColumn`]: left-aligned text
//! - [`CustomColumn`]: caller-supplied drawing and optional sort key
//! - [`StructColumn`]: a one-line summary of a native struct, drawn through
//!   the struct inspector

use crate::inspect::{Inspector, NodeKind, PresentationOptions, TreeBuilder};
use crate::layout::TypeKey;
use crate::memory::{Address, AddressPath};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
};
use std::cmp::Ordering;

/// Horizontal space requested by a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Exact width in cells
    Fixed(u16),
    /// Share of the space left after fixed columns
    Proportional(u16),
}

/// Comparable projection of a cell value.
///
/// Ordering is total: numbers before text, `Missing` last, floats by
/// `total_cmp`.
#[derive(Debug, Clone)]
pub enum SortKey {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Missing,
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Int(_) | SortKey::UInt(_) | SortKey::Float(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Missing => 2,
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortKey::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (UInt(a), UInt(b)) => a.cmp(b),
            (Int(a), UInt(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (UInt(a), Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Float(a), UInt(b)) => a.total_cmp(&(*b as f64)),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (UInt(a), Float(b)) => (*a as f64).total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Per-cell drawing context
#[derive(Clone, Copy)]
pub struct CellContext<'c> {
    /// Index of the row in the backing collection
    pub row: usize,
    pub selected: bool,
    pub width: u16,
    pub inspector: Option<&'c Inspector<'c>>,
}

/// A pluggable table column over rows of type `R`
pub trait Column<R> {
    fn header(&self) -> &str;

    fn width(&self) -> ColumnWidth {
        ColumnWidth::Proportional(1)
    }

    fn sortable(&self) -> bool {
        false
    }

    /// Whether this column provides the initial sort
    fn primary(&self) -> bool {
        false
    }

    fn sort_key(&self, _row: &R) -> SortKey {
        SortKey::Missing
    }

    fn draw(&self, row: &R, ctx: &CellContext<'_>) -> Line<'static>;
}

type Getter<R, T> = Box<dyn Fn(&R) -> T>;

/// Right-aligned numeric column
pub struct NumericColumn<R> {
    header: String,
    width: ColumnWidth,
    primary: bool,
    precision: usize,
    get: Getter<R, SortKey>,
}

impl<R> NumericColumn<R> {
    pub fn int(header: &str, get: impl Fn(&R) -> i64 + 'static) -> Self {
        Self::with_key(header, 0, Box::new(move |r| SortKey::Int(get(r))))
    }

    pub fn uint(header: &str, get: impl Fn(&R) -> u64 + 'static) -> Self {
        Self::with_key(header, 0, Box::new(move |r| SortKey::UInt(get(r))))
    }

    pub fn float(header: &str, precision: usize, get: impl Fn(&R) -> f64 + 'static) -> Self {
        Self::with_key(header, precision, Box::new(move |r| SortKey::Float(get(r))))
    }

    fn with_key(header: &str, precision: usize, get: Getter<R, SortKey>) -> Self {
        NumericColumn {
            header: header.to_string(),
            width: ColumnWidth::Fixed(10),
            primary: false,
            precision,
            get,
        }
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl<R> Column<R> for NumericColumn<R> {
    fn header(&self) -> &str {
        &self.header
    }

    fn width(&self) -> ColumnWidth {
        self.width
    }

    fn sortable(&self) -> bool {
        true
    }

    fn primary(&self) -> bool {
        self.primary
    }

    fn sort_key(&self, row: &R) -> SortKey {
        (self.get)(row)
    }

    fn draw(&self, row: &R, _ctx: &CellContext<'_>) -> Line<'static> {
        let text = match (self.get)(row) {
            SortKey::Int(n) => n.to_string(),
            SortKey::UInt(n) => n.to_string(),
            SortKey::Float(f) => format!("{:.*}", self.precision, f),
            SortKey::Text(s) => s,
            SortKey::Missing => "-".to_string(),
        };
        Line::from(Span::styled(text, Style::default().fg(DEFAULT_THEME.number)))
            .alignment(Alignment::Right)
    }
}

/// Left-aligned text column
pub struct TextColumn<R> {
    header: String,
    width: ColumnWidth,
    primary: bool,
    get: Getter<R, Option<String>>,
}

impl<R> TextColumn<R> {
    pub fn new(header: &str, get: impl Fn(&R) -> Option<String> + 'static) -> Self {
        TextColumn {
            header: header.to_string(),
            width: ColumnWidth::Proportional(1),
            primary: false,
            get: Box::new(get),
        }
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl<R> Column<R> for TextColumn<R> {
    fn header(&self) -> &str {
        &self.header
    }

    fn width(&self) -> ColumnWidth {
        self.width
    }

    fn sortable(&self) -> bool {
        true
    }

    fn primary(&self) -> bool {
        self.primary
    }

    fn sort_key(&self, row: &R) -> SortKey {
        (self.get)(row).map_or(SortKey::Missing, SortKey::Text)
    }

    fn draw(&self, row: &R, _ctx: &CellContext<'_>) -> Line<'static> {
        match (self.get)(row) {
            Some(text) => Line::from(Span::styled(text, Style::default().fg(DEFAULT_THEME.fg))),
            None => Line::from(Span::styled("-", Style::default().fg(DEFAULT_THEME.comment))),
        }
    }
}

type Drawer<R> = Box<dyn Fn(&R, &CellContext<'_>) -> Line<'static>>;

/// Column drawn by a caller-supplied closure
pub struct CustomColumn<R> {
    header: String,
    width: ColumnWidth,
    primary: bool,
    draw: Drawer<R>,
    key: Option<Getter<R, SortKey>>,
}

impl<R> CustomColumn<R> {
    pub fn new(header: &str, draw: impl Fn(&R, &CellContext<'_>) -> Line<'static> + 'static) -> Self {
        CustomColumn {
            header: header.to_string(),
            width: ColumnWidth::Proportional(1),
            primary: false,
            draw: Box::new(draw),
            key: None,
        }
    }

    /// Make the column sortable by `key`
    pub fn with_sort_key(mut self, key: impl Fn(&R) -> SortKey + 'static) -> Self {
        self.key = Some(Box::new(key));
        self
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl<R> Column<R> for CustomColumn<R> {
    fn header(&self) -> &str {
        &self.header
    }

    fn width(&self) -> ColumnWidth {
        self.width
    }

    fn sortable(&self) -> bool {
        self.key.is_some()
    }

    fn primary(&self) -> bool {
        self.primary && self.key.is_some()
    }

    fn sort_key(&self, row: &R) -> SortKey {
        self.key.as_ref().map_or(SortKey::Missing, |key| key(row))
    }

    fn draw(&self, row: &R, ctx: &CellContext<'_>) -> Line<'static> {
        (self.draw)(row, ctx)
    }
}

/// One-line summary of a native struct referenced by each row
pub struct StructColumn<R> {
    header: String,
    width: ColumnWidth,
    ty: TypeKey,
    address: Getter<R, Option<Address>>,
}

impl<R> StructColumn<R> {
    pub fn new(header: &str, ty: &str, address: impl Fn(&R) -> Option<Address> + 'static) -> Self {
        StructColumn {
            header: header.to_string(),
            width: ColumnWidth::Proportional(2),
            ty: TypeKey::new(ty),
            address: Box::new(address),
        }
    }

    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Path prefix of the struct drawn in row `row`
    pub fn row_path(row: usize) -> AddressPath {
        AddressPath::root().with_index(row)
    }
}

impl<R> Column<R> for StructColumn<R> {
    fn header(&self) -> &str {
        &self.header
    }

    fn width(&self) -> ColumnWidth {
        self.width
    }

    fn draw(&self, row: &R, ctx: &CellContext<'_>) -> Line<'static> {
        let dim = Style::default().fg(DEFAULT_THEME.comment);
        let Some(address) = (self.address)(row) else {
            return Line::from(Span::styled("NULL", dim));
        };
        let Some(inspector) = ctx.inspector else {
            return Line::from(Span::styled(format!("0x{:08x}", address), dim));
        };

        let options = PresentationOptions::default()
            .with_address_path(Self::row_path(ctx.row))
            .with_default_open(true);
        let mut tree = TreeBuilder::new();
        if let Err(e) = inspector.render(&mut tree, address, &self.ty, &options) {
            return Line::from(Span::styled(
                e.to_string(),
                Style::default().fg(DEFAULT_THEME.error),
            ));
        }

        let Some(root) = tree.lines().first() else {
            return Line::default();
        };
        if !root.kind.is_branch() {
            return Line::from(Span::styled(
                root.text.clone(),
                Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::DIM),
            ));
        }

        let mut spans = vec![Span::styled("{ ", dim)];
        let fields = tree.lines().iter().filter(|l| l.depth == 1);
        for (i, field) in fields.enumerate() {
            if i > 0 {
                spans.push(Span::styled(", ", dim));
            }
            spans.push(Span::styled(
                format!("{}: ", field.label),
                Style::default().fg(DEFAULT_THEME.fg),
            ));
            let text = match field.kind {
                NodeKind::Branch { .. } if field.text.is_empty() => "{…}".to_string(),
                _ => field.text.clone(),
            };
            spans.push(Span::styled(text, Style::default().fg(DEFAULT_THEME.number)));
        }
        spans.push(Span::styled(" }", dim));
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InspectorConfig;
    use crate::inspect::ExpandState;
    use crate::layout::{FieldType, LayoutBuilder, LayoutCache, ScalarKind};
    use crate::memory::SnapshotMemory;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_sort_key_order() {
        let mut keys = vec![
            SortKey::Missing,
            SortKey::Text("b".into()),
            SortKey::Float(f64::NAN),
            SortKey::Int(-4),
            SortKey::UInt(3),
            SortKey::Float(0.5),
            SortKey::Text("a".into()),
        ];
        keys.sort();
        assert_eq!(keys[0], SortKey::Int(-4));
        assert_eq!(keys[1], SortKey::Float(0.5));
        assert_eq!(keys[2], SortKey::UInt(3));
        assert!(matches!(keys[3], SortKey::Float(f) if f.is_nan()));
        assert_eq!(keys[4], SortKey::Text("a".into()));
        assert_eq!(keys[6], SortKey::Missing);
    }

    #[test]
    fn test_numeric_and_text_cells() {
        let ctx = CellContext {
            row: 0,
            selected: false,
            width: 10,
            inspector: None,
        };
        let col = NumericColumn::float("ratio", 2, |r: &(f64, Option<String>)| r.0);
        let text = TextColumn::new("name", |r: &(f64, Option<String>)| r.1.clone());
        let row = (1.0 / 3.0, None);

        assert_eq!(plain(&col.draw(&row, &ctx)), "0.33");
        assert_eq!(col.draw(&row, &ctx).alignment, Some(Alignment::Right));
        assert_eq!(text.sort_key(&row), SortKey::Missing);
        assert_eq!(plain(&text.draw(&row, &ctx)), "-");
    }

    #[test]
    fn test_custom_column_sortable_only_with_key() {
        let col = CustomColumn::new("x", |_: &u8, _| Line::from("x"));
        assert!(!col.sortable());
        let col = col.with_sort_key(|r| SortKey::UInt(u64::from(*r))).as_primary();
        assert!(col.sortable());
        assert!(col.primary());
    }

    #[test]
    fn test_struct_column_summary() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Pos", 4);
        layout
            .field("x", 0, FieldType::scalar(ScalarKind::I16))
            .field("y", 2, FieldType::scalar(ScalarKind::I16));
        layouts.register(layout);
        let mut mem = SnapshotMemory::new();
        let mut bytes = 3i16.to_ne_bytes().to_vec();
        bytes.extend((-1i16).to_ne_bytes());
        mem.insert(0x4000, bytes);

        let config = InspectorConfig::default();
        let expanded = ExpandState::new();
        let inspector = Inspector::new(&layouts, &mem, &expanded, &config);
        let ctx = CellContext {
            row: 7,
            selected: false,
            width: 30,
            inspector: Some(&inspector),
        };

        let col = StructColumn::new("pos", "Pos", |r: &Address| Some(*r));
        assert_eq!(plain(&col.draw(&0x4000, &ctx)), "{ x: 3, y: -1 }");
        assert_eq!(plain(&col.draw(&0x9000, &ctx)), "<invalid 0x00009000>");
    }
}
