//! Tabular view over homogeneous rows
//!
//! - [`column`]: the column contract and stock columns
//! - [`engine`]: the table itself (sorting, selection, drawing)
//! - [`loader`]: synchronous and background row loading
//! - [`virtualize`]: visible-slice arithmetic shared with the inspector

pub mod column;
pub mod engine;
pub mod loader;
pub mod virtualize;

pub use column::{
    CellContext, Column, ColumnWidth, CustomColumn, NumericColumn, SortKey, StructColumn, TextColumn,
};
pub use engine::{SortDirection, SortSpec, TableView};
pub use loader::{LoadState, RowLoader, RowSource};
pub use virtualize::{scroll_to_reveal, visible_range};
