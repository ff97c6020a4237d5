//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`tree`]: inspector tree with addresses, values and type annotations
//! - [`docs`]: documentation popup for the selected node
//! - [`status`]: status bar with the selected path and keybindings
//!
//! The entity table draws itself through
//! [`TableView::draw`](crate::table::TableView::draw).

pub mod docs;
pub mod status;
pub mod tree;

pub use docs::render_docs_popup;
pub use status::{render_status_bar, StatusRenderData};
pub use tree::{render_tree_pane, TreeRenderData, TreeScrollState};
