//! Recursive struct inspector
//!
//! - [`render`]: walks an object and emits tree lines
//! - [`tree`]: the frame-local output model and the persistent expand-state
//! - [`options`]: per-call presentation options
//! - [`format`]: leaf decoding and text
//! - [`docs`]: documentation lookup contract

pub mod docs;
pub mod format;
pub mod options;
pub mod render;
pub mod tree;

pub use docs::{DocIndex, Documentation, DocumentationLookup};
pub use options::{Language, PresentationOptions, RenderMode};
pub use render::Inspector;
pub use tree::{ExpandState, MemberTag, NodeKind, TreeBuilder, TreeLine};
