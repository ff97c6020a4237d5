//! # Introduction
//!
//! memscope renders live views of structured data that lives in memory the
//! program does not own: C structs handed over by a foreign library, arrays
//! of records, linked graphs. Every view is recomputed from current memory
//! on each frame, through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Pipeline
//!
//! ```text
//! Layouts → TypeDescriptor cache ─┐
//!                                 ├→ Inspector → TreeLines → TUI
//! Address + MemoryAccess ─────────┘
//! RowSource → RowLoader → TableView ────────────────────────→ TUI
//! ```
//!
//! 1. [`layout`]: field layouts of foreign types, resolved once per type
//!    into shared [`layout::TypeDescriptor`]s.
//! 2. [`memory`]: address paths, the probe-then-read
//!    [`memory::MemoryAccess`] contract and its live and snapshot backends.
//! 3. [`inspect`]: the recursive renderer that turns an address and a type
//!    into a flat list of [`inspect::TreeLine`]s, plus documentation lookup.
//! 4. [`table`]: column contracts and the sortable, virtualized
//!    [`table::TableView`] with background row loading.
//! 5. [`ui`]: the interactive demo over [`demo`] data; not part of the
//!    stable library API.
//!
//! Unreadable memory never fails a render. Dangling pointers, freed objects
//! and reference cycles show up as marked leaves in the tree.

pub mod config;
pub mod demo;
pub mod error;
pub mod inspect;
pub mod layout;
pub mod memory;
pub mod table;
pub mod ui;
