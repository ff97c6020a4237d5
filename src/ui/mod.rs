//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into three layers:
//!
//! - **[`app`]**: application state, keyboard and mouse event loop, pane focus
//! - **[`panes`]**: stateless render functions for the inspector tree, the
//!   documentation popup and the status bar
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point for consumers is [`App`]: construct it with an
//! [`InspectorConfig`] and call [`App::run`] to start the event loop.
//!
//! [`InspectorConfig`]: crate::config::InspectorConfig
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
