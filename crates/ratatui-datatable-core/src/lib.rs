//! `ratatui-datatable-core` provides the building blocks behind `ratatui-datatable`: a headless
//! table engine and the terminal widgets used to present it.
//!
//! Use this crate directly when you want the engine without the ready-made component, or when
//! you compose your own layout from the widgets.
//!
//! ## Design goals
//!
//! - Event-loop agnostic: you drive input, time and rendering from your app.
//! - No async runtime: everything runs on the main thread. Expensive updates are scheduled with
//!   the clock-injected helpers in [`schedule`] instead of background threads.
//! - Only what is on screen is rendered: [`datagrid::DataGridView`] virtualizes rows and columns.
//!
//! ## Getting started
//!
//! Useful entry points:
//! - [`table::Table`]: column definitions, filtering, sorting, faceting, pagination, selection.
//! - [`datagrid::DataGridView`]: virtualized 2D grid with a fixed header.
//! - [`text_input::DebouncedInput`]: single-line input that settles after a pause in typing.
//! - [`error_boundary::ErrorBoundary`]: shows a fallback when a child fails to render.
pub mod theme;

#[cfg(feature = "crossterm")]
pub mod crossterm_input;

pub mod render;
pub mod schedule;
pub mod viewport;

pub mod datagrid;
pub mod error_boundary;
pub mod help;
pub mod input;
pub mod keymap;
pub mod table;
pub mod text_input;
