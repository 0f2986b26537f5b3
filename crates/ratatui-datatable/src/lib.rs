//! `ratatui-datatable` is a ready-made data table component for ratatui: global fuzzy search,
//! per-column filters, multi-column sorting, pagination, row selection and column resizing over
//! a virtualized grid that stays responsive with hundreds of thousands of rows.
//!
//! The engine and widgets live in [`ratatui_datatable_core`] and are re-exported here.
//!
//! ```ignore
//! use ratatui_datatable::DataTable;
//! use ratatui_datatable::person::{make_data, person_columns};
//!
//! let mut table = DataTable::new(person_columns(), make_data(50_000));
//! // in the event loop:
//! // table.handle_event(event, Instant::now());
//! // table.tick(Instant::now());
//! // table.render(area, buf);
//! ```
mod data_table;

pub mod keymap;
pub mod options;
pub mod person;

pub use data_table::DataTable;
pub use data_table::DataTableAction;
pub use data_table::Focus;
pub use data_table::SEARCH_PLACEHOLDER;
pub use keymap::DataTableKeymap;
pub use options::DataTableOptions;

#[cfg(feature = "crossterm")]
pub use ratatui_datatable_core::crossterm_input;
pub use ratatui_datatable_core::datagrid;
pub use ratatui_datatable_core::error_boundary;
pub use ratatui_datatable_core::help;
pub use ratatui_datatable_core::input;
pub use ratatui_datatable_core::schedule;
pub use ratatui_datatable_core::table;
pub use ratatui_datatable_core::text_input;
pub use ratatui_datatable_core::theme;
