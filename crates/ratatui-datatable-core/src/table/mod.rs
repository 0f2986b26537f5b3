//! Headless table state engine: column definitions, filtering, sorting, faceting, pagination,
//! row selection and column sizing over an in-memory dataset.
//!
//! The pipeline mirrors what a table UI needs per frame:
//!
//! ```text
//! core rows ─▶ filtered (column filters + fuzzy global filter) ─▶ sorted ─▶ current page
//! ```
//!
//! Each stage is cached and only recomputed when one of its inputs changes. Rendering is left to
//! the caller; see `ratatui-datatable` for the terminal component built on top of it.

pub mod column;
pub mod engine;
pub mod error;
pub mod filter;
pub mod fuzzy;
pub mod pagination;
pub mod sizing;
pub mod sort;
pub mod value;

pub use column::ColumnDef;
pub use engine::Facets;
pub use engine::Header;
pub use engine::HeaderGroup;
pub use engine::Row;
pub use engine::RowId;
pub use engine::RowModel;
pub use engine::Table;
pub use engine::TableOptions;
pub use engine::TableState;
pub use error::CellError;
pub use error::TableError;
pub use filter::ColumnFilter;
pub use filter::ColumnFiltersState;
pub use filter::FilterFn;
pub use filter::FilterValue;
pub use pagination::PaginationState;
pub use sizing::ColumnResizeMode;
pub use sizing::ColumnSizingInfo;
pub use sizing::ColumnSizingState;
pub use sort::ColumnSort;
pub use sort::SortDirection;
pub use sort::SortingState;
pub use value::CellValue;
pub use value::ValueKind;
