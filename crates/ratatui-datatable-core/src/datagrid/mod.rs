//! Virtualized 2D grid.

pub mod view;

pub use view::Cell;
pub use view::DataGridAction;
pub use view::DataGridCellContext;
pub use view::DataGridColumn;
pub use view::DataGridDelegate;
pub use view::DataGridHeaderContext;
pub use view::DataGridView;
pub use view::DataGridViewOptions;
pub use view::HeaderHit;
