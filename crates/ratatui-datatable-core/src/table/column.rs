use crate::table::error::CellError;
use crate::table::filter::FilterFn;
use crate::table::value::CellValue;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_COLUMN_SIZE: u16 = 20;
pub const DEFAULT_MIN_COLUMN_SIZE: u16 = 4;
pub const DEFAULT_MAX_COLUMN_SIZE: u16 = 1000;

pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;
pub type CellFormatter = Arc<dyn Fn(&CellValue) -> Result<String, CellError> + Send + Sync>;

/// Describes how to read, format, sort and filter one column of `T`.
///
/// ```ignore
/// let age = ColumnDef::accessor("age", |p: &Person| p.age.into())
///     .header("Age")
///     .size(5);
/// ```
pub struct ColumnDef<T> {
    pub(crate) id: String,
    pub(crate) header: Option<String>,
    pub(crate) accessor: Accessor<T>,
    pub(crate) cell: Option<CellFormatter>,
    pub(crate) size: u16,
    pub(crate) min_size: u16,
    pub(crate) max_size: u16,
    pub(crate) enable_sorting: bool,
    pub(crate) enable_column_filter: bool,
    pub(crate) enable_global_filter: bool,
    pub(crate) enable_resizing: bool,
    pub(crate) sort_desc_first: Option<bool>,
    pub(crate) filter_fn: FilterFn,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: self.accessor.clone(),
            cell: self.cell.clone(),
            size: self.size,
            min_size: self.min_size,
            max_size: self.max_size,
            enable_sorting: self.enable_sorting,
            enable_column_filter: self.enable_column_filter,
            enable_global_filter: self.enable_global_filter,
            enable_resizing: self.enable_resizing,
            sort_desc_first: self.sort_desc_first,
            filter_fn: self.filter_fn,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("size", &self.size)
            .field("filter_fn", &self.filter_fn)
            .finish_non_exhaustive()
    }
}

impl<T> ColumnDef<T> {
    pub fn accessor(
        id: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: None,
            accessor: Arc::new(accessor),
            cell: None,
            size: DEFAULT_COLUMN_SIZE,
            min_size: DEFAULT_MIN_COLUMN_SIZE,
            max_size: DEFAULT_MAX_COLUMN_SIZE,
            enable_sorting: true,
            enable_column_filter: true,
            enable_global_filter: true,
            enable_resizing: true,
            sort_desc_first: None,
            filter_fn: FilterFn::Auto,
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Custom display formatting for this column's values.
    pub fn cell(
        mut self,
        f: impl Fn(&CellValue) -> Result<String, CellError> + Send + Sync + 'static,
    ) -> Self {
        self.cell = Some(Arc::new(f));
        self
    }

    pub fn size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }

    pub fn min_size(mut self, size: u16) -> Self {
        self.min_size = size;
        self
    }

    pub fn max_size(mut self, size: u16) -> Self {
        self.max_size = size;
        self
    }

    pub fn enable_sorting(mut self, enable: bool) -> Self {
        self.enable_sorting = enable;
        self
    }

    pub fn enable_column_filter(mut self, enable: bool) -> Self {
        self.enable_column_filter = enable;
        self
    }

    pub fn enable_global_filter(mut self, enable: bool) -> Self {
        self.enable_global_filter = enable;
        self
    }

    pub fn enable_resizing(mut self, enable: bool) -> Self {
        self.enable_resizing = enable;
        self
    }

    pub fn sort_desc_first(mut self, desc_first: bool) -> Self {
        self.sort_desc_first = Some(desc_first);
        self
    }

    pub fn filter_fn(mut self, filter_fn: FilterFn) -> Self {
        self.filter_fn = filter_fn;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The header title; falls back to the column id.
    pub fn title(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }

    pub fn default_size(&self) -> u16 {
        self.clamp_size(self.size)
    }

    pub fn clamp_size(&self, size: u16) -> u16 {
        let min = self.min_size.max(1);
        size.clamp(min, self.max_size.max(min))
    }

    pub fn value(&self, row: &T) -> CellValue {
        (self.accessor)(row)
    }

    /// Formats a value for display, using the custom formatter when one is set.
    pub fn format(&self, value: &CellValue) -> Result<String, CellError> {
        match &self.cell {
            Some(f) => f(value),
            None => Ok(value.to_string()),
        }
    }

    pub fn can_sort(&self) -> bool {
        self.enable_sorting
    }

    pub fn can_filter(&self) -> bool {
        self.enable_column_filter
    }

    pub fn can_resize(&self) -> bool {
        self.enable_resizing
    }
}
