use crate::table::column::ColumnDef;
use crate::table::error::Result;
use crate::table::error::TableError;
use crate::table::filter;
use crate::table::filter::ColumnFiltersState;
use crate::table::filter::CompiledFilter;
use crate::table::filter::FilterValue;
use crate::table::fuzzy::FuzzyMatcher;
use crate::table::pagination::PaginationState;
use crate::table::sizing::ColumnResizeMode;
use crate::table::sizing::ColumnSizingInfo;
use crate::table::sizing::ColumnSizingState;
use crate::table::sort;
use crate::table::sort::SortDirection;
use crate::table::sort::SortingState;
use crate::table::value::CellValue;
use crate::table::value::ValueKind;
use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Instant;

/// Index of a record in the table's data.
pub type RowId = usize;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Row {
    pub id: RowId,
    /// Best fuzzy score of the global filter, when one is active.
    pub rank: Option<u32>,
}

impl Row {
    fn plain(id: RowId) -> Self {
        Self { id, rank: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowModel {
    rows: Vec<Row>,
}

impl RowModel {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|r| r.id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableOptions {
    pub column_resize_mode: ColumnResizeMode,
    pub enable_global_filter: bool,
    pub enable_row_selection: bool,
    /// Jump back to the first page whenever data, filters or sorting change.
    pub auto_reset_page_index: bool,
    pub initial_pagination: PaginationState,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            column_resize_mode: ColumnResizeMode::OnEnd,
            enable_global_filter: true,
            enable_row_selection: true,
            auto_reset_page_index: true,
            initial_pagination: PaginationState::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableState {
    pub column_filters: ColumnFiltersState,
    pub global_filter: String,
    pub sorting: SortingState,
    pub pagination: PaginationState,
    pub row_selection: BTreeSet<RowId>,
    pub column_sizing: ColumnSizingState,
    pub column_sizing_info: ColumnSizingInfo,
}

/// One rendered header cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub column_id: String,
    pub column_index: usize,
    pub title: String,
    pub size: u16,
    pub sort: Option<SortDirection>,
    /// Position among the sort keys; only set when more than one column is sorted.
    pub sort_index: Option<usize>,
    pub can_sort: bool,
    pub can_filter: bool,
    pub can_resize: bool,
    pub is_resizing: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderGroup {
    pub id: String,
    pub headers: Vec<Header>,
}

/// Per-column hints computed over the rows that pass every *other* filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Facets {
    /// Distinct display values and how often they occur.
    pub unique_values: BTreeMap<String, usize>,
    pub min_max: Option<(f64, f64)>,
}

/// The table engine. Owns the data, the column definitions and all table state.
pub struct Table<T> {
    data: Vec<T>,
    columns: Vec<ColumnDef<T>>,
    options: TableOptions,
    state: TableState,
    first_kinds: Vec<ValueKind>,
    core: RowModel,
    filtered: RowModel,
    sorted: RowModel,
    page: RowModel,
    facets: Vec<OnceCell<Facets>>,
}

impl<T> Table<T> {
    pub fn new(columns: Vec<ColumnDef<T>>, data: Vec<T>) -> Self {
        Self::with_options(columns, data, TableOptions::default())
    }

    pub fn with_options(columns: Vec<ColumnDef<T>>, data: Vec<T>, options: TableOptions) -> Self {
        let state = TableState {
            pagination: options.initial_pagination,
            ..TableState::default()
        };
        let mut t = Self {
            data,
            columns,
            options,
            state,
            first_kinds: Vec::new(),
            core: RowModel::default(),
            filtered: RowModel::default(),
            sorted: RowModel::default(),
            page: RowModel::default(),
            facets: Vec::new(),
        };
        t.rebuild_core();
        t
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: TableOptions) {
        self.options = options;
        self.recompute_filtered();
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        let len = self.data.len();
        self.state.row_selection.retain(|id| *id < len);
        self.auto_reset_page_index();
        self.rebuild_core();
    }

    pub fn set_columns(&mut self, columns: Vec<ColumnDef<T>>) {
        self.columns = columns;
        let ids: BTreeSet<&str> = self.columns.iter().map(|c| c.id()).collect();
        self.state
            .column_filters
            .retain(|f| ids.contains(f.id.as_str()));
        self.state.sorting.retain(|s| ids.contains(s.id.as_str()));
        self.rebuild_core();
    }

    pub fn column_index(&self, id: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| TableError::UnknownColumn(id.to_string()))
    }

    pub fn column(&self, id: &str) -> Result<&ColumnDef<T>> {
        let i = self.column_index(id)?;
        Ok(&self.columns[i])
    }

    /// Kind of the column's value in the first (unfiltered) row. Drives the auto filter/sort
    /// behaviour and the choice of filter input.
    pub fn first_value_kind(&self, column: usize) -> ValueKind {
        self.first_kinds
            .get(column)
            .copied()
            .unwrap_or(ValueKind::Empty)
    }

    pub fn value(&self, row: RowId, column: usize) -> CellValue {
        match (self.data.get(row), self.columns.get(column)) {
            (Some(r), Some(c)) => c.value(r),
            _ => CellValue::Empty,
        }
    }

    /// The cell's display text as produced by the column formatter.
    pub fn formatted_value(&self, row: RowId, column: usize) -> Result<String> {
        let Some(col) = self.columns.get(column) else {
            return Err(TableError::UnknownColumn(column.to_string()));
        };
        let value = self.value(row, column);
        col.format(&value).map_err(|e| TableError::Cell {
            column: col.id().to_string(),
            message: e.message,
        })
    }

    pub fn header_groups(&self) -> Vec<HeaderGroup> {
        let multi = self.state.sorting.len() > 1;
        let headers = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| Header {
                column_id: c.id().to_string(),
                column_index: i,
                title: c.title().to_string(),
                size: self.column_size(i),
                sort: sort::sort_direction(&self.state.sorting, c.id()),
                sort_index: sort::sort_index(&self.state.sorting, c.id()).filter(|_| multi),
                can_sort: c.can_sort(),
                can_filter: c.can_filter(),
                can_resize: c.can_resize(),
                is_resizing: self.state.column_sizing_info.is_resizing(c.id()),
            })
            .collect();
        vec![HeaderGroup {
            id: "0".to_string(),
            headers,
        }]
    }

    // ---- row models -------------------------------------------------------------------------

    pub fn core_row_model(&self) -> &RowModel {
        &self.core
    }

    pub fn pre_filtered_row_model(&self) -> &RowModel {
        &self.core
    }

    pub fn filtered_row_model(&self) -> &RowModel {
        &self.filtered
    }

    pub fn pre_sorted_row_model(&self) -> &RowModel {
        &self.filtered
    }

    pub fn sorted_row_model(&self) -> &RowModel {
        &self.sorted
    }

    pub fn pre_pagination_row_model(&self) -> &RowModel {
        &self.sorted
    }

    /// Rows of the current page.
    pub fn row_model(&self) -> &RowModel {
        &self.page
    }

    /// Selected rows in data order, regardless of filters.
    pub fn selected_row_model(&self) -> RowModel {
        RowModel {
            rows: self
                .state
                .row_selection
                .iter()
                .copied()
                .filter(|id| *id < self.data.len())
                .map(Row::plain)
                .collect(),
        }
    }

    // ---- filtering --------------------------------------------------------------------------

    pub fn column_filter(&self, id: &str) -> Option<&FilterValue> {
        self.state
            .column_filters
            .iter()
            .find(|f| f.id == id)
            .map(|f| &f.value)
    }

    /// Sets (or, for empty values, removes) the filter of column `id`.
    pub fn set_column_filter(&mut self, id: &str, value: Option<FilterValue>) -> Result<()> {
        self.update_column_filter(id, |_| value)
    }

    /// Functional update of one column's filter, e.g. to change one bound of a range.
    pub fn update_column_filter<F>(&mut self, id: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<&FilterValue>) -> Option<FilterValue>,
    {
        self.column_index(id)?;
        let next = filter::updated_filters(&self.state.column_filters, id, f);
        self.set_column_filters(next)
    }

    pub fn set_column_filters(&mut self, filters: ColumnFiltersState) -> Result<()> {
        for f in &filters {
            self.column_index(&f.id)?;
        }
        let filters: ColumnFiltersState =
            filters.into_iter().filter(|f| !f.value.is_empty()).collect();
        if filters == self.state.column_filters {
            return Ok(());
        }
        self.state.column_filters = filters;
        self.auto_reset_page_index();
        self.recompute_filtered();
        Ok(())
    }

    pub fn global_filter(&self) -> &str {
        &self.state.global_filter
    }

    pub fn set_global_filter(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.state.global_filter {
            return;
        }
        self.state.global_filter = query;
        self.auto_reset_page_index();
        self.recompute_filtered();
    }

    /// Whether `column` takes part in the global filter.
    pub fn column_can_global_filter(&self, column: usize) -> bool {
        self.columns.get(column).is_some_and(|c| c.enable_global_filter)
            && matches!(
                self.first_value_kind(column),
                ValueKind::Text | ValueKind::Number
            )
    }

    // ---- faceting ---------------------------------------------------------------------------

    pub fn faceted_row_model(&self, column: usize) -> RowModel {
        self.filter_rows(Some(column))
    }

    pub fn faceted_unique_values(&self, column: usize) -> &BTreeMap<String, usize> {
        &self.facets(column).unique_values
    }

    pub fn faceted_min_max_values(&self, column: usize) -> Option<(f64, f64)> {
        self.facets(column).min_max
    }

    fn facets(&self, column: usize) -> &Facets {
        static EMPTY: std::sync::OnceLock<Facets> = std::sync::OnceLock::new();
        match self.facets.get(column) {
            Some(cell) => cell.get_or_init(|| self.compute_facets(column)),
            None => EMPTY.get_or_init(Facets::default),
        }
    }

    fn compute_facets(&self, column: usize) -> Facets {
        let started = Instant::now();
        let rows = self.faceted_row_model(column);
        let mut out = Facets::default();
        for row in rows.rows() {
            let v = self.value(row.id, column);
            if v.is_empty() {
                continue;
            }
            if let Some(n) = v.as_f64() {
                out.min_max = Some(match out.min_max {
                    Some((lo, hi)) => (lo.min(n), hi.max(n)),
                    None => (n, n),
                });
            }
            // Keyed by the text column filters compare against.
            let text = self.display_for_filter(row.id, column, &v);
            *out.unique_values.entry(text).or_insert(0) += 1;
        }
        tracing::debug!(
            column = self.columns.get(column).map(|c| c.id()).unwrap_or_default(),
            unique = out.unique_values.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "computed facets"
        );
        out
    }

    // ---- sorting ----------------------------------------------------------------------------

    pub fn sorting(&self) -> &SortingState {
        &self.state.sorting
    }

    pub fn set_sorting(&mut self, sorting: SortingState) -> Result<()> {
        for s in &sorting {
            self.column_index(&s.id)?;
        }
        if sorting == self.state.sorting {
            return Ok(());
        }
        self.state.sorting = sorting;
        self.auto_reset_page_index();
        self.recompute_sorted();
        Ok(())
    }

    pub fn is_sorted(&self, id: &str) -> Option<SortDirection> {
        sort::sort_direction(&self.state.sorting, id)
    }

    /// Direction of the first toggle on `column`, picked from the first row that passes the
    /// current filters.
    pub fn first_sort_direction(&self, column: usize) -> SortDirection {
        let desc_first = self.columns.get(column).and_then(|c| c.sort_desc_first);
        let kind = match self.filtered.get(0) {
            Some(row) => self.value(row.id, column).kind(),
            None => ValueKind::Empty,
        };
        sort::first_sort_direction(kind, desc_first)
    }

    /// The sorting state a header toggle on `id` would produce. Does not apply it, so callers
    /// can schedule the update.
    pub fn next_sorting(&self, id: &str, multi: bool) -> Result<SortingState> {
        let i = self.column_index(id)?;
        if !self.columns[i].can_sort() {
            return Ok(self.state.sorting.clone());
        }
        let first = self.first_sort_direction(i);
        Ok(sort::toggle_sorting(&self.state.sorting, id, first, multi))
    }

    pub fn toggle_sorting(&mut self, id: &str, multi: bool) -> Result<()> {
        let next = self.next_sorting(id, multi)?;
        self.set_sorting(next)
    }

    // ---- pagination -------------------------------------------------------------------------

    pub fn pagination(&self) -> PaginationState {
        self.state.pagination
    }

    pub fn page_count(&self) -> usize {
        self.state.pagination.page_count(self.sorted.len())
    }

    pub fn can_previous_page(&self) -> bool {
        self.state.pagination.page_index > 0
    }

    pub fn can_next_page(&self) -> bool {
        self.state.pagination.page_index + 1 < self.page_count()
    }

    pub fn set_page_index(&mut self, index: usize) {
        let next = PaginationState {
            page_index: index,
            ..self.state.pagination
        }
        .clamped(self.sorted.len());
        if next != self.state.pagination {
            self.state.pagination = next;
            self.recompute_page();
        }
    }

    pub fn first_page(&mut self) {
        self.set_page_index(0);
    }

    pub fn previous_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index.saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_page_index(self.state.pagination.page_index + 1);
    }

    pub fn last_page(&mut self) {
        self.set_page_index(self.page_count().saturating_sub(1));
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(TableError::InvalidPageSize(size));
        }
        let next = self
            .state
            .pagination
            .with_page_size(size)
            .clamped(self.sorted.len());
        if next != self.state.pagination {
            self.state.pagination = next;
            self.recompute_page();
        }
        Ok(())
    }

    // ---- row selection ----------------------------------------------------------------------

    pub fn is_row_selected(&self, id: RowId) -> bool {
        self.state.row_selection.contains(&id)
    }

    /// Toggles one row, or forces it to `value` when given.
    pub fn toggle_row_selected(&mut self, id: RowId, value: Option<bool>) {
        if !self.options.enable_row_selection || id >= self.data.len() {
            return;
        }
        let selected = value.unwrap_or(!self.is_row_selected(id));
        if selected {
            self.state.row_selection.insert(id);
        } else {
            self.state.row_selection.remove(&id);
        }
    }

    /// Selects or deselects every row that passes the current filters.
    pub fn toggle_all_rows_selected(&mut self, value: bool) {
        if !self.options.enable_row_selection {
            return;
        }
        let started = Instant::now();
        for id in self.filtered.ids() {
            if value {
                self.state.row_selection.insert(id);
            } else {
                self.state.row_selection.remove(&id);
            }
        }
        tracing::debug!(
            value,
            rows = self.filtered.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "toggled all rows"
        );
    }

    pub fn is_all_rows_selected(&self) -> bool {
        !self.filtered.is_empty() && self.filtered.ids().all(|id| self.is_row_selected(id))
    }

    pub fn reset_row_selection(&mut self) {
        self.state.row_selection.clear();
    }

    // ---- column sizing ----------------------------------------------------------------------

    pub fn column_size(&self, column: usize) -> u16 {
        let Some(c) = self.columns.get(column) else {
            return 0;
        };
        self.state
            .column_sizing
            .get(c.id())
            .map(|s| c.clamp_size(*s))
            .unwrap_or_else(|| c.default_size())
    }

    pub fn column_sizing_info(&self) -> &ColumnSizingInfo {
        &self.state.column_sizing_info
    }

    pub fn begin_resize(&mut self, id: &str, offset: i32) -> Result<()> {
        let i = self.column_index(id)?;
        if !self.columns[i].can_resize() {
            return Ok(());
        }
        self.state.column_sizing_info = ColumnSizingInfo {
            resizing_column: Some(id.to_string()),
            start_offset: offset,
            start_size: self.column_size(i),
            delta_offset: 0,
        };
        Ok(())
    }

    pub fn update_resize(&mut self, offset: i32) {
        let info = &mut self.state.column_sizing_info;
        if info.resizing_column.is_none() {
            return;
        }
        info.delta_offset = offset - info.start_offset;
        if self.options.column_resize_mode == ColumnResizeMode::OnChange {
            self.apply_resize();
        }
    }

    pub fn end_resize(&mut self) {
        if self.state.column_sizing_info.resizing_column.is_none() {
            return;
        }
        self.apply_resize();
        self.state.column_sizing_info = ColumnSizingInfo::default();
    }

    /// Sets a column width directly (clamped to the column's limits).
    pub fn set_column_size(&mut self, id: &str, size: u16) -> Result<()> {
        let i = self.column_index(id)?;
        let size = self.columns[i].clamp_size(size);
        self.state.column_sizing.insert(id.to_string(), size);
        Ok(())
    }

    /// Drops every width set by resizing; columns fall back to their defined sizes.
    pub fn reset_column_sizing(&mut self) {
        self.state.column_sizing.clear();
    }

    fn apply_resize(&mut self) {
        let info = &self.state.column_sizing_info;
        let Some(id) = info.resizing_column.clone() else {
            return;
        };
        let target = info.target_size().clamp(0, u16::MAX as i32) as u16;
        if let Ok(i) = self.column_index(&id) {
            let size = self.columns[i].clamp_size(target);
            self.state.column_sizing.insert(id, size);
        }
    }

    // ---- pipeline ---------------------------------------------------------------------------

    fn auto_reset_page_index(&mut self) {
        if self.options.auto_reset_page_index {
            self.state.pagination.page_index = 0;
        }
    }

    fn rebuild_core(&mut self) {
        self.core = RowModel {
            rows: (0..self.data.len()).map(Row::plain).collect(),
        };
        self.first_kinds = (0..self.columns.len())
            .map(|c| self.value(0, c).kind())
            .collect();
        self.recompute_filtered();
    }

    fn recompute_filtered(&mut self) {
        let started = Instant::now();
        self.filtered = self.filter_rows(None);
        self.facets = (0..self.columns.len()).map(|_| OnceCell::new()).collect();
        tracing::debug!(
            rows = self.core.len(),
            filtered = self.filtered.len(),
            column_filters = self.state.column_filters.len(),
            global_filter = %self.state.global_filter,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "recomputed filtered row model"
        );
        self.recompute_sorted();
    }

    /// Core rows passing the global filter and every column filter except `skip`'s.
    fn filter_rows(&self, skip: Option<usize>) -> RowModel {
        let mut compiled: Vec<CompiledFilter> = self
            .state
            .column_filters
            .iter()
            .filter_map(|f| {
                let i = self.column_index(&f.id).ok()?;
                if Some(i) == skip {
                    return None;
                }
                let filter_fn = self.columns[i].filter_fn.resolve(self.first_value_kind(i));
                Some(CompiledFilter::new(i, filter_fn, &f.value))
            })
            .collect();

        let global_columns: Vec<usize> = (0..self.columns.len())
            .filter(|&c| self.column_can_global_filter(c))
            .collect();
        let mut global = if self.options.enable_global_filter {
            Some(FuzzyMatcher::new(&self.state.global_filter)).filter(|m| !m.is_empty())
        } else {
            None
        };

        if compiled.is_empty() && global.is_none() {
            return self.core.clone();
        }

        let mut rows = Vec::with_capacity(self.core.len());
        'rows: for row in self.core.rows() {
            for f in compiled.iter_mut() {
                let v = self.value(row.id, f.column);
                let text = self.display_for_filter(row.id, f.column, &v);
                if !f.matches(&v, &text) {
                    continue 'rows;
                }
            }
            let rank = match global.as_mut() {
                None => None,
                Some(m) => {
                    let best = global_columns
                        .iter()
                        .filter_map(|&c| {
                            let v = self.value(row.id, c);
                            m.score(&self.display_for_filter(row.id, c, &v))
                        })
                        .max();
                    match best {
                        Some(score) => Some(score),
                        None => continue 'rows,
                    }
                }
            };
            rows.push(Row { id: row.id, rank });
        }
        RowModel { rows }
    }

    fn display_for_filter(&self, row: RowId, column: usize, value: &CellValue) -> String {
        match self.data.get(row).and(self.columns.get(column)) {
            Some(c) => c.format(value).unwrap_or_else(|_| value.to_string()),
            None => value.to_string(),
        }
    }

    fn recompute_sorted(&mut self) {
        let started = Instant::now();
        let keys: Vec<(usize, bool)> = self
            .state
            .sorting
            .iter()
            .filter_map(|s| {
                let i = self.column_index(&s.id).ok()?;
                self.columns[i].can_sort().then_some((i, s.desc))
            })
            .collect();

        let mut rows = self.filtered.rows.clone();
        if !keys.is_empty() {
            // Pre-extract the sort keys once; accessors can be arbitrarily expensive.
            let mut keyed: Vec<(Vec<CellValue>, Row)> = rows
                .into_iter()
                .map(|r| (keys.iter().map(|(c, _)| self.value(r.id, *c)).collect(), r))
                .collect();
            keyed.sort_by(|(a, ra), (b, rb)| {
                for (k, (_, desc)) in keys.iter().enumerate() {
                    let ord = sort::compare_for_sort(&a[k], &b[k], *desc);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                ra.id.cmp(&rb.id)
            });
            rows = keyed.into_iter().map(|(_, r)| r).collect();
        }
        self.sorted = RowModel { rows };
        tracing::debug!(
            rows = self.sorted.len(),
            keys = keys.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "recomputed sorted row model"
        );
        self.recompute_page();
    }

    fn recompute_page(&mut self) {
        self.state.pagination = self.state.pagination.clamped(self.sorted.len());
        let range = self.state.pagination.range(self.sorted.len());
        self.page = RowModel {
            rows: self.sorted.rows[range].to_vec(),
        };
    }
}
