//! The composite data table component.

mod filter_input;
mod render;

use crate::options::DataTableOptions;
use filter_input::ColumnFilterInput;
use filter_input::FilterEdit;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui_datatable_core::datagrid::Cell;
use ratatui_datatable_core::datagrid::DataGridAction;
use ratatui_datatable_core::datagrid::DataGridColumn;
use ratatui_datatable_core::datagrid::DataGridView;
use ratatui_datatable_core::datagrid::HeaderHit;
use ratatui_datatable_core::error_boundary::ErrorBoundary;
use ratatui_datatable_core::error_boundary::RenderError;
use ratatui_datatable_core::help::HelpBar;
use ratatui_datatable_core::help::HelpBarOptions;
use ratatui_datatable_core::input::InputEvent;
use ratatui_datatable_core::input::KeyCode;
use ratatui_datatable_core::input::KeyEvent;
use ratatui_datatable_core::input::MouseButton;
use ratatui_datatable_core::input::MouseEvent;
use ratatui_datatable_core::input::MouseEventKind;
use ratatui_datatable_core::schedule::Deferred;
use ratatui_datatable_core::schedule::Transition;
use ratatui_datatable_core::schedule::earliest;
use ratatui_datatable_core::table::ColumnDef;
use ratatui_datatable_core::table::ColumnFiltersState;
use ratatui_datatable_core::table::ColumnResizeMode;
use ratatui_datatable_core::table::PaginationState;
use ratatui_datatable_core::table::RowId;
use ratatui_datatable_core::table::SortingState;
use ratatui_datatable_core::table::Table;
use ratatui_datatable_core::table::TableOptions;
use ratatui_datatable_core::table::ValueKind;
use ratatui_datatable_core::table::filter;
use ratatui_datatable_core::table::sort;
use ratatui_datatable_core::text_input::DebouncedInput;
use ratatui_datatable_core::text_input::InputKind;
use ratatui_datatable_core::text_input::TextInput;
use ratatui_datatable_core::text_input::TextInputAction;
use ratatui_datatable_core::text_input::TextInputOptions;
use std::time::Instant;

pub const SEARCH_PLACEHOLDER: &str = "Search data...";

/// Which part of the component receives keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Search,
    /// A filter input under a column header; `slot` 1 is the upper bound of a range filter.
    Filter { column: usize, slot: usize },
    Grid,
    Page,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataTableAction {
    None,
    Redraw,
    /// Enter on a cell of the grid.
    Activated { row: RowId, column: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Search,
    Sort,
    SortMulti,
    SelectAll,
    ClearSelection,
    FirstPage,
    PreviousPage,
    NextPage,
    LastPage,
    PageSize,
    ShrinkColumn,
    GrowColumn,
    ResetWidths,
    Reset,
}

/// Clickable regions of the last render.
#[derive(Clone, Copy, Debug, Default)]
struct HitAreas {
    search: Rect,
    select_all: Rect,
    clear_selection: Rect,
    grid: Rect,
    first_page: Rect,
    previous_page: Rect,
    next_page: Rect,
    last_page: Rect,
    page_input: Rect,
    page_size: Rect,
    cursor: Option<(u16, u16)>,
}

/// A sortable, filterable, paginated and virtualized table of `T`.
///
/// The component owns a [`Table`] engine and drives it from user input:
///
/// - the toolbar holds a debounced global search and row-selection actions,
/// - every filterable column gets debounced filter inputs under its title,
/// - the body is a [`DataGridView`] over the rows of the current page,
/// - the footer navigates pages and changes the page size.
///
/// Expensive updates (sorting, filtering, select all) are queued and applied by
/// [`DataTable::tick`], so the keystroke that caused them is echoed first. Drive it like this:
///
/// ```ignore
/// loop {
///     terminal.draw(|f| table.render(f.area(), f.buffer_mut()))?;
///     let timeout = table.next_deadline().map(|d| d.saturating_duration_since(Instant::now()));
///     // ... wait for input up to `timeout`, feed it to `table.handle_event(ev, Instant::now())`
///     table.tick(Instant::now());
/// }
/// ```
pub struct DataTable<T> {
    table: Table<T>,
    options: DataTableOptions,
    grid: DataGridView,
    boundary: ErrorBoundary,
    help: HelpBar,
    search: DebouncedInput,
    global_filter: Deferred<String>,
    filter_inputs: Vec<Option<ColumnFilterInput>>,
    page_input: TextInput,
    focus: Focus,
    sorting: Transition<SortingState>,
    column_filters: Transition<ColumnFiltersState>,
    select_all: Transition<bool>,
    queued_at: Option<Instant>,
    failure: Option<RenderError>,
    hits: HitAreas,
}

impl<T> DataTable<T> {
    pub fn new(columns: Vec<ColumnDef<T>>, data: Vec<T>) -> Self {
        Self::with_options(columns, data, DataTableOptions::default())
    }

    pub fn with_options(
        columns: Vec<ColumnDef<T>>,
        data: Vec<T>,
        options: DataTableOptions,
    ) -> Self {
        let table = Table::with_options(
            columns,
            data,
            TableOptions {
                column_resize_mode: options.column_resize_mode,
                initial_pagination: PaginationState::new(0, options.page_size),
                ..TableOptions::default()
            },
        );
        let search = DebouncedInput::with_options(
            TextInputOptions {
                placeholder: SEARCH_PLACEHOLDER.to_string(),
                ..Default::default()
            },
            options.debounce,
        );
        let page_input = TextInput::with_options(TextInputOptions {
            kind: InputKind::Number,
            ..Default::default()
        });
        let help = help_bar(&options);
        let grid = DataGridView::with_options(options.grid.clone());

        let mut dt = Self {
            table,
            options,
            grid,
            boundary: ErrorBoundary::new(),
            help,
            search,
            global_filter: Deferred::new(String::new()),
            filter_inputs: Vec::new(),
            page_input,
            focus: Focus::Grid,
            sorting: Transition::new(),
            column_filters: Transition::new(),
            select_all: Transition::new(),
            queued_at: None,
            failure: None,
            hits: HitAreas::default(),
        };
        dt.rebuild_filter_inputs();
        dt.after_table_change();
        dt.apply_focus();
        dt
    }

    /// Runs `hook` whenever the error fallback is dismissed.
    pub fn on_reset(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.boundary = std::mem::take(&mut self.boundary).on_reset(hook);
        self
    }

    /// Replaces the options at runtime. Typed input, filters and sorting are kept; the page size
    /// only changes when `options.page_size` differs from the current option.
    pub fn set_options(&mut self, options: DataTableOptions) {
        self.table.set_options(TableOptions {
            column_resize_mode: options.column_resize_mode,
            ..self.table.options().clone()
        });
        if options.page_size != self.options.page_size {
            if let Err(err) = self.table.set_page_size(options.page_size) {
                self.fail(err.into());
            }
        }
        self.search.set_delay(options.debounce);
        for input in self.filter_inputs.iter_mut().flatten() {
            input.configure(options.debounce, options.suggestion_limit);
        }
        self.grid.set_options(options.grid.clone());
        self.help = help_bar(&options);
        self.options = options;
        self.after_table_change();
        self.apply_focus();
    }

    pub fn table(&self) -> &Table<T> {
        &self.table
    }

    pub fn options(&self) -> &DataTableOptions {
        &self.options
    }

    pub fn grid(&self) -> &DataGridView {
        &self.grid
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// The error shown in place of the table, if rendering failed.
    pub fn error(&self) -> Option<&RenderError> {
        self.boundary.error()
    }

    /// Replaces the records. Filters and sorting are kept; the page index and the row
    /// selection are reset.
    pub fn set_data(&mut self, data: Vec<T>) {
        self.table.reset_row_selection();
        self.table.set_data(data);
        self.rebuild_filter_inputs();
        self.after_table_change();
        self.apply_focus();
    }

    /// The global search value that is being typed (not yet applied while stale).
    pub fn global_filter(&self) -> &str {
        self.global_filter.value()
    }

    /// True while a settled search value is waiting to be applied to the rows.
    pub fn is_stale(&self) -> bool {
        self.global_filter.is_stale()
    }

    /// True while any queued update has not been applied yet.
    pub fn is_pending(&self) -> bool {
        self.is_stale()
            || self.sorting.is_pending()
            || self.column_filters.is_pending()
            || self.select_all.is_pending()
    }

    /// Where the terminal cursor belongs after the last render (the focused input).
    pub fn cursor_position(&self) -> Option<(u16, u16)> {
        self.hits.cursor
    }

    /// Dismisses the error fallback and renders the table again.
    pub fn reset(&mut self) {
        self.failure = None;
        self.boundary.reset();
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.apply_focus();
        if let Focus::Filter { column, .. } = focus {
            let row = self.grid.cursor().map(|c| c.row).unwrap_or(0);
            self.grid.set_cursor(Some(Cell { row, col: column }));
        }
    }

    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> DataTableAction {
        if self.boundary.has_error() {
            return match event {
                InputEvent::Key(key) if self.options.keymap.reset.matches(&key) => {
                    self.reset();
                    DataTableAction::Redraw
                }
                _ => DataTableAction::None,
            };
        }
        match event {
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse, now),
            InputEvent::Key(key) => self.handle_key(key, now),
            InputEvent::Paste(_) => {
                self.forward_to_input(event, now);
                DataTableAction::Redraw
            }
        }
    }

    /// Applies updates queued before this call, then picks up inputs whose debounce delay
    /// elapsed. Returns whether anything changed and a redraw is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        let applied = self.apply_transitions();
        if applied {
            self.after_table_change();
        }
        let queued = self.poll_inputs(now);
        self.search.input.set_disabled(self.is_stale());
        applied || queued
    }

    /// Applies every pending input and queued update immediately.
    pub fn flush(&mut self, now: Instant) {
        if let Some(query) = self.search.flush() {
            self.set_global_filter(query, now);
        }
        let mut edits = Vec::new();
        for (column, input) in self.filter_inputs.iter_mut().enumerate() {
            if let Some(input) = input {
                edits.extend(input.flush().into_iter().map(|e| (column, e)));
            }
        }
        for (column, edit) in edits {
            self.queue_filter_edit(column, edit, now);
        }
        if self.apply_transitions() {
            self.after_table_change();
        }
        self.search.input.set_disabled(false);
    }

    /// The next instant at which [`DataTable::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut deadline = if self.is_pending() {
            self.queued_at
        } else {
            None
        };
        deadline = earliest(deadline, self.search.deadline());
        for input in self.filter_inputs.iter().flatten() {
            deadline = earliest(deadline, input.deadline());
        }
        deadline
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> DataTableAction {
        if key.code == KeyCode::Tab && self.focused_completion() {
            self.forward_to_input(InputEvent::Key(key), now);
            return DataTableAction::Redraw;
        }
        if self.options.keymap.next_focus.matches(&key) {
            self.cycle_focus(true);
            return DataTableAction::Redraw;
        }
        if self.options.keymap.previous_focus.matches(&key) {
            self.cycle_focus(false);
            return DataTableAction::Redraw;
        }
        if self.focus != Focus::Grid && self.options.keymap.back.matches(&key) {
            self.set_focus(Focus::Grid);
            return DataTableAction::Redraw;
        }

        if self.focus == Focus::Grid {
            return self.handle_grid_key(key, now);
        }
        self.forward_to_input(InputEvent::Key(key), now);
        DataTableAction::Redraw
    }

    fn handle_grid_key(&mut self, key: KeyEvent, now: Instant) -> DataTableAction {
        let column = self.grid.cursor().map(|c| c.col).unwrap_or(0);
        let Some(command) = self.command_for(&key) else {
            return match self.grid.handle_event(InputEvent::Key(key)) {
                DataGridAction::None => DataTableAction::None,
                DataGridAction::Redraw => DataTableAction::Redraw,
                DataGridAction::ToggleRow(index) => {
                    if let Some(row) = self.table.row_model().get(index) {
                        self.table.toggle_row_selected(row.id, None);
                    }
                    DataTableAction::Redraw
                }
                DataGridAction::Activated(cell) => match self.table.row_model().get(cell.row) {
                    Some(row) => DataTableAction::Activated {
                        row: row.id,
                        column: cell.col,
                    },
                    None => DataTableAction::None,
                },
            };
        };

        match command {
            Command::Search => self.set_focus(Focus::Search),
            Command::Sort => self.queue_sort(column, false, now),
            Command::SortMulti => self.queue_sort(column, true, now),
            Command::SelectAll => self.queue_select_all(true, now),
            Command::ClearSelection => self.queue_select_all(false, now),
            Command::FirstPage => self.go_to(Table::first_page),
            Command::PreviousPage => self.go_to(Table::previous_page),
            Command::NextPage => self.go_to(Table::next_page),
            Command::LastPage => self.go_to(Table::last_page),
            Command::PageSize => self.cycle_page_size(),
            Command::ShrinkColumn => self.resize_column(column, -1),
            Command::GrowColumn => self.resize_column(column, 1),
            Command::ResetWidths => {
                self.table.reset_column_sizing();
                self.sync_grid();
            }
            Command::Reset => self.reset(),
        }
        DataTableAction::Redraw
    }

    fn command_for(&self, key: &KeyEvent) -> Option<Command> {
        let km = &self.options.keymap;
        [
            (&km.search, Command::Search),
            (&km.sort, Command::Sort),
            (&km.sort_multi, Command::SortMulti),
            (&km.select_all, Command::SelectAll),
            (&km.clear_selection, Command::ClearSelection),
            (&km.first_page, Command::FirstPage),
            (&km.previous_page, Command::PreviousPage),
            (&km.next_page, Command::NextPage),
            (&km.last_page, Command::LastPage),
            (&km.page_size, Command::PageSize),
            (&km.shrink_column, Command::ShrinkColumn),
            (&km.grow_column, Command::GrowColumn),
            (&km.reset_widths, Command::ResetWidths),
            (&km.reset, Command::Reset),
        ]
        .into_iter()
        .find(|(binding, _)| binding.matches(key))
        .map(|(_, command)| command)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) -> DataTableAction {
        let resizing = self.table.column_sizing_info().resizing_column.is_some();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.click(mouse, now),
            MouseEventKind::Drag(MouseButton::Left) if resizing => {
                self.table.update_resize(mouse.x as i32);
                if self.options.column_resize_mode == ColumnResizeMode::OnChange {
                    self.sync_grid();
                }
                DataTableAction::Redraw
            }
            MouseEventKind::Up(MouseButton::Left) if resizing => {
                self.table.end_resize();
                self.sync_grid();
                DataTableAction::Redraw
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
                if self.hits.grid.contains(Position::new(mouse.x, mouse.y)) =>
            {
                match self.grid.handle_event(InputEvent::Mouse(mouse)) {
                    DataGridAction::None => DataTableAction::None,
                    _ => DataTableAction::Redraw,
                }
            }
            _ => DataTableAction::None,
        }
    }

    fn click(&mut self, mouse: MouseEvent, now: Instant) -> DataTableAction {
        let hits = self.hits;
        let at = Position::new(mouse.x, mouse.y);
        if hits.search.contains(at) {
            self.set_focus(Focus::Search);
        } else if hits.select_all.contains(at) {
            self.queue_select_all(true, now);
        } else if hits.clear_selection.contains(at) {
            self.queue_select_all(false, now);
        } else if hits.first_page.contains(at) {
            self.go_to(Table::first_page);
        } else if hits.previous_page.contains(at) {
            self.go_to(Table::previous_page);
        } else if hits.next_page.contains(at) {
            self.go_to(Table::next_page);
        } else if hits.last_page.contains(at) {
            self.go_to(Table::last_page);
        } else if hits.page_input.contains(at) {
            self.set_focus(Focus::Page);
        } else if hits.page_size.contains(at) {
            self.cycle_page_size();
        } else if let Some(hit) = self.grid.header_hit(mouse.x, mouse.y) {
            self.click_header(hit, mouse, now);
        } else if hits.grid.contains(at) {
            self.set_focus(Focus::Grid);
            self.grid.handle_event(InputEvent::Mouse(mouse));
        } else {
            return DataTableAction::None;
        }
        DataTableAction::Redraw
    }

    fn click_header(&mut self, hit: HeaderHit, mouse: MouseEvent, now: Instant) {
        match hit {
            HeaderHit::Boundary { col } => {
                let Some(id) = self.column_id(col) else {
                    return;
                };
                if let Err(err) = self.table.begin_resize(&id, mouse.x as i32) {
                    self.fail(err.into());
                }
            }
            HeaderHit::Column { col, row: 0 } => self.queue_sort(col, mouse.modifiers.shift, now),
            HeaderHit::Column { col, row } => {
                let slot = row as usize - 1;
                let has_slot = self
                    .filter_inputs
                    .get(col)
                    .and_then(Option::as_ref)
                    .is_some_and(|f| slot < f.slots());
                if has_slot {
                    self.set_focus(Focus::Filter { column: col, slot });
                }
            }
        }
    }

    fn forward_to_input(&mut self, event: InputEvent, now: Instant) {
        match self.focus {
            Focus::Grid => {}
            Focus::Search => {
                let action = self.search.handle_event(event, now);
                if matches!(action, TextInputAction::Submitted(_)) {
                    if let Some(query) = self.search.flush() {
                        self.set_global_filter(query, now);
                    }
                }
            }
            Focus::Filter { column, slot } => {
                let Some(Some(input)) = self.filter_inputs.get_mut(column) else {
                    return;
                };
                let action = input.handle_event(slot, event, now);
                if matches!(action, TextInputAction::Submitted(_)) {
                    if let Some(edit) = input.flush_slot(slot) {
                        self.queue_filter_edit(column, edit, now);
                    }
                }
            }
            Focus::Page => match self.page_input.input(event) {
                TextInputAction::Changed(text) => self.go_to_page(&text),
                TextInputAction::Submitted(_) => self.set_focus(Focus::Grid),
                TextInputAction::None => {}
            },
        }
    }

    fn focused_completion(&self) -> bool {
        let Focus::Filter { column, slot } = self.focus else {
            return false;
        };
        self.filter_inputs
            .get(column)
            .and_then(Option::as_ref)
            .and_then(|f| f.slot(slot))
            .is_some_and(|input| input.input.completion().is_some())
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::Search];
        for (column, input) in self.filter_inputs.iter().enumerate() {
            if let Some(input) = input {
                order.extend((0..input.slots()).map(|slot| Focus::Filter { column, slot }));
            }
        }
        order.push(Focus::Grid);
        order.push(Focus::Page);
        order
    }

    fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let n = order.len();
        let i = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.set_focus(order[next]);
    }

    fn apply_focus(&mut self) {
        let focus = self.focus;
        self.search.input.set_focused(focus == Focus::Search);
        for (c, input) in self.filter_inputs.iter_mut().enumerate() {
            if let Some(input) = input {
                input.set_focused(match focus {
                    Focus::Filter { column, slot } if column == c => Some(slot),
                    _ => None,
                });
            }
        }
        self.page_input.set_focused(focus == Focus::Page);
        self.sync_page_input();
    }

    fn column_id(&self, column: usize) -> Option<String> {
        self.table.columns().get(column).map(|c| c.id().to_string())
    }

    fn mark_queued(&mut self, now: Instant) {
        self.queued_at.get_or_insert(now);
    }

    fn set_global_filter(&mut self, query: String, now: Instant) {
        self.global_filter.set(query);
        if self.global_filter.is_stale() {
            self.mark_queued(now);
        }
    }

    fn queue_sort(&mut self, column: usize, multi: bool, now: Instant) {
        let Some(col) = self.table.columns().get(column) else {
            return;
        };
        if !col.can_sort() {
            return;
        }
        let id = col.id().to_string();
        let base = self.sorting.peek().unwrap_or(self.table.sorting());
        let next = sort::toggle_sorting(base, &id, self.table.first_sort_direction(column), multi);
        tracing::debug!(column = %id, multi, "sorting queued");
        self.sorting.start(next);
        self.mark_queued(now);
    }

    fn queue_filter_edit(&mut self, column: usize, edit: FilterEdit, now: Instant) {
        let Some(id) = self.column_id(column) else {
            return;
        };
        let base = self
            .column_filters
            .peek()
            .unwrap_or(&self.table.state().column_filters);
        let next = filter::updated_filters(base, &id, |old| edit.apply(old));
        tracing::debug!(column = %id, "column filter queued");
        self.column_filters.start(next);
        self.mark_queued(now);
    }

    fn queue_select_all(&mut self, value: bool, now: Instant) {
        if value && self.is_stale() {
            return;
        }
        self.select_all.start(value);
        self.mark_queued(now);
    }

    fn apply_transitions(&mut self) -> bool {
        let mut changed = false;
        if let Some(sorting) = self.sorting.take() {
            changed = true;
            if let Err(err) = self.table.set_sorting(sorting) {
                self.fail(err.into());
            }
        }
        if let Some(filters) = self.column_filters.take() {
            changed = true;
            if let Err(err) = self.table.set_column_filters(filters) {
                self.fail(err.into());
            }
        }
        if let Some(value) = self.select_all.take() {
            changed = true;
            self.table.toggle_all_rows_selected(value);
        }
        if let Some(query) = self.global_filter.commit() {
            changed = true;
            self.table.set_global_filter(query);
        }
        self.queued_at = None;
        changed
    }

    fn poll_inputs(&mut self, now: Instant) -> bool {
        let mut queued = false;
        if let Some(query) = self.search.poll(now) {
            self.set_global_filter(query, now);
            queued = true;
        }
        let mut edits = Vec::new();
        for (column, input) in self.filter_inputs.iter_mut().enumerate() {
            if let Some(input) = input {
                edits.extend(input.poll(now).into_iter().map(|e| (column, e)));
            }
        }
        for (column, edit) in edits {
            self.queue_filter_edit(column, edit, now);
            queued = true;
        }
        queued
    }

    fn go_to(&mut self, f: impl FnOnce(&mut Table<T>)) {
        f(&mut self.table);
        self.after_page_change();
    }

    fn go_to_page(&mut self, text: &str) {
        let text = text.trim();
        let page = if text.is_empty() {
            0
        } else {
            match text.parse::<f64>() {
                Ok(n) if n >= 1.0 => n as usize - 1,
                Ok(_) => 0,
                Err(_) => return,
            }
        };
        self.table.set_page_index(page);
        self.after_page_change();
    }

    fn cycle_page_size(&mut self) {
        let next = self.options.next_page_size(self.table.pagination().page_size);
        if let Err(err) = self.table.set_page_size(next) {
            self.fail(err.into());
        }
        self.after_page_change();
    }

    fn resize_column(&mut self, column: usize, delta: i32) {
        let Some(col) = self.table.columns().get(column) else {
            return;
        };
        if !col.can_resize() {
            return;
        }
        let id = col.id().to_string();
        let size = (self.table.column_size(column) as i32 + delta).clamp(0, u16::MAX as i32);
        if let Err(err) = self.table.set_column_size(&id, size as u16) {
            self.fail(err.into());
        }
        self.sync_grid();
    }

    fn fail(&mut self, err: RenderError) {
        tracing::warn!(error = %err, "table update failed");
        self.failure.get_or_insert(err);
    }

    fn rebuild_filter_inputs(&mut self) {
        let debounce = self.options.debounce;
        let limit = self.options.suggestion_limit;
        self.filter_inputs = self
            .table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if !c.can_filter() {
                    return None;
                }
                Some(match self.table.first_value_kind(i) {
                    ValueKind::Number => ColumnFilterInput::range(debounce),
                    _ => ColumnFilterInput::text(debounce, limit),
                })
            })
            .collect();
    }

    fn header_height(&self) -> u16 {
        let filter_rows = self
            .filter_inputs
            .iter()
            .flatten()
            .map(ColumnFilterInput::slots)
            .max()
            .unwrap_or(0);
        1 + filter_rows as u16
    }

    fn after_table_change(&mut self) {
        self.after_page_change();
        self.refresh_filter_hints();
    }

    fn after_page_change(&mut self) {
        self.sync_grid();
        self.grid.to_top();
        self.sync_page_input();
    }

    fn sync_grid(&mut self) {
        let columns = self
            .table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| DataGridColumn::new(c.title(), self.table.column_size(i)))
            .collect();
        self.grid.set_columns(columns);
        self.grid.set_header_height(self.header_height());
        self.grid.set_row_count(self.table.row_model().len());
    }

    fn refresh_filter_hints(&mut self) {
        for (i, input) in self.filter_inputs.iter_mut().enumerate() {
            let Some(input) = input else {
                continue;
            };
            input.refresh_hints(
                self.table.faceted_unique_values(i),
                self.table.faceted_min_max_values(i),
            );
            let id = self.table.columns()[i].id();
            input.sync(self.table.column_filter(id));
        }
    }

    fn sync_page_input(&mut self) {
        if self.page_input.is_focused() {
            return;
        }
        let page = self.table.pagination().page_index + 1;
        self.page_input.set_text(page.to_string());
    }
}

fn help_bar(options: &DataTableOptions) -> HelpBar {
    HelpBar::with_options(
        options.keymap.help_bindings(),
        HelpBarOptions {
            style: options.theme.text_muted,
            key_style: options.theme.accent,
            ..Default::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui_datatable_core::table::CellValue;
    use ratatui_datatable_core::table::ColumnSort;
    use ratatui_datatable_core::table::FilterValue;
    use std::time::Duration;

    struct Item {
        name: String,
        qty: i64,
    }

    fn table(n: i64) -> DataTable<Item> {
        let columns = vec![
            ColumnDef::accessor("name", |i: &Item| CellValue::from(i.name.as_str())),
            ColumnDef::accessor("qty", |i: &Item| CellValue::from(i.qty)),
        ];
        let data = (0..n)
            .map(|i| Item {
                name: format!("item {i}"),
                qty: i,
            })
            .collect();
        DataTable::new(columns, data)
    }

    fn key(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    #[test]
    fn sorting_is_applied_on_the_next_tick() {
        let t0 = Instant::now();
        let mut dt = table(10);
        dt.grid.set_cursor(Some(Cell { row: 0, col: 1 }));
        dt.handle_event(key('s'), t0);
        assert!(dt.is_pending());
        assert!(dt.table().sorting().is_empty());
        assert_eq!(dt.next_deadline(), Some(t0));

        assert!(dt.tick(t0));
        assert_eq!(dt.table().sorting(), &vec![ColumnSort::new("qty", true)]);
        assert!(!dt.is_pending());
    }

    #[test]
    fn newer_sort_toggles_build_on_queued_ones() {
        let t0 = Instant::now();
        let mut dt = table(10);
        dt.handle_event(key('s'), t0);
        dt.handle_event(key('s'), t0);
        dt.tick(t0);
        assert_eq!(dt.table().sorting(), &vec![ColumnSort::new("name", true)]);
    }

    #[test]
    fn search_waits_for_debounce_then_goes_stale() {
        let t0 = Instant::now();
        let mut dt = table(30);
        dt.handle_event(key('/'), t0);
        assert_eq!(dt.focus(), Focus::Search);
        for c in "29".chars() {
            dt.handle_event(key(c), t0);
        }
        assert!(!dt.tick(t0 + Duration::from_millis(100)));
        assert_eq!(dt.next_deadline(), Some(t0 + dt.options().debounce));

        let settled = t0 + dt.options().debounce;
        assert!(dt.tick(settled));
        assert!(dt.is_stale());
        assert_eq!(dt.global_filter(), "29");
        assert_eq!(dt.table().global_filter(), "");

        assert!(dt.tick(settled));
        assert!(!dt.is_stale());
        assert_eq!(dt.table().global_filter(), "29");
        assert_eq!(dt.table().pre_pagination_row_model().len(), 1);
    }

    #[test]
    fn enter_in_search_skips_the_debounce() {
        let t0 = Instant::now();
        let mut dt = table(30);
        dt.set_focus(Focus::Search);
        dt.handle_event(key('9'), t0);
        dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Enter)), t0);
        assert!(dt.is_stale());
        dt.tick(t0);
        assert_eq!(dt.table().global_filter(), "9");
    }

    #[test]
    fn range_filter_updates_compose() {
        let t0 = Instant::now();
        let mut dt = table(50);
        dt.set_focus(Focus::Filter { column: 1, slot: 0 });
        dt.handle_event(key('1'), t0);
        dt.handle_event(key('0'), t0);
        dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Tab)), t0);
        assert_eq!(dt.focus(), Focus::Filter { column: 1, slot: 1 });
        dt.handle_event(key('1'), t0);
        dt.handle_event(key('9'), t0);
        dt.flush(t0);
        assert_eq!(
            dt.table().column_filter("qty"),
            Some(&FilterValue::range(Some(10.0), Some(19.0)))
        );
        assert_eq!(dt.table().pre_pagination_row_model().len(), 10);
    }

    #[test]
    fn select_all_is_ignored_while_stale() {
        let t0 = Instant::now();
        let mut dt = table(5);
        dt.set_global_filter("item".to_string(), t0);
        dt.handle_event(key('a'), t0);
        dt.tick(t0);
        assert_eq!(dt.table().state().row_selection.len(), 0);

        dt.handle_event(key('a'), t0);
        dt.tick(t0);
        assert_eq!(dt.table().state().row_selection.len(), 5);
        dt.handle_event(key('x'), t0);
        dt.tick(t0);
        assert!(dt.table().state().row_selection.is_empty());
    }

    #[test]
    fn focus_cycles_through_inputs() {
        let mut dt = table(5);
        let t0 = Instant::now();
        let tab = InputEvent::Key(KeyEvent::new(KeyCode::Tab));
        let order: Vec<Focus> = (0..5)
            .map(|_| {
                dt.handle_event(tab.clone(), t0);
                dt.focus()
            })
            .collect();
        assert_eq!(
            order,
            vec![
                Focus::Page,
                Focus::Search,
                Focus::Filter { column: 0, slot: 0 },
                Focus::Filter { column: 1, slot: 0 },
                Focus::Filter { column: 1, slot: 1 },
            ]
        );
        dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Esc)), t0);
        assert_eq!(dt.focus(), Focus::Grid);
    }

    #[test]
    fn page_keys_and_page_input_navigate() {
        let t0 = Instant::now();
        let mut dt = table(350);
        assert_eq!(dt.table().page_count(), 4);
        dt.handle_event(key(']'), t0);
        assert_eq!(dt.table().pagination().page_index, 1);
        dt.handle_event(key('}'), t0);
        assert_eq!(dt.table().pagination().page_index, 3);
        assert_eq!(dt.grid().row_count(), 50);

        dt.set_focus(Focus::Page);
        dt.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Backspace)), t0);
        assert_eq!(dt.table().pagination().page_index, 0);
        dt.handle_event(key('3'), t0);
        assert_eq!(dt.table().pagination().page_index, 2);

        dt.set_focus(Focus::Grid);
        dt.handle_event(key('p'), t0);
        assert_eq!(dt.table().pagination().page_size, 200);
        assert_eq!(dt.table().pagination().page_index, 1);
    }

    #[test]
    fn space_toggles_the_row_under_the_cursor() {
        let t0 = Instant::now();
        let mut dt = table(10);
        dt.handle_event(key('s'), t0);
        dt.handle_event(key('s'), t0);
        dt.tick(t0);
        // Sorted by name descending: "item 9" first.
        dt.grid.set_cursor(Some(Cell { row: 0, col: 0 }));
        dt.handle_event(key(' '), t0);
        assert!(dt.table().is_row_selected(9));
    }

    #[test]
    fn options_can_change_at_runtime() {
        let t0 = Instant::now();
        let mut dt = table(500);
        dt.set_focus(Focus::Search);
        dt.handle_event(key('4'), t0);

        let options = DataTableOptions {
            page_size: 200,
            debounce: Duration::from_millis(20),
            column_resize_mode: ColumnResizeMode::OnChange,
            show_help: false,
            ..DataTableOptions::default()
        };
        dt.set_options(options);
        assert_eq!(dt.table().pagination().page_size, 200);
        assert_eq!(dt.table().page_count(), 3);
        assert_eq!(
            dt.table().options().column_resize_mode,
            ColumnResizeMode::OnChange
        );
        assert_eq!(dt.global_filter(), "");

        dt.handle_event(key('9'), t0);
        assert_eq!(dt.next_deadline(), Some(t0 + Duration::from_millis(20)));
        assert!(dt.tick(t0 + Duration::from_millis(20)));
        assert_eq!(dt.global_filter(), "49");
    }

    #[test]
    fn clear_keeps_selected_rows_hidden_by_filters() {
        let t0 = Instant::now();
        let mut dt = table(10);
        dt.handle_event(key('a'), t0);
        dt.tick(t0);
        assert_eq!(dt.table().state().row_selection.len(), 10);

        dt.table.set_column_filter("qty", Some(FilterValue::range(Some(7.0), None)))
            .unwrap();
        dt.handle_event(key('x'), t0);
        dt.tick(t0);
        assert_eq!(
            dt.table().state().row_selection.iter().copied().collect::<Vec<_>>(),
            (0..7).collect::<Vec<usize>>()
        );
    }

    #[test]
    fn column_resize_keys_change_sizes() {
        let t0 = Instant::now();
        let mut dt = table(3);
        let before = dt.table().column_size(0);
        dt.handle_event(key('>'), t0);
        dt.handle_event(key('>'), t0);
        assert_eq!(dt.table().column_size(0), before + 2);
        assert_eq!(dt.grid().columns()[0].width, before + 2);

        dt.handle_event(key('='), t0);
        assert_eq!(dt.table().column_size(0), before);
        assert_eq!(dt.grid().columns()[0].width, before);
    }
}
