use super::DataTable;
use super::Focus;
use super::HitAreas;
use super::filter_input::ColumnFilterInput;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui_datatable_core::datagrid::DataGridCellContext;
use ratatui_datatable_core::datagrid::DataGridDelegate;
use ratatui_datatable_core::datagrid::DataGridHeaderContext;
use ratatui_datatable_core::error_boundary::RenderError;
use ratatui_datatable_core::render;
use ratatui_datatable_core::table::ColumnResizeMode;
use ratatui_datatable_core::table::Table;
use ratatui_datatable_core::table::sort;
use ratatui_datatable_core::theme::Theme;

const MIN_SEARCH_WIDTH: u16 = 20;
const PAGE_INPUT_WIDTH: u16 = 6;
const RESIZE_MARKER: &str = "┃";

impl<T> DataTable<T> {
    /// Renders the component. Failures (cell formatter errors, engine errors, panics) replace it
    /// with an error message until [`DataTable::reset`].
    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let theme = self.options.theme.clone();
        let mut boundary = std::mem::take(&mut self.boundary);
        boundary.render(area, buf, &theme, |area, buf| {
            self.render_content(area, buf, &theme)
        });
        if boundary.has_error() {
            self.hits = HitAreas::default();
        }
        self.boundary = boundary;
    }

    fn render_content(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
    ) -> Result<(), RenderError> {
        self.hits = HitAreas::default();
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        if area.width == 0 || area.height == 0 {
            return Ok(());
        }

        let help_h = u16::from(self.options.show_help && area.height > 6);
        let [toolbar, grid_area, footer, help] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(help_h),
            ])
            .areas(area);

        self.render_toolbar(toolbar, buf, theme);
        self.render_grid(grid_area, buf, theme)?;
        self.render_footer(footer, buf, theme);
        if help.height > 0 {
            self.help.render_ref(help, buf);
        }
        Ok(())
    }

    fn render_toolbar(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let search_w = (area.width / 4).max(MIN_SEARCH_WIDTH).min(area.width);
        let search = Rect { width: search_w, ..area };
        self.search.input.render(search, buf, theme);
        self.hits.search = search;
        if self.focus == Focus::Search {
            self.hits.cursor = self.search.input.cursor_pos(search);
        }

        let mut line = Line::new(area, search.right().saturating_add(2));
        let stale = self.is_stale();
        let select_style = if stale {
            theme.text_muted.patch(theme.stale)
        } else {
            theme.accent
        };
        let select_all = line.put(buf, "[Select all]", select_style);
        if !stale {
            self.hits.select_all = select_all;
        }

        let selected = self.table.state().row_selection.len();
        if selected > 0 {
            line.put(buf, &format!("{selected} rows selected"), theme.text_primary);
            self.hits.clear_selection = line.put(buf, "[✕]", theme.accent);
        }
    }

    fn render_grid(
        &mut self,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
    ) -> Result<(), RenderError> {
        self.hits.grid = area;
        let mut cells = TableCells {
            table: &self.table,
            filters: &mut self.filter_inputs,
            theme,
            focus: self.focus,
            error: None,
            cursor: None,
        };
        self.grid.render(area, buf, theme, &mut cells);
        let TableCells { error, cursor, .. } = cells;
        if let Some(err) = error {
            return Err(err);
        }
        if cursor.is_some() {
            self.hits.cursor = cursor;
        }

        self.render_resize_marker(area, buf, theme);
        if self.is_stale() {
            buf.set_style(area, theme.stale);
        }
        Ok(())
    }

    /// Guide line at the prospective column edge while a drag resize is in progress.
    fn render_resize_marker(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        if self.options.column_resize_mode != ColumnResizeMode::OnEnd {
            return;
        }
        let info = self.table.column_sizing_info();
        let Some(id) = info.resizing_column.as_deref() else {
            return;
        };
        let Ok(column) = self.table.column_index(id) else {
            return;
        };
        let Some(edge) = self.grid.column_edge_x(column) else {
            return;
        };
        let x = edge + info.delta_offset;
        if x < area.x as i32 || x >= area.right() as i32 {
            return;
        }
        for y in area.top()..area.bottom() {
            buf.set_string(x as u16, y, RESIZE_MARKER, theme.accent);
        }
    }

    fn render_footer(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let enabled = |on: bool| {
            if on {
                theme.accent
            } else {
                theme.text_muted
            }
        };
        let can_prev = self.table.can_previous_page();
        let can_next = self.table.can_next_page();

        let mut line = Line::new(area, area.x);
        let first = line.put(buf, "[<<]", enabled(can_prev));
        let prev = line.put(buf, "[<]", enabled(can_prev));
        let next = line.put(buf, "[>]", enabled(can_next));
        let last = line.put(buf, "[>>]", enabled(can_next));
        if can_prev {
            self.hits.first_page = first;
            self.hits.previous_page = prev;
        }
        if can_next {
            self.hits.next_page = next;
            self.hits.last_page = last;
        }
        let records = self.table.pre_pagination_row_model().len();
        line.put(buf, &format!("{records} record(s)"), theme.text_muted);

        line.skip(1);
        line.put(buf, "Page", theme.text_primary);
        let page_input = line.reserve(PAGE_INPUT_WIDTH);
        self.page_input.render(page_input, buf, theme);
        self.hits.page_input = page_input;
        if self.focus == Focus::Page {
            self.hits.cursor = self.page_input.cursor_pos(page_input);
        }
        line.put(
            buf,
            &format!("of {}", self.table.page_count()),
            theme.text_primary,
        );

        line.skip(1);
        let page_size = self.table.pagination().page_size;
        self.hits.page_size = line.put(buf, &format!("[Show {page_size}]"), theme.accent);
    }
}

/// Left-to-right writer of space-separated items on one row.
struct Line {
    area: Rect,
    x: u16,
}

impl Line {
    fn new(area: Rect, x: u16) -> Self {
        Self { area, x }
    }

    fn remaining(&self) -> u16 {
        self.area.right().saturating_sub(self.x)
    }

    /// Writes `text` and returns the covered rect (empty when nothing fit).
    fn put(&mut self, buf: &mut Buffer, text: &str, style: Style) -> Rect {
        let width = (render::display_width(text) as u16).min(self.remaining());
        if width == 0 || self.area.height == 0 {
            return Rect::default();
        }
        let rect = Rect::new(self.x, self.area.y, width, 1);
        render::render_str_clipped(rect.x, rect.y, 0, width, buf, text, style);
        self.x = self.x.saturating_add(width).saturating_add(1);
        rect
    }

    fn reserve(&mut self, width: u16) -> Rect {
        let width = width.min(self.remaining());
        let rect = Rect::new(self.x, self.area.y, width, self.area.height.min(1));
        self.x = self.x.saturating_add(width).saturating_add(1);
        rect
    }

    fn skip(&mut self, n: u16) {
        self.x = self.x.saturating_add(n);
    }
}

/// Grid delegate drawing engine rows, sort indicators and the per-column filter inputs.
struct TableCells<'a, T> {
    table: &'a Table<T>,
    filters: &'a mut [Option<ColumnFilterInput>],
    theme: &'a Theme,
    focus: Focus,
    error: Option<RenderError>,
    cursor: Option<(u16, u16)>,
}

impl<T> TableCells<'_, T> {
    fn sort_label(&self, column: usize) -> String {
        let Some(col) = self.table.columns().get(column) else {
            return String::new();
        };
        let sorting = self.table.sorting();
        let Some(dir) = sort::sort_direction(sorting, col.id()) else {
            return String::new();
        };
        match sort::sort_index(sorting, col.id()) {
            Some(i) if sorting.len() > 1 => format!(" {}{}", dir.arrow(), i + 1),
            _ => format!(" {}", dir.arrow()),
        }
    }
}

impl<T> DataGridDelegate for TableCells<'_, T> {
    fn render_cell(&mut self, area: Rect, ctx: DataGridCellContext, buf: &mut Buffer, _: &Theme) {
        if self.error.is_some() {
            return;
        }
        let Some(row) = self.table.row_model().get(ctx.cell.row) else {
            return;
        };
        match self.table.formatted_value(row.id, ctx.cell.col) {
            Ok(text) => render::render_str_clipped(
                area.x,
                area.y,
                ctx.clip_left,
                area.width,
                buf,
                &text,
                Style::default(),
            ),
            Err(err) => self.error = Some(err.into()),
        }
    }

    fn render_header(
        &mut self,
        area: Rect,
        ctx: DataGridHeaderContext,
        title: &str,
        buf: &mut Buffer,
        style: Style,
    ) {
        let label = format!("{title}{}", self.sort_label(ctx.col));
        render::render_str_clipped(area.x, area.y, ctx.clip_left, area.width, buf, &label, style);

        // Inputs are only drawn when the column is fully scrolled into view.
        if ctx.clip_left > 0 {
            return;
        }
        let Some(Some(filter)) = self.filters.get_mut(ctx.col) else {
            return;
        };
        for slot in 0..filter.slots() {
            let y = area.y + 1 + slot as u16;
            if y >= area.bottom() {
                break;
            }
            let Some(input) = filter.slot_mut(slot) else {
                continue;
            };
            let rect = Rect::new(area.x, y, area.width, 1);
            input.input.render(rect, buf, self.theme);
            let focused = self.focus
                == Focus::Filter {
                    column: ctx.col,
                    slot,
                };
            if focused {
                self.cursor = input.input.cursor_pos(rect);
            }
        }
    }

    fn is_row_selected(&self, row: usize) -> bool {
        self.table
            .row_model()
            .get(row)
            .is_some_and(|r| self.table.is_row_selected(r.id))
    }
}
