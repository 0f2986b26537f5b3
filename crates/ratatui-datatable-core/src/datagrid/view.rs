use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::MouseButton;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::render;
use crate::theme::Theme;
use crate::viewport::ViewportState;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Span;
use std::ops::Range;
use virtualizer::Align;
use virtualizer::Virtualizer;
use virtualizer::VirtualizerOptions;

const WHEEL_STEP: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataGridAction {
    None,
    Redraw,
    Activated(Cell),
    /// The user asked to toggle the selection of a row (Space).
    ToggleRow(usize),
}

/// A grid cell address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Column configuration for [`DataGridView`].
#[derive(Clone, Debug)]
pub struct DataGridColumn {
    pub title: String,
    pub width: u16,
}

impl DataGridColumn {
    pub fn new(title: impl Into<String>, width: u16) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

/// Options for [`DataGridView`].
///
/// Rows and columns are virtualized via the `virtualizer` crate; cell and header content is
/// delegated to a [`DataGridDelegate`].
#[derive(Clone, Debug)]
pub struct DataGridViewOptions {
    /// Height of the fixed header in rows; `0` hides it.
    pub header_height: u16,
    pub show_scrollbar_y: bool,
    pub overscan_rows: usize,
    pub overscan_cols: usize,
    pub row_height: u32,
    pub col_gap: u32,
    pub style: Style,
    pub header_style: Style,
    pub grid_line_style: Style,
    pub scrollbar_style: Style,
    pub cursor_style: Style,
}

impl Default for DataGridViewOptions {
    fn default() -> Self {
        Self {
            header_height: 1,
            show_scrollbar_y: true,
            overscan_rows: 2,
            overscan_cols: 2,
            row_height: 1,
            col_gap: 1,
            style: Style::default(),
            header_style: Style::default().add_modifier(Modifier::BOLD),
            grid_line_style: Style::default(),
            scrollbar_style: Style::default(),
            cursor_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }
}

/// Context passed to [`DataGridDelegate::render_cell`].
#[derive(Clone, Debug)]
pub struct DataGridCellContext {
    pub cell: Cell,
    pub col_width: u16,
    pub clip_left: u32,
    pub clip_top: u32,
    pub is_cursor: bool,
    pub is_row_selected: bool,
}

/// Context passed to [`DataGridDelegate::render_header`].
#[derive(Clone, Debug)]
pub struct DataGridHeaderContext {
    pub col: usize,
    pub col_width: u16,
    pub clip_left: u32,
}

/// Supplies content for a [`DataGridView`].
pub trait DataGridDelegate {
    fn render_cell(&mut self, area: Rect, ctx: DataGridCellContext, buf: &mut Buffer, theme: &Theme);

    /// Renders the header of one column. The default prints the column title.
    fn render_header(
        &mut self,
        area: Rect,
        ctx: DataGridHeaderContext,
        title: &str,
        buf: &mut Buffer,
        style: Style,
    ) {
        render::render_str_clipped(
            area.x,
            area.y,
            ctx.clip_left,
            area.width,
            buf,
            title,
            style,
        );
    }

    fn is_row_selected(&self, _row: usize) -> bool {
        false
    }
}

/// Result of [`DataGridView::header_hit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderHit {
    /// Inside the header cell of a column; `row` is relative to the header top.
    Column { col: usize, row: u16 },
    /// On the separator right of a column: a resize handle.
    Boundary { col: usize },
}

/// A virtualized 2D grid view with a fixed header, keyboard and mouse navigation.
///
/// Only the rows and columns intersecting the viewport (plus overscan) are rendered, so the row
/// count can be arbitrarily large. The grid is event-loop agnostic: drive it with
/// `handle_event` and `render`.
pub struct DataGridView {
    pub state: ViewportState,
    options: DataGridViewOptions,
    columns: Vec<DataGridColumn>,
    rows: usize,
    cursor: Option<Cell>,
    row_v: Virtualizer,
    col_v: Virtualizer,
    row_items: Vec<virtualizer::VirtualItem>,
    col_items: Vec<virtualizer::VirtualItem>,
    header_area: Rect,
    body_area: Rect,
}

impl Default for DataGridView {
    fn default() -> Self {
        let options = DataGridViewOptions::default();

        let row_height = options.row_height.max(1);
        let mut row_opts = VirtualizerOptions::new(0, move |_| row_height);
        row_opts.overscan = options.overscan_rows;
        let row_v = Virtualizer::new(row_opts);

        let mut col_opts = VirtualizerOptions::new(0, |_| 1);
        col_opts.gap = options.col_gap;
        col_opts.overscan = options.overscan_cols;
        let col_v = Virtualizer::new(col_opts);

        Self {
            state: ViewportState::default(),
            options,
            columns: Vec::new(),
            rows: 0,
            cursor: None,
            row_v,
            col_v,
            row_items: Vec::new(),
            col_items: Vec::new(),
            header_area: Rect::default(),
            body_area: Rect::default(),
        }
    }
}

#[derive(Clone, Copy)]
struct DataGridBodyStyles {
    base: Style,
    cursor: Style,
    selected_row: Style,
    grid_line: Style,
}

struct ColSeparatorContext<'a> {
    area: Rect,
    scroll_x: u64,
    col_count: usize,
    buf: &'a mut Buffer,
    style: Style,
}

impl DataGridView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DataGridViewOptions) -> Self {
        let mut v = Self::default();
        v.set_options(options);
        v
    }

    pub fn options(&self) -> &DataGridViewOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DataGridViewOptions) {
        self.options = options;
        self.rebuild_row_virtualizer();
        self.rebuild_col_virtualizer();
        self.state.clamp();
    }

    pub fn set_header_height(&mut self, height: u16) {
        self.options.header_height = height;
    }

    pub fn set_row_count(&mut self, rows: usize) {
        if rows == self.rows {
            return;
        }
        self.rows = rows;
        self.rebuild_row_virtualizer();
        self.cursor = clamp_cursor(self.cursor, self.rows, self.columns.len());
        self.state.clamp();
    }

    /// Replaces the columns, keeping the scroll position. Call again after a column was resized.
    pub fn set_columns(&mut self, columns: Vec<DataGridColumn>) {
        self.columns = columns;
        self.rebuild_col_virtualizer();
        self.cursor = clamp_cursor(self.cursor, self.rows, self.columns.len());
        self.state.clamp();
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[DataGridColumn] {
        &self.columns
    }

    pub fn cursor(&self) -> Option<Cell> {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Option<Cell>) {
        self.cursor = clamp_cursor(cursor, self.rows, self.columns.len());
        self.ensure_cursor_visible();
    }

    /// Scrolls back to the first row and moves the cursor there.
    pub fn to_top(&mut self) {
        self.state.to_top();
        self.row_v.set_scroll_offset(0);
        if let Some(c) = self.cursor {
            self.cursor = clamp_cursor(Some(Cell { row: 0, col: c.col }), self.rows, self.columns.len());
        }
    }

    /// Row indices materialised by the last render, overscan included.
    pub fn visible_rows(&self) -> Range<usize> {
        match (self.row_items.first(), self.row_items.last()) {
            (Some(first), Some(last)) => first.index..last.index + 1,
            _ => 0..0,
        }
    }

    pub fn header_area(&self) -> Rect {
        self.header_area
    }

    pub fn body_area(&self) -> Rect {
        self.body_area
    }

    pub fn handle_event(&mut self, event: InputEvent) -> DataGridAction {
        match event {
            InputEvent::Paste(_) => DataGridAction::None,
            InputEvent::Key(key) => self.handle_key(key),
            InputEvent::Mouse(mouse) => self.handle_mouse(mouse),
        }
    }

    pub fn scroll_y_by(&mut self, delta: i32) {
        self.sync_virtualizers_from_state();
        self.state.scroll_y_by(delta);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    pub fn scroll_x_by(&mut self, delta: i32) {
        self.sync_virtualizers_from_state();
        self.state.scroll_x_by(delta);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    pub fn ensure_cursor_visible(&mut self) {
        self.sync_virtualizers_from_state();
        let Some(c) = self.cursor else {
            return;
        };
        self.row_v.scroll_to_index(c.row, Align::Auto);
        self.col_v.scroll_to_index(c.col, Align::Auto);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.clamp();
    }

    /// Maps a screen position inside the last rendered header to a column or a resize handle.
    pub fn header_hit(&self, x: u16, y: u16) -> Option<HeaderHit> {
        let area = self.header_area;
        if x < area.x || x >= area.x + area.width || y < area.y || y >= area.y + area.height {
            return None;
        }
        let offset = self.col_v.scroll_offset() + (x - area.x) as u64;
        for item in &self.col_items {
            let end = item.start + item.size as u64;
            if offset >= item.start && offset < end {
                return Some(HeaderHit::Column {
                    col: item.index,
                    row: y - area.y,
                });
            }
            if offset >= end && offset < end + self.options.col_gap.max(1) as u64 {
                return Some(HeaderHit::Boundary { col: item.index });
            }
        }
        None
    }

    /// Screen x of the right edge of `col` in the last render; may lie outside the viewport.
    pub fn column_edge_x(&self, col: usize) -> Option<i32> {
        let item = self.col_items.iter().find(|i| i.index == col)?;
        let rel = (item.start + item.size as u64) as i64 - self.col_v.scroll_offset() as i64;
        Some((self.header_area.x as i64 + rel) as i32)
    }

    /// Maps a screen position inside the last rendered body to a cell.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Cell> {
        let area = self.body_area;
        if x < area.x || x >= area.x + area.width || y < area.y || y >= area.y + area.height {
            return None;
        }
        let row_offset = self.row_v.scroll_offset() + (y - area.y) as u64;
        let col_offset = self.col_v.scroll_offset() + (x - area.x) as u64;
        let row = self
            .row_items
            .iter()
            .find(|i| row_offset >= i.start && row_offset < i.start + i.size as u64)?
            .index;
        let col = self
            .col_items
            .iter()
            .find(|i| col_offset >= i.start && col_offset < i.start + i.size as u64)?
            .index;
        Some(Cell { row, col })
    }

    pub fn render<D>(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme, delegate: &mut D)
    where
        D: DataGridDelegate + ?Sized,
    {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let header_h = self.options.header_height.min(area.height);

        let (content_area, scrollbar_x) = if self.options.show_scrollbar_y && area.width >= 2 {
            (
                Rect::new(area.x, area.y, area.width - 1, area.height),
                Some(area.x + area.width - 1),
            )
        } else {
            (area, None)
        };

        let header_area = Rect::new(content_area.x, content_area.y, content_area.width, header_h);
        let body_area = Rect::new(
            content_area.x,
            content_area.y + header_h,
            content_area.width,
            content_area.height.saturating_sub(header_h),
        );
        self.header_area = header_area;
        self.body_area = body_area;

        let base_style = if self.options.style == Style::default() {
            theme.text_primary
        } else {
            self.options.style
        };
        let header_style = self.options.header_style.patch(theme.accent);
        let grid_line_style = if self.options.grid_line_style == Style::default() {
            theme.text_muted
        } else {
            self.options.grid_line_style
        };
        let cursor_style = self.options.cursor_style.patch(theme.accent);

        buf.set_style(content_area, base_style);
        buf.set_style(header_area, header_style);

        self.sync_virtualizers(body_area);
        self.collect_virtual_items();

        if header_area.height > 0 {
            self.render_header(header_area, buf, header_style, grid_line_style, delegate);
        }

        self.render_body(
            body_area,
            buf,
            theme,
            DataGridBodyStyles {
                base: base_style,
                cursor: cursor_style,
                selected_row: theme.selected_row,
                grid_line: grid_line_style,
            },
            delegate,
        );

        if let Some(sb_x) = scrollbar_x {
            render::render_scrollbar(
                Rect::new(sb_x, body_area.y, 1, body_area.height),
                buf,
                &ViewportState {
                    x: 0,
                    y: self.state.y,
                    viewport_w: 1,
                    viewport_h: body_area.height,
                    content_w: 1,
                    content_h: self.state.content_h,
                },
                self.options.scrollbar_style,
            );
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> DataGridAction {
        if self.rows == 0 || self.columns.is_empty() {
            self.cursor = None;
            self.state.to_top();
            self.state.to_left();
            return DataGridAction::None;
        }

        self.sync_virtualizers_from_state();

        if key.modifiers.ctrl && !key.modifiers.alt {
            match key.code {
                KeyCode::Char('d') => return self.page_by(1),
                KeyCode::Char('u') => return self.page_by(-1),
                _ => {}
            }
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.move_action(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_action(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_action(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.move_action(0, -1),
            KeyCode::PageDown => self.page_by(1),
            KeyCode::PageUp => self.page_by(-1),
            KeyCode::Home => {
                self.set_cursor(Some(Cell { row: 0, col: 0 }));
                DataGridAction::Redraw
            }
            KeyCode::End => {
                self.set_cursor(Some(Cell {
                    row: self.rows.saturating_sub(1),
                    col: self.columns.len().saturating_sub(1),
                }));
                DataGridAction::Redraw
            }
            KeyCode::Char('g') => {
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.set_cursor(Some(Cell { row: 0, col }));
                DataGridAction::Redraw
            }
            KeyCode::Char('G') => {
                let col = self.cursor.map(|c| c.col).unwrap_or(0);
                self.set_cursor(Some(Cell {
                    row: self.rows.saturating_sub(1),
                    col,
                }));
                DataGridAction::Redraw
            }
            KeyCode::Char(' ') => {
                let cur = self.cursor.unwrap_or(Cell { row: 0, col: 0 });
                self.cursor = Some(cur);
                DataGridAction::ToggleRow(cur.row)
            }
            KeyCode::Enter => self
                .cursor
                .map(DataGridAction::Activated)
                .unwrap_or(DataGridAction::None),
            _ => DataGridAction::None,
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> DataGridAction {
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.scroll_y_by(WHEEL_STEP);
                DataGridAction::Redraw
            }
            MouseEventKind::ScrollUp => {
                self.scroll_y_by(-WHEEL_STEP);
                DataGridAction::Redraw
            }
            MouseEventKind::Down(MouseButton::Left) => match self.cell_at(mouse.x, mouse.y) {
                Some(cell) => {
                    self.cursor = Some(cell);
                    DataGridAction::Redraw
                }
                None => DataGridAction::None,
            },
            _ => DataGridAction::None,
        }
    }

    fn move_action(&mut self, drow: i32, dcol: i32) -> DataGridAction {
        if self.move_cursor_by(drow, dcol) {
            DataGridAction::Redraw
        } else {
            DataGridAction::None
        }
    }

    fn page_by(&mut self, dir: i32) -> DataGridAction {
        let step = self.state.viewport_h.saturating_sub(1).max(1) as i32;
        self.scroll_y_by(dir * step);
        let col = self.cursor.map(|c| c.col).unwrap_or(0);
        self.cursor = Some(Cell {
            row: self.row_from_scroll(),
            col,
        });
        DataGridAction::Redraw
    }

    fn move_cursor_by(&mut self, drow: i32, dcol: i32) -> bool {
        let cur = self.cursor.unwrap_or(Cell { row: 0, col: 0 });
        let next_row =
            (cur.row as i64 + drow as i64).clamp(0, self.rows.saturating_sub(1) as i64) as usize;
        let next_col = (cur.col as i64 + dcol as i64)
            .clamp(0, self.columns.len().saturating_sub(1) as i64) as usize;
        let next = Cell {
            row: next_row,
            col: next_col,
        };
        if Some(next) == self.cursor {
            return false;
        }
        self.cursor = Some(next);
        self.ensure_cursor_visible();
        true
    }

    fn row_from_scroll(&self) -> usize {
        self.row_v
            .index_at_offset(self.row_v.scroll_offset())
            .unwrap_or(0)
    }

    fn sync_virtualizers(&mut self, body_area: Rect) {
        self.state.set_viewport(body_area.width, body_area.height);
        self.sync_virtualizers_from_state();
    }

    fn sync_virtualizers_from_state(&mut self) {
        self.row_v.set_count(self.rows);
        self.col_v.set_count(self.columns.len());

        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);

        self.row_v.set_scroll_offset(self.state.y as u64);
        self.col_v.set_scroll_offset(self.state.x as u64);

        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;

        self.state
            .set_content(self.total_w_u32(), self.total_h_u32());
        self.state.clamp();

        self.row_v.set_overscan(self.options.overscan_rows);
        self.col_v.set_overscan(self.options.overscan_cols);
    }

    fn total_h_u32(&self) -> u32 {
        self.row_v.total_size().min(u32::MAX as u64) as u32
    }

    fn total_w_u32(&self) -> u32 {
        self.col_v.total_size().min(u32::MAX as u64) as u32
    }

    fn rebuild_row_virtualizer(&mut self) {
        let row_height = self.options.row_height.max(1);
        let mut opts = VirtualizerOptions::new(self.rows, move |_| row_height);
        opts.overscan = self.options.overscan_rows;
        self.row_v = Virtualizer::new(opts);
        self.row_v.set_viewport_size(self.state.viewport_h as u32);
        self.row_v.set_scroll_offset(self.state.y as u64);
        self.state.y = self.row_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    fn rebuild_col_virtualizer(&mut self) {
        let widths: Vec<u32> = self.columns.iter().map(|c| c.width as u32).collect();
        let widths = std::sync::Arc::new(widths);
        let mut opts = VirtualizerOptions::new(self.columns.len(), move |i| {
            widths.get(i).copied().unwrap_or(1).max(1)
        });
        opts.gap = self.options.col_gap;
        opts.overscan = self.options.overscan_cols;
        self.col_v = Virtualizer::new(opts);
        self.col_v.set_viewport_size(self.state.viewport_w as u32);
        self.col_v.set_scroll_offset(self.state.x as u64);
        self.state.x = self.col_v.scroll_offset().min(u32::MAX as u64) as u32;
    }

    fn collect_virtual_items(&mut self) {
        self.row_v.collect_virtual_items(&mut self.row_items);
        self.col_v.collect_virtual_items(&mut self.col_items);
    }

    fn render_header<D>(
        &self,
        area: Rect,
        buf: &mut Buffer,
        style: Style,
        grid_line_style: Style,
        delegate: &mut D,
    ) where
        D: DataGridDelegate + ?Sized,
    {
        if area.width == 0 || area.height == 0 || self.columns.is_empty() {
            return;
        }

        let scroll_x = self.col_v.scroll_offset();
        for col_item in self.col_items.iter().copied() {
            let col = &self.columns[col_item.index];
            let (rect, clip_left) = clipped_rect_x(area, scroll_x, col_item.start, col_item.size);
            if rect.width == 0 {
                continue;
            }
            let ctx = DataGridHeaderContext {
                col: col_item.index,
                col_width: col.width,
                clip_left,
            };
            delegate.render_header(rect, ctx, &col.title, buf, style);
            if self.options.col_gap > 0 {
                let mut sep = ColSeparatorContext {
                    area,
                    scroll_x,
                    col_count: self.columns.len(),
                    buf,
                    style: grid_line_style,
                };
                maybe_draw_col_separator(&mut sep, col_item.index, col_item.start, col_item.size);
            }
        }
    }

    fn render_body<D>(
        &self,
        area: Rect,
        buf: &mut Buffer,
        theme: &Theme,
        styles: DataGridBodyStyles,
        delegate: &mut D,
    ) where
        D: DataGridDelegate + ?Sized,
    {
        if area.width == 0 || area.height == 0 {
            return;
        }
        if self.rows == 0 || self.columns.is_empty() {
            return;
        }

        let scroll_x = self.col_v.scroll_offset();
        let scroll_y = self.row_v.scroll_offset();

        for row_item in self.row_items.iter().copied() {
            let (row_rect, clip_top) = clipped_rect_y(area, scroll_y, row_item.start, row_item.size);
            if row_rect.height == 0 {
                continue;
            }
            let is_row_selected = delegate.is_row_selected(row_item.index);
            if is_row_selected {
                buf.set_style(row_rect, styles.selected_row);
            }
            for col_item in self.col_items.iter().copied() {
                let (cell_rect, clip_left) =
                    clipped_rect_x(row_rect, scroll_x, col_item.start, col_item.size);
                if cell_rect.width == 0 || cell_rect.height == 0 {
                    continue;
                }

                let cell = Cell {
                    row: row_item.index,
                    col: col_item.index,
                };
                let is_cursor = self.cursor == Some(cell);
                let style = if is_cursor {
                    styles.cursor
                } else if is_row_selected {
                    styles.selected_row
                } else {
                    styles.base
                };
                buf.set_style(cell_rect, style);

                let ctx = DataGridCellContext {
                    cell,
                    col_width: self.columns[col_item.index].width,
                    clip_left,
                    clip_top,
                    is_cursor,
                    is_row_selected,
                };
                delegate.render_cell(cell_rect, ctx, buf, theme);
                if self.options.col_gap > 0 {
                    let mut sep = ColSeparatorContext {
                        area: row_rect,
                        scroll_x,
                        col_count: self.columns.len(),
                        buf,
                        style: styles.grid_line,
                    };
                    maybe_draw_col_separator(
                        &mut sep,
                        col_item.index,
                        col_item.start,
                        col_item.size,
                    );
                }
            }
        }
    }
}

fn clamp_cursor(cursor: Option<Cell>, rows: usize, cols: usize) -> Option<Cell> {
    if rows == 0 || cols == 0 {
        return None;
    }
    cursor.map(|c| Cell {
        row: c.row.min(rows - 1),
        col: c.col.min(cols - 1),
    })
}

fn clipped_rect_x(area: Rect, scroll_x: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_x as i64;
    let clip_left = (-rel).max(0) as u32;
    let x = rel.clamp(0, area.width as i64) as u16;
    let max_w = area.width.saturating_sub(x);
    let visible_w = size.saturating_sub(clip_left).min(max_w as u32) as u16;
    (
        Rect::new(area.x + x, area.y, visible_w, area.height),
        clip_left,
    )
}

fn clipped_rect_y(area: Rect, scroll_y: u64, start: u64, size: u32) -> (Rect, u32) {
    let rel = start as i64 - scroll_y as i64;
    let clip_top = (-rel).max(0) as u32;
    let y = rel.clamp(0, area.height as i64) as u16;
    let max_h = area.height.saturating_sub(y);
    let visible_h = size.saturating_sub(clip_top).min(max_h as u32) as u16;
    (
        Rect::new(area.x, area.y + y, area.width, visible_h),
        clip_top,
    )
}

fn maybe_draw_col_separator(
    ctx: &mut ColSeparatorContext<'_>,
    col_index: usize,
    col_start: u64,
    col_size: u32,
) {
    if col_index + 1 >= ctx.col_count {
        return;
    }
    let sep_x_rel = (col_start + col_size as u64) as i64 - ctx.scroll_x as i64;
    if sep_x_rel < 0 || sep_x_rel >= ctx.area.width as i64 {
        return;
    }
    let sep_x = sep_x_rel as u16;
    for dy in 0..ctx.area.height {
        ctx.buf.set_span(
            ctx.area.x + sep_x,
            ctx.area.y + dy,
            &Span::styled("│", ctx.style),
            1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyModifiers;
    use std::collections::BTreeSet;

    struct Numbers {
        selected: BTreeSet<usize>,
        rendered_rows: BTreeSet<usize>,
    }

    impl Numbers {
        fn new() -> Self {
            Self {
                selected: BTreeSet::new(),
                rendered_rows: BTreeSet::new(),
            }
        }
    }

    impl DataGridDelegate for Numbers {
        fn render_cell(&mut self, area: Rect, ctx: DataGridCellContext, buf: &mut Buffer, _: &Theme) {
            self.rendered_rows.insert(ctx.cell.row);
            let text = format!("{}", ctx.cell.row * 10 + ctx.cell.col);
            render::render_str_clipped(area.x, area.y, ctx.clip_left, area.width, buf, &text, Style::default());
        }

        fn is_row_selected(&self, row: usize) -> bool {
            self.selected.contains(&row)
        }
    }

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code))
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    fn grid(rows: usize) -> DataGridView {
        let mut g = DataGridView::new();
        g.set_columns(vec![
            DataGridColumn::new("A", 5),
            DataGridColumn::new("B", 5),
            DataGridColumn::new("C", 5),
        ]);
        g.set_row_count(rows);
        g
    }

    #[test]
    fn moves_cursor_and_scrolls_down() {
        let mut g = grid(10_000);
        g.state.set_viewport(10, 5);
        g.set_cursor(Some(Cell { row: 0, col: 0 }));
        assert_eq!(g.state.y, 0);

        for _ in 0..10 {
            g.handle_event(key(KeyCode::Down));
        }
        assert_eq!(g.cursor(), Some(Cell { row: 10, col: 0 }));
        assert!(g.state.y > 0);
    }

    #[test]
    fn renders_only_rows_in_view() {
        let mut g = grid(50_000);
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        let mut d = Numbers::new();
        g.render(area, &mut buf, &Theme::default(), &mut d);

        // One header row leaves five body rows, plus overscan.
        assert!(d.rendered_rows.len() <= 5 + g.options().overscan_rows * 2);
        assert!(d.rendered_rows.contains(&0));
        assert!(!d.rendered_rows.contains(&100));
        let visible = g.visible_rows();
        assert_eq!(visible.start, 0);
        assert!(visible.end >= 5 && visible.end < 10);
        assert!(row_text(&buf, 0).starts_with("A    │B"));
        assert!(row_text(&buf, 1).starts_with("0    │1"));
    }

    #[test]
    fn header_height_is_configurable() {
        let mut g = DataGridView::with_options(DataGridViewOptions {
            header_height: 3,
            ..Default::default()
        });
        g.set_columns(vec![DataGridColumn::new("A", 5)]);
        g.set_row_count(10);
        let area = Rect::new(0, 0, 10, 6);
        let mut buf = Buffer::empty(area);
        g.render(area, &mut buf, &Theme::default(), &mut Numbers::new());
        assert_eq!(g.header_area().height, 3);
        assert_eq!(g.body_area().y, 3);
        assert!(row_text(&buf, 3).starts_with('0'));
    }

    #[test]
    fn space_requests_row_toggle_and_selected_rows_are_highlighted() {
        let mut g = grid(10);
        g.set_cursor(Some(Cell { row: 2, col: 1 }));
        assert_eq!(g.handle_event(key(KeyCode::Char(' '))), DataGridAction::ToggleRow(2));

        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        let mut d = Numbers::new();
        d.selected.insert(1);
        g.render(area, &mut buf, &theme, &mut d);
        // Body row 1 is screen row 2.
        assert_eq!(buf.cell((0, 2)).map(|c| c.bg), theme.selected_row.bg);
        assert_ne!(buf.cell((0, 1)).map(|c| c.bg), theme.selected_row.bg);
    }

    #[test]
    fn header_hit_finds_columns_and_boundaries() {
        let mut g = grid(10);
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        g.render(area, &mut buf, &Theme::default(), &mut Numbers::new());

        assert_eq!(g.header_hit(1, 0), Some(HeaderHit::Column { col: 0, row: 0 }));
        assert_eq!(g.header_hit(5, 0), Some(HeaderHit::Boundary { col: 0 }));
        assert_eq!(g.header_hit(6, 0), Some(HeaderHit::Column { col: 1, row: 0 }));
        assert_eq!(g.header_hit(1, 3), None);
        assert_eq!(g.cell_at(7, 2), Some(Cell { row: 1, col: 1 }));
        assert_eq!(g.column_edge_x(0), Some(5));
        assert_eq!(g.column_edge_x(1), Some(11));
    }

    #[test]
    fn mouse_wheel_scrolls() {
        let mut g = grid(1_000);
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        g.render(area, &mut buf, &Theme::default(), &mut Numbers::new());
        let action = g.handle_event(InputEvent::Mouse(MouseEvent::new(
            1,
            2,
            MouseEventKind::ScrollDown,
        )));
        assert_eq!(action, DataGridAction::Redraw);
        assert_eq!(g.state.y, WHEEL_STEP as u32);
    }

    #[test]
    fn ctrl_d_pages_down() {
        let mut g = grid(1_000);
        g.state.set_viewport(20, 5);
        g.set_cursor(Some(Cell { row: 0, col: 0 }));
        let ev = InputEvent::Key(
            KeyEvent::new(KeyCode::Char('d')).with_modifiers(KeyModifiers::ctrl()),
        );
        g.handle_event(ev);
        assert_eq!(g.state.y, 4);
        assert_eq!(g.cursor(), Some(Cell { row: 4, col: 0 }));
    }
}
