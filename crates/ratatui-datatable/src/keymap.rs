use ratatui_datatable_core::input::KeyCode;
use ratatui_datatable_core::keymap::Binding;
use ratatui_datatable_core::keymap::key;
use ratatui_datatable_core::keymap::key_char;
use ratatui_datatable_core::keymap::key_ctrl;
use ratatui_datatable_core::keymap::key_shift;

/// Key bindings of [`crate::DataTable`] that apply while the grid has focus.
///
/// Focus cycling (`Tab`/`BackTab`) and `Esc` are handled in every focus state.
#[derive(Clone, Debug)]
pub struct DataTableKeymap {
    pub search: Binding,
    pub sort: Binding,
    pub sort_multi: Binding,
    pub select_all: Binding,
    pub clear_selection: Binding,
    pub first_page: Binding,
    pub previous_page: Binding,
    pub next_page: Binding,
    pub last_page: Binding,
    pub page_size: Binding,
    pub shrink_column: Binding,
    pub grow_column: Binding,
    pub reset_widths: Binding,
    pub reset: Binding,
    pub next_focus: Binding,
    pub previous_focus: Binding,
    pub back: Binding,
}

impl Default for DataTableKeymap {
    fn default() -> Self {
        Self {
            search: Binding::new("/", "search", vec![key_char('/')]),
            sort: Binding::new("s", "sort", vec![key_char('s')]),
            sort_multi: Binding::new("S", "add sort", vec![key_char('S')]),
            select_all: Binding::new("a", "select all", vec![key_char('a'), key_ctrl('a')]),
            clear_selection: Binding::new("x", "clear selection", vec![key_char('x')]),
            first_page: Binding::new("{", "first page", vec![key_char('{')]),
            previous_page: Binding::new("[", "prev page", vec![key_char('[')]),
            next_page: Binding::new("]", "next page", vec![key_char(']')]),
            last_page: Binding::new("}", "last page", vec![key_char('}')]),
            page_size: Binding::new("p", "page size", vec![key_char('p')]),
            shrink_column: Binding::new("<", "narrower", vec![key_char('<')]),
            grow_column: Binding::new(">", "wider", vec![key_char('>')]),
            reset_widths: Binding::new("=", "reset widths", vec![key_char('=')]),
            reset: Binding::new("R", "reset", vec![key_char('R')]),
            next_focus: Binding::new("tab", "next field", vec![key(KeyCode::Tab)]),
            previous_focus: Binding::new(
                "S-tab",
                "prev field",
                vec![key(KeyCode::BackTab), key_shift(KeyCode::Tab)],
            ),
            back: Binding::new("esc", "back to grid", vec![key(KeyCode::Esc)]),
        }
    }
}

impl DataTableKeymap {
    /// Bindings shown in the help bar.
    pub fn help_bindings(&self) -> Vec<Binding> {
        vec![
            self.search.clone(),
            self.sort.clone(),
            self.sort_multi.clone(),
            Binding::new("space", "select row", vec![]),
            self.select_all.clone(),
            self.clear_selection.clone(),
            self.previous_page.clone(),
            self.next_page.clone(),
            self.page_size.clone(),
            self.shrink_column.clone(),
            self.grow_column.clone(),
            self.next_focus.clone(),
        ]
    }
}
