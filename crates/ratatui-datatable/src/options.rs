use crate::keymap::DataTableKeymap;
use ratatui_datatable_core::datagrid::DataGridViewOptions;
use ratatui_datatable_core::schedule::DEFAULT_DEBOUNCE;
use ratatui_datatable_core::table::ColumnResizeMode;
use ratatui_datatable_core::table::pagination::DEFAULT_PAGE_SIZE;
use ratatui_datatable_core::text_input::DEFAULT_SUGGESTION_LIMIT;
use ratatui_datatable_core::theme::Theme;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE_CHOICES: [usize; 5] = [100, 200, 300, 500, 1000];

/// Configuration for [`crate::DataTable`].
#[derive(Clone, Debug)]
pub struct DataTableOptions {
    pub page_size: usize,
    /// Values cycled through by the page-size selector.
    pub page_size_choices: Vec<usize>,
    /// Quiet period before a typed search or filter value is applied.
    pub debounce: Duration,
    pub column_resize_mode: ColumnResizeMode,
    /// Maximum number of suggestions offered by text filters.
    pub suggestion_limit: usize,
    pub show_help: bool,
    pub grid: DataGridViewOptions,
    pub theme: Theme,
    pub keymap: DataTableKeymap,
}

impl Default for DataTableOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_choices: DEFAULT_PAGE_SIZE_CHOICES.to_vec(),
            debounce: DEFAULT_DEBOUNCE,
            column_resize_mode: ColumnResizeMode::OnEnd,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            show_help: true,
            grid: DataGridViewOptions::default(),
            theme: Theme::default(),
            keymap: DataTableKeymap::default(),
        }
    }
}

impl DataTableOptions {
    /// The page size following `current` in [`DataTableOptions::page_size_choices`].
    pub fn next_page_size(&self, current: usize) -> usize {
        let choices = &self.page_size_choices;
        match choices.iter().position(|c| *c == current) {
            Some(i) => choices[(i + 1) % choices.len()],
            None => choices.first().copied().unwrap_or(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_sizes_cycle() {
        let o = DataTableOptions::default();
        assert_eq!(o.next_page_size(100), 200);
        assert_eq!(o.next_page_size(1000), 100);
        assert_eq!(o.next_page_size(42), 100);
    }
}
