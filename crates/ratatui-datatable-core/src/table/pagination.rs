pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self, rows: usize) -> usize {
        rows.div_ceil(self.page_size.max(1))
    }

    /// Clamps `page_index` into the pages available for `rows`.
    pub fn clamped(self, rows: usize) -> Self {
        let max_index = self.page_count(rows).saturating_sub(1);
        Self {
            page_index: self.page_index.min(max_index),
            ..self
        }
    }

    /// Changes the page size keeping the first visible record on the resulting page.
    pub fn with_page_size(self, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let top_row = self.page_size * self.page_index;
        Self {
            page_index: top_row / page_size,
            page_size,
        }
    }

    /// Row range (into the pre-pagination rows) covered by the current page.
    pub fn range(&self, rows: usize) -> std::ops::Range<usize> {
        let start = (self.page_index * self.page_size).min(rows);
        let end = (start + self.page_size).min(rows);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let p = PaginationState::new(0, 100);
        assert_eq!(p.page_count(0), 0);
        assert_eq!(p.page_count(1), 1);
        assert_eq!(p.page_count(100), 1);
        assert_eq!(p.page_count(50_000), 500);
        assert_eq!(p.page_count(50_001), 501);
    }

    #[test]
    fn page_size_change_keeps_top_row() {
        let p = PaginationState::new(3, 100).with_page_size(200);
        assert_eq!(p, PaginationState::new(1, 200));
        let p = PaginationState::new(3, 100).with_page_size(1000);
        assert_eq!(p.page_index, 0);
    }

    #[test]
    fn range_is_clipped_to_rows() {
        let p = PaginationState::new(2, 100);
        assert_eq!(p.range(250), 200..250);
        assert_eq!(p.range(10), 10..10);
        assert_eq!(p.clamped(250).page_index, 2);
        assert_eq!(p.clamped(150).page_index, 1);
        assert_eq!(p.clamped(0).page_index, 0);
    }
}
