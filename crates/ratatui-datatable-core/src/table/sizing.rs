use std::collections::HashMap;

/// When a dragged column width is committed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnResizeMode {
    /// Width changes on release; while dragging only a marker moves.
    #[default]
    OnEnd,
    /// Width follows the pointer.
    OnChange,
}

/// User-chosen column widths by column id. Columns missing here use their default size.
pub type ColumnSizingState = HashMap<String, u16>;

/// Bookkeeping for an in-progress resize drag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnSizingInfo {
    pub resizing_column: Option<String>,
    pub start_offset: i32,
    pub start_size: u16,
    pub delta_offset: i32,
}

impl ColumnSizingInfo {
    pub fn is_resizing(&self, id: &str) -> bool {
        self.resizing_column.as_deref() == Some(id)
    }

    pub fn target_size(&self) -> i32 {
        self.start_size as i32 + self.delta_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_size_follows_delta() {
        let info = ColumnSizingInfo {
            resizing_column: Some("age".into()),
            start_offset: 10,
            start_size: 5,
            delta_offset: -2,
        };
        assert!(info.is_resizing("age"));
        assert!(!info.is_resizing("visits"));
        assert_eq!(info.target_size(), 3);
    }
}
