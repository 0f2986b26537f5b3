use crate::table::value::CellValue;
use crate::table::value::ValueKind;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_desc(self) -> bool {
        self == SortDirection::Desc
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSort {
    pub id: String,
    pub desc: bool,
}

impl ColumnSort {
    pub fn new(id: impl Into<String>, desc: bool) -> Self {
        Self {
            id: id.into(),
            desc,
        }
    }

    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// Sort keys in priority order.
pub type SortingState = Vec<ColumnSort>;

pub fn sort_direction(state: &SortingState, id: &str) -> Option<SortDirection> {
    state.iter().find(|s| s.id == id).map(ColumnSort::direction)
}

/// Position of `id` among the sort keys, when it is sorted.
pub fn sort_index(state: &SortingState, id: &str) -> Option<usize> {
    state.iter().position(|s| s.id == id)
}

/// First direction applied when a column becomes sorted: text sorts ascending, everything
/// else descending.
pub fn first_sort_direction(first_value: ValueKind, desc_first: Option<bool>) -> SortDirection {
    let desc = desc_first.unwrap_or(first_value != ValueKind::Text);
    if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

/// Next state of one column in the cycle `unsorted → first → other → unsorted`.
pub fn next_sort_direction(
    current: Option<SortDirection>,
    first: SortDirection,
) -> Option<SortDirection> {
    match current {
        None => Some(first),
        Some(dir) if dir != first => None,
        Some(dir) => Some(dir.reversed()),
    }
}

/// Applies a header toggle to the sorting state.
///
/// A `multi` toggle only touches `id`, appending it when it was not sorted yet. A single toggle
/// replaces all sort keys, unless `id` is already the last key: then it cycles in place and the
/// keys before it stay.
pub fn toggle_sorting(
    state: &SortingState,
    id: &str,
    first: SortDirection,
    multi: bool,
) -> SortingState {
    let next = next_sort_direction(sort_direction(state, id), first);
    let is_last = sort_index(state, id) == state.len().checked_sub(1);

    if !multi && !is_last {
        return next
            .map(|dir| vec![ColumnSort::new(id, dir.is_desc())])
            .unwrap_or_default();
    }

    let mut out = state.clone();
    match (next, sort_index(state, id)) {
        (Some(dir), Some(i)) => out[i].desc = dir.is_desc(),
        (Some(dir), None) => out.push(ColumnSort::new(id, dir.is_desc())),
        (None, Some(i)) => {
            out.remove(i);
        }
        (None, None) => {}
    }
    out
}

/// Compares two values for one sort key. Empty values sort last in both directions.
pub fn compare_for_sort(a: &CellValue, b: &CellValue, desc: bool) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.compare(b);
            if desc { ord.reverse() } else { ord }
        }
    }
}
