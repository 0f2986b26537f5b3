use ratatui_datatable_core::input::InputEvent;
use ratatui_datatable_core::table::FilterValue;
use ratatui_datatable_core::text_input::DebouncedInput;
use ratatui_datatable_core::text_input::InputKind;
use ratatui_datatable_core::text_input::TextInputAction;
use ratatui_datatable_core::text_input::TextInputOptions;
use std::collections::BTreeMap;
use std::time::Duration;
use std::time::Instant;

/// One settled edit of a column filter, applied to the previous filter value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FilterEdit {
    Text(String),
    Min(Option<f64>),
    Max(Option<f64>),
}

impl FilterEdit {
    pub(crate) fn apply(self, old: Option<&FilterValue>) -> Option<FilterValue> {
        match self {
            FilterEdit::Text(s) => Some(FilterValue::text(s)),
            FilterEdit::Min(min) => Some(FilterValue::range(min, old.and_then(FilterValue::max))),
            FilterEdit::Max(max) => Some(FilterValue::range(old.and_then(FilterValue::min), max)),
        }
    }
}

/// Filter inputs shown under a column header: a text search with suggestions, or a min/max pair
/// for numeric columns.
#[derive(Debug)]
pub(crate) enum ColumnFilterInput {
    Text(DebouncedInput),
    Range {
        min: DebouncedInput,
        max: DebouncedInput,
    },
}

impl ColumnFilterInput {
    pub(crate) fn text(debounce: Duration, suggestion_limit: usize) -> Self {
        let options = TextInputOptions {
            suggestion_limit,
            ..Default::default()
        };
        Self::Text(DebouncedInput::with_options(options, debounce))
    }

    pub(crate) fn range(debounce: Duration) -> Self {
        let options = TextInputOptions {
            kind: InputKind::Number,
            ..Default::default()
        };
        Self::Range {
            min: DebouncedInput::with_options(options.clone(), debounce),
            max: DebouncedInput::with_options(options, debounce),
        }
    }

    /// Number of input rows this filter occupies.
    pub(crate) fn slots(&self) -> usize {
        match self {
            Self::Text(_) => 1,
            Self::Range { .. } => 2,
        }
    }

    pub(crate) fn slot(&self, slot: usize) -> Option<&DebouncedInput> {
        match (self, slot) {
            (Self::Text(input), 0) => Some(input),
            (Self::Range { min, .. }, 0) => Some(min),
            (Self::Range { max, .. }, 1) => Some(max),
            _ => None,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut DebouncedInput> {
        match (self, slot) {
            (Self::Text(input), 0) => Some(input),
            (Self::Range { min, .. }, 0) => Some(min),
            (Self::Range { max, .. }, 1) => Some(max),
            _ => None,
        }
    }

    /// Applies a new debounce delay and suggestion limit without dropping typed text.
    pub(crate) fn configure(&mut self, debounce: Duration, suggestion_limit: usize) {
        for i in 0..self.slots() {
            if let Some(input) = self.slot_mut(i) {
                input.set_delay(debounce);
                let options = TextInputOptions {
                    suggestion_limit,
                    ..input.input.options().clone()
                };
                input.input.set_options(options);
            }
        }
    }

    pub(crate) fn set_focused(&mut self, slot: Option<usize>) {
        for i in 0..self.slots() {
            if let Some(input) = self.slot_mut(i) {
                input.input.set_focused(slot == Some(i));
            }
        }
    }

    pub(crate) fn handle_event(
        &mut self,
        slot: usize,
        event: InputEvent,
        now: Instant,
    ) -> TextInputAction {
        match self.slot_mut(slot) {
            Some(input) => input.handle_event(event, now),
            None => TextInputAction::None,
        }
    }

    /// Edits whose debounce delay elapsed.
    pub(crate) fn poll(&mut self, now: Instant) -> Vec<FilterEdit> {
        self.collect(|input| input.poll(now))
    }

    /// Pending edits, regardless of their deadline.
    pub(crate) fn flush(&mut self) -> Vec<FilterEdit> {
        self.collect(DebouncedInput::flush)
    }

    pub(crate) fn flush_slot(&mut self, slot: usize) -> Option<FilterEdit> {
        let value = self.slot_mut(slot)?.flush()?;
        Some(self.edit(slot, value))
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        (0..self.slots())
            .filter_map(|i| self.slot(i).and_then(DebouncedInput::deadline))
            .min()
    }

    /// Mirrors the table's current filter value into the inputs.
    pub(crate) fn sync(&mut self, value: Option<&FilterValue>) {
        match self {
            Self::Text(input) => input.sync_value(value.and_then(FilterValue::as_text).unwrap_or("")),
            Self::Range { min, max } => {
                min.sync_value(&format_bound(value.and_then(FilterValue::min)));
                max.sync_value(&format_bound(value.and_then(FilterValue::max)));
            }
        }
    }

    /// Refreshes placeholders and suggestions from the column's facets.
    pub(crate) fn refresh_hints(
        &mut self,
        unique_values: &BTreeMap<String, usize>,
        min_max: Option<(f64, f64)>,
    ) {
        match self {
            Self::Text(input) => {
                input
                    .input
                    .set_placeholder(format!("Search... ({})", unique_values.len()));
                input.input.set_suggestions(unique_values.keys().cloned());
            }
            Self::Range { min, max } => {
                let (lo, hi) = min_max.unzip();
                min.input.set_placeholder(bound_placeholder("Min", lo));
                max.input.set_placeholder(bound_placeholder("Max", hi));
            }
        }
    }

    fn collect(&mut self, mut f: impl FnMut(&mut DebouncedInput) -> Option<String>) -> Vec<FilterEdit> {
        let mut edits = Vec::new();
        for slot in 0..self.slots() {
            if let Some(value) = self.slot_mut(slot).and_then(&mut f) {
                edits.push(self.edit(slot, value));
            }
        }
        edits
    }

    fn edit(&self, slot: usize, value: String) -> FilterEdit {
        match (self, slot) {
            (Self::Text(_), _) => FilterEdit::Text(value),
            (Self::Range { .. }, 0) => FilterEdit::Min(parse_bound(&value)),
            (Self::Range { .. }, _) => FilterEdit::Max(parse_bound(&value)),
        }
    }
}

fn parse_bound(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn format_bound(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// `Min (3)`; the hint is left out when the facet is missing or zero.
fn bound_placeholder(label: &str, value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format!("{label} ({v})"),
        _ => format!("{label} "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui_datatable_core::input::KeyCode;
    use ratatui_datatable_core::input::KeyEvent;

    #[test]
    fn range_edits_keep_the_other_bound() {
        let old = FilterValue::range(Some(1.0), Some(9.0));
        assert_eq!(
            FilterEdit::Min(Some(3.0)).apply(Some(&old)),
            Some(FilterValue::range(Some(3.0), Some(9.0)))
        );
        assert_eq!(
            FilterEdit::Max(None).apply(Some(&old)),
            Some(FilterValue::range(Some(1.0), None))
        );
        assert_eq!(
            FilterEdit::Max(Some(5.0)).apply(None),
            Some(FilterValue::range(None, Some(5.0)))
        );
    }

    #[test]
    fn placeholders_follow_facets() {
        let mut f = ColumnFilterInput::range(Duration::from_millis(10));
        f.refresh_hints(&BTreeMap::new(), Some((0.0, 39.0)));
        assert_eq!(f.slot(0).map(|i| i.input.placeholder()), Some("Min "));
        assert_eq!(f.slot(1).map(|i| i.input.placeholder()), Some("Max (39)"));

        let mut f = ColumnFilterInput::text(Duration::from_millis(10), 5000);
        let uniques: BTreeMap<String, usize> =
            [("single".to_string(), 2), ("complicated".to_string(), 1)].into();
        f.refresh_hints(&uniques, None);
        let input = f.slot(0).map(|i| &i.input);
        assert_eq!(input.map(|i| i.placeholder()), Some("Search... (2)"));
        assert_eq!(
            input.map(|i| i.suggestions().to_vec()),
            Some(vec!["complicated".to_string(), "single".to_string()])
        );
    }

    #[test]
    fn typed_bounds_become_edits() {
        let t0 = Instant::now();
        let mut f = ColumnFilterInput::range(Duration::from_millis(10));
        f.handle_event(1, InputEvent::Key(KeyEvent::new(KeyCode::Char('3'))), t0);
        f.handle_event(1, InputEvent::Key(KeyEvent::new(KeyCode::Char('0'))), t0);
        assert!(f.poll(t0).is_empty());
        assert_eq!(
            f.poll(t0 + Duration::from_millis(10)),
            vec![FilterEdit::Max(Some(30.0))]
        );
    }

    #[test]
    fn sync_mirrors_filter_values() {
        let mut f = ColumnFilterInput::range(Duration::from_millis(10));
        f.sync(Some(&FilterValue::range(Some(2.5), None)));
        assert_eq!(f.slot(0).map(|i| i.text()), Some("2.5"));
        assert_eq!(f.slot(1).map(|i| i.text()), Some(""));
    }
}
