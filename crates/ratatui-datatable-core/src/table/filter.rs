use crate::table::fuzzy::FuzzyMatcher;
use crate::table::value::CellValue;
use crate::table::value::ValueKind;

/// How a column filter value is matched against cell values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterFn {
    /// Picked from the column's first value: numbers use [`FilterFn::InNumberRange`], everything
    /// else [`FilterFn::IncludesString`].
    #[default]
    Auto,
    IncludesString,
    InNumberRange,
    Fuzzy,
    Equals,
}

impl FilterFn {
    pub fn resolve(self, first_value: ValueKind) -> FilterFn {
        match self {
            FilterFn::Auto => match first_value {
                ValueKind::Number => FilterFn::InNumberRange,
                _ => FilterFn::IncludesString,
            },
            other => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Text(String),
    Range { min: Option<f64>, max: Option<f64> },
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        FilterValue::Text(s.into())
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        FilterValue::Range { min, max }
    }

    /// Empty values remove the filter instead of being stored.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Range { .. } => None,
        }
    }

    pub fn min(&self) -> Option<f64> {
        match *self {
            FilterValue::Range { min, .. } => min,
            FilterValue::Text(_) => None,
        }
    }

    pub fn max(&self) -> Option<f64> {
        match *self {
            FilterValue::Range { max, .. } => max,
            FilterValue::Text(_) => None,
        }
    }

    /// Inclusive bounds with missing sides unbounded. Inverted bounds are swapped.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            FilterValue::Range { min, max } => {
                let lo = min.filter(|v| !v.is_nan()).unwrap_or(f64::NEG_INFINITY);
                let hi = max.filter(|v| !v.is_nan()).unwrap_or(f64::INFINITY);
                if lo > hi { (hi, lo) } else { (lo, hi) }
            }
            FilterValue::Text(ref s) => match s.trim().parse::<f64>() {
                Ok(v) => (v, v),
                Err(_) => (f64::NEG_INFINITY, f64::INFINITY),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnFilter {
    pub id: String,
    pub value: FilterValue,
}

pub type ColumnFiltersState = Vec<ColumnFilter>;

/// Returns `filters` with the filter of `id` replaced by `f(old)`; empty results remove it.
pub fn updated_filters<F>(filters: &ColumnFiltersState, id: &str, f: F) -> ColumnFiltersState
where
    F: FnOnce(Option<&FilterValue>) -> Option<FilterValue>,
{
    let mut next = filters.clone();
    let pos = next.iter().position(|c| c.id == id);
    let value = f(pos.map(|i| &next[i].value)).filter(|v| !v.is_empty());
    match (pos, value) {
        (Some(i), Some(v)) => next[i].value = v,
        (None, Some(v)) => next.push(ColumnFilter {
            id: id.to_string(),
            value: v,
        }),
        (Some(i), None) => {
            next.remove(i);
        }
        (None, None) => {}
    }
    next
}

/// A column filter prepared for evaluating many rows.
pub(crate) struct CompiledFilter {
    pub column: usize,
    kind: CompiledKind,
}

enum CompiledKind {
    Includes(String),
    Range(f64, f64),
    Fuzzy(FuzzyMatcher),
    Equals(FilterValue),
}

impl CompiledFilter {
    pub fn new(column: usize, filter_fn: FilterFn, value: &FilterValue) -> Self {
        let kind = match filter_fn {
            FilterFn::Auto | FilterFn::IncludesString => match value {
                FilterValue::Text(s) => CompiledKind::Includes(s.to_lowercase()),
                FilterValue::Range { .. } => {
                    let (lo, hi) = value.bounds();
                    CompiledKind::Range(lo, hi)
                }
            },
            FilterFn::InNumberRange => {
                let (lo, hi) = value.bounds();
                CompiledKind::Range(lo, hi)
            }
            FilterFn::Fuzzy => {
                CompiledKind::Fuzzy(FuzzyMatcher::new(value.as_text().unwrap_or_default()))
            }
            FilterFn::Equals => CompiledKind::Equals(value.clone()),
        };
        Self { column, kind }
    }

    /// `display` is the formatted cell text, used by the string-based filter fns.
    pub fn matches(&mut self, value: &CellValue, display: &str) -> bool {
        match &mut self.kind {
            CompiledKind::Includes(needle) => display.to_lowercase().contains(needle.as_str()),
            CompiledKind::Range(lo, hi) => value
                .as_f64()
                .is_some_and(|v| v >= *lo && v <= *hi),
            CompiledKind::Fuzzy(m) => m.score(display).is_some(),
            CompiledKind::Equals(FilterValue::Text(s)) => display == s.as_str(),
            CompiledKind::Equals(range @ FilterValue::Range { .. }) => {
                let (lo, hi) = range.bounds();
                value.as_f64().is_some_and(|v| v >= lo && v <= hi)
            }
        }
    }
}
