//! Fuzzy matching for the global filter, backed by `nucleo-matcher`.

use nucleo_matcher::Config;
use nucleo_matcher::Matcher;
use nucleo_matcher::Utf32Str;
use nucleo_matcher::pattern::AtomKind;
use nucleo_matcher::pattern::CaseMatching;
use nucleo_matcher::pattern::Normalization;
use nucleo_matcher::pattern::Pattern;

/// A compiled fuzzy query. Reuse one instance across rows; it keeps scratch buffers around.
pub struct FuzzyMatcher {
    matcher: Matcher,
    pattern: Pattern,
    buf: Vec<char>,
    empty: bool,
}

impl FuzzyMatcher {
    pub fn new(query: &str) -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
            pattern: Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ),
            buf: Vec::new(),
            empty: query.trim().is_empty(),
        }
    }

    /// Returns `true` when the query has no atoms and therefore matches everything.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Scores `haystack` against the query; `None` means no match. Higher is better.
    pub fn score(&mut self, haystack: &str) -> Option<u32> {
        if self.empty {
            return Some(0);
        }
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        self.pattern.score(haystack, &mut self.matcher)
    }
}

impl std::fmt::Debug for FuzzyMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyMatcher")
            .field("empty", &self.empty)
            .finish_non_exhaustive()
    }
}
